//! Level-set advection engine for stacks of nested materials.
//!
//! The engine owns an ordered stack of [`NarrowBandField`]s, bottom first.
//! Each step moves the top field under a caller-supplied
//! [`VelocityField`](strata_core::VelocityField) and then clips every
//! lower material to it:
//!
//! 1. widen the top band to the width the spatial scheme needs,
//! 2. sweep active points for rates and the largest stable time step
//!    ([`rates`]),
//! 3. displace the points ([`update`]),
//! 4. renormalise the band ([`rebuild`]),
//! 5. intersect the lower materials with the moved top.
//!
//! Runge-Kutta integration repeats steps 1 to 3 per stage ([`temporal`]).
//!
//! [`NarrowBandField`]: strata_field::NarrowBandField

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod rates;
pub mod rebuild;
pub mod temporal;
pub mod update;

pub use config::AdvectConfig;
pub use engine::{AdvectionEngine, VelocityUpdate};
pub use rates::{compute_rates, PointRates, RateEntry, RateTable, WRAPPING_LAYER_EPSILON};
pub use rebuild::rebuild;
pub use strata_scheme::{finalize_stencil_local_lax_friedrichs, prepare_stencil_local_lax_friedrichs};
pub use temporal::combine_level_sets;
pub use update::{update_level_set, DISSIPATION_LABEL, VELOCITY_LABEL};
