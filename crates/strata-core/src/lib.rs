//! Core types and traits for the Strata level-set advection engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Strata workspace:
//! identifiers, the [`VelocityField`] capability, scheme selectors, and
//! error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod scheme;
pub mod velocity;

pub use error::{AdvectError, ConfigError};
pub use id::{MaterialId, PointId, Vec3};
pub use scheme::{SpatialSchemeKind, TemporalSchemeKind};
pub use velocity::VelocityField;
