//! Strata: level-set advection of nested material stacks.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use strata::prelude::*;
//!
//! // Isotropic growth at one unit per unit time.
//! struct Deposit;
//! impl VelocityField for Deposit {
//!     fn scalar_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
//!         1.0
//!     }
//! }
//!
//! // A circle of radius 4 on a 33x33 grid.
//! let grid = Grid::<2>::new([-16, -16], [16, 16], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
//! let circle = NarrowBandField::from_fn(grid, 2, |x| (x[0] * x[0] + x[1] * x[1]).sqrt() - 4.0);
//!
//! let mut engine = AdvectionEngine::new();
//! engine.insert_level_set(circle);
//! engine.set_velocity_field(Arc::new(Deposit));
//! engine.set_advection_time(2.0);
//! engine.apply().unwrap();
//!
//! assert!((engine.advected_time() - 2.0).abs() < 1e-9);
//! // the old centre of the surface ring is now well inside
//! assert!(engine.level_sets()[0].value_at([4, 0]) < -1.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | IDs, the velocity trait, scheme selectors, errors |
//! | [`field`] | `strata-field` | Grids, narrow-band fields, point data, band operations |
//! | [`scheme`] | `strata-scheme` | Hamilton-Jacobi spatial schemes |
//! | [`engine`] | `strata-engine` | Rate sweep, update, rebuild, time integration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`strata-core`).
///
/// Contains [`types::VelocityField`], the spatial and temporal scheme
/// selectors, and the error types returned by the engine.
pub use strata_core as types;

/// Grids and sparse narrow-band fields (`strata-field`).
///
/// [`field::NarrowBandField`] stores a level set; [`field::PointData`]
/// carries auxiliary arrays that follow its points.
pub use strata_field as field;

/// Spatial discretisation schemes (`strata-scheme`).
///
/// Most users select a scheme through [`types::SpatialSchemeKind`] and
/// never touch this module directly.
pub use strata_scheme as scheme;

/// The advection engine (`strata-engine`).
///
/// [`engine::AdvectionEngine`] owns a material stack and advances it.
pub use strata_engine as engine;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use strata_core::{MaterialId, PointId, SpatialSchemeKind, TemporalSchemeKind, Vec3, VelocityField};

    // Errors
    pub use strata_core::{AdvectError, ConfigError};
    pub use strata_field::FieldError;

    // Fields
    pub use strata_field::{BooleanOp, BoundaryCondition, Grid, NarrowBandField, PointData};

    // Engine
    pub use strata_engine::{AdvectConfig, AdvectionEngine, VelocityUpdate};
}
