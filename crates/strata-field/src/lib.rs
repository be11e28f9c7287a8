//! Sparse narrow-band level-set fields for Strata.
//!
//! A [`NarrowBandField`] stores a signed-distance-like value only within a
//! few grid layers of its zero crossing. Negative values are inside the
//! material. Everything else reads as one of the [`POS_VALUE`] /
//! [`NEG_VALUE`] sentinels.
//!
//! # Operations
//!
//! - [`NarrowBandField::expand`] / [`NarrowBandField::reduce`]: grow or
//!   shrink the band width
//! - [`NarrowBandField::prune`]: keep only points next to a sign change
//! - [`NarrowBandField::boolean_op`]: intersection, union and relative
//!   complement with another field
//! - [`NarrowBandField::mark_void_points`]: label disconnected voids
//! - [`NarrowBandField::rebuild_with`]: replace the point set wholesale,
//!   migrating [`PointData`] by source point

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod band;
pub mod boolean;
pub mod boundary;
pub mod error;
pub mod field;
pub mod grid;
pub mod point_data;
pub mod voids;

pub use boolean::BooleanOp;
pub use boundary::BoundaryCondition;
pub use error::FieldError;
pub use field::{is_sentinel, BandPoint, NarrowBandField, NEG_VALUE, POS_VALUE};
pub use grid::Grid;
pub use point_data::PointData;
pub use voids::VOID_POINT_LABEL;
