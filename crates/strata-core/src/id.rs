//! Strongly-typed identifiers and the [`Vec3`] type alias.

use std::fmt;

/// A world-space coordinate, normal, or velocity vector.
///
/// Always three components; two-dimensional domains leave the last
/// component at zero.
pub type Vec3 = [f64; 3];

/// Identifies a material by its position in the material stack.
///
/// `MaterialId(0)` is the lowest material; the highest id is the top
/// layer that wraps all others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for MaterialId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Identifies a defined point of a narrow-band field.
///
/// The id is the point's rank in the field's sparse iteration order, so it
/// doubles as the index into every auxiliary point-data array. Ids are only
/// stable until the field's point set changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub usize);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for PointId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}
