//! Error types for field construction and combination.

use std::error::Error;
use std::fmt;

/// Errors arising from grid construction or field operations.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// An axis has `min > max`.
    InvertedBounds {
        /// The offending axis.
        axis: usize,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// Grid spacing is NaN, infinite, zero, or negative.
    InvalidGridDelta {
        /// The invalid value.
        value: f64,
    },
    /// The grid has more cells than can be addressed.
    TooManyCells,
    /// Two fields combined in one operation live on different grids.
    GridMismatch,
    /// A point-data array does not have one entry per defined point.
    PointDataLength {
        /// Label of the offending array.
        label: String,
        /// Number of entries supplied.
        len: usize,
        /// Number of defined points.
        expected: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedBounds { axis, min, max } => {
                write!(f, "axis {axis} has inverted bounds [{min}, {max}]")
            }
            Self::InvalidGridDelta { value } => {
                write!(f, "grid delta must be finite and positive, got {value}")
            }
            Self::TooManyCells => write!(f, "grid cell count overflows usize"),
            Self::GridMismatch => write!(f, "fields live on different grids"),
            Self::PointDataLength {
                label,
                len,
                expected,
            } => write!(
                f,
                "point data '{label}' has {len} entries, expected {expected}"
            ),
        }
    }
}

impl Error for FieldError {}
