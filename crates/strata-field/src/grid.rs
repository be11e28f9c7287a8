//! Finite index box with spacing and per-axis boundary conditions.

use crate::boundary::BoundaryCondition;
use crate::error::FieldError;
use smallvec::SmallVec;
use strata_core::Vec3;

/// Face neighbours of a grid cell, at most `2 * 3` entries.
pub type StarNeighbors = SmallVec<[usize; 6]>;

/// An axis-aligned box of integer grid indices.
///
/// Indices run from `min[i]` to `max[i]` inclusive on each axis. Cells are
/// linearised with axis 0 varying fastest, which is also the sparse
/// iteration order of every field on this grid.
///
/// # Examples
///
/// ```
/// use strata_field::{BoundaryCondition, Grid};
///
/// let grid = Grid::<2>::new([-2, 0], [2, 3], 0.5, [BoundaryCondition::Infinite; 2]).unwrap();
/// assert_eq!(grid.cell_count(), 20);
/// let lin = grid.linear([1, 2]);
/// assert_eq!(grid.index_of(lin), [1, 2]);
/// assert_eq!(grid.coordinate(lin), [0.5, 1.0, 0.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<const D: usize> {
    min: [i64; D],
    max: [i64; D],
    delta: f64,
    boundary: [BoundaryCondition; D],
    strides: [usize; D],
    cell_count: usize,
}

impl<const D: usize> Grid<D> {
    /// Create a grid covering `[min, max]` (inclusive) with spacing `delta`.
    ///
    /// Returns `Err(FieldError::InvertedBounds)` if any axis has
    /// `min > max`, or `Err(FieldError::InvalidGridDelta)` if `delta` is not
    /// finite and positive.
    pub fn new(
        min: [i64; D],
        max: [i64; D],
        delta: f64,
        boundary: [BoundaryCondition; D],
    ) -> Result<Self, FieldError> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(FieldError::InvalidGridDelta { value: delta });
        }
        let mut strides = [0usize; D];
        let mut count = 1usize;
        for axis in 0..D {
            if min[axis] > max[axis] {
                return Err(FieldError::InvertedBounds {
                    axis,
                    min: min[axis],
                    max: max[axis],
                });
            }
            strides[axis] = count;
            let extent = usize::try_from(max[axis] - min[axis] + 1)
                .map_err(|_| FieldError::TooManyCells)?;
            count = count.checked_mul(extent).ok_or(FieldError::TooManyCells)?;
        }
        Ok(Self {
            min,
            max,
            delta,
            boundary,
            strides,
            cell_count: count,
        })
    }

    /// Lowest index on each axis.
    pub fn min_index(&self) -> [i64; D] {
        self.min
    }

    /// Highest index on each axis.
    pub fn max_index(&self) -> [i64; D] {
        self.max
    }

    /// Grid spacing in world units.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Boundary condition of `axis`.
    pub fn boundary(&self, axis: usize) -> BoundaryCondition {
        self.boundary[axis]
    }

    /// Total number of cells in the box.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Linear position of `index` after boundary resolution.
    pub fn linear(&self, index: [i64; D]) -> usize {
        let mut lin = 0usize;
        for axis in 0..D {
            let v = self.boundary[axis].resolve(index[axis], self.min[axis], self.max[axis]);
            lin += (v - self.min[axis]) as usize * self.strides[axis];
        }
        lin
    }

    /// Grid index of linear position `lin`.
    pub fn index_of(&self, lin: usize) -> [i64; D] {
        let mut index = [0i64; D];
        let mut rest = lin;
        for axis in (0..D).rev() {
            let q = rest / self.strides[axis];
            rest -= q * self.strides[axis];
            index[axis] = self.min[axis] + q as i64;
        }
        index
    }

    /// Linear position of the cell at `offset` from `lin`.
    pub fn offset(&self, lin: usize, offset: [i64; D]) -> usize {
        let mut index = self.index_of(lin);
        for axis in 0..D {
            index[axis] += offset[axis];
        }
        self.linear(index)
    }

    /// The `2 * D` face neighbours of `lin`.
    ///
    /// Order is `+axis0, +axis1, .., -axis0, -axis1, ..`; tie-breaking
    /// searches over neighbours rely on it.
    pub fn star_neighbors(&self, lin: usize) -> StarNeighbors {
        let index = self.index_of(lin);
        let mut out = StarNeighbors::new();
        for sign in [1i64, -1] {
            for axis in 0..D {
                let mut n = index;
                n[axis] += sign;
                out.push(self.linear(n));
            }
        }
        out
    }

    /// World coordinate of `lin`, padded to three components.
    pub fn coordinate(&self, lin: usize) -> Vec3 {
        let index = self.index_of(lin);
        let mut c = [0.0; 3];
        for axis in 0..D.min(3) {
            c[axis] = index[axis] as f64 * self.delta;
        }
        c
    }

    /// Whether `other` describes the same box, spacing and boundaries.
    pub fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}
