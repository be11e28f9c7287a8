//! Boolean combination of two fields on the same grid.

use crate::error::FieldError;
use crate::field::{chunk_len, is_sentinel, BandPoint, NarrowBandField};
use rayon::prelude::*;
use strata_core::PointId;

/// How two fields are combined, cell by cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BooleanOp {
    /// Material present in both: `max(a, b)`.
    Intersect,
    /// Material present in either: `min(a, b)`.
    Union,
    /// Material of `a` not in `b`: `max(a, -b)`.
    RelativeComplement,
}

impl BooleanOp {
    fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Intersect => a.max(b),
            Self::Union => a.min(b),
            Self::RelativeComplement => a.max(-b),
        }
    }
}

impl<const D: usize> NarrowBandField<D> {
    /// Combine `other` into `self` with `op`, then prune to width 1.
    ///
    /// Every cell of the grid is combined, sentinels included, so the side
    /// of undefined cells follows the result. Point data is cleared.
    ///
    /// Returns `Err(FieldError::GridMismatch)` if the grids differ.
    pub fn boolean_op(&mut self, other: &Self, op: BooleanOp) -> Result<(), FieldError> {
        if !self.grid().same_as(other.grid()) {
            return Err(FieldError::GridMismatch);
        }
        let combined: Vec<f64> = self
            .values()
            .par_iter()
            .zip(other.values().par_iter())
            .map(|(&a, &b)| op.combine(a, b))
            .collect();

        let chunk = chunk_len(combined.len());
        let segments: Vec<Vec<BandPoint>> = combined
            .par_chunks(chunk)
            .enumerate()
            .map(|(c, values)| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !is_sentinel(**v))
                    .map(|(i, &value)| BandPoint {
                        index: c * chunk + i,
                        value,
                        source: PointId(0),
                    })
                    .collect()
            })
            .collect();

        let width = self.level_set_width().min(other.level_set_width());
        self.assemble(combined, segments, width, false);
        self.prune();
        Ok(())
    }

    /// Swap inside and outside by negating every value.
    pub fn invert(&mut self) {
        self.negate_values();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use crate::field::{NEG_VALUE, POS_VALUE};
    use crate::grid::Grid;

    fn grid() -> Grid<1> {
        Grid::new([-10], [10], 1.0, [BoundaryCondition::Infinite]).unwrap()
    }

    // Material below x = at.
    fn below(at: f64) -> NarrowBandField<1> {
        NarrowBandField::from_fn(grid(), 2, move |x| x[0] - at)
    }

    // Material above x = at.
    fn above(at: f64) -> NarrowBandField<1> {
        NarrowBandField::from_fn(grid(), 2, move |x| at - x[0])
    }

    #[test]
    fn intersect_of_half_spaces_is_slab() {
        let mut f = below(3.4);
        f.boolean_op(&above(-2.4), BooleanOp::Intersect).unwrap();
        assert!(f.value_at([0]) < 0.0);
        assert_eq!(f.value_at([0]), NEG_VALUE);
        assert_eq!(f.value_at([8]), POS_VALUE);
        assert_eq!(f.value_at([-8]), POS_VALUE);
        // two interfaces, two points each
        assert_eq!(f.number_of_points(), 4);
        assert_eq!(f.level_set_width(), 1);
    }

    #[test]
    fn union_takes_minimum() {
        let mut f = below(-3.4);
        f.boolean_op(&below(2.6), BooleanOp::Union).unwrap();
        assert!((f.value_at([2]) + 0.6).abs() < 1e-12);
        assert!((f.value_at([3]) - 0.4).abs() < 1e-12);
        assert_eq!(f.value_at([-3]), NEG_VALUE);
    }

    #[test]
    fn relative_complement_removes_other() {
        let mut f = below(3.4);
        f.boolean_op(&below(-2.6), BooleanOp::RelativeComplement).unwrap();
        // material is now (-2.6, 3.4]
        assert_eq!(f.value_at([-6]), POS_VALUE);
        assert_eq!(f.value_at([0]), NEG_VALUE);
        assert!((f.value_at([-3]) - 0.4).abs() < 1e-12);
        assert!((f.value_at([-2]) + 0.6).abs() < 1e-12);
    }

    #[test]
    fn boolean_op_clears_point_data() {
        let mut f = below(0.3);
        let n = f.number_of_points();
        f.point_data_mut().insert_scalar_data("tag", vec![1.0; n]);
        f.boolean_op(&below(0.3), BooleanOp::Union).unwrap();
        assert!(f.point_data().is_empty());
    }

    #[test]
    fn grid_mismatch_is_rejected() {
        let mut f = below(0.3);
        let other_grid = Grid::new([-10], [11], 1.0, [BoundaryCondition::Infinite]).unwrap();
        let other = NarrowBandField::from_fn(other_grid, 2, |x| x[0]);
        match f.boolean_op(&other, BooleanOp::Union) {
            Err(FieldError::GridMismatch) => {}
            other => panic!("expected GridMismatch, got {other:?}"),
        }
    }

    #[test]
    fn invert_swaps_sides() {
        let mut f = below(0.3);
        f.invert();
        assert_eq!(f.value_at([-5]), POS_VALUE);
        assert_eq!(f.value_at([5]), NEG_VALUE);
        assert!((f.value_at([0]) - 0.3).abs() < 1e-12);
    }
}
