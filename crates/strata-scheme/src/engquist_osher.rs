//! Engquist-Osher upwind scheme.
//!
//! Cheap and free of dissipation, but only accurate for velocity fields
//! that vary slowly with the surface normal.

use crate::differences::{central_gradient, normalize, one_sided, pad};
use crate::scheme::{FieldView, SpatialScheme};
use strata_core::MaterialId;

/// Upwind Hamiltonian with first- or second-order one-sided differences.
///
/// ```text
/// H = sqrt(Σ max(D-,0)² + min(D+,0)²) * v   if v > 0
/// H = sqrt(Σ min(D-,0)² + max(D+,0)²) * v   otherwise
///   + Σ upwinded vector velocity terms
/// ```
#[derive(Clone)]
pub struct EngquistOsher<'a, const D: usize> {
    view: FieldView<'a, D>,
    order: usize,
    calculate_normal_vectors: bool,
}

impl<'a, const D: usize> EngquistOsher<'a, D> {
    /// New scheme of `order` (1 or 2).
    pub fn new(view: FieldView<'a, D>, order: usize, calculate_normal_vectors: bool) -> Self {
        Self {
            view,
            order,
            calculate_normal_vectors,
        }
    }
}

impl<const D: usize> SpatialScheme for EngquistOsher<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let field = self.view.field;
        let mut grad_pos = [0.0; D];
        let mut grad_neg = [0.0; D];
        let mut grad_pos_total = 0.0;
        let mut grad_neg_total = 0.0;

        for axis in 0..D {
            let (diff_pos, diff_neg) = one_sided(field, lin, axis, self.order);
            grad_pos[axis] = diff_neg;
            grad_neg[axis] = diff_pos;
            grad_pos_total += diff_neg.max(0.0).powi(2) + diff_pos.min(0.0).powi(2);
            grad_neg_total += diff_neg.min(0.0).powi(2) + diff_pos.max(0.0).powi(2);
        }

        let mut normal = [0.0; 3];
        if self.calculate_normal_vectors {
            normal = pad(central_gradient(field, lin, [0; D]));
            normalize(&mut normal);
        }

        let (scalar, vector) = self.view.velocities(
            self.view.coordinate(lin),
            material,
            normal,
            self.view.point(lin),
        );

        let mut hamiltonian = if scalar > 0.0 {
            grad_pos_total.sqrt() * scalar
        } else {
            grad_neg_total.sqrt() * scalar
        };
        for w in 0..D {
            hamiltonian += if vector[w] > 0.0 {
                vector[w] * grad_pos[w]
            } else {
                vector[w] * grad_neg[w]
            };
        }

        (hamiltonian, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_field::{BoundaryCondition, Grid, NarrowBandField};
    use strata_test_utils::ConstantVelocity;

    fn plane() -> NarrowBandField<2> {
        let grid = Grid::new([-6, -6], [6, 6], 0.5, [BoundaryCondition::Infinite; 2]).unwrap();
        NarrowBandField::from_fn(grid, 5, |x| x[1] - 0.1)
    }

    #[test]
    fn flat_interface_hamiltonian_is_speed_over_delta() {
        let f = plane();
        let v = ConstantVelocity::scalar(1.5);
        let mut s = EngquistOsher::new(FieldView::new(&f, &v), 1, true);
        let (h, d) = s.evaluate(f.grid().linear([0, 0]), MaterialId(0));
        assert!((h - 3.0).abs() < 1e-9, "h = {h}");
        assert_eq!(d, 0.0);
    }

    #[test]
    fn etching_uses_forward_differences() {
        let f = plane();
        let v = ConstantVelocity::scalar(-1.0);
        let mut s = EngquistOsher::new(FieldView::new(&f, &v), 2, false);
        let (h, _) = s.evaluate(f.grid().linear([1, 0]), MaterialId(0));
        assert!((h + 2.0).abs() < 1e-9, "h = {h}");
    }

    #[test]
    fn vector_velocity_is_upwinded() {
        let f = plane();
        let v = ConstantVelocity::vector([0.0, 1.0, 0.0]);
        let mut s = EngquistOsher::new(FieldView::new(&f, &v), 1, true);
        let (h, _) = s.evaluate(f.grid().linear([0, 0]), MaterialId(0));
        assert!((h - 2.0).abs() < 1e-9);
    }
}
