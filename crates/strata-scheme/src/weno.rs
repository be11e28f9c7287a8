//! Upwind scheme with weighted essentially non-oscillatory differences.
//!
//! Same Godunov flux as Engquist-Osher, but each one-sided difference is a
//! WENO blend of candidate stencils, so smooth fronts are resolved to third
//! or fifth order while kinks fall back to the smoothest candidate. The
//! stencil reaches two or three cells to each side.

use crate::differences::{axis_stencil, central_gradient, normalize, pad, weno3, weno5};
use crate::scheme::{FieldView, SpatialScheme};
use strata_core::MaterialId;

/// Upwind Hamiltonian from WENO one-sided differences. No dissipation.
///
/// ```text
/// H = sqrt(Σ max(D-,0)² + min(D+,0)²) * v   if v > 0
/// H = sqrt(Σ min(D-,0)² + max(D+,0)²) * v   if v < 0
///   + Σ upwinded vector velocity terms
/// ```
#[derive(Clone)]
pub struct Weno<'a, const D: usize> {
    view: FieldView<'a, D>,
    fifth_order: bool,
    calculate_normal_vectors: bool,
}

impl<'a, const D: usize> Weno<'a, D> {
    /// New scheme of `order` 3 or 5; any other order selects 3.
    pub fn new(view: FieldView<'a, D>, order: usize, calculate_normal_vectors: bool) -> Self {
        Self {
            view,
            fifth_order: order == 5,
            calculate_normal_vectors,
        }
    }

    // Backward and forward differences along `axis`.
    fn differences(&self, lin: usize, axis: usize) -> (f64, f64) {
        let field = self.view.field;
        let delta = field.grid().delta();
        if self.fifth_order {
            let x: [f64; 7] = axis_stencil(field, lin, axis);
            (weno5(&x, delta, false), weno5(&x, delta, true))
        } else {
            let x: [f64; 5] = axis_stencil(field, lin, axis);
            (weno3(&x, delta, false), weno3(&x, delta, true))
        }
    }
}

impl<const D: usize> SpatialScheme for Weno<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let mut normal = [0.0; 3];
        if self.calculate_normal_vectors {
            normal = pad(central_gradient(self.view.field, lin, [0; D]));
            normalize(&mut normal);
        }

        let (scalar, vector) = self.view.velocities(
            self.view.coordinate(lin),
            material,
            normal,
            self.view.point(lin),
        );

        let mut grad_pos_total = 0.0;
        let mut grad_neg_total = 0.0;
        let mut hamiltonian = 0.0;
        for axis in 0..D {
            let (minus, plus) = self.differences(lin, axis);
            grad_pos_total += minus.max(0.0).powi(2) + plus.min(0.0).powi(2);
            grad_neg_total += minus.min(0.0).powi(2) + plus.max(0.0).powi(2);
            if vector[axis] > 0.0 {
                hamiltonian += vector[axis] * minus;
            } else if vector[axis] < 0.0 {
                hamiltonian += vector[axis] * plus;
            }
        }

        if scalar > 0.0 {
            hamiltonian += grad_pos_total.sqrt() * scalar;
        } else if scalar < 0.0 {
            hamiltonian += grad_neg_total.sqrt() * scalar;
        }
        (hamiltonian, 0.0)
    }
}
