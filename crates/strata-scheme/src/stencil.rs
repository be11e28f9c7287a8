//! Stencil local Lax-Friedrichs scheme.
//!
//! Dissipation at a point is derived from how strongly the velocity reacts
//! to changes of the surface normal across a `(2 * order + 1)^D` stencil,
//! following Toifl et al., SISPAD 2019. The scheme handles material stacks
//! itself, so it comes with helpers that rewrap a stack before advection
//! and restore it afterwards.

use crate::differences::{box_offsets, central_gradient, gradient_diff, normalize, pad};
use crate::scheme::{reduce_by_alphas, FieldView, SpatialScheme};
use strata_core::{MaterialId, Vec3};
use strata_field::{BooleanOp, FieldError, NarrowBandField};
use tracing::warn;

const CORRUPTED_NORMAL: f64 = 1e-6;

/// Scheme with per-axis dissipation from velocity sensitivity.
///
/// For every stencil point with a usable normal `n`, each axis `k` gets
///
/// ```text
/// monti = Σ_j g_j² * dv_k / |g|²
/// toifl = -g_k * Σ_j g_j * dv_j / |g|²        (j = k+1 .. k+D-1, cyclic)
/// osher = v_local * n_k
/// alpha_k = |monti + toifl + osher|
/// ```
///
/// where `g` is the central gradient and `dv` the finite-difference
/// derivative of the scalar velocity with respect to the normal. Values
/// above `max_dissipation` are dropped as corrupted.
#[derive(Clone)]
pub struct StencilLocalLaxFriedrichs<'a, const D: usize> {
    view: FieldView<'a, D>,
    max_dissipation: f64,
    normal_epsilon: f64,
    final_alphas: Vec3,
    offsets: Vec<[i64; D]>,
}

impl<'a, const D: usize> StencilLocalLaxFriedrichs<'a, D> {
    /// New scheme of stencil radius `order`.
    pub fn new(view: FieldView<'a, D>, order: usize, max_dissipation: f64) -> Self {
        Self {
            view,
            max_dissipation,
            normal_epsilon: f64::EPSILON.cbrt(),
            final_alphas: [0.0; 3],
            offsets: box_offsets(order as i64),
        }
    }

    fn stencil_alpha(
        &self,
        lin: usize,
        offset: [i64; D],
        coordinate: Vec3,
        material: MaterialId,
        scalar: f64,
    ) -> [f64; D] {
        let field = self.view.field;
        let delta = field.grid().delta();
        let point = self.view.point(lin);
        let gradient = central_gradient(field, lin, offset);
        let mut normal = pad(gradient);
        normalize(&mut normal);
        if normal.iter().all(|n| n.abs() < CORRUPTED_NORMAL) {
            return [0.0; D];
        }

        let mut local = coordinate;
        for dir in 0..D {
            local[dir] += offset[dir] as f64 * delta;
        }
        let (mut local_scalar, local_vector) = self.view.velocities(local, material, normal, point);
        for i in 0..D {
            local_scalar += local_vector[i] * normal[i];
        }

        let dn = (self.normal_epsilon * scalar).abs();
        let mut velocity_delta = [0.0; D];
        for (k, vd) in velocity_delta.iter_mut().enumerate() {
            let mut previous = normal;
            let mut next = normal;
            previous[k] -= dn;
            next[k] += dn;
            let vp = self.view.velocity.scalar_velocity(local, material, previous, point);
            let vn = self.view.velocity.scalar_velocity(local, material, next, point);
            *vd = (vn - vp) / (2.0 * dn);
        }

        let norm2: f64 = gradient.iter().map(|g| g * g).sum();
        let mut alpha = [0.0; D];
        for (k, a) in alpha.iter_mut().enumerate() {
            let mut monti = 0.0;
            let mut toifl = 0.0;
            for j in 0..D - 1 {
                let idx = (k + 1 + j) % D;
                monti += gradient[idx] * gradient[idx];
                toifl += gradient[idx] * velocity_delta[idx];
            }
            monti *= velocity_delta[k] / norm2;
            toifl *= -gradient[k] / norm2;
            let osher = local_scalar * normal[k];
            let total = (monti + toifl + osher).abs();
            *a = if total > self.max_dissipation { 0.0 } else { total };
        }
        alpha
    }
}

impl<const D: usize> SpatialScheme for StencilLocalLaxFriedrichs<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let field = self.view.field;
        let coordinate = self.view.coordinate(lin);
        let gradient = central_gradient(field, lin, [0; D]);
        let mut normal = pad(gradient);
        normalize(&mut normal);

        let (mut scalar, vector) =
            self.view
                .velocities(coordinate, material, normal, self.view.point(lin));
        for i in 0..D {
            scalar += vector[i] * normal[i];
        }
        if scalar == 0.0 {
            return (0.0, 0.0);
        }

        let hamiltonian = gradient.iter().map(|g| g * g).sum::<f64>().sqrt() * scalar;

        let mut max_alpha = [0.0f64; D];
        for offset in &self.offsets {
            let alpha = self.stencil_alpha(lin, *offset, coordinate, material, scalar);
            for d in 0..D {
                max_alpha[d] = max_alpha[d].max(alpha[d]);
            }
        }

        let diff = gradient_diff(field, lin);
        let mut dissipation = 0.0;
        for d in 0..D {
            self.final_alphas[d] = self.final_alphas[d].max(max_alpha[d]);
            dissipation += max_alpha[d] * diff[d];
        }
        (hamiltonian, dissipation)
    }

    fn reduce_time_step_hamilton_jacobi(&self, max_time_step: &mut f64, grid_delta: f64) {
        reduce_by_alphas(&self.final_alphas, D, max_time_step, grid_delta);
    }

    fn final_alphas(&self) -> Vec3 {
        self.final_alphas
    }
}

/// Rewrap `stack` for the stencil scheme.
///
/// The top layer is replaced by the inverted union of every deposition
/// layer minus the first non-deposition layer beneath it. `is_depo[i]` says
/// whether layer `i` can grow; missing entries count as `false`. Layers
/// that cannot grow are assumed to be masks that do not wrap other
/// deposition layers.
pub fn prepare_stencil_local_lax_friedrichs<const D: usize>(
    stack: &mut [NarrowBandField<D>],
    is_depo: &[bool],
) -> Result<(), FieldError> {
    let Some(bottom) = stack.first() else {
        return Ok(());
    };
    if is_depo.len() < stack.len() {
        warn!(
            layers = stack.len(),
            flags = is_depo.len(),
            "deposition flags missing; treating higher layers as masks"
        );
    }
    let depo = |i: usize| is_depo.get(i).copied().unwrap_or(false);

    let mut final_top = NarrowBandField::new(bottom.grid().clone());
    let mut layer = stack.len() - 1;
    let mut layer_above_is_depo = false;

    for i in (0..stack.len()).rev() {
        if depo(i) {
            if !layer_above_is_depo {
                layer = i;
                layer_above_is_depo = true;
            }
        } else {
            if layer_above_is_depo {
                let mut above = stack[layer].clone();
                above.boolean_op(&stack[i], BooleanOp::RelativeComplement)?;
                final_top.boolean_op(&above, BooleanOp::Union)?;
                final_top.prune();
            }
            layer_above_is_depo = false;
        }
    }
    if layer_above_is_depo {
        final_top.boolean_op(&stack[layer], BooleanOp::Union)?;
    }

    final_top.invert();
    if let Some(top) = stack.last_mut() {
        top.deep_copy(&final_top);
    }
    Ok(())
}

/// Undo [`prepare_stencil_local_lax_friedrichs`] after advection.
pub fn finalize_stencil_local_lax_friedrichs<const D: usize>(
    stack: &mut [NarrowBandField<D>],
) -> Result<(), FieldError> {
    let Some((top, lower)) = stack.split_last_mut() else {
        return Ok(());
    };
    top.invert();
    if let Some(below) = lower.last() {
        top.boolean_op(below, BooleanOp::Union)?;
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use strata_field::{BoundaryCondition, Grid};
    use strata_test_utils::ConstantVelocity;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flat_interface_alpha_is_speed_unless_discarded(
            magnitude in 0.01f64..4.0,
            etch in any::<bool>(),
            max_dissipation in 0.5f64..5.0,
        ) {
            let grid = Grid::new([-6, -6], [6, 6], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
            let f = NarrowBandField::from_fn(grid, 5, |x| x[1] - 0.1);
            let speed = if etch { -magnitude } else { magnitude };
            let v = ConstantVelocity::scalar(speed);
            let mut s = StencilLocalLaxFriedrichs::new(FieldView::new(&f, &v), 1, max_dissipation);
            s.evaluate(f.grid().linear([0, 0]), MaterialId(0));
            let alphas = s.final_alphas();
            prop_assert!(alphas[0].abs() < 1e-12);
            if magnitude > max_dissipation + 1e-9 {
                prop_assert_eq!(alphas[1], 0.0);
            } else if magnitude < max_dissipation - 1e-9 {
                prop_assert!((alphas[1] - magnitude).abs() < 1e-9);
            }
        }
    }
}
