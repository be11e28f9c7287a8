//! Lax-Friedrichs schemes with global or point-local dissipation.

use crate::differences::Derivatives;
use crate::scheme::{reduce_by_alphas, FieldView, SchemeParams, SpatialScheme};
use rayon::prelude::*;
use strata_core::{MaterialId, PointId, Vec3};
use tracing::debug;

fn central_hamiltonian<const D: usize>(derivatives: &Derivatives<D>, scalar: f64, vector: Vec3) -> f64 {
    let mut hamiltonian = 0.0;
    if scalar != 0.0 {
        hamiltonian = scalar * derivatives.central_sq.sqrt();
    }
    hamiltonian + derivatives.upwind(vector)
}

/// Lax-Friedrichs with fixed per-axis coefficients for the whole sweep.
///
/// ```text
/// H = v * |central gradient| + upwinded vector terms
/// dissipation = Σ alpha_factor * alpha_i * (D+_i - D-_i) / 2
/// ```
#[derive(Clone)]
pub struct LaxFriedrichs<'a, const D: usize> {
    view: FieldView<'a, D>,
    order: usize,
    alpha_factor: f64,
    final_alphas: Vec3,
    calculate_normal_vectors: bool,
}

impl<'a, const D: usize> LaxFriedrichs<'a, D> {
    /// New scheme using `params.global_alphas` as its coefficients.
    pub fn new(view: FieldView<'a, D>, order: usize, params: SchemeParams) -> Self {
        Self {
            view,
            order,
            alpha_factor: params.dissipation_alpha,
            final_alphas: params.global_alphas,
            calculate_normal_vectors: params.calculate_normal_vectors,
        }
    }
}

impl<const D: usize> SpatialScheme for LaxFriedrichs<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let derivatives = Derivatives::at(self.view.field, lin, self.order);
        let normal = if self.calculate_normal_vectors {
            derivatives.normal
        } else {
            [0.0; 3]
        };
        let (scalar, vector) = self.view.velocities(
            self.view.coordinate(lin),
            material,
            normal,
            self.view.point(lin),
        );
        let hamiltonian = central_hamiltonian(&derivatives, scalar, vector);
        let dissipation: f64 = (0..D)
            .map(|i| self.alpha_factor * self.final_alphas[i] * derivatives.half_jump(i))
            .sum();
        (hamiltonian, if hamiltonian != 0.0 { dissipation } else { 0.0 })
    }

    fn reduce_time_step_hamilton_jacobi(&self, max_time_step: &mut f64, grid_delta: f64) {
        reduce_by_alphas(&self.final_alphas, D, max_time_step, grid_delta);
    }

    fn final_alphas(&self) -> Vec3 {
        self.final_alphas
    }
}

/// Lax-Friedrichs with coefficients from the point itself.
#[derive(Clone)]
pub struct LocalLocalLaxFriedrichs<'a, const D: usize> {
    view: FieldView<'a, D>,
    order: usize,
    alpha_factor: f64,
    final_alphas: Vec3,
}

impl<'a, const D: usize> LocalLocalLaxFriedrichs<'a, D> {
    /// New scheme of `order` scaling dissipation by `alpha_factor`.
    pub fn new(view: FieldView<'a, D>, order: usize, alpha_factor: f64) -> Self {
        Self {
            view,
            order,
            alpha_factor,
            final_alphas: [0.0; 3],
        }
    }
}

impl<const D: usize> SpatialScheme for LocalLocalLaxFriedrichs<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let derivatives = Derivatives::at(self.view.field, lin, self.order);
        let normal = derivatives.normal;
        let (scalar, vector) = self.view.velocities(
            self.view.coordinate(lin),
            material,
            normal,
            self.view.point(lin),
        );
        let hamiltonian = central_hamiltonian(&derivatives, scalar, vector);

        let mut dissipation = 0.0;
        for i in 0..D {
            let alpha = ((scalar + vector[i]) * normal[i]).abs();
            self.final_alphas[i] = self.final_alphas[i].max(alpha);
            dissipation += self.alpha_factor * alpha * derivatives.half_jump(i);
        }
        (hamiltonian, if hamiltonian != 0.0 { dissipation } else { 0.0 })
    }

    fn reduce_time_step_hamilton_jacobi(&self, max_time_step: &mut f64, grid_delta: f64) {
        reduce_by_alphas(&self.final_alphas, D, max_time_step, grid_delta);
    }

    fn final_alphas(&self) -> Vec3 {
        self.final_alphas
    }
}

/// Per-axis dissipation coefficients for [`LaxFriedrichs`].
///
/// Sweeps every active point (`|value| <= 0.5`) of the field in parallel and
/// keeps the largest `|(v + vec_i) * n_i|` seen on each axis. `material_of`
/// names the material that owns each point.
pub fn global_alphas<const D: usize>(
    view: FieldView<'_, D>,
    order: usize,
    material_of: impl Fn(usize) -> MaterialId + Sync,
) -> Vec3 {
    let field = view.field;
    let alphas = field
        .worker_segments()
        .into_par_iter()
        .map(|range| {
            let mut alphas = [0.0f64; 3];
            for id in range {
                let lin = field.point_index(PointId(id));
                if field.value(lin).abs() > 0.5 {
                    continue;
                }
                let derivatives = Derivatives::at(field, lin, order);
                let normal = derivatives.normal;
                let (scalar, vector) = view.velocities(
                    view.coordinate(lin),
                    material_of(lin),
                    normal,
                    PointId(id),
                );
                for i in 0..D {
                    alphas[i] = alphas[i].max(((scalar + vector[i]) * normal[i]).abs());
                }
            }
            alphas
        })
        .reduce(
            || [0.0; 3],
            |a, b| [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        );
    debug!(?alphas, "global Lax-Friedrichs alphas");
    alphas
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_field::{BoundaryCondition, Grid, NarrowBandField};
    use strata_test_utils::ConstantVelocity;

    fn plane() -> NarrowBandField<2> {
        let grid = Grid::new([-6, -6], [6, 6], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
        NarrowBandField::from_fn(grid, 5, |x| x[1] - 0.1)
    }

    fn kink() -> NarrowBandField<1> {
        let grid = Grid::new([-6], [6], 1.0, [BoundaryCondition::Infinite]).unwrap();
        NarrowBandField::from_fn(grid, 8, |x| x[0].abs() - 0.2)
    }

    #[test]
    fn global_alphas_of_flat_interface() {
        let f = plane();
        let v = ConstantVelocity::scalar(2.0);
        let alphas = global_alphas(FieldView::new(&f, &v), 1, |_| MaterialId(0));
        assert!(alphas[0].abs() < 1e-12);
        assert!((alphas[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn lax_friedrichs_dissipates_at_kinks() {
        let f = kink();
        let v = ConstantVelocity::scalar(1.0);
        let params = SchemeParams {
            global_alphas: [1.0, 0.0, 0.0],
            ..SchemeParams::default()
        };
        let mut s = LaxFriedrichs::new(FieldView::new(&f, &v), 1, params);
        // centre of the kink: central gradient 0, jump 1
        let (h, d) = s.evaluate(f.grid().linear([0]), MaterialId(0));
        assert_eq!(h, 0.0);
        assert_eq!(d, 0.0);
        // one cell off the kink: smooth, no jump
        let (h, d) = s.evaluate(f.grid().linear([2]), MaterialId(0));
        assert!((h - 1.0).abs() < 1e-12);
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn lax_friedrichs_time_step_bound() {
        let f = plane();
        let v = ConstantVelocity::scalar(1.0);
        let params = SchemeParams {
            global_alphas: [0.5, 2.0, 0.0],
            ..SchemeParams::default()
        };
        let s = LaxFriedrichs::new(FieldView::new(&f, &v), 1, params);
        let mut dt = f64::MAX;
        s.reduce_time_step_hamilton_jacobi(&mut dt, 0.5);
        assert!((dt - 0.2).abs() < 1e-12);
    }

    #[test]
    fn local_local_tracks_running_maximum() {
        let f = plane();
        let v = ConstantVelocity::scalar(-3.0);
        let mut s = LocalLocalLaxFriedrichs::new(FieldView::new(&f, &v), 1, 1.0);
        assert_eq!(s.final_alphas(), [0.0; 3]);
        let (h, d) = s.evaluate(f.grid().linear([0, 0]), MaterialId(0));
        assert!((h + 3.0).abs() < 1e-12);
        assert!(d.abs() < 1e-12);
        assert!((s.final_alphas()[1] - 3.0).abs() < 1e-12);
        let mut dt = 10.0;
        s.reduce_time_step_hamilton_jacobi(&mut dt, 1.0);
        assert!((dt - 1.0 / 3.0).abs() < 1e-12);
    }
}
