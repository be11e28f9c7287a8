//! Local Lax-Friedrichs: dissipation from the neighbouring `3^D` box.

use crate::differences::{box_offsets, normal_component, normalize, Derivatives};
use crate::scheme::{reduce_by_alphas, FieldView, SpatialScheme};
use strata_core::{MaterialId, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
enum AlphaSource {
    // Velocities sampled at each box point, scaled by the dissipation factor.
    Sampled { alpha_factor: f64 },
    // VelocityField::dissipation_alpha at each box point.
    Analytical,
}

/// Lax-Friedrichs scheme whose coefficients are the largest seen in the
/// `3^D` box around the point.
///
/// The sampled variant queries the velocity field at every box point with
/// that point's own normal and takes `|(v + vec_i) * n_i|`. The analytical
/// variant asks [`VelocityField::dissipation_alpha`](strata_core::VelocityField::dissipation_alpha)
/// instead and ignores the dissipation factor.
#[derive(Clone)]
pub struct LocalLaxFriedrichs<'a, const D: usize> {
    view: FieldView<'a, D>,
    order: usize,
    source: AlphaSource,
    final_alphas: Vec3,
    offsets: Vec<[i64; D]>,
}

impl<'a, const D: usize> LocalLaxFriedrichs<'a, D> {
    /// Scheme sampling velocities over the box.
    pub fn sampled(view: FieldView<'a, D>, order: usize, alpha_factor: f64) -> Self {
        Self::with_source(view, order, AlphaSource::Sampled { alpha_factor })
    }

    /// Scheme using analytic dissipation coefficients.
    pub fn analytical(view: FieldView<'a, D>, order: usize) -> Self {
        Self::with_source(view, order, AlphaSource::Analytical)
    }

    fn with_source(view: FieldView<'a, D>, order: usize, source: AlphaSource) -> Self {
        Self {
            view,
            order,
            source,
            final_alphas: [0.0; 3],
            offsets: box_offsets(1),
        }
    }

    fn box_alphas(&mut self, lin: usize, material: MaterialId) -> [f64; D] {
        let field = self.view.field;
        let delta = field.grid().delta();
        let coordinate = self.view.coordinate(lin);
        let point = self.view.point(lin);
        let mut alpha = [0.0f64; D];

        for offset in &self.offsets {
            let center = field.neighbor_value(lin, *offset);
            let mut normal = [0.0; 3];
            for (dir, n) in normal.iter_mut().enumerate().take(D) {
                let mut neg = *offset;
                neg[dir] -= 1;
                let mut pos = *offset;
                pos[dir] += 1;
                *n = normal_component(
                    field.neighbor_value(lin, neg),
                    center,
                    field.neighbor_value(lin, pos),
                    delta,
                );
            }

            match self.source {
                AlphaSource::Sampled { .. } => {
                    normalize(&mut normal);
                    let mut coords = coordinate;
                    for dir in 0..D {
                        coords[dir] += offset[dir] as f64 * delta;
                    }
                    let (scalar, vector) = self.view.velocities(coords, material, normal, point);
                    for dir in 0..D {
                        let a = ((scalar + vector[dir]) * normal[dir]).abs();
                        alpha[dir] = alpha[dir].max(a);
                        self.final_alphas[dir] = self.final_alphas[dir].max(a);
                    }
                }
                AlphaSource::Analytical => {
                    for dir in 0..D {
                        let a = self.view.velocity.dissipation_alpha(dir, material, normal);
                        alpha[dir] = alpha[dir].max(a);
                        self.final_alphas[dir] = self.final_alphas[dir].max(a);
                    }
                }
            }
        }
        alpha
    }
}

impl<const D: usize> SpatialScheme for LocalLaxFriedrichs<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        let derivatives = Derivatives::at(self.view.field, lin, self.order);
        let (scalar, vector) = self.view.velocities(
            self.view.coordinate(lin),
            material,
            derivatives.normal,
            self.view.point(lin),
        );
        let mut hamiltonian = 0.0;
        if scalar != 0.0 {
            hamiltonian = scalar * derivatives.central_sq.sqrt();
        }
        hamiltonian += derivatives.upwind(vector);

        let alpha = self.box_alphas(lin, material);
        let factor = match self.source {
            AlphaSource::Sampled { alpha_factor } => alpha_factor,
            AlphaSource::Analytical => 1.0,
        };
        let dissipation: f64 = (0..D)
            .map(|i| factor * alpha[i] * derivatives.half_jump(i))
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

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{PointId, VelocityField};
    use strata_field::{BoundaryCondition, Grid, NarrowBandField};
    use strata_test_utils::ConstantVelocity;

    struct Analytic;

    impl VelocityField for Analytic {
        fn scalar_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
            1.0
        }

        fn dissipation_alpha(&self, direction: usize, _: MaterialId, _: Vec3) -> f64 {
            (direction + 1) as f64
        }
    }

    fn kink() -> NarrowBandField<2> {
        let grid = Grid::new([-6, -6], [6, 6], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
        NarrowBandField::from_fn(grid, 10, |x| x[1].abs() - 0.2)
    }

    #[test]
    fn sampled_alphas_cover_the_box() {
        let f = kink();
        let v = ConstantVelocity::scalar(2.0);
        let mut s = LocalLaxFriedrichs::sampled(FieldView::new(&f, &v), 1, 1.0);
        // one row above the kink, the box still reaches the sloped rows
        let (h, d) = s.evaluate(f.grid().linear([0, 1]), MaterialId(0));
        assert!((h - 2.0).abs() < 1e-12);
        // jump at (0, 1) is zero, so no dissipation
        assert!(d.abs() < 1e-12);
        assert!((s.final_alphas()[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn analytical_alphas_come_from_the_field() {
        let f = kink();
        let mut s = LocalLaxFriedrichs::analytical(FieldView::new(&f, &Analytic), 1);
        s.evaluate(f.grid().linear([0, 2]), MaterialId(0));
        assert_eq!(s.final_alphas(), [1.0, 2.0, 0.0]);
        let mut dt = f64::MAX;
        s.reduce_time_step_hamilton_jacobi(&mut dt, 1.0);
        assert!((dt - 1.0 / 3.0).abs() < 1e-12);
    }
}
