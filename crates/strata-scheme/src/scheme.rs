//! The [`SpatialScheme`] trait and the closed set of schemes behind it.

use crate::engquist_osher::EngquistOsher;
use crate::lax_friedrichs::{LaxFriedrichs, LocalLocalLaxFriedrichs};
use crate::local_lax_friedrichs::LocalLaxFriedrichs;
use crate::stencil::StencilLocalLaxFriedrichs;
use crate::weno::Weno;
use strata_core::{MaterialId, PointId, SpatialSchemeKind, Vec3, VelocityField};
use strata_field::NarrowBandField;

/// Numerical flux evaluation for one parallel segment.
///
/// # Contract
///
/// - `evaluate()` returns `(hamiltonian, dissipation)`; the rate applied to
///   the point is their difference.
/// - One instance is cloned per worker. State such as running dissipation
///   maxima is private to the clone and merged by the caller under a lock
///   through [`reduce_time_step_hamilton_jacobi`](Self::reduce_time_step_hamilton_jacobi).
pub trait SpatialScheme: Send {
    /// Flux terms at linear grid position `lin` for `material`.
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64);

    /// Further limit `max_time_step` from dissipation gathered so far.
    fn reduce_time_step_hamilton_jacobi(&self, max_time_step: &mut f64, grid_delta: f64) {
        let _ = (max_time_step, grid_delta);
    }

    /// Per-axis dissipation coefficients gathered so far.
    fn final_alphas(&self) -> Vec3 {
        [0.0; 3]
    }
}

/// Tunables shared by all schemes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchemeParams {
    /// Scale applied to Lax-Friedrichs dissipation.
    pub dissipation_alpha: f64,
    /// Pass estimated normals to the velocity field.
    pub calculate_normal_vectors: bool,
    /// Stencil dissipation above this is discarded as corrupted.
    pub max_dissipation: f64,
    /// Dissipation coefficients for the global Lax-Friedrichs scheme, from
    /// [`global_alphas`](crate::global_alphas).
    pub global_alphas: Vec3,
}

impl Default for SchemeParams {
    fn default() -> Self {
        Self {
            dissipation_alpha: 1.0,
            calculate_normal_vectors: true,
            max_dissipation: f64::MAX,
            global_alphas: [0.0; 3],
        }
    }
}

/// Field and velocity a scheme reads from.
#[derive(Clone, Copy)]
pub struct FieldView<'a, const D: usize> {
    /// The top field being advected.
    pub field: &'a NarrowBandField<D>,
    /// Caller-supplied velocities.
    pub velocity: &'a dyn VelocityField,
}

impl<'a, const D: usize> FieldView<'a, D> {
    /// Bundle a field with its velocity source.
    pub fn new(field: &'a NarrowBandField<D>, velocity: &'a dyn VelocityField) -> Self {
        Self { field, velocity }
    }

    pub(crate) fn coordinate(&self, lin: usize) -> Vec3 {
        self.field.grid().coordinate(lin)
    }

    pub(crate) fn point(&self, lin: usize) -> PointId {
        self.field.point_id(lin).unwrap_or(PointId(0))
    }

    pub(crate) fn velocities(
        &self,
        coordinate: Vec3,
        material: MaterialId,
        normal: Vec3,
        point: PointId,
    ) -> (f64, Vec3) {
        (
            self.velocity.scalar_velocity(coordinate, material, normal, point),
            self.velocity.vector_velocity(coordinate, material, normal, point),
        )
    }
}

/// One of the supported schemes, ready to evaluate.
#[derive(Clone)]
pub enum Scheme<'a, const D: usize> {
    /// Upwind, no dissipation.
    EngquistOsher(EngquistOsher<'a, D>),
    /// Global dissipation coefficients.
    LaxFriedrichs(LaxFriedrichs<'a, D>),
    /// Point-local dissipation coefficients.
    LocalLocalLaxFriedrichs(LocalLocalLaxFriedrichs<'a, D>),
    /// Dissipation from the surrounding `3^D` box, sampled or analytic.
    LocalLaxFriedrichs(LocalLaxFriedrichs<'a, D>),
    /// Stencil dissipation from velocity sensitivity.
    StencilLocalLaxFriedrichs(StencilLocalLaxFriedrichs<'a, D>),
    /// Upwind over WENO differences, no dissipation.
    Weno(Weno<'a, D>),
}

impl<'a, const D: usize> Scheme<'a, D> {
    /// Build the scheme selected by `kind` over `view`.
    pub fn new(kind: SpatialSchemeKind, view: FieldView<'a, D>, params: SchemeParams) -> Self {
        let order = kind.order();
        match kind {
            SpatialSchemeKind::EngquistOsher1 | SpatialSchemeKind::EngquistOsher2 => {
                Self::EngquistOsher(EngquistOsher::new(view, order, params.calculate_normal_vectors))
            }
            SpatialSchemeKind::LaxFriedrichs1 | SpatialSchemeKind::LaxFriedrichs2 => {
                Self::LaxFriedrichs(LaxFriedrichs::new(view, order, params))
            }
            SpatialSchemeKind::LocalLocalLaxFriedrichs1
            | SpatialSchemeKind::LocalLocalLaxFriedrichs2 => Self::LocalLocalLaxFriedrichs(
                LocalLocalLaxFriedrichs::new(view, order, params.dissipation_alpha),
            ),
            SpatialSchemeKind::LocalLaxFriedrichs1 | SpatialSchemeKind::LocalLaxFriedrichs2 => {
                Self::LocalLaxFriedrichs(LocalLaxFriedrichs::sampled(
                    view,
                    order,
                    params.dissipation_alpha,
                ))
            }
            SpatialSchemeKind::LocalLaxFriedrichsAnalytical1 => {
                Self::LocalLaxFriedrichs(LocalLaxFriedrichs::analytical(view, order))
            }
            SpatialSchemeKind::StencilLocalLaxFriedrichs1 => Self::StencilLocalLaxFriedrichs(
                StencilLocalLaxFriedrichs::new(view, order, params.max_dissipation),
            ),
            SpatialSchemeKind::Weno3 | SpatialSchemeKind::Weno5 => {
                Self::Weno(Weno::new(view, order, params.calculate_normal_vectors))
            }
        }
    }

    fn inner(&self) -> &dyn SpatialScheme {
        match self {
            Self::EngquistOsher(s) => s,
            Self::LaxFriedrichs(s) => s,
            Self::LocalLocalLaxFriedrichs(s) => s,
            Self::LocalLaxFriedrichs(s) => s,
            Self::StencilLocalLaxFriedrichs(s) => s,
            Self::Weno(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SpatialScheme {
        match self {
            Self::EngquistOsher(s) => s,
            Self::LaxFriedrichs(s) => s,
            Self::LocalLocalLaxFriedrichs(s) => s,
            Self::LocalLaxFriedrichs(s) => s,
            Self::StencilLocalLaxFriedrichs(s) => s,
            Self::Weno(s) => s,
        }
    }
}

impl<const D: usize> SpatialScheme for Scheme<'_, D> {
    fn evaluate(&mut self, lin: usize, material: MaterialId) -> (f64, f64) {
        self.inner_mut().evaluate(lin, material)
    }

    fn reduce_time_step_hamilton_jacobi(&self, max_time_step: &mut f64, grid_delta: f64) {
        self.inner()
            .reduce_time_step_hamilton_jacobi(max_time_step, grid_delta)
    }

    fn final_alphas(&self) -> Vec3 {
        self.inner().final_alphas()
    }
}

/// Widen `field` to the band width `kind` needs.
pub fn prepare<const D: usize>(kind: SpatialSchemeKind, field: &mut NarrowBandField<D>) {
    field.expand(kind.required_width());
}

/// Time step bound from per-axis dissipation coefficients.
///
/// ```text
/// dt = min(dt, 1 / Σ(alpha_i / delta))
/// ```
pub(crate) fn reduce_by_alphas(alphas: &Vec3, dims: usize, max_time_step: &mut f64, grid_delta: f64) {
    const ALPHA_MAX_CFL: f64 = 1.0;
    let rate: f64 = alphas[..dims.min(3)].iter().map(|a| a / grid_delta).sum();
    let time_step = ALPHA_MAX_CFL / rate;
    *max_time_step = max_time_step.min(time_step);
}
