//! The [`AdvectionEngine`]: owns a material stack and moves it in time.

use std::fmt;
use std::sync::Arc;

use strata_core::{AdvectError, SpatialSchemeKind, TemporalSchemeKind, VelocityField};
use strata_field::{BooleanOp, NarrowBandField};
use strata_scheme::prepare;
use tracing::{debug, error, warn};

use crate::config::AdvectConfig;
use crate::rates::{compute_rates, RateTable};
use crate::rebuild::rebuild;
use crate::update::update_level_set;

/// Callback run on the top field between Runge-Kutta stages.
///
/// Returning `false` logs a warning; integration carries on regardless.
pub type VelocityUpdate<const D: usize> = Box<dyn Fn(&NarrowBandField<D>) -> bool + Send + Sync>;

/// Advects a stack of nested materials.
///
/// The last field inserted is the top material and is the one that moves.
/// Every material below it is clipped to the moved top surface after each
/// step, so the stack stays nested.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use strata_core::{MaterialId, PointId, Vec3, VelocityField};
/// use strata_engine::AdvectionEngine;
/// use strata_field::{BoundaryCondition, Grid, NarrowBandField};
///
/// struct Etch;
/// impl VelocityField for Etch {
///     fn scalar_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
///         -1.0
///     }
/// }
///
/// let grid = Grid::<2>::new([-8, -8], [8, 8], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
/// let mut engine = AdvectionEngine::new();
/// engine.insert_level_set(NarrowBandField::from_fn(grid, 2, |x| x[1] - 0.1));
/// engine.set_velocity_field(Arc::new(Etch));
/// engine.set_time_step_ratio(0.4);
/// engine.apply().unwrap();
///
/// // one step of the largest stable length moves the surface 0.4 cells down
/// assert_eq!(engine.number_of_time_steps(), 1);
/// assert!((engine.advected_time() - 0.4).abs() < 1e-12);
/// assert!((engine.level_sets()[0].value_at([0, 0]) - 0.3).abs() < 1e-12);
/// ```
pub struct AdvectionEngine<const D: usize> {
    level_sets: Vec<NarrowBandField<D>>,
    velocity: Option<Arc<dyn VelocityField>>,
    velocity_update: Option<VelocityUpdate<D>>,
    config: AdvectConfig,
    unknown_scheme: Option<u32>,
    advected_time: f64,
    number_of_time_steps: usize,
    current_time_step: f64,
}

impl<const D: usize> Default for AdvectionEngine<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> fmt::Debug for AdvectionEngine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvectionEngine")
            .field("level_sets", &self.level_sets.len())
            .field("has_velocity", &self.velocity.is_some())
            .field("config", &self.config)
            .field("advected_time", &self.advected_time)
            .field("number_of_time_steps", &self.number_of_time_steps)
            .finish()
    }
}

impl<const D: usize> AdvectionEngine<D> {
    /// Engine with an empty stack and default configuration.
    pub fn new() -> Self {
        Self::with_config(AdvectConfig::default())
    }

    /// Engine with an empty stack and `config`.
    pub fn with_config(config: AdvectConfig) -> Self {
        Self {
            level_sets: Vec::new(),
            velocity: None,
            velocity_update: None,
            config,
            unknown_scheme: None,
            advected_time: 0.0,
            number_of_time_steps: 0,
            current_time_step: -1.0,
        }
    }

    // ── Material stack ─────────────────────────────────────────────

    /// Push `field` on top of the stack. Order matters: the last field
    /// inserted is the one that moves.
    pub fn insert_level_set(&mut self, field: NarrowBandField<D>) {
        self.level_sets.push(field);
    }

    /// The stack, bottom first.
    pub fn level_sets(&self) -> &[NarrowBandField<D>] {
        &self.level_sets
    }

    /// Mutable access to the stack, for edits between calls to
    /// [`apply()`](Self::apply).
    pub fn level_sets_mut(&mut self) -> &mut Vec<NarrowBandField<D>> {
        &mut self.level_sets
    }

    /// Take the stack back out of the engine.
    pub fn into_level_sets(self) -> Vec<NarrowBandField<D>> {
        self.level_sets
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Current configuration.
    pub fn config(&self) -> &AdvectConfig {
        &self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: AdvectConfig) {
        self.config = config;
        self.unknown_scheme = None;
    }

    /// Install the velocity source.
    pub fn set_velocity_field(&mut self, velocity: Arc<dyn VelocityField>) {
        self.velocity = Some(velocity);
    }

    /// Install a callback run between Runge-Kutta stages.
    pub fn set_velocity_update_callback(
        &mut self,
        callback: impl Fn(&NarrowBandField<D>) -> bool + Send + Sync + 'static,
    ) {
        self.velocity_update = Some(Box::new(callback));
    }

    /// Select the spatial scheme.
    pub fn set_spatial_scheme(&mut self, kind: SpatialSchemeKind) {
        self.config.spatial_scheme = kind;
        self.unknown_scheme = None;
    }

    /// Select the spatial scheme by ordinal.
    ///
    /// An unknown ordinal is remembered and makes the next
    /// [`apply()`](Self::apply) fail with
    /// [`AdvectError::UnknownSpatialScheme`] without advecting.
    pub fn set_spatial_scheme_ordinal(&mut self, ordinal: u32) {
        match SpatialSchemeKind::try_from(ordinal) {
            Ok(kind) => self.set_spatial_scheme(kind),
            Err(_) => self.unknown_scheme = Some(ordinal),
        }
    }

    /// Select the time integration scheme.
    pub fn set_temporal_scheme(&mut self, kind: TemporalSchemeKind) {
        self.config.temporal_scheme = kind;
    }

    /// Set the CFL ratio. Values of 0.5 and above are accepted but may
    /// make the advection unstable; [`apply`](Self::apply) warns about them.
    pub fn set_time_step_ratio(&mut self, ratio: f64) {
        self.config.time_step_ratio = ratio;
    }

    /// Scale of Lax-Friedrichs dissipation.
    pub fn set_dissipation_alpha(&mut self, alpha: f64) {
        self.config.dissipation_alpha = alpha;
    }

    /// Whether to pass estimated normals to the velocity field.
    pub fn set_calculate_normal_vectors(&mut self, calculate: bool) {
        self.config.calculate_normal_vectors = calculate;
    }

    /// Whether enclosed voids should stay still.
    pub fn set_ignore_voids(&mut self, ignore: bool) {
        self.config.ignore_voids = ignore;
    }

    /// Sub-step near material interfaces instead of snapping through them.
    pub fn set_adaptive_time_stepping(&mut self, adaptive: bool, subdivisions: u32) {
        self.config.adaptive_time_stepping = adaptive;
        self.config.adaptive_subdivisions = subdivisions;
    }

    /// Stop [`apply()`](Self::apply) after one step.
    pub fn set_single_step(&mut self, single_step: bool) {
        self.config.single_step = single_step;
    }

    /// Total time to advect per [`apply()`](Self::apply). Zero means one
    /// step of the largest stable length.
    pub fn set_advection_time(&mut self, time: f64) {
        self.config.advection_time = time;
    }

    /// Whether point data follows the points through the rebuild.
    pub fn set_update_point_data(&mut self, update: bool) {
        self.config.update_point_data = update;
    }

    /// Whether to record the applied displacement and dissipation.
    pub fn set_save_advection_velocities(&mut self, save: bool) {
        self.config.save_advection_velocities = save;
    }

    /// Whether to zero rates whose dissipation flips the flux sign.
    pub fn set_check_dissipation(&mut self, check: bool) {
        self.config.check_dissipation = check;
    }

    /// Upper bound on stencil dissipation.
    pub fn set_max_dissipation(&mut self, max: f64) {
        self.config.max_dissipation = max;
    }

    // ── Read-back ──────────────────────────────────────────────────

    /// Time advanced by the last [`apply()`](Self::apply).
    pub fn advected_time(&self) -> f64 {
        self.advected_time
    }

    /// Steps taken by the last [`apply()`](Self::apply).
    pub fn number_of_time_steps(&self) -> usize {
        self.number_of_time_steps
    }

    /// Length of the most recent step, or `-1.0` before the first.
    pub fn current_time_step(&self) -> f64 {
        self.current_time_step
    }

    /// Configured CFL ratio.
    pub fn time_step_ratio(&self) -> f64 {
        self.config.time_step_ratio
    }

    /// Whether normals are passed to the velocity field.
    pub fn calculate_normal_vectors(&self) -> bool {
        self.config.calculate_normal_vectors
    }

    // ── Advection ──────────────────────────────────────────────────

    fn check_inputs(&self) -> Result<Arc<dyn VelocityField>, AdvectError> {
        if let Some(ordinal) = self.unknown_scheme {
            error!(ordinal, "spatial scheme not found; not advecting");
            return Err(AdvectError::UnknownSpatialScheme { ordinal });
        }
        self.config.validate().inspect_err(|e| warn!(%e, "invalid advection config"))?;
        let Some(top) = self.level_sets.last() else {
            warn!("no level sets passed to advection");
            return Err(AdvectError::NoLevelSets);
        };
        let Some(velocity) = self.velocity.clone() else {
            warn!("no velocity field passed to advection");
            return Err(AdvectError::MissingVelocityField);
        };
        if let Some(layer) = self
            .level_sets
            .iter()
            .position(|field| !field.grid().same_as(top.grid()))
        {
            warn!(layer, "level set grid differs from the top level set");
            return Err(AdvectError::GridMismatch { layer });
        }
        if self.config.time_step_ratio >= 0.5 {
            warn!(
                ratio = self.config.time_step_ratio,
                "time step ratio should be smaller than 0.5; advection might fail"
            );
        }
        Ok(velocity)
    }

    /// Advect the stack.
    ///
    /// With an advection time of zero this takes exactly one step of the
    /// largest stable length, which is `f64::MAX` if nothing moves.
    /// Otherwise it steps until the advection time is used up, or after one
    /// step if single stepping is on.
    ///
    /// # Errors
    ///
    /// Fails before touching any field if the stack is empty, no velocity
    /// field is installed, the materials do not share a grid, the spatial
    /// scheme ordinal is unknown, or the configuration is invalid.
    pub fn apply(&mut self) -> Result<(), AdvectError> {
        let velocity = self.check_inputs()?;
        let time = self.config.advection_time;

        if time == 0.0 {
            self.advected_time = self.advect(velocity.as_ref(), f64::MAX)?;
            self.number_of_time_steps = 1;
            return Ok(());
        }

        let mut current = 0.0;
        self.number_of_time_steps = 0;
        while current < time {
            let step = self.advect(velocity.as_ref(), time - current)?;
            if step <= 0.0 {
                warn!(step, current, "advection made no progress; stopping");
                break;
            }
            current += step;
            self.number_of_time_steps += 1;
            if self.config.single_step {
                break;
            }
        }
        self.advected_time = current;
        debug!(
            advected_time = current,
            steps = self.number_of_time_steps,
            "advection finished"
        );
        Ok(())
    }

    // One step of the configured temporal scheme.
    fn advect(&mut self, velocity: &dyn VelocityField, max_time_step: f64) -> Result<f64, AdvectError> {
        let step = match self.config.temporal_scheme {
            TemporalSchemeKind::ForwardEuler => self.evolve_forward_euler(velocity, max_time_step),
            TemporalSchemeKind::RungeKutta2 => {
                self.evolve_runge_kutta(velocity, max_time_step, &[(0.5, 0.5)])
            }
            TemporalSchemeKind::RungeKutta3 => self.evolve_runge_kutta(
                velocity,
                max_time_step,
                &[(0.75, 0.25), (1.0 / 3.0, 2.0 / 3.0)],
            ),
        };
        self.adjust_lower_layers()?;
        Ok(step)
    }

    /// Widen the top band for the scheme and sweep it for rates.
    pub(crate) fn stage_rates(&mut self, velocity: &dyn VelocityField, max_time_step: f64) -> RateTable {
        let kind = self.config.spatial_scheme;
        let Some(top) = self.level_sets.last_mut() else {
            return RateTable::empty(max_time_step);
        };
        prepare(kind, top);
        if self.config.ignore_voids {
            top.mark_void_points();
        }
        compute_rates(&self.level_sets, velocity, &self.config, max_time_step)
    }

    /// Move the top field by `time_step` along `rates`.
    pub(crate) fn stage_update(&mut self, rates: &RateTable, time_step: f64) {
        let save = self.config.save_advection_velocities;
        let width = self.config.spatial_scheme.active_width();
        if let Some(top) = self.level_sets.last_mut() {
            update_level_set(top, rates, time_step, width, save);
        }
    }

    /// Renormalise the top field.
    pub(crate) fn rebuild_top(&mut self) {
        let update = self.config.update_point_data;
        let width = self.config.spatial_scheme.rebuild_width();
        if let Some(top) = self.level_sets.last_mut() {
            rebuild(top, width, update);
        }
    }

    /// Run the inter-stage callback, if any.
    pub(crate) fn run_velocity_update(&self, stage: usize) {
        let (Some(callback), Some(top)) = (&self.velocity_update, self.level_sets.last()) else {
            return;
        };
        if !callback(top) {
            warn!(stage, "velocity update callback returned false");
        }
    }

    pub(crate) fn set_current_time_step(&mut self, time_step: f64) {
        self.current_time_step = time_step;
    }

    pub(crate) fn top(&self) -> Option<&NarrowBandField<D>> {
        self.level_sets.last()
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut NarrowBandField<D>> {
        self.level_sets.last_mut()
    }

    // Clip every lower material to the moved top surface.
    fn adjust_lower_layers(&mut self) -> Result<(), AdvectError> {
        if self.config.spatial_scheme.integrates_material_stack() {
            return Ok(());
        }
        let Some((top, lower)) = self.level_sets.split_last_mut() else {
            return Ok(());
        };
        for (layer, field) in lower.iter_mut().enumerate() {
            field
                .boolean_op(top, BooleanOp::Intersect)
                .map_err(|_| AdvectError::GridMismatch { layer })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_test_utils::{grid, plane, ConstantVelocity};

    fn flat() -> NarrowBandField<2> {
        plane(grid(8, 1.0), [0.0, 0.1, 0.0], [0.0, 1.0, 0.0], 2)
    }

    #[test]
    fn empty_stack_is_rejected() {
        let mut engine = AdvectionEngine::<2>::new();
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(1.0)));
        assert_eq!(engine.apply(), Err(AdvectError::NoLevelSets));
    }

    #[test]
    fn missing_velocity_is_rejected_without_mutation() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(flat());
        let before = engine.level_sets()[0].values().to_vec();
        assert_eq!(engine.apply(), Err(AdvectError::MissingVelocityField));
        assert_eq!(engine.level_sets()[0].values(), before.as_slice());
        assert_eq!(engine.number_of_time_steps(), 0);
    }

    #[test]
    fn unknown_ordinal_is_rejected_until_replaced() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(flat());
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(1.0)));
        engine.set_spatial_scheme_ordinal(99);
        let before = engine.level_sets()[0].values().to_vec();
        match engine.apply() {
            Err(AdvectError::UnknownSpatialScheme { ordinal: 99 }) => {}
            other => panic!("expected UnknownSpatialScheme, got {other:?}"),
        }
        assert_eq!(engine.level_sets()[0].values(), before.as_slice());
        engine.set_spatial_scheme_ordinal(1);
        assert_eq!(engine.config().spatial_scheme, SpatialSchemeKind::EngquistOsher2);
        assert!(engine.apply().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(flat());
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(1.0)));
        engine.set_time_step_ratio(-1.0);
        match engine.apply() {
            Err(AdvectError::InvalidConfig(_)) => {}
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn grid_mismatch_is_rejected() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(plane(grid(6, 1.0), [0.0; 3], [0.0, 1.0, 0.0], 2));
        engine.insert_level_set(flat());
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(1.0)));
        assert_eq!(engine.apply(), Err(AdvectError::GridMismatch { layer: 0 }));
    }

    #[test]
    fn single_step_stops_early() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(flat());
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(-1.0)));
        engine.set_time_step_ratio(0.4);
        engine.set_advection_time(10.0);
        engine.set_single_step(true);
        engine.apply().unwrap();
        assert_eq!(engine.number_of_time_steps(), 1);
        assert!((engine.advected_time() - 0.4).abs() < 1e-12);
        assert!((engine.current_time_step() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn large_ratio_is_applied_with_a_warning() {
        let mut engine = AdvectionEngine::new();
        engine.insert_level_set(flat());
        engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(-1.0)));
        engine.set_time_step_ratio(0.6);
        assert_eq!(engine.time_step_ratio(), 0.6);
        assert!(engine.apply().is_ok());
        assert!((engine.advected_time() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn read_back_reflects_setters() {
        let mut engine = AdvectionEngine::<3>::new();
        assert_eq!(engine.current_time_step(), -1.0);
        engine.set_time_step_ratio(0.25);
        engine.set_calculate_normal_vectors(false);
        assert_eq!(engine.time_step_ratio(), 0.25);
        assert!(!engine.calculate_normal_vectors());
    }
}
