//! Time integration: forward Euler and strong-stability-preserving
//! Runge-Kutta.
//!
//! Runge-Kutta steps fix the time step in the first stage and reuse it
//! for every later stage. Each later stage advances the current field by
//! one Euler step and blends the result with the field saved at the start
//! of the step:
//!
//! ```text
//! RK2:  u1 = E(u0)        u  = 1/2 u0 + 1/2 E(u1)
//! RK3:  u1 = E(u0)        u2 = 3/4 u0 + 1/4 E(u1)
//!                         u  = 1/3 u0 + 2/3 E(u2)
//! ```
//!
//! The band is rebuilt once, after the last stage.

use strata_core::{PointId, VelocityField};
use strata_field::{is_sentinel, NarrowBandField};
use tracing::trace;

use crate::engine::AdvectionEngine;

/// Blend the defined points of `field` with `original` in place.
///
/// Each point becomes `w_original * original + w_current * current`.
/// Points undefined in `original` keep their current value.
pub fn combine_level_sets<const D: usize>(
    field: &mut NarrowBandField<D>,
    original: &NarrowBandField<D>,
    w_original: f64,
    w_current: f64,
) {
    for id in 0..field.number_of_points() {
        let id = PointId(id);
        let lin = field.point_index(id);
        let before = original.value(lin);
        if is_sentinel(before) {
            continue;
        }
        let blended = w_original * before + w_current * field.point_value(id);
        field.set_point_value(id, blended);
    }
}

impl<const D: usize> AdvectionEngine<D> {
    pub(crate) fn evolve_forward_euler(&mut self, velocity: &dyn VelocityField, max_time_step: f64) -> f64 {
        let rates = self.stage_rates(velocity, max_time_step);
        let time_step = rates.max_time_step();
        self.set_current_time_step(time_step);
        self.stage_update(&rates, time_step);
        self.rebuild_top();
        time_step
    }

    /// Runge-Kutta step; `blends` holds `(w_original, w_current)` for every
    /// stage after the first.
    pub(crate) fn evolve_runge_kutta(
        &mut self,
        velocity: &dyn VelocityField,
        max_time_step: f64,
        blends: &[(f64, f64)],
    ) -> f64 {
        let rates = self.stage_rates(velocity, max_time_step);
        let time_step = rates.max_time_step();
        self.set_current_time_step(time_step);
        let Some(original) = self.top().cloned() else {
            return 0.0;
        };
        if time_step <= 0.0 {
            return 0.0;
        }

        self.stage_update(&rates, time_step);
        for (stage, &(w_original, w_current)) in blends.iter().enumerate() {
            self.run_velocity_update(stage + 1);
            let rates = self.stage_rates(velocity, time_step);
            self.stage_update(&rates, time_step);
            if let Some(top) = self.top_mut() {
                combine_level_sets(top, &original, w_original, w_current);
            }
            trace!(stage = stage + 2, time_step, "runge-kutta stage");
        }

        self.rebuild_top();
        time_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_test_utils::{grid, plane};

    #[test]
    fn blends_defined_points() {
        let original = plane::<2>(grid(4, 1.0), [0.0, 0.2, 0.0], [0.0, 1.0, 0.0], 2);
        let mut current = plane::<2>(grid(4, 1.0), [0.0, 0.6, 0.0], [0.0, 1.0, 0.0], 2);
        combine_level_sets(&mut current, &original, 0.5, 0.5);
        // (-0.2 + -0.6) / 2
        assert!((current.value_at([0, 0]) + 0.4).abs() < 1e-12);
        assert!((current.value_at([0, 1]) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn keeps_points_missing_from_original() {
        let original = plane::<2>(grid(4, 1.0), [0.0, 0.2, 0.0], [0.0, 1.0, 0.0], 2);
        let mut current = plane::<2>(grid(4, 1.0), [0.0, 1.6, 0.0], [0.0, 1.0, 0.0], 2);
        combine_level_sets(&mut current, &original, 0.75, 0.25);
        // row 2 is undefined in the original
        assert!((current.value_at([0, 2]) - 0.4).abs() < 1e-12);
        // row 1: 0.75 * 0.8 + 0.25 * -0.6
        assert!((current.value_at([0, 1]) - 0.45).abs() < 1e-12);
    }
}
