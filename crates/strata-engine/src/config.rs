//! Advection configuration and validation.
//!
//! [`AdvectConfig`] holds every option the engine recognises. The
//! engine's setters write into it; [`validate()`](AdvectConfig::validate)
//! runs at the start of every [`apply()`](crate::AdvectionEngine::apply)
//! so a bad value is reported before any field is touched.

use strata_core::{ConfigError, SpatialSchemeKind, TemporalSchemeKind};

/// Default CFL ratio, just below the stability limit of one half.
pub const DEFAULT_TIME_STEP_RATIO: f64 = 0.4999;

/// Default number of sub-steps taken near material interfaces when
/// adaptive time stepping is on.
pub const DEFAULT_ADAPTIVE_SUBDIVISIONS: u32 = 20;

// ── AdvectConfig ───────────────────────────────────────────────────

/// Options for one advection engine.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvectConfig {
    /// Finite-difference scheme for flux and dissipation.
    pub spatial_scheme: SpatialSchemeKind,
    /// Time integration around the spatial scheme.
    pub temporal_scheme: TemporalSchemeKind,
    /// Fraction of a grid spacing a surface may move in one step.
    /// Values at or above 0.5 are accepted with a warning.
    pub time_step_ratio: f64,
    /// Scale applied to Lax-Friedrichs dissipation.
    pub dissipation_alpha: f64,
    /// Pass estimated normals to the velocity field.
    pub calculate_normal_vectors: bool,
    /// Give points in enclosed voids zero velocity.
    pub ignore_voids: bool,
    /// Take small sub-steps instead of snapping when an etch front is
    /// close to the material below.
    pub adaptive_time_stepping: bool,
    /// Number of sub-steps per CFL step in adaptive mode.
    pub adaptive_subdivisions: u32,
    /// Stop [`apply()`](crate::AdvectionEngine::apply) after one step.
    pub single_step: bool,
    /// Total time to advect. Zero means one step of unbounded length.
    pub advection_time: f64,
    /// Carry point data through the rebuild instead of clearing it.
    pub update_point_data: bool,
    /// Record the applied displacement and dissipation as point data.
    pub save_advection_velocities: bool,
    /// Zero the rate of points where dissipation flips the sign of the
    /// flux.
    pub check_dissipation: bool,
    /// Stencil dissipation above this is discarded as corrupted.
    pub max_dissipation: f64,
}

impl Default for AdvectConfig {
    fn default() -> Self {
        Self {
            spatial_scheme: SpatialSchemeKind::default(),
            temporal_scheme: TemporalSchemeKind::default(),
            time_step_ratio: DEFAULT_TIME_STEP_RATIO,
            dissipation_alpha: 1.0,
            calculate_normal_vectors: true,
            ignore_voids: false,
            adaptive_time_stepping: false,
            adaptive_subdivisions: DEFAULT_ADAPTIVE_SUBDIVISIONS,
            single_step: false,
            advection_time: 0.0,
            update_point_data: true,
            save_advection_velocities: false,
            check_dissipation: true,
            max_dissipation: f64::MAX,
        }
    }
}

impl AdvectConfig {
    /// Check every numeric option.
    ///
    /// A time step ratio of 0.5 or more is *valid*: it only risks an
    /// unstable result and is reported by the engine as a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.time_step_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::InvalidTimeStepRatio { value: ratio });
        }
        let alpha = self.dissipation_alpha;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::InvalidDissipationAlpha { value: alpha });
        }
        let max = self.max_dissipation;
        if max.is_nan() || max <= 0.0 {
            return Err(ConfigError::InvalidMaxDissipation { value: max });
        }
        let time = self.advection_time;
        if !time.is_finite() || time < 0.0 {
            return Err(ConfigError::InvalidAdvectionTime { value: time });
        }
        if self.adaptive_time_stepping && self.adaptive_subdivisions == 0 {
            return Err(ConfigError::ZeroSubdivisions);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AdvectConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spatial_scheme, SpatialSchemeKind::EngquistOsher1);
        assert_eq!(config.temporal_scheme, TemporalSchemeKind::ForwardEuler);
        assert!(config.time_step_ratio < 0.5);
    }

    #[test]
    fn ratio_above_half_is_still_valid() {
        let config = AdvectConfig {
            time_step_ratio: 0.7,
            ..AdvectConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_ratio() {
        for value in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let config = AdvectConfig {
                time_step_ratio: value,
                ..AdvectConfig::default()
            };
            match config.validate() {
                Err(ConfigError::InvalidTimeStepRatio { .. }) => {}
                other => panic!("expected InvalidTimeStepRatio, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_negative_alpha() {
        let config = AdvectConfig {
            dissipation_alpha: -1.0,
            ..AdvectConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidDissipationAlpha { value }) => assert_eq!(value, -1.0),
            other => panic!("expected InvalidDissipationAlpha, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_max_dissipation() {
        let config = AdvectConfig {
            max_dissipation: 0.0,
            ..AdvectConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidMaxDissipation { .. }) => {}
            other => panic!("expected InvalidMaxDissipation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_infinite_advection_time() {
        let config = AdvectConfig {
            advection_time: f64::INFINITY,
            ..AdvectConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidAdvectionTime { .. }) => {}
            other => panic!("expected InvalidAdvectionTime, got {other:?}"),
        }
    }

    #[test]
    fn zero_subdivisions_only_matter_when_adaptive() {
        let mut config = AdvectConfig {
            adaptive_subdivisions: 0,
            ..AdvectConfig::default()
        };
        assert!(config.validate().is_ok());
        config.adaptive_time_stepping = true;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSubdivisions));
    }
}
