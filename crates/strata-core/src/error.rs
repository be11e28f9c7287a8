//! Error types for the Strata advection engine.
//!
//! Organised by subsystem: configuration validation and advection.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating an advection configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Time step ratio is NaN, infinite, zero, or negative.
    InvalidTimeStepRatio {
        /// The invalid value.
        value: f64,
    },
    /// Dissipation alpha is NaN, infinite, or negative.
    InvalidDissipationAlpha {
        /// The invalid value.
        value: f64,
    },
    /// Maximum stencil dissipation is NaN or not positive.
    InvalidMaxDissipation {
        /// The invalid value.
        value: f64,
    },
    /// Advection time is NaN, infinite, or negative.
    InvalidAdvectionTime {
        /// The invalid value.
        value: f64,
    },
    /// Adaptive time stepping was enabled with zero subdivisions.
    ZeroSubdivisions,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeStepRatio { value } => {
                write!(f, "time_step_ratio must be finite and positive, got {value}")
            }
            Self::InvalidDissipationAlpha { value } => {
                write!(f, "dissipation_alpha must be finite and >= 0, got {value}")
            }
            Self::InvalidMaxDissipation { value } => {
                write!(f, "max_dissipation must be positive, got {value}")
            }
            Self::InvalidAdvectionTime { value } => {
                write!(f, "advection_time must be finite and >= 0, got {value}")
            }
            Self::ZeroSubdivisions => {
                write!(f, "adaptive time stepping needs at least one subdivision")
            }
        }
    }
}

impl Error for ConfigError {}

// ── AdvectError ────────────────────────────────────────────────────

/// Errors that stop an advection call before any field is touched.
#[derive(Clone, Debug, PartialEq)]
pub enum AdvectError {
    /// The material stack is empty.
    NoLevelSets,
    /// No velocity field was installed.
    MissingVelocityField,
    /// The spatial scheme selector does not name a known scheme.
    UnknownSpatialScheme {
        /// The unrecognised ordinal.
        ordinal: u32,
    },
    /// A material does not share the top material's grid.
    GridMismatch {
        /// Position of the offending material in the stack.
        layer: usize,
    },
    /// The configuration failed validation.
    InvalidConfig(ConfigError),
}

impl fmt::Display for AdvectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLevelSets => write!(f, "no level sets passed to advection"),
            Self::MissingVelocityField => write!(f, "no velocity field passed to advection"),
            Self::UnknownSpatialScheme { ordinal } => {
                write!(f, "unknown spatial scheme ordinal {ordinal}")
            }
            Self::GridMismatch { layer } => {
                write!(f, "level set {layer} does not share the top level set's grid")
            }
            Self::InvalidConfig(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl Error for AdvectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for AdvectError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}
