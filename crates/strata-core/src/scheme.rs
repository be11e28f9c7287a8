//! Selectors for the spatial and temporal discretisation schemes.

use crate::error::AdvectError;
use std::fmt;

/// Spatial (flux/dissipation) scheme used to evaluate the Hamiltonian.
///
/// Ordinals are stable and follow declaration order, which is what the
/// `TryFrom<u32>` conversion uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpatialSchemeKind {
    /// Upwind Engquist-Osher, first-order one-sided differences.
    #[default]
    EngquistOsher1,
    /// Upwind Engquist-Osher with ENO second-order correction.
    EngquistOsher2,
    /// Lax-Friedrichs with globally estimated alphas.
    LaxFriedrichs1,
    /// Second-order Lax-Friedrichs with globally estimated alphas.
    LaxFriedrichs2,
    /// Local Lax-Friedrichs with analytic alphas from the velocity field.
    LocalLaxFriedrichsAnalytical1,
    /// Local-local Lax-Friedrichs: alphas from the point itself.
    LocalLocalLaxFriedrichs1,
    /// Second-order local-local Lax-Friedrichs.
    LocalLocalLaxFriedrichs2,
    /// Local Lax-Friedrichs: alphas maximised over the 3^D neighbourhood.
    LocalLaxFriedrichs1,
    /// Second-order local Lax-Friedrichs.
    LocalLaxFriedrichs2,
    /// Stencil local Lax-Friedrichs with velocity-sensitivity dissipation.
    StencilLocalLaxFriedrichs1,
    /// Upwind with fifth-order WENO one-sided differences.
    Weno5,
    /// Upwind with third-order WENO one-sided differences.
    Weno3,
}

impl SpatialSchemeKind {
    /// Every scheme, in ordinal order.
    pub const ALL: [SpatialSchemeKind; 12] = [
        Self::EngquistOsher1,
        Self::EngquistOsher2,
        Self::LaxFriedrichs1,
        Self::LaxFriedrichs2,
        Self::LocalLaxFriedrichsAnalytical1,
        Self::LocalLocalLaxFriedrichs1,
        Self::LocalLocalLaxFriedrichs2,
        Self::LocalLaxFriedrichs1,
        Self::LocalLaxFriedrichs2,
        Self::StencilLocalLaxFriedrichs1,
        Self::Weno5,
        Self::Weno3,
    ];

    /// Order of the one-sided differences (1, 2, 3 or 5).
    pub fn order(self) -> usize {
        match self {
            Self::EngquistOsher2
            | Self::LaxFriedrichs2
            | Self::LocalLocalLaxFriedrichs2
            | Self::LocalLaxFriedrichs2 => 2,
            Self::Weno3 => 3,
            Self::Weno5 => 5,
            _ => 1,
        }
    }

    /// Whether the scheme keeps a two-layer active band.
    pub fn is_wide_stencil(self) -> bool {
        matches!(self, Self::Weno3 | Self::Weno5)
    }

    /// Points per side of the one-sided difference stencil.
    pub fn stencil_radius(self) -> usize {
        match self {
            Self::Weno3 | Self::Weno5 => (self.order() + 1) / 2,
            _ => self.order(),
        }
    }

    /// Narrow-band width the scheme's stencil requires.
    ///
    /// Wide-stencil schemes evaluate every point with `|value| <= 1`, so
    /// their band reaches one layer past the stencil radius.
    pub fn required_width(self) -> usize {
        let order = self.order();
        match self {
            Self::LocalLaxFriedrichs1
            | Self::LocalLaxFriedrichs2
            | Self::LocalLaxFriedrichsAnalytical1 => 2 * (order + 2) + 1,
            Self::StencilLocalLaxFriedrichs1 => 2 * (order + 1) + 4,
            Self::Weno3 | Self::Weno5 => 2 * (self.stencil_radius() + 1) + 1,
            _ => 2 * order + 1,
        }
    }

    /// Band width of the points that get a rate: 1, or 2 for wide-stencil
    /// schemes.
    pub fn active_width(self) -> usize {
        if self.is_wide_stencil() {
            2
        } else {
            1
        }
    }

    /// Largest `|value|` of a point that gets a rate.
    pub fn active_cutoff(self) -> f64 {
        self.active_width() as f64 * 0.5
    }

    /// Band width recorded after the top field is rebuilt: 2, or 3 for
    /// wide-stencil schemes.
    pub fn rebuild_width(self) -> usize {
        self.active_width() + 1
    }

    /// Whether lower materials are carried by their own stencil rather than
    /// by intersection with the moved top layer.
    pub fn integrates_material_stack(self) -> bool {
        matches!(self, Self::StencilLocalLaxFriedrichs1)
    }

    /// Whether the scheme needs a global alpha pre-sweep before rates.
    pub fn needs_global_alpha(self) -> bool {
        matches!(self, Self::LaxFriedrichs1 | Self::LaxFriedrichs2)
    }
}

impl fmt::Display for SpatialSchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EngquistOsher1 => "engquist-osher-1",
            Self::EngquistOsher2 => "engquist-osher-2",
            Self::LaxFriedrichs1 => "lax-friedrichs-1",
            Self::LaxFriedrichs2 => "lax-friedrichs-2",
            Self::LocalLaxFriedrichsAnalytical1 => "local-lax-friedrichs-analytical-1",
            Self::LocalLocalLaxFriedrichs1 => "local-local-lax-friedrichs-1",
            Self::LocalLocalLaxFriedrichs2 => "local-local-lax-friedrichs-2",
            Self::LocalLaxFriedrichs1 => "local-lax-friedrichs-1",
            Self::LocalLaxFriedrichs2 => "local-lax-friedrichs-2",
            Self::StencilLocalLaxFriedrichs1 => "stencil-local-lax-friedrichs-1",
            Self::Weno3 => "weno-3",
            Self::Weno5 => "weno-5",
        };
        f.write_str(name)
    }
}

impl TryFrom<u32> for SpatialSchemeKind {
    type Error = AdvectError;

    fn try_from(ordinal: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or(AdvectError::UnknownSpatialScheme { ordinal })
    }
}

/// Time integration scheme wrapped around the spatial discretisation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TemporalSchemeKind {
    /// Single explicit Euler stage.
    #[default]
    ForwardEuler,
    /// Two-stage strong-stability-preserving Runge-Kutta (Heun).
    RungeKutta2,
    /// Three-stage strong-stability-preserving Runge-Kutta.
    RungeKutta3,
}

impl TemporalSchemeKind {
    /// Number of rate evaluations per step.
    pub fn stages(self) -> usize {
        match self {
            Self::ForwardEuler => 1,
            Self::RungeKutta2 => 2,
            Self::RungeKutta3 => 3,
        }
    }
}
