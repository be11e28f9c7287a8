//! Rate sweep: per-point velocities and the global time step.
//!
//! Every active point of the top material gets a short list of
//! [`RateEntry`] legs. A leg says "move at this rate until the value
//! reaches `stop`". Most points have a single leg; an etch front sitting
//! within one CFL step of the material below gets one leg per material it
//! will cut through.
//!
//! A point is active when `|value|` is within the scheme's
//! [`active_cutoff`](strata_core::SpatialSchemeKind::active_cutoff): half a
//! cell for the first- and second-order schemes, a full cell for the wide
//! WENO stencils.
//!
//! The sweep runs one scheme clone per worker segment. The only shared
//! state is the running minimum time step and the merged dissipation
//! coefficients, both behind one mutex.

use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use smallvec::SmallVec;
use strata_core::{MaterialId, PointId, Vec3, VelocityField};
use strata_field::{NarrowBandField, VOID_POINT_LABEL};
use strata_scheme::{global_alphas, FieldView, Scheme, SchemeParams, SpatialScheme};
use tracing::{debug, warn};

use crate::config::AdvectConfig;

/// Tolerance when deciding whether a lower material reaches the surface
/// of the point being advected.
pub const WRAPPING_LAYER_EPSILON: f64 = 1e-4;

/// Fraction of the CFL ratio: in adaptive mode a gap to the material below
/// larger than this share of the remaining CFL ratio is approached in
/// sub-steps instead of being cut through.
const ADAPTIVE_FRACTION: f64 = 0.2;

/// One leg of a point's motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateEntry {
    /// Rate of change of the level-set value, in grid units per time.
    /// Positive values grow the material.
    pub velocity: f64,
    /// Value at which this leg ends and the next begins. `±f64::MAX` means
    /// the leg never ends within a step.
    pub stop: f64,
    /// Dissipation already folded into `velocity`.
    pub dissipation: f64,
}

/// Legs of one active point, keyed by its linear grid position.
#[derive(Clone, Debug, PartialEq)]
pub struct PointRates {
    /// Linear grid position of the point.
    pub index: usize,
    /// Legs in the order they are consumed.
    pub entries: SmallVec<[RateEntry; 2]>,
}

/// Output of one rate sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    points: Vec<PointRates>,
    max_time_step: f64,
    final_alphas: Vec3,
}

impl RateTable {
    /// A table without points, allowing steps up to `max_time_step`.
    pub fn empty(max_time_step: f64) -> Self {
        Self {
            points: Vec::new(),
            max_time_step,
            final_alphas: [0.0; 3],
        }
    }

    /// Largest stable time step found by the sweep.
    pub fn max_time_step(&self) -> f64 {
        self.max_time_step
    }

    /// Dissipation coefficients merged across all workers.
    pub fn final_alphas(&self) -> Vec3 {
        self.final_alphas
    }

    /// Number of points with a rate record.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if no point was active.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All records, in increasing linear order.
    pub fn points(&self) -> &[PointRates] {
        &self.points
    }

    /// Record for the point at linear position `index`.
    pub fn get(&self, index: usize) -> Option<&PointRates> {
        self.points
            .binary_search_by_key(&index, |p| p.index)
            .ok()
            .map(|i| &self.points[i])
    }
}

// Lowest material whose surface reaches `value` at `lin`.
fn owning_material<const D: usize>(
    stack: &[NarrowBandField<D>],
    lin: usize,
    value: f64,
) -> Option<MaterialId> {
    stack
        .iter()
        .position(|field| field.value(lin) <= value + WRAPPING_LAYER_EPSILON)
        .map(MaterialId)
}

fn opposite_signs(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

struct Reduction {
    max_time_step: f64,
    final_alphas: Vec3,
}

/// Sweep the active points of the top of `stack`.
///
/// `max_time_step` caps the result. The top field must already have the
/// band width its scheme needs; with `ignore_voids` set it must also
/// carry void markers under [`VOID_POINT_LABEL`].
pub fn compute_rates<const D: usize>(
    stack: &[NarrowBandField<D>],
    velocity: &dyn VelocityField,
    config: &AdvectConfig,
    max_time_step: f64,
) -> RateTable {
    let Some(top) = stack.last() else {
        return RateTable::empty(max_time_step);
    };
    let kind = config.spatial_scheme;
    let cutoff = kind.active_cutoff();
    let delta = top.grid().delta();
    let view = FieldView::new(top, velocity);

    let voids = if config.ignore_voids {
        let markers = top.point_data().scalar_data(VOID_POINT_LABEL);
        if markers.is_none() {
            warn!("cannot find void point markers; not ignoring void points");
        }
        markers
    } else {
        None
    };

    let mut params = SchemeParams {
        dissipation_alpha: config.dissipation_alpha,
        calculate_normal_vectors: config.calculate_normal_vectors,
        max_dissipation: config.max_dissipation,
        global_alphas: [0.0; 3],
    };
    if kind.needs_global_alpha() {
        params.global_alphas = global_alphas(view, kind.order(), |lin| {
            owning_material(stack, lin, top.value(lin)).unwrap_or(MaterialId(stack.len() - 1))
        });
    }
    let template = Scheme::new(kind, view, params);

    let ratio = config.time_step_ratio;
    let adaptive = config.adaptive_time_stepping;
    let subdivisions = f64::from(config.adaptive_subdivisions.max(1));
    let check_dissipation = config.check_dissipation;

    let shared = Mutex::new(Reduction {
        max_time_step,
        final_alphas: [0.0; 3],
    });

    let segments: Vec<Vec<PointRates>> = top
        .worker_segments()
        .into_par_iter()
        .map(|range| {
            let mut scheme = template.clone();
            let mut segment_max = max_time_step;
            let mut out = Vec::with_capacity(range.len());

            for id in range {
                let lin = top.point_index(PointId(id));
                let mut value = top.value(lin);
                if value.abs() > cutoff {
                    continue;
                }
                let is_void = voids.is_some_and(|v| v.get(id).is_some_and(|&m| m != 0.0));

                let mut max_step = 0.0;
                let mut cfl = ratio;
                let mut entries = SmallVec::new();

                for current in (0..stack.len()).rev() {
                    let mut rate = 0.0;
                    let mut dissipation = 0.0;
                    if !is_void {
                        if let Some(material) = owning_material(stack, lin, value) {
                            let (hamiltonian, diss) = scheme.evaluate(lin, material);
                            rate = hamiltonian - diss;
                            dissipation = diss;
                            if check_dissipation && opposite_signs(rate, hamiltonian) {
                                rate = 0.0;
                            }
                        }
                    }

                    let below = if current > 0 {
                        stack[current - 1].value(lin)
                    } else {
                        f64::MAX
                    };

                    if rate > 0.0 {
                        max_step += cfl / rate;
                        entries.push(RateEntry {
                            velocity: rate,
                            stop: -f64::MAX,
                            dissipation,
                        });
                        break;
                    } else if rate == 0.0 {
                        max_step = f64::MAX;
                        entries.push(RateEntry {
                            velocity: rate,
                            stop: f64::MAX,
                            dissipation,
                        });
                        break;
                    }

                    let difference = (below - value).abs();
                    if difference >= cfl {
                        max_step -= cfl / rate;
                        entries.push(RateEntry {
                            velocity: rate,
                            stop: f64::MAX,
                            dissipation,
                        });
                        break;
                    } else if adaptive && difference > ADAPTIVE_FRACTION * cfl {
                        // Creep up on the interface and look again next step.
                        max_step -= cfl / rate / subdivisions;
                        entries.push(RateEntry {
                            velocity: rate,
                            stop: -f64::MIN_POSITIVE,
                            dissipation,
                        });
                        break;
                    }

                    // Cut through to the material below with what is left.
                    max_step -= difference / rate;
                    entries.push(RateEntry {
                        velocity: rate,
                        stop: below,
                        dissipation,
                    });
                    cfl -= difference;
                    value = below;
                }

                segment_max = segment_max.min(max_step);
                out.push(PointRates { index: lin, entries });
            }

            let mut reduction = shared.lock().unwrap_or_else(PoisonError::into_inner);
            scheme.reduce_time_step_hamilton_jacobi(&mut segment_max, delta);
            reduction.max_time_step = reduction.max_time_step.min(segment_max);
            let alphas = scheme.final_alphas();
            for (merged, a) in reduction.final_alphas.iter_mut().zip(alphas) {
                *merged = merged.max(a);
            }
            out
        })
        .collect();

    let reduction = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
    let points: Vec<PointRates> = segments.into_iter().flatten().collect();
    debug!(
        scheme = %kind,
        active = points.len(),
        max_time_step = reduction.max_time_step,
        "rates computed"
    );
    RateTable {
        points,
        max_time_step: reduction.max_time_step,
        final_alphas: reduction.final_alphas,
    }
}
