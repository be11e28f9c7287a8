//! Renormalisation of the top field after it has been displaced.
//!
//! Advection leaves values near the surface that are no longer a signed
//! distance. The rebuild keeps points that still straddle a sign change,
//! clamps ones that drifted too deep next to an opposite-signed deep
//! neighbour, grows one new layer from the survivors, and drops
//! everything else. Distances are Manhattan, one grid spacing per layer.
//!
//! Neighbours are visited in star order (`+axis0 .. +axisD-1`, then the
//! negative directions); where several neighbours qualify the first one
//! wins, which keeps the choice of data source reproducible.

use rayon::prelude::*;
use strata_core::PointId;
use strata_field::{BandPoint, NarrowBandField, NEG_VALUE, POS_VALUE};
use tracing::debug;

const SIGN_TOLERANCE: f64 = 1e-7;

fn point(index: usize, value: f64, source: PointId) -> Option<BandPoint> {
    Some(BandPoint {
        index,
        value,
        source,
    })
}

fn rebuilt_point<const D: usize>(field: &NarrowBandField<D>, lin: usize) -> Option<BandPoint> {
    let center = field.value(lin);
    let neighbors = field.grid().star_neighbors(lin);

    if center.abs() <= 1.0 {
        let own = field.point_id(lin)?;
        let crosses = neighbors.iter().any(|&nb| {
            (field.value(nb) - SIGN_TOLERANCE).is_sign_negative()
                != (center + SIGN_TOLERANCE).is_sign_negative()
        });
        if !crosses {
            return None;
        }

        let deep = |wanted: fn(f64) -> bool| {
            neighbors.iter().find_map(|&nb| {
                let v = field.value(nb);
                if v.abs() <= 1.0 && wanted(v) {
                    field.point_id(nb)
                } else {
                    None
                }
            })
        };
        if center > 0.5 {
            if let Some(source) = deep(|v| v < -0.5) {
                return point(lin, 0.5, source);
            }
        } else if center < -0.5 {
            if let Some(source) = deep(|v| v > 0.5) {
                return point(lin, -0.5, source);
            }
        }
        return point(lin, center, own);
    }

    let mut best: Option<(f64, PointId)> = None;
    if center >= 0.0 {
        let mut distance = POS_VALUE;
        for &nb in &neighbors {
            let v = field.value(nb);
            if v.abs() <= 1.0 && v < 0.0 && distance > v + 1.0 {
                distance = v + 1.0;
                best = field.point_id(nb).map(|id| (distance, id));
            }
        }
        let (value, source) = best?;
        (value <= 1.0).then_some(BandPoint {
            index: lin,
            value,
            source,
        })
    } else {
        let mut distance = NEG_VALUE;
        for &nb in &neighbors {
            let v = field.value(nb);
            if v.abs() <= 1.0 && v > 0.0 && distance < v - 1.0 {
                distance = v - 1.0;
                best = field.point_id(nb).map(|id| (distance, id));
            }
        }
        let (value, source) = best?;
        (value >= -1.0).then_some(BandPoint {
            index: lin,
            value,
            source,
        })
    }
}

/// Rebuild `field` and record `width` as its band width.
///
/// The new band is always the crossing points plus one grown layer;
/// `width` is what the next expansion starts from, normally
/// [`SpatialSchemeKind::rebuild_width`](strata_core::SpatialSchemeKind::rebuild_width).
///
/// With `update_point_data` every new point inherits the point data of
/// the old point recorded as its source; otherwise point data is cleared.
pub fn rebuild<const D: usize>(field: &mut NarrowBandField<D>, width: usize, update_point_data: bool) {
    let candidates = field.band_candidates();
    let chunk = candidates
        .len()
        .div_ceil(rayon::current_num_threads().max(1))
        .max(1);
    let segments: Vec<Vec<BandPoint>> = candidates
        .par_chunks(chunk)
        .map(|chunk| {
            chunk
                .iter()
                .filter_map(|&lin| rebuilt_point(field, lin))
                .collect()
        })
        .collect();
    field.rebuild_with(segments, width, update_point_data);
    debug!(points = field.number_of_points(), width, "rebuilt band");
}
