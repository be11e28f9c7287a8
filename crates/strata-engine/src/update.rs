//! Apply a rate table to the top field.

use rayon::prelude::*;
use strata_core::PointId;
use strata_field::NarrowBandField;

use crate::rates::{PointRates, RateTable};

/// Point-data label for the displacement applied in the last step.
pub const VELOCITY_LABEL: &str = "AdvectionVelocities";

/// Point-data label for the dissipation applied in the last step.
pub const DISSIPATION_LABEL: &str = "AdvectionDissipation";

// Displaced value plus the displacement and dissipation of the final leg.
fn advance(mut value: f64, record: &PointRates, time_step: f64) -> (f64, f64, f64) {
    let entries = &record.entries;
    let mut time = time_step;
    let mut k = 0;
    while k + 1 < entries.len()
        && (entries[k].stop - value).abs() < (time * entries[k].velocity).abs()
    {
        time -= ((entries[k].stop - value) / entries[k].velocity).abs();
        value = entries[k].stop;
        k += 1;
    }
    let Some(last) = entries.get(k) else {
        return (value, 0.0, 0.0);
    };
    let displacement = time * last.velocity;
    (value - displacement, displacement, time * last.dissipation)
}

/// Move every active point of `field` by `time_step`.
///
/// The band is first reduced to `active_width` layers, the scheme's
/// [`active_width`](strata_core::SpatialSchemeKind::active_width), which
/// leaves exactly the points that have a record in `rates`. Each point then consumes its legs in
/// order: when the remaining motion would carry it past a leg's stop
/// value, it snaps to the stop, pays the time that took, and continues
/// with the next leg.
///
/// With `save_velocities` the displacement and dissipation of the final
/// leg are stored under [`VELOCITY_LABEL`] and [`DISSIPATION_LABEL`].
pub fn update_level_set<const D: usize>(
    field: &mut NarrowBandField<D>,
    rates: &RateTable,
    time_step: f64,
    active_width: usize,
    save_velocities: bool,
) {
    field.reduce(active_width);

    let updated: Vec<(f64, f64, f64)> = field
        .points()
        .par_iter()
        .map(|&lin| {
            let value = field.value(lin);
            match rates.get(lin) {
                Some(record) => advance(value, record, time_step),
                None => (value, 0.0, 0.0),
            }
        })
        .collect();

    let mut velocities = Vec::with_capacity(updated.len());
    let mut dissipation = Vec::with_capacity(updated.len());
    for (id, (value, v, d)) in updated.into_iter().enumerate() {
        field.set_point_value(PointId(id), value);
        velocities.push(v);
        dissipation.push(d);
    }

    if save_velocities {
        let data = field.point_data_mut();
        data.insert_scalar_data(VELOCITY_LABEL, velocities);
        data.insert_scalar_data(DISSIPATION_LABEL, dissipation);
    }
}
