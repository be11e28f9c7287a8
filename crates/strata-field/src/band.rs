//! Band-width operations: expand, reduce and prune.
//!
//! Each operation computes the new point set in parallel over contiguous
//! chunks and hands the per-chunk lists to
//! [`NarrowBandField::rebuild_with`], which concatenates them in order and
//! migrates point data by source id.

use crate::field::{chunk_len, BandPoint, NarrowBandField};
use rayon::prelude::*;
use strata_core::PointId;
use tracing::trace;

fn is_negative(value: f64) -> bool {
    value < 0.0
}

impl<const D: usize> NarrowBandField<D> {
    /// Grow the band to `width` layers.
    ///
    /// One layer is added per cycle. A new point outside the material takes
    /// `min(neighbour + 1)` over its defined face neighbours, a point inside
    /// takes `max(neighbour - 1)`; the chosen neighbour is its data source.
    /// Does nothing if the band is already at least `width` wide.
    pub fn expand(&mut self, width: usize) {
        if width <= self.level_set_width() || self.is_empty() {
            return;
        }
        let total_limit = width as f64 * 0.5;
        let start = self.level_set_width();

        for cycle in 0..(width - start) {
            let limit = (start + cycle + 1) as f64 * 0.5;
            let candidates = self.band_candidates();
            let chunk = chunk_len(candidates.len());
            let segments: Vec<Vec<BandPoint>> = candidates
                .par_chunks(chunk)
                .map(|chunk| {
                    chunk
                        .iter()
                        .filter_map(|&lin| self.expanded_point(lin, total_limit, limit))
                        .collect()
                })
                .collect();
            self.rebuild_with(segments, start + cycle + 1, true);
        }
        trace!(width, points = self.number_of_points(), "expanded band");
    }

    fn expanded_point(&self, lin: usize, total_limit: f64, limit: f64) -> Option<BandPoint> {
        let center = self.value(lin);
        if center.abs() <= total_limit {
            return self.point_id(lin).map(|source| BandPoint {
                index: lin,
                value: center,
                source,
            });
        }

        let outside = center > -f64::EPSILON;
        let mut best: Option<(f64, PointId)> = None;
        for nb in self.grid().star_neighbors(lin) {
            let Some(id) = self.point_id(nb) else {
                continue;
            };
            let candidate = if outside {
                self.value(nb) + 1.0
            } else {
                self.value(nb) - 1.0
            };
            let better = match best {
                None => true,
                Some((b, _)) if outside => candidate < b,
                Some((b, _)) => candidate > b,
            };
            if better {
                best = Some((candidate, id));
            }
        }

        let (value, source) = best?;
        let within = if outside { value <= limit } else { value >= -limit };
        within.then_some(BandPoint {
            index: lin,
            value,
            source,
        })
    }

    /// Shrink the band to `width` layers.
    ///
    /// Points with `|value| > width / 2` become undefined. Does nothing if
    /// the band is already at most `width` wide.
    pub fn reduce(&mut self, width: usize) {
        if width >= self.level_set_width() {
            return;
        }
        let limit = width as f64 * 0.5;
        let segments: Vec<Vec<BandPoint>> = self
            .worker_segments()
            .into_par_iter()
            .map(|range| {
                range
                    .filter_map(|id| {
                        let index = self.point_index(PointId(id));
                        let value = self.value(index);
                        (value.abs() <= limit).then_some(BandPoint {
                            index,
                            value,
                            source: PointId(id),
                        })
                    })
                    .collect()
            })
            .collect();
        self.rebuild_with(segments, width, true);
        trace!(width, points = self.number_of_points(), "reduced band");
    }

    /// Keep only points with a face neighbour on the other side of zero.
    ///
    /// Points exactly at zero are always kept. The band width is reset to 1.
    pub fn prune(&mut self) {
        if self.is_empty() {
            return;
        }
        let segments: Vec<Vec<BandPoint>> = self
            .worker_segments()
            .into_par_iter()
            .map(|range| {
                range
                    .filter_map(|id| {
                        let index = self.point_index(PointId(id));
                        let value = self.value(index);
                        let keep = value == 0.0
                            || self
                                .grid()
                                .star_neighbors(index)
                                .iter()
                                .any(|&nb| is_negative(self.value(nb)) != is_negative(value));
                        keep.then_some(BandPoint {
                            index,
                            value,
                            source: PointId(id),
                        })
                    })
                    .collect()
            })
            .collect();
        self.rebuild_with(segments, 1, true);
    }
}


#[cfg(test)]
mod proptests {
    use crate::boundary::BoundaryCondition;
    use crate::field::NarrowBandField;
    use crate::grid::Grid;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn expand_then_reduce_restores_band(
            offset in -0.45f64..0.45,
            slope in -0.5f64..0.5,
            width in 2usize..7,
        ) {
            let grid = Grid::new([-10, -10], [10, 10], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
            let norm = (1.0 + slope * slope).sqrt();
            let original = NarrowBandField::from_fn(grid, 1, |x| (x[1] - slope * x[0] - offset) / norm);
            let mut f = original.clone();
            f.expand(width);
            prop_assert_eq!(f.level_set_width(), width);
            f.reduce(1);
            prop_assert_eq!(f.points(), original.points());
            for &lin in original.points() {
                prop_assert_eq!(f.value(lin), original.value(lin));
            }
        }
    }
}
