//! The narrow-band field container.

use crate::error::FieldError;
use crate::grid::Grid;
use crate::point_data::PointData;
use std::ops::Range;
use strata_core::{PointId, Vec3};

/// Sentinel read for undefined cells outside the material.
pub const POS_VALUE: f64 = f64::MAX;

/// Sentinel read for undefined cells inside the material.
pub const NEG_VALUE: f64 = f64::MIN;

const NO_POINT: usize = usize::MAX;

/// One defined point of a field under construction.
///
/// `source` names the point of the *previous* field whose auxiliary data
/// the new point inherits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandPoint {
    /// Linear grid position.
    pub index: usize,
    /// Level-set value in grid units.
    pub value: f64,
    /// Point of the previous field providing point data.
    pub source: PointId,
}

/// A sparse scalar field defined only near its zero crossing.
///
/// Values are stored in grid units (world distance divided by the grid
/// spacing), negative inside. Cells that are not part of the band hold
/// [`POS_VALUE`] or [`NEG_VALUE`] so that their side of the surface is
/// still known.
///
/// Defined points are kept in increasing linear order; a point's
/// [`PointId`] is its position in that order.
///
/// # Examples
///
/// ```
/// use strata_field::{BoundaryCondition, Grid, NarrowBandField};
///
/// let grid = Grid::<2>::new([-5, -5], [5, 5], 1.0, [BoundaryCondition::Infinite; 2]).unwrap();
/// // Half-space y < 0.25 is material.
/// let field = NarrowBandField::from_fn(grid, 2, |x| x[1] - 0.25);
/// assert_eq!(field.number_of_points(), 2 * 11);
/// assert!(field.value_at([0, 0]) < 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct NarrowBandField<const D: usize> {
    grid: Grid<D>,
    values: Vec<f64>,
    ids: Vec<usize>,
    points: Vec<usize>,
    width: usize,
    point_data: PointData,
}

/// Sentinel carrying the side of `value`.
pub(crate) fn sentinel_for(value: f64) -> f64 {
    if value < 0.0 {
        NEG_VALUE
    } else {
        POS_VALUE
    }
}

/// Whether `value` is one of the undefined sentinels.
pub fn is_sentinel(value: f64) -> bool {
    value == POS_VALUE || value == NEG_VALUE
}

/// Chunk length that splits `len` items over the worker pool.
pub(crate) fn chunk_len(len: usize) -> usize {
    len.div_ceil(rayon::current_num_threads().max(1)).max(1)
}

impl<const D: usize> NarrowBandField<D> {
    /// An empty field: every cell is outside the material.
    pub fn new(grid: Grid<D>) -> Self {
        let cells = grid.cell_count();
        Self {
            grid,
            values: vec![POS_VALUE; cells],
            ids: vec![NO_POINT; cells],
            points: Vec::new(),
            width: 1,
            point_data: PointData::new(),
        }
    }

    /// Sample a signed distance function on every grid cell.
    ///
    /// `sdf` receives world coordinates and returns a world-unit signed
    /// distance (negative inside). Cells within `width / 2` grid spacings
    /// of the surface become defined points.
    pub fn from_fn(grid: Grid<D>, width: usize, sdf: impl Fn(Vec3) -> f64) -> Self {
        let limit = width as f64 * 0.5;
        let delta = grid.delta();
        let cells = grid.cell_count();
        let mut values = Vec::with_capacity(cells);
        let mut ids = vec![NO_POINT; cells];
        let mut points = Vec::new();
        for lin in 0..cells {
            let v = sdf(grid.coordinate(lin)) / delta;
            if v.abs() <= limit {
                ids[lin] = points.len();
                points.push(lin);
                values.push(v);
            } else {
                values.push(sentinel_for(v));
            }
        }
        Self {
            grid,
            values,
            ids,
            points,
            width,
            point_data: PointData::new(),
        }
    }

    /// Grid this field lives on.
    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    /// Narrow-band width recorded at the last finalize.
    pub fn level_set_width(&self) -> usize {
        self.width
    }

    /// Record the band width without touching any value.
    pub fn finalize(&mut self, width: usize) {
        self.width = width;
    }

    /// Number of defined points.
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// `true` if no point is defined.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Linear positions of the defined points, in [`PointId`] order.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Dense value array, sentinels included.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Linear position of point `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a point of this field.
    pub fn point_index(&self, id: PointId) -> usize {
        self.points[id.0]
    }

    /// Point id of the cell at `lin`, if it is defined.
    pub fn point_id(&self, lin: usize) -> Option<PointId> {
        match self.ids.get(lin) {
            Some(&id) if id != NO_POINT => Some(PointId(id)),
            _ => None,
        }
    }

    /// Whether the cell at `lin` is a defined point.
    pub fn is_defined(&self, lin: usize) -> bool {
        self.point_id(lin).is_some()
    }

    /// Value of the cell at `lin` (sentinel if undefined).
    pub fn value(&self, lin: usize) -> f64 {
        self.values[lin]
    }

    /// Value at a grid index, resolved through the boundary conditions.
    pub fn value_at(&self, index: [i64; D]) -> f64 {
        self.values[self.grid.linear(index)]
    }

    /// Value at `offset` from the cell at `lin`.
    pub fn neighbor_value(&self, lin: usize, offset: [i64; D]) -> f64 {
        self.values[self.grid.offset(lin, offset)]
    }

    /// Value of point `id`.
    pub fn point_value(&self, id: PointId) -> f64 {
        self.values[self.points[id.0]]
    }

    /// Overwrite the value of point `id` in place.
    ///
    /// The point set is unchanged; callers restore a canonical band later
    /// with [`rebuild_with`](Self::rebuild_with).
    pub fn set_point_value(&mut self, id: PointId, value: f64) {
        let lin = self.points[id.0];
        self.values[lin] = value;
    }

    /// Auxiliary per-point arrays.
    pub fn point_data(&self) -> &PointData {
        &self.point_data
    }

    /// Mutable auxiliary per-point arrays.
    pub fn point_data_mut(&mut self) -> &mut PointData {
        &mut self.point_data
    }

    /// Replace the auxiliary arrays, checking every array has one entry per
    /// defined point.
    pub fn set_point_data(&mut self, data: PointData) -> Result<(), FieldError> {
        let expected = self.points.len();
        if let Some((label, len)) = data.lengths().find(|&(_, len)| len != expected) {
            return Err(FieldError::PointDataLength {
                label: label.to_string(),
                len,
                expected,
            });
        }
        self.point_data = data;
        Ok(())
    }

    /// Split the point ids into at most `n` contiguous, near-equal ranges.
    ///
    /// Always returns at least one range (empty for an empty field).
    pub fn segments(&self, n: usize) -> Vec<Range<usize>> {
        let len = self.points.len();
        let n = n.clamp(1, len.max(1));
        let base = len / n;
        let extra = len % n;
        let mut out = Vec::with_capacity(n);
        let mut start = 0;
        for s in 0..n {
            let end = start + base + usize::from(s < extra);
            out.push(start..end);
            start = end;
        }
        out
    }

    /// Segmentation used for parallel passes: one range per worker.
    pub fn worker_segments(&self) -> Vec<Range<usize>> {
        self.segments(rayon::current_num_threads())
    }

    /// Defined points plus their face neighbours, sorted and deduplicated.
    ///
    /// These are the only cells whose state can change when the band is
    /// rebuilt one layer at a time.
    pub fn band_candidates(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.points.len() * (2 * D + 1));
        for &lin in &self.points {
            out.push(lin);
            out.extend(self.grid.star_neighbors(lin));
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Replace the point set with `segments`, concatenated in order.
    ///
    /// Cells not listed become undefined, keeping the side of their current
    /// value. With `translate_data` the point data follows each new point's
    /// `source`; otherwise it is cleared. Indices must be strictly
    /// increasing across the concatenation.
    pub fn rebuild_with(&mut self, segments: Vec<Vec<BandPoint>>, width: usize, translate_data: bool) {
        let fill = self.values.iter().map(|&v| sentinel_for(v)).collect();
        self.assemble(fill, segments, width, translate_data);
    }

    pub(crate) fn negate_values(&mut self) {
        self.values.iter_mut().for_each(|v| *v = -*v);
    }

    /// Copy every part of `other` into `self`.
    pub fn deep_copy(&mut self, other: &Self) {
        self.clone_from(other);
    }

    pub(crate) fn assemble(
        &mut self,
        mut values: Vec<f64>,
        segments: Vec<Vec<BandPoint>>,
        width: usize,
        translate_data: bool,
    ) {
        let total: usize = segments.iter().map(Vec::len).sum();
        let mut ids = vec![NO_POINT; values.len()];
        let mut points = Vec::with_capacity(total);
        let mut sources = Vec::with_capacity(segments.len());
        for segment in segments {
            let mut segment_sources = Vec::with_capacity(segment.len());
            for p in segment {
                debug_assert!(points.last().is_none_or(|&last| last < p.index));
                values[p.index] = p.value;
                ids[p.index] = points.len();
                points.push(p.index);
                segment_sources.push(p.source);
            }
            sources.push(segment_sources);
        }
        self.point_data = if translate_data {
            self.point_data.translate_from_multi_data(&sources)
        } else {
            PointData::new()
        };
        self.values = values;
        self.ids = ids;
        self.points = points;
        self.width = width;
    }
}
