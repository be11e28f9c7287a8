//! Label-addressed auxiliary arrays attached to the defined points of a field.

use indexmap::IndexMap;
use strata_core::{PointId, Vec3};
use tracing::warn;

/// Scalar and vector arrays indexed by [`PointId`].
///
/// Labels keep insertion order, so iteration is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointData {
    scalars: IndexMap<String, Vec<f64>>,
    vectors: IndexMap<String, Vec<Vec3>>,
}

impl PointData {
    /// Empty point data.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if no arrays are attached.
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.vectors.is_empty()
    }

    /// Insert or replace a scalar array.
    pub fn insert_scalar_data(&mut self, label: impl Into<String>, data: Vec<f64>) {
        self.scalars.insert(label.into(), data);
    }

    /// Insert or replace a vector array.
    pub fn insert_vector_data(&mut self, label: impl Into<String>, data: Vec<Vec3>) {
        self.vectors.insert(label.into(), data);
    }

    /// Scalar array for `label`.
    pub fn scalar_data(&self, label: &str) -> Option<&[f64]> {
        self.scalars.get(label).map(Vec::as_slice)
    }

    /// Mutable scalar array for `label`.
    pub fn scalar_data_mut(&mut self, label: &str) -> Option<&mut Vec<f64>> {
        self.scalars.get_mut(label)
    }

    /// Vector array for `label`.
    pub fn vector_data(&self, label: &str) -> Option<&[Vec3]> {
        self.vectors.get(label).map(Vec::as_slice)
    }

    /// Remove and return the scalar array for `label`.
    pub fn erase_scalar_data(&mut self, label: &str) -> Option<Vec<f64>> {
        self.scalars.shift_remove(label)
    }

    /// Remove and return the vector array for `label`.
    pub fn erase_vector_data(&mut self, label: &str) -> Option<Vec<Vec3>> {
        self.vectors.shift_remove(label)
    }

    /// Labels of all scalar arrays, in insertion order.
    pub fn scalar_labels(&self) -> impl Iterator<Item = &str> {
        self.scalars.keys().map(String::as_str)
    }

    /// Labels of all vector arrays, in insertion order.
    pub fn vector_labels(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }

    /// Build new point data whose entry `i` is `self[sources[i]]`.
    pub fn translate(&self, sources: &[PointId]) -> PointData {
        self.translate_from_multi_data(&[sources.to_vec()])
    }

    /// Build new point data from per-segment source lists.
    ///
    /// The lists are concatenated in order; entry `i` of the result copies
    /// entry `sources[i]` of every array in `self`. Arrays too short to
    /// serve a source id are dropped with a warning.
    pub fn translate_from_multi_data(&self, sources: &[Vec<PointId>]) -> PointData {
        let total: usize = sources.iter().map(Vec::len).sum();
        let mut out = PointData::new();

        for (label, data) in &self.scalars {
            if let Some(translated) = gather(data, sources, total) {
                out.scalars.insert(label.clone(), translated);
            } else {
                warn!(label = %label, "scalar point data shorter than source ids, dropped");
            }
        }
        for (label, data) in &self.vectors {
            if let Some(translated) = gather(data, sources, total) {
                out.vectors.insert(label.clone(), translated);
            } else {
                warn!(label = %label, "vector point data shorter than source ids, dropped");
            }
        }
        out
    }

    /// Length of every array, keyed by label.
    pub(crate) fn lengths(&self) -> impl Iterator<Item = (&str, usize)> {
        self.scalars
            .iter()
            .map(|(l, d)| (l.as_str(), d.len()))
            .chain(self.vectors.iter().map(|(l, d)| (l.as_str(), d.len())))
    }
}

fn gather<T: Copy>(data: &[T], sources: &[Vec<PointId>], total: usize) -> Option<Vec<T>> {
    let mut out = Vec::with_capacity(total);
    for id in sources.iter().flatten() {
        out.push(*data.get(id.0)?);
    }
    Some(out)
}
