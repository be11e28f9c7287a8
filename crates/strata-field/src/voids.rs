//! Detection of material voids: regions not connected to the top surface.

use crate::field::NarrowBandField;
use strata_core::PointId;
use tracing::warn;

/// Point-data label written by [`NarrowBandField::mark_void_points`].
pub const VOID_POINT_LABEL: &str = "VoidPointMarkers";

// Union-find over point ids with path halving.
struct Components {
    parent: Vec<usize>,
}

impl Components {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

impl<const D: usize> NarrowBandField<D> {
    /// Label every defined point as void (1.0) or connected (0.0).
    ///
    /// Defined points are grouped into face-connected components of equal
    /// sign. The top component is the positive component holding the
    /// positive point with the greatest linear index, which on a grid with
    /// the last axis slowest is the highest one. A positive point is void
    /// unless it belongs to the top component; a negative component is void
    /// unless one of its points touches the top component.
    ///
    /// The labels are stored as scalar point data under
    /// [`VOID_POINT_LABEL`], replacing any previous labels.
    pub fn mark_void_points(&mut self) {
        let n = self.number_of_points();
        let mut components = Components::new(n);
        for id in 0..n {
            let lin = self.point_index(PointId(id));
            let negative = self.value(lin) < 0.0;
            for nb in self.grid().star_neighbors(lin) {
                if let Some(other) = self.point_id(nb) {
                    if (self.value(nb) < 0.0) == negative {
                        components.union(id, other.0);
                    }
                }
            }
        }

        let top = (0..n)
            .rev()
            .find(|&id| self.point_value(PointId(id)) >= 0.0)
            .map(|id| components.find(id));
        let Some(top) = top else {
            warn!("no positive points; void detection marks nothing");
            self.point_data_mut()
                .insert_scalar_data(VOID_POINT_LABEL, vec![0.0; n]);
            return;
        };

        let mut negative_connected = vec![false; n];
        for id in 0..n {
            let lin = self.point_index(PointId(id));
            if self.value(lin) >= 0.0 {
                continue;
            }
            let touches_top = self
                .grid()
                .star_neighbors(lin)
                .into_iter()
                .filter_map(|nb| self.point_id(nb))
                .any(|other| components.find(other.0) == top);
            if touches_top {
                let root = components.find(id);
                negative_connected[root] = true;
            }
        }

        let markers: Vec<f64> = (0..n)
            .map(|id| {
                let root = components.find(id);
                let void = if self.point_value(PointId(id)) >= 0.0 {
                    root != top
                } else {
                    !negative_connected[root]
                };
                if void {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        self.point_data_mut()
            .insert_scalar_data(VOID_POINT_LABEL, markers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use crate::grid::Grid;

    fn grid() -> Grid<2> {
        Grid::new([-12, -12], [12, 12], 1.0, [BoundaryCondition::Infinite; 2]).unwrap()
    }

    fn marker_at(field: &NarrowBandField<2>, index: [i64; 2]) -> f64 {
        let id = field.point_id(field.grid().linear(index)).unwrap();
        field.point_data().scalar_data(VOID_POINT_LABEL).unwrap()[id.0]
    }

    #[test]
    fn plane_has_no_voids() {
        let mut f = NarrowBandField::from_fn(grid(), 2, |x| x[1] - 0.3);
        f.mark_void_points();
        let markers = f.point_data().scalar_data(VOID_POINT_LABEL).unwrap();
        assert_eq!(markers.len(), f.number_of_points());
        assert!(markers.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn buried_bubble_is_void() {
        // material below y = 6.3 with an empty bubble of radius 3.2 at the origin
        let mut f = NarrowBandField::from_fn(grid(), 2, |x| {
            let slab = x[1] - 6.3;
            let bubble = 3.2 - (x[0] * x[0] + x[1] * x[1]).sqrt();
            slab.max(bubble)
        });
        f.mark_void_points();
        // surface of the slab
        assert_eq!(marker_at(&f, [0, 6]), 0.0);
        assert_eq!(marker_at(&f, [0, 7]), 0.0);
        // inside of the bubble and the material shell around it
        assert_eq!(marker_at(&f, [0, 3]), 1.0);
        assert_eq!(marker_at(&f, [0, 4]), 1.0);
    }

    #[test]
    fn all_negative_marks_nothing() {
        let mut f = NarrowBandField::from_fn(grid(), 40, |_| -1.0);
        f.mark_void_points();
        let markers = f.point_data().scalar_data(VOID_POINT_LABEL).unwrap();
        assert!(markers.iter().all(|&m| m == 0.0));
    }
}
