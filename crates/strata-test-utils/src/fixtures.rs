//! Signed-distance geometry for test fields.

use strata_core::Vec3;
use strata_field::{BoundaryCondition, Grid, NarrowBandField};

/// A `[-extent, extent]^D` grid with spacing `delta` and infinite
/// boundaries on every axis.
pub fn grid<const D: usize>(extent: i64, delta: f64) -> Grid<D> {
    Grid::new([-extent; D], [extent; D], delta, [BoundaryCondition::Infinite; D])
        .expect("fixture grid bounds are valid")
}

/// Half-space below the plane through `origin` with outward `normal`.
pub fn plane<const D: usize>(grid: Grid<D>, origin: Vec3, normal: Vec3, width: usize) -> NarrowBandField<D> {
    let modulus = normal[..D].iter().map(|n| n * n).sum::<f64>().sqrt();
    NarrowBandField::from_fn(grid, width, move |x| {
        (0..D).map(|i| (x[i] - origin[i]) * normal[i]).sum::<f64>() / modulus
    })
}

/// Ball of `radius` around `center`.
pub fn sphere<const D: usize>(grid: Grid<D>, center: Vec3, radius: f64, width: usize) -> NarrowBandField<D> {
    NarrowBandField::from_fn(grid, width, move |x| {
        (0..D).map(|i| (x[i] - center[i]).powi(2)).sum::<f64>().sqrt() - radius
    })
}

/// Axis-aligned box spanning `min` to `max`.
pub fn aabb<const D: usize>(grid: Grid<D>, min: Vec3, max: Vec3, width: usize) -> NarrowBandField<D> {
    NarrowBandField::from_fn(grid, width, move |x| {
        let mut outside = 0.0;
        let mut inside = f64::MIN;
        for i in 0..D {
            let center = 0.5 * (min[i] + max[i]);
            let half = 0.5 * (max[i] - min[i]);
            let q = (x[i] - center).abs() - half;
            outside += q.max(0.0).powi(2);
            inside = inside.max(q);
        }
        outside.sqrt() + inside.min(0.0)
    })
}
