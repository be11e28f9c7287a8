//! Benchmark profiles for the Strata advection engine.
//!
//! Provides pre-built material stacks for benchmarks:
//!
//! - [`trench_profile`]: 2D substrate under a mask with an open trench
//! - [`sphere_profile`]: 3D sphere on a cubic grid, for single-layer sweeps

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use strata_core::{SpatialSchemeKind, VelocityField};
use strata_engine::AdvectionEngine;
use strata_field::{BooleanOp, NarrowBandField};
use strata_test_utils::{aabb, grid, plane, sphere, MaterialSelectiveVelocity};

/// Build a trench etch: a substrate whose top is at `y = 0`, covered by a
/// 4-cell mask with a trench of half-width `extent / 4` cut through it.
///
/// The mask is inert and the substrate etches at unit speed.
pub fn trench_profile(extent: i64, kind: SpatialSchemeKind) -> AdvectionEngine<2> {
    let g = grid::<2>(extent, 1.0);
    let half = (extent / 4) as f64 + 0.5;
    let substrate = plane(g.clone(), [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 2);
    let mut mask = aabb(g.clone(), [-1e6, -0.5, 0.0], [1e6, 4.3, 0.0], 2);
    let trench = aabb(g, [-half, -1.0, 0.0], [half, 5.0, 0.0], 2);
    mask.boolean_op(&trench, BooleanOp::RelativeComplement)
        .expect("profile fields share a grid");

    let mut top = substrate;
    top.boolean_op(&mask, BooleanOp::Union)
        .expect("profile fields share a grid");

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(mask);
    engine.insert_level_set(top);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, -1.0])));
    engine.set_spatial_scheme(kind);
    engine
}

/// Build a single sphere of radius `extent / 2` on a `[-extent, extent]^3`
/// grid, advected by `velocity`.
pub fn sphere_profile(
    extent: i64,
    velocity: Arc<dyn VelocityField>,
    kind: SpatialSchemeKind,
) -> AdvectionEngine<3> {
    let field: NarrowBandField<3> = sphere(grid(extent, 1.0), [0.0; 3], extent as f64 * 0.5 + 0.3, 2);
    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(field);
    engine.set_velocity_field(velocity);
    engine.set_spatial_scheme(kind);
    engine
}
