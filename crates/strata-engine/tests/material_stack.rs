//! Integration test: stacks of nested materials.
//!
//! Covers the lower-layer clipping after every step, interface snapping
//! when an etch front reaches the material below, and the containment
//! property under random velocities.

use std::sync::Arc;

use proptest::prelude::*;
use strata_core::SpatialSchemeKind;
use strata_engine::AdvectionEngine;
use strata_field::{BooleanOp, NarrowBandField};
use strata_test_utils::{aabb, grid, plane, MaterialSelectiveVelocity, NoisyVelocity};

/// Every cell inside `lower` is inside `upper`, and where both are
/// defined `lower` is never below `upper`.
fn assert_contained(lower: &NarrowBandField<2>, upper: &NarrowBandField<2>) {
    for lin in 0..lower.grid().cell_count() {
        let (l, u) = (lower.value(lin), upper.value(lin));
        if l < 0.0 {
            assert!(u < 0.0, "cell {lin}: lower {l} inside but upper {u} outside");
        }
        if lower.is_defined(lin) && upper.is_defined(lin) {
            assert!(l >= u - 1e-12, "cell {lin}: lower {l} below upper {u}");
        }
    }
}

// ── Nested boxes ─────────────────────────────────────────────────────

#[test]
fn etching_outer_box_leaves_inner_box_alone() {
    let g = grid(10, 1.0);
    let mut inner = aabb::<2>(g.clone(), [-2.5, -1.5, 0.0], [2.5, 1.5, 0.0], 2);
    inner.prune();
    let outer = aabb::<2>(g, [-6.3, -5.3, 0.0], [6.3, 5.3, 0.0], 2);
    let inner_before = inner.values().to_vec();

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(inner);
    engine.insert_level_set(outer);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, -1.0])));
    engine.set_time_step_ratio(0.4);
    engine.set_advection_time(1.2);
    engine.apply().unwrap();

    let stack = engine.level_sets();
    assert_eq!(stack[0].values(), inner_before.as_slice());
    assert_contained(&stack[0], &stack[1]);
    // the flat top face of the outer box has receded from 5.3 to 4.1
    let row = stack[1].value_at([0, 4]);
    assert!((row + 0.1).abs() < 1e-6, "row 4 holds {row}");
}

#[test]
fn growing_top_material_does_not_touch_lower_one() {
    let g = grid(10, 1.0);
    let mut inner = aabb::<2>(g.clone(), [-2.5, -1.5, 0.0], [2.5, 1.5, 0.0], 2);
    inner.prune();
    let outer = aabb::<2>(g, [-4.3, -3.3, 0.0], [4.3, 3.3, 0.0], 2);
    let inner_before = inner.values().to_vec();

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(inner);
    engine.insert_level_set(outer);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, 1.0])));
    engine.set_time_step_ratio(0.4);
    engine.set_advection_time(0.8);
    engine.apply().unwrap();

    let stack = engine.level_sets();
    assert_eq!(stack[0].values(), inner_before.as_slice());
    assert_contained(&stack[0], &stack[1]);
}

// ── Interface snapping ───────────────────────────────────────────────

#[test]
fn etch_front_stops_at_material_below() {
    // film surface 0.2 cells above the substrate surface
    let g = grid(8, 1.0);
    let substrate = plane::<2>(g.clone(), [0.0, 0.05, 0.0], [0.0, 1.0, 0.0], 2);
    let film = plane::<2>(g, [0.0, 0.25, 0.0], [0.0, 1.0, 0.0], 2);

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(substrate);
    engine.insert_level_set(film);
    // the film etches, the substrate is inert
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, -1.0])));
    engine.set_time_step_ratio(0.4);
    engine.set_advection_time(1.0);
    engine.apply().unwrap();

    let stack = engine.level_sets();
    assert_contained(&stack[0], &stack[1]);
    // the film moved only the 0.2 cells down to the substrate
    assert!((stack[1].value_at([0, 0]) + 0.05).abs() < 1e-12);
    assert!((stack[0].value_at([0, 0]) + 0.05).abs() < 1e-12);
    assert_eq!(engine.number_of_time_steps(), 1);
}

#[test]
fn etch_cuts_through_thin_film_into_substrate() {
    let g = grid(8, 1.0);
    let substrate = plane::<2>(g.clone(), [0.0, 0.15, 0.0], [0.0, 1.0, 0.0], 2);
    let film = plane::<2>(g, [0.0, 0.25, 0.0], [0.0, 1.0, 0.0], 2);

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(substrate);
    engine.insert_level_set(film);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![-0.5, -1.0])));
    engine.set_time_step_ratio(0.4);
    engine.apply().unwrap();

    // 0.1 cells of film at rate 1, then 0.3 cells of substrate at rate 0.5
    assert!((engine.advected_time() - 0.7).abs() < 1e-9);
    let stack = engine.level_sets();
    assert!((stack[1].value_at([0, 0]) - 0.15).abs() < 1e-9);
    // the substrate is clipped to the film
    assert!((stack[0].value_at([0, 0]) - 0.15).abs() < 1e-9);
    assert_contained(&stack[0], &stack[1]);
}

#[test]
fn adaptive_stepping_approaches_interface_gradually() {
    let g = grid(8, 1.0);
    let substrate = plane::<2>(g.clone(), [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 2);
    let film = plane::<2>(g, [0.0, 0.25, 0.0], [0.0, 1.0, 0.0], 2);

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(substrate);
    engine.insert_level_set(film);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, -1.0])));
    engine.set_time_step_ratio(0.4);
    engine.set_adaptive_time_stepping(true, 20);
    engine.apply().unwrap();

    assert!((engine.advected_time() - 0.02).abs() < 1e-12);
    let stack = engine.level_sets();
    assert!((stack[1].value_at([0, 0]) + 0.23).abs() < 1e-12);
    assert_contained(&stack[0], &stack[1]);
}

// ── Stencil scheme skips clipping ────────────────────────────────────

#[test]
fn stencil_scheme_leaves_lower_layers_unclipped() {
    let g = grid(10, 1.0);
    let substrate = plane::<2>(g.clone(), [0.0, -0.3, 0.0], [0.0, 1.0, 0.0], 2);
    let film = plane::<2>(g, [0.0, 1.7, 0.0], [0.0, 1.0, 0.0], 2);
    let substrate_before = substrate.values().to_vec();

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(substrate);
    engine.insert_level_set(film);
    engine.set_velocity_field(Arc::new(MaterialSelectiveVelocity::new(vec![0.0, 1.0])));
    engine.set_spatial_scheme(SpatialSchemeKind::StencilLocalLaxFriedrichs1);
    engine.set_time_step_ratio(0.4);
    engine.apply().unwrap();

    assert_eq!(engine.level_sets()[0].values(), substrate_before.as_slice());
}

// ── Containment under random velocities ──────────────────────────────

fn random_stack_run(velocity: NoisyVelocity, kind: SpatialSchemeKind, gap: f64) {
    let g = grid(8, 1.0);
    let substrate = plane::<2>(g.clone(), [0.0, -gap, 0.0], [0.0, 1.0, 0.0], 2);
    let mut mid = plane::<2>(g.clone(), [0.0, 0.0, 0.0], [0.3, 1.0, 0.0], 2);
    let mut top = plane::<2>(g, [0.0, gap, 0.0], [0.0, 1.0, 0.0], 2);
    // keep the initial stack nested
    top.boolean_op(&mid, BooleanOp::Union).unwrap();
    mid.boolean_op(&substrate, BooleanOp::Union).unwrap();

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(substrate);
    engine.insert_level_set(mid);
    engine.insert_level_set(top);
    engine.set_velocity_field(Arc::new(velocity));
    engine.set_spatial_scheme(kind);
    engine.set_time_step_ratio(0.4);
    engine.set_advection_time(1.5);
    engine.apply().unwrap();

    let stack = engine.level_sets();
    let (top, lower) = stack.split_last().unwrap();
    for layer in lower {
        assert_contained(layer, top);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn stack_stays_nested(
        base in -1.0f64..1.0,
        amplitude in 0.0f64..0.5,
        seed in any::<u64>(),
        gap in 0.1f64..1.5,
        kind in prop::sample::select(vec![
            SpatialSchemeKind::EngquistOsher1,
            SpatialSchemeKind::EngquistOsher2,
            SpatialSchemeKind::LaxFriedrichs1,
            SpatialSchemeKind::LocalLocalLaxFriedrichs1,
        ]),
    ) {
        random_stack_run(NoisyVelocity::new(base, amplitude, seed), kind, gap);
    }
}
