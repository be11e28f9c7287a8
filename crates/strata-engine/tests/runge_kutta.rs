//! Integration test: Runge-Kutta stage callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strata_core::TemporalSchemeKind;
use strata_engine::AdvectionEngine;
use strata_test_utils::{grid, sphere, ConstantVelocity};

fn count_callbacks(temporal: TemporalSchemeKind, reply: bool) -> (usize, AdvectionEngine<2>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut engine = AdvectionEngine::new();
    engine.insert_level_set(sphere(grid(8, 1.0), [0.0; 3], 4.2, 2));
    engine.set_velocity_field(Arc::new(ConstantVelocity::scalar(1.0)));
    engine.set_temporal_scheme(temporal);
    engine.set_velocity_update_callback(move |top| {
        assert!(!top.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
        reply
    });
    engine.set_single_step(true);
    engine.set_advection_time(10.0);
    engine.apply().unwrap();
    (calls.load(Ordering::SeqCst), engine)
}

#[test]
fn callback_runs_between_stages() {
    assert_eq!(count_callbacks(TemporalSchemeKind::ForwardEuler, true).0, 0);
    assert_eq!(count_callbacks(TemporalSchemeKind::RungeKutta2, true).0, 1);
    assert_eq!(count_callbacks(TemporalSchemeKind::RungeKutta3, true).0, 2);
}

#[test]
fn refusing_callback_does_not_abort_the_step() {
    let (calls, engine) = count_callbacks(TemporalSchemeKind::RungeKutta3, false);
    assert_eq!(calls, 2);
    assert_eq!(engine.number_of_time_steps(), 1);
    assert!(engine.advected_time() > 0.0);
}

#[test]
fn runge_kutta_step_matches_euler_length() {
    let (_, euler) = count_callbacks(TemporalSchemeKind::ForwardEuler, true);
    let (_, rk3) = count_callbacks(TemporalSchemeKind::RungeKutta3, true);
    assert_eq!(euler.advected_time(), rk3.advected_time());
}
