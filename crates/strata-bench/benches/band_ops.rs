//! Criterion micro-benchmarks for narrow-band operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_field::BooleanOp;
use strata_test_utils::{grid, sphere};

/// Benchmark: expand a 3D sphere from width 2 to width 7.
fn bench_expand_sphere(c: &mut Criterion) {
    let field = sphere::<3>(grid(24, 1.0), [0.0; 3], 12.3, 2);

    c.bench_function("expand_sphere_2_to_7", |b| {
        b.iter(|| {
            let mut f = field.clone();
            f.expand(7);
            black_box(f.number_of_points());
        });
    });
}

/// Benchmark: intersect two overlapping 3D spheres.
fn bench_intersect_spheres(c: &mut Criterion) {
    let a = sphere::<3>(grid(24, 1.0), [-3.0, 0.0, 0.0], 12.3, 2);
    let b_field = sphere::<3>(grid(24, 1.0), [3.0, 0.0, 0.0], 12.3, 2);

    c.bench_function("intersect_spheres_49", |b| {
        b.iter(|| {
            let mut f = a.clone();
            f.boolean_op(&b_field, BooleanOp::Intersect).unwrap();
            black_box(f.number_of_points());
        });
    });
}

/// Benchmark: label voids on a hollow sphere.
fn bench_mark_voids(c: &mut Criterion) {
    let outer = sphere::<3>(grid(24, 1.0), [0.0; 3], 12.3, 2);
    let inner = sphere::<3>(grid(24, 1.0), [0.0; 3], 5.3, 2);
    let mut shell = outer;
    shell.boolean_op(&inner, BooleanOp::RelativeComplement).unwrap();

    c.bench_function("mark_voids_shell_49", |b| {
        b.iter(|| {
            let mut f = shell.clone();
            f.mark_void_points();
            black_box(f.number_of_points());
        });
    });
}

/// Benchmark: one scheme sweep over a prepared sphere.
fn bench_rate_sweep(c: &mut Criterion) {
    use strata_core::SpatialSchemeKind;
    use strata_engine::{compute_rates, AdvectConfig};
    use strata_test_utils::ConstantVelocity;

    let mut field = sphere::<3>(grid(24, 1.0), [0.0; 3], 12.3, 2);
    let config = AdvectConfig {
        spatial_scheme: SpatialSchemeKind::EngquistOsher2,
        ..AdvectConfig::default()
    };
    strata_scheme::prepare(config.spatial_scheme, &mut field);
    let stack = vec![field];
    let velocity = ConstantVelocity::scalar(1.0);

    c.bench_function("rate_sweep_eo2_49", |b| {
        b.iter(|| {
            let table = compute_rates(&stack, &velocity, &config, f64::MAX);
            black_box(table.max_time_step());
        });
    });
}

criterion_group!(
    benches,
    bench_expand_sphere,
    bench_intersect_spheres,
    bench_mark_voids,
    bench_rate_sweep
);
criterion_main!(benches);
