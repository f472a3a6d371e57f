//! Criterion benchmarks for the fulfillment pipeline.
//!
//! Uses seeded random instances to measure model construction separately
//! from the end-to-end solve.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_fulfill::fulfillment::{
    fulfill, AssignmentUniverse, FulfillmentConfig, InstanceConfig, ModelBuilder,
};

fn instance(items: usize) -> InstanceConfig {
    InstanceConfig::default()
        .with_items(items)
        .with_dcs(3)
        .with_carriers_per_dc(2)
        .with_max_quantity(3)
        .with_seed(42)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_model");

    for &items in &[10, 50, 200] {
        let input = instance(items).generate();
        group.bench_with_input(BenchmarkId::from_parameter(items), &input, |b, input| {
            b.iter(|| {
                let universe = AssignmentUniverse::generate(black_box(input));
                black_box(ModelBuilder::new().build(&universe))
            })
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("fulfill");
    group.sample_size(10);

    let config = FulfillmentConfig::default();
    for &items in &[2, 4, 6] {
        let input = instance(items).generate();
        group.bench_with_input(BenchmarkId::from_parameter(items), &input, |b, input| {
            b.iter(|| black_box(fulfill(black_box(input), &config)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_solve);
criterion_main!(benches);
