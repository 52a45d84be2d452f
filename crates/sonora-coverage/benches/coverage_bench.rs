//! Criterion benchmarks for sonora-coverage
//!
//! Run with: cargo bench -p sonora-coverage
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sonora_coverage::{CoverageModel, SimulationConfig, simulate_coverage};

fn bench_simulate_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simulate_Coverage");

    for &grid in &[24usize, 48, 96] {
        let mut config = SimulationConfig::default();
        config.options.grid = grid;
        group.bench_with_input(BenchmarkId::from_parameter(grid), &config, |b, config| {
            b.iter(|| black_box(simulate_coverage(black_box(config))))
        });
    }

    group.finish();
}

fn bench_spl_point(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let model = CoverageModel::new(&config).unwrap();
    c.bench_function("spl_at", |b| {
        b.iter(|| black_box(model.spl_at(black_box(7.0), black_box(12.0))))
    });
}

criterion_group!(benches, bench_simulate_grid, bench_spl_point);

criterion_main!(benches);
