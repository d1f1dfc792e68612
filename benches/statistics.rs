//! Statistics benchmarks
//!
//! Aggregation sorts every sample before summing; these benches keep an eye
//! on that cost as seed counts grow, and on the comparison over a full
//! alpha grid.
//!
//! Run with: cargo bench --bench statistics

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sweepstat::aggregate::{aggregate, mean_std};
use sweepstat::compare::compare;
use sweepstat::plan::config_key;
use sweepstat::record::RunResult;
use sweepstat::ExperimentConfiguration;

fn random_losses(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(1.5..4.0)).collect()
}

fn random_runs(rng: &mut StdRng, alpha: f64, n: usize) -> Vec<RunResult> {
    (0..n as u64)
        .map(|seed| {
            if rng.gen_bool(0.1) {
                RunResult::failed(alpha, seed, "bench", 3000, "injected")
            } else {
                let eval = rng.gen_range(1.5..4.0);
                RunResult::success(alpha, seed, "bench", 3000, eval, eval - 0.1, 60.0)
            }
        })
        .collect()
}

/// Benchmark order-independent mean/std
fn bench_mean_std(c: &mut Criterion) {
    let mut group = c.benchmark_group("mean_std");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [3, 30, 3_000] {
        let losses = random_losses(&mut rng, size);
        group.bench_with_input(BenchmarkId::new("sorted", size), &losses, |b, data| {
            b.iter(|| mean_std(black_box(data)));
        });
    }

    group.finish();
}

/// Benchmark per-configuration aggregation with mixed outcomes
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let mut rng = StdRng::seed_from_u64(123);
    let config = ExperimentConfiguration::new(0.5, "bench");

    for seeds in [3, 10, 100] {
        let runs = random_runs(&mut rng, 0.5, seeds);
        group.bench_with_input(BenchmarkId::new("seeds", seeds), &runs, |b, runs| {
            b.iter(|| aggregate(black_box(&config), black_box(runs)));
        });
    }

    group.finish();
}

/// Benchmark baseline comparison over an alpha grid
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    let mut rng = StdRng::seed_from_u64(456);

    for grid in [5, 21, 101] {
        let mut summaries = BTreeMap::new();
        for step in 0..grid {
            #[allow(clippy::cast_precision_loss)]
            let alpha = step as f64 / (grid - 1) as f64;
            let config = ExperimentConfiguration::new(alpha, "bench");
            let runs = random_runs(&mut rng, alpha, 5);
            if let Some(summary) = aggregate(&config, &runs) {
                summaries.insert(config_key(alpha), summary);
            }
        }
        group.bench_with_input(BenchmarkId::new("alphas", grid), &summaries, |b, summaries| {
            b.iter(|| compare(black_box(summaries)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mean_std, bench_aggregate, bench_compare);
criterion_main!(benches);
