//! Criterion benchmarks for the division partitioner and pairing generator.
//!
//! Uses synthetic leagues (evenly spread priorities, targets in blocks of
//! the ideal size) so timings reflect the algorithms alone.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_ladder::pairing::{PairingConfig, PairingRunner};
use u_ladder::partition::{PartitionConfig, PartitionPlayer, PartitionSolver};
use uuid::Uuid;

// ===========================================================================
// Synthetic league
// ===========================================================================

fn synthetic_players(n: usize, seed: u64) -> Vec<PartitionPlayer> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let target = (i / 15) as u32 + 1;
            let priority = (n - i) as f64;
            if rng.random_bool(0.1) {
                PartitionPlayer::newcomer(Uuid::new_v4(), priority, target)
            } else {
                let relegated = rng.random_bool(0.15);
                PartitionPlayer::returning(Uuid::new_v4(), priority, target, relegated, 0)
            }
        })
        .collect()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    group.sample_size(10);

    for n in [30usize, 150, 600] {
        let players = synthetic_players(n, 42);
        let config = PartitionConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &(players, config), |b, (p, c)| {
            b.iter(|| {
                let result = PartitionSolver::solve(black_box(p), black_box(c));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_pairing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairing");
    group.sample_size(20);

    let complete = PairingConfig::default().without_round_cap();
    let capped = PairingConfig::default().with_round_cap(14, 16);
    for (label, n, config) in [
        ("complete_14", 14usize, complete),
        ("capped_20", 20, capped.clone()),
        ("subset_21", 21, capped),
    ] {
        group.bench_with_input(BenchmarkId::new(label, n), &(n, config), |b, (n, c)| {
            b.iter(|| {
                let schedule = PairingRunner::generate(black_box(*n), black_box(12_345), c);
                black_box(schedule)
            })
        });
    }
    group.finish();
}

fn bench_pairing_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairing_many");
    group.sample_size(10);

    let config = PairingConfig::default().with_round_cap(14, 16);
    let requests: Vec<(usize, u64)> = (0..40).map(|i| (12 + i % 8, i as u64)).collect();
    group.bench_function("divisions_40", |b| {
        b.iter(|| {
            let schedules = PairingRunner::generate_many(black_box(&requests), &config);
            black_box(schedules)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_partition, bench_pairing, bench_pairing_many);
criterion_main!(benches);
