//! Performance benchmarks for tensor ALS training
//!
//! Measures full training runs on synthetic context-aware data, comparing
//! the sequential sweep against pooled sweeps.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use tcofi_decomp::{ExecutionStrategy, TensorCoFi, TrainConfig};
use tcofi_sparse::ObservationSet;

/// Random observations over `cards`, `per_user` rows for every user
fn synthetic(cards: &[usize], per_user: usize, seed: u64) -> ObservationSet<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(cards[0] * per_user);
    let mut scores = Vec::with_capacity(cards[0] * per_user);

    for user in 1..=cards[0] {
        for _ in 0..per_user {
            let mut row = vec![user];
            for &card in &cards[1..] {
                row.push(rng.random_range(1..=card));
            }
            rows.push(row);
            scores.push(rng.random_range(-5.0..5.0));
        }
    }

    ObservationSet::new(rows, scores).expect("synthetic observations are well-formed")
}

fn bench_training_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensorcofi_train");
    group.sample_size(10);

    let cards = vec![2000, 500, 4];
    let obs = synthetic(&cards, 20, 42);

    for strategy in [
        ExecutionStrategy::Sequential,
        ExecutionStrategy::Parallel { workers: 2 },
        ExecutionStrategy::Parallel { workers: 4 },
    ] {
        let config = TrainConfig::default()
            .with_rank(20)
            .with_iterations(2)
            .with_strategy(strategy)
            .with_seed(7);

        group.throughput(Throughput::Elements(obs.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", strategy)),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut model = TensorCoFi::<f64>::new(config.clone(), cards.clone())
                        .expect("valid configuration");
                    model.train(black_box(&obs)).expect("training succeeds");
                    black_box(model)
                })
            },
        );
    }

    group.finish();
}

fn bench_rank_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensorcofi_rank");
    group.sample_size(10);

    let cards = vec![500, 200];
    let obs = synthetic(&cards, 10, 3);

    for &rank in &[5, 10, 20, 40] {
        let config = TrainConfig::default()
            .with_rank(rank)
            .with_iterations(1)
            .with_seed(1);

        group.bench_with_input(BenchmarkId::from_parameter(rank), &config, |b, config| {
            b.iter(|| {
                let mut model = TensorCoFi::<f64>::new(config.clone(), cards.clone())
                    .expect("valid configuration");
                model.train(black_box(&obs)).expect("training succeeds");
                black_box(model)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training_strategies, bench_rank_scaling);
criterion_main!(benches);
