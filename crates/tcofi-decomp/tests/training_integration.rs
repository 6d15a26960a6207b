//! End-to-end tests for tensor ALS training
//!
//! Covers the observable guarantees of a training run: initialization,
//! determinism, agreement between execution strategies, the decision
//! function, bounds checking and error propagation out of the sweep.

use scirs2_core::ndarray_ext::{array, Array1, Array2};
use tcofi_decomp::{
    EntrySolver, ExecutionStrategy, FactorStore, Scheduler, TensorCoFi, TrainConfig,
    TrainingError,
};
use tcofi_kernels::{gram_matrix, KernelError};
use tcofi_sparse::{ObservationError, ObservationSet, TensorIndex};

const SEED: u64 = 2024;

fn scenario_observations() -> ObservationSet<f64> {
    ObservationSet::new(
        vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![3, 2]],
        vec![5.0, 1.0, 3.0, 4.0],
    )
    .unwrap()
}

fn scenario_config() -> TrainConfig {
    TrainConfig::default()
        .with_rank(2)
        .with_iterations(1)
        .with_lambda(0.1)
        .with_confidence(1.0)
        .with_seed(SEED)
}

/// Context-aware data set: 30 users, 12 items, 3 time slots
fn synthetic_observations() -> ObservationSet<f64> {
    let mut rows = Vec::new();
    let mut scores = Vec::new();
    for u in 0..30usize {
        for j in 0..4usize {
            let item = (u * 5 + j * 7) % 12;
            let slot = (u + j) % 3;
            rows.push(vec![u + 1, item + 1, slot + 1]);
            scores.push(((u * 3 + j) as f64 * 0.7).cos() * 5.0);
        }
    }
    ObservationSet::new(rows, scores).unwrap()
}

fn solve_2x2(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let det = a[[0, 0]] * a[[1, 1]] - a[[0, 1]] * a[[1, 0]];
    array![
        (b[0] * a[[1, 1]] - a[[0, 1]] * b[1]) / det,
        (a[[0, 0]] * b[1] - a[[1, 0]] * b[0]) / det,
    ]
}

#[test]
fn test_end_to_end_scenario() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut model = TensorCoFi::<f64>::new(scenario_config(), vec![3, 2])?;
    model.train(&scenario_observations())?;

    let factors = model.export_model()?;
    assert_eq!(factors.len(), 2);
    assert_eq!(factors[0].dim(), (2, 3));
    assert_eq!(factors[1].dim(), (2, 2));
    assert!(factors
        .iter()
        .all(|f| f.iter().all(|x| x.is_finite())));

    // User 2 only rated item 1 (score 3), so its column is a function of the
    // initial item factors alone.
    let initial = FactorStore::<f64>::random(2, &[3, 2], Some(SEED));
    let items = initial.factor(1);
    let t = items.column(0).to_owned();
    let w = 1.0 + 4.0f64.ln();

    let mut a = gram_matrix(&items.view());
    for i in 0..2 {
        for j in 0..2 {
            a[[i, j]] += (w - 1.0) * t[i] * t[j];
        }
        a[[i, i]] += 0.1 / 3.0;
    }
    let b = &t * w;
    let expected = solve_2x2(&a, &b);

    let user2 = factors[0].column(1);
    for i in 0..2 {
        assert!(
            (user2[i] - expected[i]).abs() < 1e-9,
            "component {}: {} vs {}",
            i,
            user2[i],
            expected[i]
        );
    }

    Ok(())
}

#[test]
fn test_zero_iterations_keep_initialization() {
    let config = scenario_config().with_iterations(0);
    let mut model = TensorCoFi::<f64>::new(config, vec![3, 2]).unwrap();
    model.train(&scenario_observations()).unwrap();

    let initial = FactorStore::<f64>::random(2, &[3, 2], Some(SEED));
    assert_eq!(model.factors().unwrap(), initial.factors());
    assert_eq!(model.report().map(|r| r.sweeps), Some(0));
}

#[test]
fn test_observed_columns_change() {
    let obs = synthetic_observations();
    let cards = vec![30, 12, 3];
    let config = TrainConfig::default().with_rank(4).with_iterations(1).with_seed(SEED);

    let mut model = TensorCoFi::<f64>::new(config, cards.clone()).unwrap();
    model.train(&obs).unwrap();

    let initial = FactorStore::<f64>::random(4, &cards, Some(SEED));
    let index = TensorIndex::build(&obs, &cards).unwrap();
    let trained = model.factors().unwrap();

    for (dim, &card) in cards.iter().enumerate() {
        for entry in 0..card {
            if index.rows(dim, entry).is_empty() {
                continue;
            }
            assert_ne!(
                trained[dim].column(entry),
                initial.factor(dim).column(entry),
                "dimension {} entry {} was not recomputed",
                dim,
                entry
            );
        }
    }
}

#[test]
fn test_unobserved_entries_become_zero() {
    // Item 3 never occurs
    let obs = ObservationSet::new(vec![vec![1, 1], vec![2, 2]], vec![1.0, 2.0]).unwrap();
    let mut model = TensorCoFi::<f64>::new(scenario_config(), vec![2, 3]).unwrap();
    model.train(&obs).unwrap();

    assert_eq!(model.occurrence_counts(1), Some(&[1, 1, 0][..]));
    let items = &model.factors().unwrap()[1];
    assert!(items.column(2).iter().all(|&x| x == 0.0));
}

#[test]
fn test_same_seed_is_bit_identical() {
    let obs = synthetic_observations();
    let config = TrainConfig::default().with_rank(5).with_iterations(3).with_seed(SEED);

    let mut first = TensorCoFi::<f64>::new(config.clone(), vec![30, 12, 3]).unwrap();
    let mut second = TensorCoFi::<f64>::new(config, vec![30, 12, 3]).unwrap();
    first.train(&obs).unwrap();
    second.train(&obs).unwrap();

    assert_eq!(first.factors().unwrap(), second.factors().unwrap());
}

#[test]
fn test_sequential_matches_pool_of_four() {
    let obs = synthetic_observations();
    let config = TrainConfig::default()
        .with_rank(6)
        .with_iterations(4)
        .with_seed(SEED);

    let mut sequential = TensorCoFi::<f64>::new(config.clone(), vec![30, 12, 3]).unwrap();
    sequential.train(&obs).unwrap();

    let mut pooled = TensorCoFi::<f64>::new(
        config.with_strategy(ExecutionStrategy::Parallel { workers: 4 }),
        vec![30, 12, 3],
    )
    .unwrap();
    pooled.train(&obs).unwrap();

    for (a, b) in sequential
        .factors()
        .unwrap()
        .iter()
        .zip(pooled.factors().unwrap())
    {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5);
        }
    }
}

#[test]
fn test_two_mode_decision_is_inner_product() {
    let users = array![[0.5, -1.0, 2.0], [1.5, 0.25, 0.0]];
    let items = array![[2.0, 1.0], [-0.5, 4.0]];
    let model =
        TensorCoFi::from_factors(TrainConfig::default().with_rank(2), vec![users.clone(), items.clone()])
            .unwrap();

    for u in 0..3 {
        for i in 0..2 {
            let expected: f64 = (0..2).map(|r| users[[r, u]] * items[[r, i]]).sum();
            let got = model.decision(&[u, i]).unwrap();
            assert!((got - expected).abs() < 1e-12);
            assert_eq!(got, model.decision_one_based(&[u + 1, i + 1]).unwrap());
        }
    }
}

#[test]
fn test_cardinality_plus_one_fails_before_training() {
    let obs = ObservationSet::new(vec![vec![1, 1], vec![4, 2]], vec![1.0, 1.0]).unwrap();
    let mut model = TensorCoFi::<f64>::new(scenario_config(), vec![3, 2]).unwrap();

    let err = model.train(&obs).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Observations(ObservationError::DimensionBounds {
            dimension: 0,
            row: 1,
            value: 4,
            cardinality: 3,
        })
    ));
    assert!(model.occurrence_counts(0).is_none());
}

#[test]
fn test_misshaped_factor_is_rejected_before_sweep() {
    let obs = scenario_observations();
    let index = TensorIndex::build(&obs, &[3, 2]).unwrap();

    // Item matrix too narrow for the indexed coordinates
    let items = Array2::<f64>::ones((2, 1));
    let base = Array2::<f64>::eye(2);
    let err = EntrySolver::new(
        &index,
        obs.scores(),
        vec![(1, items.view())],
        &base,
        0,
        0,
        0.1,
        1.0,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Kernel(KernelError::DimensionMismatch { .. })
    ));

    let items = Array2::<f64>::ones((2, 2));
    let solver = EntrySolver::new(
        &index,
        obs.scores(),
        vec![(1, items.view())],
        &base,
        0,
        0,
        0.1,
        1.0,
    )
    .unwrap();
    let mut users = Array2::<f64>::zeros((2, 2));
    let err = Scheduler::new(ExecutionStrategy::Sequential)
        .unwrap()
        .sweep(&solver, users.view_mut())
        .unwrap_err();
    assert!(matches!(err, TrainingError::Kernel(_)));
}

#[test]
fn test_singular_solve_aborts_training() {
    // λ = 0 and a single item leave the rank-3 user systems singular
    let obs = ObservationSet::new(vec![vec![1, 1], vec![2, 1]], vec![2.0, 1.0]).unwrap();

    for strategy in [
        ExecutionStrategy::Sequential,
        ExecutionStrategy::Parallel { workers: 4 },
    ] {
        for seed in 0..20 {
            let config = TrainConfig::default()
                .with_rank(3)
                .with_iterations(2)
                .with_lambda(0.0)
                .with_confidence(1.0)
                .with_strategy(strategy)
                .with_seed(seed);
            let mut model = TensorCoFi::<f64>::new(config, vec![3, 1]).unwrap();

            let err = model.train(&obs).unwrap_err();
            assert!(
                matches!(
                    err,
                    TrainingError::Solve {
                        dimension: 0,
                        iteration: 0,
                        ..
                    }
                ),
                "strategy {:?}, seed {}: {}",
                strategy,
                seed,
                err
            );
            assert!(!model.is_trained());
            assert!(matches!(model.factors(), Err(TrainingError::NotTrained)));
            assert!(model.report().is_none());
        }
    }
}
