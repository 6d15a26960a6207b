//! Context-Aware Recommendation Example
//!
//! Trains TensorCoFi on a small user × item × time-of-day data set and ranks
//! items for a user in each context, next to the popularity baseline.
//!
//! Run with: RUST_LOG=debug cargo run --release --example context_aware

use tcofi_decomp::{
    ExecutionStrategy, PopularityPredictor, Predictor, TensorCoFi, TrainConfig,
};
use tcofi_sparse::{ObservationSet, TensorIndex};

const N_USERS: usize = 40;
const N_ITEMS: usize = 15;
const N_SLOTS: usize = 3;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== TensorCoFi Context-Aware Example ===\n");

    let obs = build_observations()?;
    let cards = vec![N_USERS, N_ITEMS, N_SLOTS];
    println!("Observations: {}", obs.len());

    let index = TensorIndex::build(&obs, &cards)?;
    println!("Item occurrence counts: {:?}\n", index.occurrence_counts(1));

    let config = TrainConfig::default()
        .with_rank(8)
        .with_iterations(10)
        .with_strategy(ExecutionStrategy::available_parallelism())
        .with_seed(17)
        .with_report_error(true);

    let mut tensor = TensorCoFi::<f64>::new(config, cards)?;
    let report = tensor.train(&obs)?;
    println!(
        "Trained in {:?} ({} sweeps)",
        report.elapsed, report.sweeps
    );
    for (i, err) in report.errors.iter().enumerate() {
        println!("  iteration {:2}: training error {:.4}", i, err);
    }

    let mut popularity = Predictor::from(PopularityPredictor::<f64>::new(N_ITEMS));
    popularity.train(&obs)?;
    let tensor = Predictor::from(tensor);

    let user = 0;
    for slot in 0..N_SLOTS {
        println!("\nTop items for user {} in slot {}:", user + 1, slot + 1);
        for predictor in [&tensor, &popularity] {
            let ranked = top_items(predictor, user, slot, 5)?;
            println!("  {:<12} {:?}", predictor.name(), ranked);
        }
    }

    Ok(())
}

/// Users prefer a band of items that shifts with the time slot
fn build_observations() -> anyhow::Result<ObservationSet<f64>> {
    let mut rows = Vec::new();
    let mut scores = Vec::new();

    for user in 0..N_USERS {
        for slot in 0..N_SLOTS {
            for k in 0..3 {
                let liked = (user % 5 + slot * 5 + k) % N_ITEMS;
                rows.push(vec![user + 1, liked + 1, slot + 1]);
                scores.push(4.0 + k as f64);

                let disliked = (liked + 7) % N_ITEMS;
                rows.push(vec![user + 1, disliked + 1, slot + 1]);
                scores.push(-2.0);
            }
        }
    }

    Ok(ObservationSet::new(rows, scores)?)
}

/// 1-based identifiers of the `n` best-scoring items
fn top_items(
    predictor: &Predictor<f64>,
    user: usize,
    slot: usize,
    n: usize,
) -> anyhow::Result<Vec<usize>> {
    let mut scored = (0..N_ITEMS)
        .map(|item| -> anyhow::Result<(usize, f64)> {
            Ok((item, predictor.decision(&[user, item, slot])?))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored.into_iter().take(n).map(|(item, _)| item + 1).collect())
}
