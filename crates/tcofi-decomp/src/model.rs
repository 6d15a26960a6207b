//! TensorCoFi: context-aware tensor factorization trained by ALS
//!
//! The model holds one latent factor matrix per dimension (user, item and any
//! number of contextual dimensions). Training alternates over dimensions:
//! each sweep fixes every other matrix and recomputes all columns of one
//! matrix through independent per-entry least-squares solves.
//!
//! ```text
//! Initialized → IndexBuilt → Sweep{dimension, iteration}… → Done
//! ```
//!
//! The score of a tuple `(v₀, …, vₖ₋₁)` is the generalized inner product
//!
//! ```text
//! ŷ = Σᵣ Πᵢ F₍ᵢ₎[r, vᵢ]
//! ```
//!
//! # Examples
//!
//! ```
//! use tcofi_decomp::{TensorCoFi, TrainConfig};
//! use tcofi_sparse::ObservationSet;
//!
//! // user, item, time-of-day
//! let obs = ObservationSet::new(
//!     vec![vec![1, 1, 1], vec![1, 2, 2], vec![2, 1, 2], vec![3, 2, 1]],
//!     vec![5.0, 1.0, 3.0, 4.0],
//! ).unwrap();
//!
//! let config = TrainConfig::default().with_rank(2).with_iterations(3).with_seed(1);
//! let mut model = TensorCoFi::<f64>::new(config, vec![3, 2, 2]).unwrap();
//! model.train(&obs).unwrap();
//!
//! let score = model.decision_one_based(&[1, 1, 1]).unwrap();
//! assert!(score.is_finite());
//! ```

use crate::config::TrainConfig;
use crate::error::TrainingError;
use crate::factors::FactorStore;
use crate::scheduler::Scheduler;
use crate::solver::{preference, EntrySolver};
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tcofi_kernels::{gram_hadamard, tuple_inner_product, FactorScalar};
use tcofi_sparse::{ObservationError, ObservationSet, TensorIndex};

/// Lifecycle of a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Initialized,
    /// Index built, occurrence counts frozen
    IndexBuilt,
    Sweep { dimension: usize, iteration: usize },
    Done,
}

/// Cooperative cancellation flag checked between sweeps
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub iterations: usize,
    /// Number of dimension sweeps performed
    pub sweeps: usize,
    /// Training error after each iteration; empty unless requested
    pub errors: Vec<f64>,
    pub elapsed: Duration,
}

/// Context-aware tensor factorization model
#[derive(Debug, Clone)]
pub struct TensorCoFi<T> {
    config: TrainConfig,
    cardinalities: Vec<usize>,
    factors: Option<FactorStore<T>>,
    counts: Option<Vec<Vec<usize>>>,
    state: TrainingState,
    cancellation: Option<CancellationToken>,
    report: Option<TrainingReport>,
}

impl<T: FactorScalar> TensorCoFi<T> {
    /// Create an untrained model
    ///
    /// # Errors
    ///
    /// - [`TrainingError::Config`] if the configuration is invalid
    /// - [`TrainingError::Observations`] if no dimension is declared or a
    ///   cardinality is zero
    pub fn new(config: TrainConfig, cardinalities: Vec<usize>) -> Result<Self, TrainingError> {
        config.validate()?;
        if cardinalities.is_empty() {
            return Err(ObservationError::EmptyDimensions.into());
        }
        if let Some(dim) = cardinalities.iter().position(|&c| c == 0) {
            return Err(ObservationError::ZeroCardinality(dim).into());
        }

        Ok(Self {
            config,
            cardinalities,
            factors: None,
            counts: None,
            state: TrainingState::Initialized,
            cancellation: None,
            report: None,
        })
    }

    /// Build a trained model from existing factor matrices
    ///
    /// Cardinalities are taken from the column counts.
    pub fn from_factors(config: TrainConfig, factors: Vec<Array2<T>>) -> Result<Self, TrainingError> {
        let store = FactorStore::from_factors(factors)?;
        if store.rank() != config.rank {
            return Err(tcofi_kernels::KernelError::rank_mismatch(
                "TensorCoFi::from_factors",
                config.rank,
                store.rank(),
                0,
            )
            .into());
        }
        let cardinalities = store.factors().iter().map(|f| f.ncols()).collect();

        let mut model = Self::new(config, cardinalities)?;
        model.factors = Some(store);
        model.state = TrainingState::Done;
        Ok(model)
    }

    /// Attach a cancellation token checked before every sweep
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    pub fn n_dims(&self) -> usize {
        self.cardinalities.len()
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn is_trained(&self) -> bool {
        self.state == TrainingState::Done && self.factors.is_some()
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Occurrence counts of `dimension`, available once the index is built
    pub fn occurrence_counts(&self, dimension: usize) -> Option<&[usize]> {
        self.counts
            .as_ref()
            .and_then(|c| c.get(dimension))
            .map(|c| c.as_slice())
    }

    /// Train on `observations`, replacing any previous factors
    ///
    /// # Errors
    ///
    /// - [`TrainingError::Observations`] if a row does not fit the declared
    ///   cardinalities
    /// - [`TrainingError::Solve`] / [`TrainingError::WorkerTask`] if an entry
    ///   cannot be solved
    /// - [`TrainingError::Cancelled`] if the token fires
    ///
    /// On error the model is left untrained: no factors, no occurrence
    /// counts, no report and state [`TrainingState::Initialized`].
    pub fn train(&mut self, observations: &ObservationSet<T>) -> Result<&TrainingReport, TrainingError> {
        let start = Instant::now();
        self.factors = None;
        self.counts = None;
        self.report = None;
        self.state = TrainingState::Initialized;

        let (store, sweeps, errors) = match self.fit(observations) {
            Ok(fitted) => fitted,
            Err(e) => {
                self.counts = None;
                self.state = TrainingState::Initialized;
                return Err(e);
            }
        };

        self.factors = Some(store);
        self.state = TrainingState::Done;

        let report = TrainingReport {
            iterations: self.config.iterations,
            sweeps,
            errors,
            elapsed: start.elapsed(),
        };
        log::info!("Training finished: {} sweeps in {:?}", sweeps, report.elapsed);

        Ok(&*self.report.insert(report))
    }

    /// Build the index and run every sweep, returning factors, sweep count
    /// and per-iteration errors
    fn fit(
        &mut self,
        observations: &ObservationSet<T>,
    ) -> Result<(FactorStore<T>, usize, Vec<f64>), TrainingError> {
        let index = TensorIndex::build(observations, &self.cardinalities)?;
        self.counts = Some(index.all_occurrence_counts());
        self.state = TrainingState::IndexBuilt;

        log::info!(
            "Training TensorCoFi: {} observations, cardinalities {:?}, rank {}, {} iterations, {:?}",
            observations.len(),
            self.cardinalities,
            self.config.rank,
            self.config.iterations,
            self.config.strategy
        );

        let mut store = FactorStore::<T>::random(self.config.rank, &self.cardinalities, self.config.seed);
        let scheduler = Scheduler::new(self.config.strategy)?;
        let n_dims = self.cardinalities.len();
        let mut errors = Vec::new();
        let mut sweeps = 0;

        for iteration in 0..self.config.iterations {
            for dimension in 0..n_dims {
                if let Some(token) = &self.cancellation {
                    if token.is_cancelled() {
                        log::info!(
                            "Training cancelled at iteration {}, dimension {}",
                            iteration,
                            dimension
                        );
                        return Err(TrainingError::Cancelled {
                            iteration,
                            dimension,
                        });
                    }
                }

                self.state = TrainingState::Sweep {
                    dimension,
                    iteration,
                };
                let sweep_start = Instant::now();

                let base = gram_hadamard(&store.views(), dimension)?;
                let (target, others) = store.split_for_update(dimension);
                let solver = EntrySolver::new(
                    &index,
                    observations.scores(),
                    others,
                    &base,
                    dimension,
                    iteration,
                    self.config.lambda,
                    self.config.confidence,
                )?;
                scheduler.sweep(&solver, target)?;
                sweeps += 1;

                log::debug!(
                    "Iteration {} dimension {}: {} entries in {:?}",
                    iteration,
                    dimension,
                    self.cardinalities[dimension],
                    sweep_start.elapsed()
                );
            }

            if self.config.report_error {
                let error = training_error(&store.views(), &index, observations.scores());
                log::debug!("Iteration {}: training error {:.6}", iteration, error);
                errors.push(error);
            }
        }

        Ok((store, sweeps, errors))
    }

    /// Trained factor matrices, one per dimension
    pub fn factors(&self) -> Result<&[Array2<T>], TrainingError> {
        self.factors
            .as_ref()
            .map(|s| s.factors())
            .ok_or(TrainingError::NotTrained)
    }

    /// Copy of the trained factor matrices, in dimension order
    pub fn export_model(&self) -> Result<Vec<Array2<T>>, TrainingError> {
        Ok(self.factors()?.to_vec())
    }

    /// Score a 0-based tuple: `Σᵣ Πᵢ F₍ᵢ₎[r, tupleᵢ]`
    ///
    /// # Errors
    ///
    /// - [`TrainingError::NotTrained`] before training
    /// - [`TrainingError::InvalidTuple`] for a wrong length or an
    ///   out-of-range index
    pub fn decision(&self, tuple: &[usize]) -> Result<T, TrainingError> {
        let store = self.factors.as_ref().ok_or(TrainingError::NotTrained)?;
        if tuple.len() != store.n_dims() {
            return Err(TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason: format!("expected {} indices", store.n_dims()),
            });
        }

        tuple_inner_product(&store.views(), tuple).map_err(|e| TrainingError::InvalidTuple {
            tuple: tuple.to_vec(),
            reason: e.to_string(),
        })
    }

    /// Score a tuple of 1-based identifiers as delivered by data sources
    pub fn decision_one_based(&self, tuple: &[usize]) -> Result<T, TrainingError> {
        if tuple.contains(&0) {
            return Err(TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason: "identifiers are 1-based".to_string(),
            });
        }
        let zero_based: Vec<usize> = tuple.iter().map(|v| v - 1).collect();
        self.decision(&zero_based).map_err(|e| match e {
            TrainingError::InvalidTuple { reason, .. } => TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason,
            },
            other => other,
        })
    }
}

/// Mean squared error between `sign(score)` and the model score
///
/// Returns 0 for an empty observation set and NaN when the factors do not
/// fit the indexed coordinates.
pub fn training_error<T: FactorScalar>(
    factors: &[ArrayView2<'_, T>],
    index: &TensorIndex,
    scores: &[T],
) -> f64 {
    let n = index.n_rows();
    if n == 0 {
        return 0.0;
    }

    let mut total = 0.0;
    for (r, &score) in scores.iter().enumerate().take(n) {
        let diff = match tuple_inner_product(factors, index.coordinates(r)) {
            Ok(predicted) => (preference(score) - predicted).to_f64().unwrap_or(f64::NAN),
            Err(_) => f64::NAN,
        };
        total += diff * diff;
    }

    total / n as f64
}
