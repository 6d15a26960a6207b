//! Training configuration
//!
//! [`TrainConfig`] carries every tunable of a training run. It is a plain
//! value with builder-style setters; nothing is validated until
//! [`TrainConfig::validate`] runs, which the model does on construction.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid rank: {0} (must be > 0)")]
    InvalidRank(usize),

    #[error("Invalid regularization: {0} (must be finite and >= 0)")]
    InvalidLambda(f64),

    #[error("Invalid confidence: {0} (must be finite and >= 0)")]
    InvalidConfidence(f64),

    #[error("Invalid worker count: {0} (must be > 0)")]
    InvalidWorkers(usize),
}

/// How the entries of one dimension are distributed during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionStrategy {
    /// Solve entries in increasing order on the calling thread
    #[default]
    Sequential,
    /// Split entries into contiguous column ranges on a fixed-size pool
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Parallel strategy with one worker per available core
    pub fn available_parallelism() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        ExecutionStrategy::Parallel { workers }
    }

    /// Number of threads the strategy occupies
    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => *workers,
        }
    }
}

/// Hyperparameters for tensor ALS training
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainConfig {
    /// Latent rank `d` shared by all factor matrices
    pub rank: usize,

    /// Number of full passes over all dimensions (no convergence check)
    pub iterations: usize,

    /// Regularization λ, divided by the cardinality of the swept dimension
    pub lambda: f64,

    /// Confidence scale `p` in `1 + p·ln(1 + |score|)`
    pub confidence: f64,

    pub strategy: ExecutionStrategy,

    /// Seed for factor initialization; `None` draws one from the thread RNG
    pub seed: Option<u64>,

    /// Compute and record the training error after every iteration
    pub report_error: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            rank: 20,
            iterations: 5,
            lambda: 0.05,
            confidence: 40.0,
            strategy: ExecutionStrategy::Sequential,
            seed: None,
            report_error: false,
        }
    }
}

impl TrainConfig {
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for [`ExecutionStrategy::Parallel`]
    pub fn with_workers(self, workers: usize) -> Self {
        self.with_strategy(ExecutionStrategy::Parallel { workers })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_report_error(mut self, report_error: bool) -> Self {
        self.report_error = report_error;
        self
    }

    /// Check every parameter against its valid range
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rank == 0 {
            return Err(ConfigError::InvalidRank(self.rank));
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(ConfigError::InvalidLambda(self.lambda));
        }
        if !self.confidence.is_finite() || self.confidence < 0.0 {
            return Err(ConfigError::InvalidConfidence(self.confidence));
        }
        if let ExecutionStrategy::Parallel { workers: 0 } = self.strategy {
            return Err(ConfigError::InvalidWorkers(0));
        }
        Ok(())
    }
}
