//! Training and prediction errors
//!
//! Every failure is terminal: a run that returns an error leaves the model
//! untrained and nothing is retried.

use crate::config::ConfigError;
use crate::scheduler::ColumnRange;
use tcofi_kernels::KernelError;
use tcofi_sparse::ObservationError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TrainingError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid observations: {0}")]
    Observations(#[from] ObservationError),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error(
        "Solve failed for entry {entry} of dimension {dimension} in iteration {iteration} \
         (condition estimate {condition:.3e})"
    )]
    Solve {
        dimension: usize,
        entry: usize,
        iteration: usize,
        condition: f64,
    },

    #[error("Worker task for columns {range} of dimension {dimension} failed in iteration {iteration}: {message}")]
    WorkerTask {
        dimension: usize,
        iteration: usize,
        range: ColumnRange,
        message: String,
    },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("Training cancelled before dimension {dimension} of iteration {iteration}")]
    Cancelled { iteration: usize, dimension: usize },

    #[error("Invalid tuple {tuple:?}: {reason}")]
    InvalidTuple { tuple: Vec<usize>, reason: String },

    #[error("Dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model has not been trained")]
    NotTrained,
}

impl TrainingError {
    /// Dimension being swept when the error occurred, if any
    pub fn dimension(&self) -> Option<usize> {
        match self {
            TrainingError::Solve { dimension, .. }
            | TrainingError::WorkerTask { dimension, .. }
            | TrainingError::Cancelled { dimension, .. } => Some(*dimension),
            TrainingError::Observations(ObservationError::DimensionBounds { dimension, .. }) => {
                Some(*dimension)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_display() {
        let err = TrainingError::Solve {
            dimension: 1,
            entry: 42,
            iteration: 3,
            condition: f64::INFINITY,
        };
        let msg = err.to_string();
        assert!(msg.contains("entry 42"));
        assert!(msg.contains("dimension 1"));
        assert!(msg.contains("iteration 3"));
        assert_eq!(err.dimension(), Some(1));
    }

    #[test]
    fn test_worker_task_display() {
        let err = TrainingError::WorkerTask {
            dimension: 0,
            iteration: 0,
            range: ColumnRange { start: 4, end: 8 },
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("columns 4..8"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_from_observation_error() {
        let err: TrainingError = ObservationError::DimensionBounds {
            dimension: 2,
            row: 0,
            value: 9,
            cardinality: 8,
        }
        .into();
        assert!(matches!(err, TrainingError::Observations(_)));
        assert_eq!(err.dimension(), Some(2));
        assert_eq!(TrainingError::NotTrained.dimension(), None);
    }
}
