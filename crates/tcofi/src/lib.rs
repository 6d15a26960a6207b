//! # TCoFi - Context-Aware Tensor Factorization
//!
//! Meta crate that re-exports all TCoFi components.
//!
//! ## Modules
//!
//! - [`sparse`] - observation sets and per-dimension tensor indices
//! - [`kernels`] - Gram, Hadamard, rank-one and SPD solve kernels
//! - [`decomp`] - tensor ALS training, decision function, predictors
//! - [`exec`] - source/sink contracts and the extract-train-load pipeline
//!
//! ## Quick Start
//!
//! ```
//! use tcofi::prelude::*;
//!
//! let obs = ObservationSet::new(
//!     vec![vec![1, 1, 1], vec![1, 2, 2], vec![2, 1, 2]],
//!     vec![5.0, 1.0, 3.0],
//! )?;
//!
//! let config = TrainConfig::default().with_rank(2).with_seed(3);
//! let mut model = TensorCoFi::<f64>::new(config, vec![2, 2, 2])?;
//! model.train(&obs)?;
//!
//! let score = model.decision(&[0, 0, 0])?;
//! assert!(score.is_finite());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub use tcofi_decomp as decomp;
pub use tcofi_exec as exec;
pub use tcofi_kernels as kernels;
pub use tcofi_sparse as sparse;

/// Prelude module for convenient imports
pub mod prelude {
    pub use tcofi_decomp::{
        CancellationToken, ExecutionStrategy, PopularityPredictor, Predictor, RandomPredictor,
        TensorCoFi, TrainConfig, TrainingError, TrainingReport, TrainingState,
    };
    pub use tcofi_exec::{MemorySink, MemorySource, ModelBuilder, ModelSink, ObservationSource};
    pub use tcofi_kernels::FactorScalar;
    pub use tcofi_sparse::{ObservationError, ObservationSet, TensorIndex};
}
