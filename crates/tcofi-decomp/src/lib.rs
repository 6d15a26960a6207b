//! # tcofi-decomp - Context-Aware Tensor Factorization
//!
//! Alternating least squares for sparse, weighted interaction tensors with
//! an arbitrary number of dimensions (user, item, context...).
//!
//! ## Overview
//!
//! Each dimension `i` owns a latent factor matrix `F₍ᵢ₎ ∈ ℝ^(d×Iᵢ)`. The
//! score of a tuple is
//!
//! ```text
//! ŷ(v₀, ..., vₖ₋₁) = Σᵣ Πᵢ F₍ᵢ₎[r, vᵢ]
//! ```
//!
//! Training alternates over dimensions. A sweep over dimension `n` fixes all
//! other matrices, computes the Gram-Hadamard base once, and solves one
//! regularized weighted least-squares system per entry:
//!
//! ```text
//! (B₍ₙ₎ + Σ (w−1) t tᵀ + λ/Iₙ · Id) x = Σ sign(s) · w · t
//! ```
//!
//! with confidence `w = 1 + p · ln(1 + |s|)`.
//!
//! **Components:**
//! - [`FactorStore`] - seeded factor matrices
//! - [`EntrySolver`] - per-entry normal equations
//! - [`Scheduler`] - sequential or pooled column-range sweeps
//! - [`TensorCoFi`] - training loop, states, decision function
//! - [`Predictor`] - tensor model and popularity/random baselines
//!
//! ## Quick Start
//!
//! ```
//! use tcofi_decomp::{ExecutionStrategy, TensorCoFi, TrainConfig};
//! use tcofi_sparse::ObservationSet;
//!
//! let obs = ObservationSet::new(
//!     vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![3, 2]],
//!     vec![5.0, 1.0, 3.0, 4.0],
//! )?;
//!
//! let config = TrainConfig::default()
//!     .with_rank(2)
//!     .with_iterations(5)
//!     .with_strategy(ExecutionStrategy::Parallel { workers: 2 })
//!     .with_seed(7);
//!
//! let mut model = TensorCoFi::<f64>::new(config, vec![3, 2])?;
//! model.train(&obs)?;
//!
//! let factors = model.export_model()?;
//! assert_eq!(factors[0].shape(), &[2, 3]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for [`TrainConfig`] and
//!   [`ExecutionStrategy`]
//!
//! ## SciRS2 Integration
//!
//! Array operations use `scirs2_core::ndarray_ext`, random initialization
//! uses `scirs2_core::random`, and the per-entry solve goes through
//! `tcofi-kernels` (Cholesky from `scirs2_linalg`).

pub mod config;
pub mod error;
pub mod factors;
pub mod model;
pub mod predictors;
pub mod scheduler;
pub mod solver;


// Re-exports
pub use config::*;
pub use error::*;
pub use factors::*;
pub use model::*;
pub use predictors::*;
pub use scheduler::*;
pub use solver::*;
