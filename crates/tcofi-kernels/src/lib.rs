//! # tcofi-kernels
//!
//! Dense numeric kernels behind the TCoFi ALS sweep.
//!
//! **Key Features:**
//! - **Gram matrices** - `F Fᵀ` for latent-major factor matrices
//! - **Gram-Hadamard base** - element-wise product of every other mode's Gram
//! - **Column Hadamard** - per-observation product of factor columns
//! - **Rank-one updates** - symmetric in-place normal-equation accumulation
//! - **SPD inversion** - Cholesky-based inverse with a conditioning estimate
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{array, Array2};
//! use tcofi_kernels::{add_diagonal, gram_hadamard, hadamard_columns, rank_one_update, spd_inverse};
//!
//! let users = array![[0.2, 0.9], [0.5, 0.1]];
//! let items = array![[0.7, 0.3, 0.4], [0.6, 0.8, 0.1]];
//! let views = [users.view(), items.view()];
//!
//! // System for user 0 with a single observation on item 2
//! let mut a = gram_hadamard(&views, 0).unwrap();
//! let t = hadamard_columns(2, vec![items.column(2)]);
//! rank_one_update(&mut a.view_mut(), 1.5, &t.view()).unwrap();
//! add_diagonal(&mut a.view_mut(), 0.05).unwrap();
//!
//! let inv = spd_inverse(&a.view()).unwrap();
//! let x = inv.apply(&t.view());
//! assert_eq!(x.len(), 2);
//! ```
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for all array operations and numeric traits,
//! and `scirs2-linalg` for the Cholesky factorization.

pub mod error;
pub mod gram;
pub mod hadamard;
pub mod solve;
pub mod update;


use scirs2_core::ndarray_ext::ScalarOperand;
use scirs2_core::numeric::{Float, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display};
use std::iter::Sum;

// Re-exports
pub use error::*;
pub use gram::*;
pub use hadamard::*;
pub use solve::*;
pub use update::*;

/// Scalar type usable for factor matrices
///
/// Bundles the bounds required by the Cholesky backend and the parallel
/// sweep so downstream signatures stay short. Implemented for `f32` and
/// `f64`.
pub trait FactorScalar:
    Float
    + FromPrimitive
    + NumAssign
    + Sum
    + ScalarOperand
    + Send
    + Sync
    + Debug
    + Display
    + 'static
{
}

impl<T> FactorScalar for T where
    T: Float
        + FromPrimitive
        + NumAssign
        + Sum
        + ScalarOperand
        + Send
        + Sync
        + Debug
        + Display
        + 'static
{
}
