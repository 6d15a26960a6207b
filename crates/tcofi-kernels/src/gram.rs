//! Gram matrices and their Hadamard products
//!
//! Factor matrices are stored latent-major: `F ∈ ℝ^(d×I)`, one column per
//! dimension value. The Gram matrix is therefore `F Fᵀ ∈ ℝ^(d×d)`.
//!
//! For tensor ALS the normal-equations base of mode `n` is the Hadamard
//! product of the Gram matrices of every other mode:
//!
//! ```text
//! B₍ₙ₎ = ⊛_{m ≠ n} (F₍ₘ₎ F₍ₘ₎ᵀ)
//! ```
//!
//! It does not depend on which entry of mode `n` is being solved, so it is
//! computed once per sweep.
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use scirs2_core::numeric::Float;

/// Compute the Gram matrix `F Fᵀ` of a `d × I` factor matrix
///
/// The result is exactly symmetric: entry `(i, j)` and `(j, i)` are
/// accumulated from identical products in identical order.
///
/// # Complexity
///
/// Time: O(d² × I)
/// Space: O(d²)
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tcofi_kernels::gram_matrix;
///
/// let f = array![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]];
/// let g = gram_matrix(&f.view());
///
/// assert_eq!(g.shape(), &[2, 2]);
/// assert_eq!(g[[0, 0]], 35.0); // 1² + 3² + 5²
/// assert_eq!(g[[0, 1]], 44.0); // 1·2 + 3·4 + 5·6
/// assert_eq!(g[[1, 0]], 44.0);
/// ```
pub fn gram_matrix<T>(factor: &ArrayView2<T>) -> Array2<T>
where
    T: Float,
{
    let (rank, cols) = factor.dim();
    let mut gram = Array2::<T>::zeros((rank, rank));

    for i in 0..rank {
        for j in i..rank {
            let mut sum = T::zero();
            for c in 0..cols {
                sum = sum + factor[[i, c]] * factor[[j, c]];
            }
            gram[[i, j]] = sum;
            gram[[j, i]] = sum;
        }
    }

    gram
}

/// Compute the ALS base matrix for `skip_mode`
///
/// - Two modes: the Gram matrix of the other mode, without the identity
///   multiplication.
/// - More modes: ones(d, d) multiplied element-wise by the Gram matrix of
///   every mode except `skip_mode`.
/// - One mode: the empty product, ones(d, d).
///
/// # Errors
///
/// Returns error if `factors` is empty, `skip_mode` is out of range, or the
/// factor matrices do not share the same latent rank.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tcofi_kernels::{gram_hadamard, gram_matrix};
///
/// let users = array![[1.0, 0.5], [0.0, 2.0]];
/// let items = array![[2.0, 1.0, 0.0], [1.0, 1.0, 3.0]];
/// let views = vec![users.view(), items.view()];
///
/// // Base for the user mode is the item Gram matrix
/// let base = gram_hadamard(&views, 0).unwrap();
/// assert_eq!(base, gram_matrix(&items.view()));
/// ```
pub fn gram_hadamard<T>(factors: &[ArrayView2<T>], skip_mode: usize) -> KernelResult<Array2<T>>
where
    T: Float,
{
    if factors.is_empty() {
        return Err(KernelError::empty_input("gram_hadamard", "factors"));
    }
    if skip_mode >= factors.len() {
        return Err(KernelError::invalid_mode(
            skip_mode,
            factors.len(),
            "Base mode must index a factor matrix",
        ));
    }

    let rank = factors[0].nrows();
    for (i, factor) in factors.iter().enumerate() {
        if factor.nrows() != rank {
            return Err(KernelError::rank_mismatch(
                "gram_hadamard",
                rank,
                factor.nrows(),
                i,
            ));
        }
    }

    if factors.len() == 2 {
        let other = 1 - skip_mode;
        return Ok(gram_matrix(&factors[other]));
    }

    let mut base = Array2::<T>::ones((rank, rank));
    for (mode, factor) in factors.iter().enumerate() {
        if mode == skip_mode {
            continue;
        }

        let g = gram_matrix(factor);
        base.zip_mut_with(&g, |b, &x| *b = *b * x);
    }

    Ok(base)
}
