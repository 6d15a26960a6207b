//! In-place updates for normal-equation systems
//!
//! Each observation contributes a weighted rank-one term to the system
//! matrix and a scaled copy of its Hadamard vector to the right-hand side.
//! The updates mutate pre-allocated buffers so the per-entry solver does not
//! allocate inside its row loop.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{ArrayView1, ArrayViewMut1, ArrayViewMut2};
use scirs2_core::numeric::Float;

/// Symmetric rank-one update: `A ← A + α x xᵀ`
///
/// Only the upper triangle is computed; the lower is mirrored so `A` stays
/// exactly symmetric.
///
/// # Errors
///
/// Returns error if `A` is not square or `x` does not match its order.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{array, Array2};
/// use tcofi_kernels::rank_one_update;
///
/// let mut a = Array2::<f64>::zeros((2, 2));
/// rank_one_update(&mut a.view_mut(), 2.0, &array![1.0, 3.0].view()).unwrap();
///
/// assert_eq!(a, array![[2.0, 6.0], [6.0, 18.0]]);
/// ```
pub fn rank_one_update<T>(a: &mut ArrayViewMut2<T>, alpha: T, x: &ArrayView1<T>) -> KernelResult<()>
where
    T: Float,
{
    let (n, m) = a.dim();
    if n != m || x.len() != n {
        return Err(KernelError::dimension_mismatch(
            "rank_one_update",
            vec![n, n],
            vec![n, m, x.len()],
            "Matrix must be square and match the vector length",
        ));
    }

    if alpha == T::zero() {
        return Ok(());
    }

    for i in 0..n {
        let ax = alpha * x[i];
        for j in i..n {
            let v = a[[i, j]] + ax * x[j];
            a[[i, j]] = v;
            a[[j, i]] = v;
        }
    }

    Ok(())
}

/// `y ← y + α x`
///
/// # Errors
///
/// Returns error if the vectors differ in length.
pub fn axpy<T>(y: &mut ArrayViewMut1<T>, alpha: T, x: &ArrayView1<T>) -> KernelResult<()>
where
    T: Float,
{
    if y.len() != x.len() {
        return Err(KernelError::dimension_mismatch(
            "axpy",
            vec![y.len()],
            vec![x.len()],
            "Vectors must have equal length",
        ));
    }

    y.zip_mut_with(x, |yi, &xi| *yi = *yi + alpha * xi);
    Ok(())
}

/// `A ← A + value · I` (Tikhonov regularization)
///
/// # Errors
///
/// Returns error if `A` is not square.
pub fn add_diagonal<T>(a: &mut ArrayViewMut2<T>, value: T) -> KernelResult<()>
where
    T: Float,
{
    let (n, m) = a.dim();
    if n != m {
        return Err(KernelError::dimension_mismatch(
            "add_diagonal",
            vec![n, n],
            vec![n, m],
            "Matrix must be square",
        ));
    }

    a.diag_mut().mapv_inplace(|d| d + value);
    Ok(())
}
