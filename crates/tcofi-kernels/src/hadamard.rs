//! Column-wise Hadamard products across factor matrices
//!
//! A single observation `(v₀, ..., vₖ₋₁)` touches one column of every factor
//! matrix. Its element-wise product over all modes except the one being
//! solved is the tensor analogue of the "other side" vector in two-mode ALS:
//!
//! ```text
//! t = ⊙_{m ≠ n} F₍ₘ₎[:, vₘ]
//! ```
//!
//! Summing the full product over the latent axis gives the model's score of
//! the tuple (the generalized inner product).
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array1, ArrayView1, ArrayView2, ArrayViewMut1};
use scirs2_core::numeric::Float;

/// Multiply `out` element-wise by every column in `columns`
///
/// `out` is not reset; fill it with ones first to get a plain product.
///
/// # Panics
///
/// Panics if a column length differs from `out.len()`.
pub fn hadamard_columns_into<'a, T, I>(out: &mut ArrayViewMut1<T>, columns: I)
where
    T: Float + 'a,
    I: IntoIterator<Item = ArrayView1<'a, T>>,
{
    for column in columns {
        assert_eq!(
            out.len(),
            column.len(),
            "Column length must match the latent rank"
        );
        out.zip_mut_with(&column, |o, &c| *o = *o * c);
    }
}

/// Element-wise product of the selected columns
///
/// Returns a length-`rank` vector; an empty selection yields all ones.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tcofi_kernels::hadamard_columns;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[0.5, 2.0], [1.0, 0.0]];
///
/// let t = hadamard_columns(2, vec![a.column(1), b.column(0)]);
/// assert_eq!(t.to_vec(), vec![1.0, 4.0]);
/// ```
pub fn hadamard_columns<'a, T, I>(rank: usize, columns: I) -> Array1<T>
where
    T: Float + 'a,
    I: IntoIterator<Item = ArrayView1<'a, T>>,
{
    let mut out = Array1::<T>::ones(rank);
    hadamard_columns_into(&mut out.view_mut(), columns);
    out
}

/// Score of a full tuple: `Σᵣ Πᵢ Fᵢ[r, idxᵢ]`
///
/// # Errors
///
/// Returns error if the tuple length differs from the number of factors,
/// an index is out of range, or the factors disagree on the latent rank.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tcofi_kernels::tuple_inner_product;
///
/// let users = array![[1.0, 2.0], [3.0, 4.0]];
/// let items = array![[0.5], [2.0]];
///
/// // user 1, item 0: 2·0.5 + 4·2 = 9
/// let score = tuple_inner_product(&[users.view(), items.view()], &[1, 0]).unwrap();
/// assert_eq!(score, 9.0);
/// ```
pub fn tuple_inner_product<T>(factors: &[ArrayView2<T>], tuple: &[usize]) -> KernelResult<T>
where
    T: Float,
{
    if factors.is_empty() {
        return Err(KernelError::empty_input("tuple_inner_product", "factors"));
    }
    if tuple.len() != factors.len() {
        return Err(KernelError::dimension_mismatch(
            "tuple_inner_product",
            vec![factors.len()],
            vec![tuple.len()],
            "Tuple needs one index per factor matrix",
        ));
    }

    let rank = factors[0].nrows();
    for (mode, (factor, &idx)) in factors.iter().zip(tuple).enumerate() {
        if factor.nrows() != rank {
            return Err(KernelError::rank_mismatch(
                "tuple_inner_product",
                rank,
                factor.nrows(),
                mode,
            ));
        }
        if idx >= factor.ncols() {
            return Err(KernelError::dimension_mismatch(
                "tuple_inner_product",
                vec![factor.ncols()],
                vec![idx],
                format!("Index out of range for mode {}", mode),
            ));
        }
    }

    let product = hadamard_columns(
        rank,
        factors
            .iter()
            .zip(tuple)
            .map(|(factor, &idx)| factor.column(idx)),
    );

    Ok(product.iter().fold(T::zero(), |acc, &x| acc + x))
}
