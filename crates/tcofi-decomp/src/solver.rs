//! Per-entry weighted least squares
//!
//! For entry `e` of the swept dimension `n`, every observation row `r`
//! touching `e` contributes
//!
//! ```text
//! t   = ⊙_{m ≠ n} F₍ₘ₎[:, v_{r,m}]
//! w   = 1 + p · ln(1 + |s_r|)
//! A  += (w − 1) t tᵀ
//! b  += sign(s_r) · w · t
//! ```
//!
//! after which `A += B₍ₙ₎ + (λ / Iₙ) Id` and the new column is `A⁻¹ b`.
//! `B₍ₙ₎` is the Gram-Hadamard base shared by all entries of the sweep.
//!
//! An entry with no rows solves against `b = 0` and becomes the zero vector.

use crate::error::TrainingError;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};
use tcofi_kernels::{
    add_diagonal, axpy, hadamard_columns_into, rank_one_update, spd_inverse, FactorScalar,
    KernelError,
};
use tcofi_sparse::TensorIndex;

/// Observation weight `1 + p · ln(1 + |score|)`
///
/// # Examples
///
/// ```
/// use tcofi_decomp::confidence_weight;
///
/// assert_eq!(confidence_weight(0.0, 40.0), 1.0);
/// let w = confidence_weight(-3.0, 1.0);
/// assert!((w - (1.0 + 4.0f64.ln())).abs() < 1e-12);
/// ```
pub fn confidence_weight<T: FactorScalar>(score: T, confidence: T) -> T {
    T::one() + confidence * (T::one() + score.abs()).ln()
}

/// Three-way sign with `sign(0) = 0`
pub fn preference<T: FactorScalar>(score: T) -> T {
    if score > T::zero() {
        T::one()
    } else if score < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Solves the columns of one dimension against fixed other factors
///
/// Holds only shared borrows, so one solver serves every worker of a sweep.
#[derive(Debug)]
pub struct EntrySolver<'a, T> {
    index: &'a TensorIndex,
    scores: &'a [T],
    others: Vec<(usize, ArrayView2<'a, T>)>,
    base: &'a Array2<T>,
    dimension: usize,
    iteration: usize,
    regularization: T,
    confidence: T,
}

impl<'a, T: FactorScalar> EntrySolver<'a, T> {
    /// Build the solver for one (iteration, dimension) sweep
    ///
    /// `others` are the fixed factor matrices tagged with their dimension.
    /// `lambda` is divided by the cardinality of `dimension` here.
    ///
    /// # Errors
    ///
    /// [`TrainingError::Kernel`] if `base` is not square, a fixed matrix
    /// does not have `rank` rows and one column per indexed entry, or a
    /// dimension tag is out of range or names the swept dimension.
    /// [`TrainingError::DimensionMismatch`] if `scores` does not hold one
    /// score per indexed row.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: &'a TensorIndex,
        scores: &'a [T],
        others: Vec<(usize, ArrayView2<'a, T>)>,
        base: &'a Array2<T>,
        dimension: usize,
        iteration: usize,
        lambda: f64,
        confidence: f64,
    ) -> Result<Self, TrainingError> {
        let n_dims = index.n_dims();
        if dimension >= n_dims {
            return Err(KernelError::invalid_mode(dimension, n_dims, "Swept dimension").into());
        }
        if scores.len() != index.n_rows() {
            return Err(TrainingError::DimensionMismatch {
                expected: index.n_rows(),
                actual: scores.len(),
            });
        }

        let rank = base.nrows();
        if base.ncols() != rank {
            return Err(KernelError::dimension_mismatch(
                "EntrySolver::new",
                vec![rank, rank],
                vec![rank, base.ncols()],
                "Base must be square",
            )
            .into());
        }
        for (m, f) in &others {
            if *m >= n_dims || *m == dimension {
                return Err(KernelError::invalid_mode(
                    *m,
                    n_dims,
                    format!("Fixed factor cannot be the swept dimension {}", dimension),
                )
                .into());
            }
            if f.nrows() != rank {
                return Err(KernelError::rank_mismatch("EntrySolver::new", rank, f.nrows(), *m).into());
            }
            if f.ncols() != index.cardinality(*m) {
                return Err(KernelError::dimension_mismatch(
                    "EntrySolver::new",
                    vec![rank, index.cardinality(*m)],
                    vec![f.nrows(), f.ncols()],
                    format!("Factor of dimension {} must have one column per entry", m),
                )
                .into());
            }
        }

        let card = index.cardinality(dimension).max(1) as f64;
        Ok(Self {
            index,
            scores,
            others,
            base,
            dimension,
            iteration,
            regularization: T::from_f64(lambda / card).unwrap_or_else(T::zero),
            confidence: T::from_f64(confidence).unwrap_or_else(T::zero),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn rank(&self) -> usize {
        self.base.nrows()
    }

    /// Number of entries (columns) in the swept dimension
    pub fn n_entries(&self) -> usize {
        self.index.cardinality(self.dimension)
    }

    /// Assemble the system `(A, b)` for `entry` without solving it
    pub fn assemble(&self, entry: usize) -> Result<(Array2<T>, Array1<T>), TrainingError> {
        let rank = self.rank();
        let mut a = Array2::<T>::zeros((rank, rank));
        let mut b = Array1::<T>::zeros(rank);
        let mut temp = Array1::<T>::ones(rank);

        for &r in self.index.rows(self.dimension, entry) {
            let coords = self.index.coordinates(r);
            let score = self.scores[r];

            temp.fill(T::one());
            hadamard_columns_into(
                &mut temp.view_mut(),
                self.others.iter().map(|(m, f)| f.column(coords[*m])),
            );

            let weight = confidence_weight(score, self.confidence);
            rank_one_update(&mut a.view_mut(), weight - T::one(), &temp.view())?;
            axpy(&mut b.view_mut(), preference(score) * weight, &temp.view())?;
        }

        Zip::from(&mut a)
            .and(self.base)
            .for_each(|x, &base| *x += base);
        add_diagonal(&mut a.view_mut(), self.regularization)?;

        Ok((a, b))
    }

    /// Solve `entry` and write the new latent vector into `out`
    ///
    /// # Errors
    ///
    /// [`TrainingError::Solve`] if the system is not positive definite, holds
    /// non-finite values, or produces a non-finite solution.
    pub fn solve_entry(&self, entry: usize, out: &mut ArrayViewMut1<T>) -> Result<(), TrainingError> {
        let (a, b) = self.assemble(entry)?;

        let inv = spd_inverse(&a.view()).map_err(|e| TrainingError::Solve {
            dimension: self.dimension,
            entry,
            iteration: self.iteration,
            condition: e.condition().unwrap_or(f64::NAN),
        })?;

        let x = inv.apply(&b.view());
        if x.iter().any(|v| !v.is_finite()) {
            return Err(TrainingError::Solve {
                dimension: self.dimension,
                entry,
                iteration: self.iteration,
                condition: inv.condition,
            });
        }

        out.assign(&x);
        Ok(())
    }

    /// Solve a block of consecutive columns starting at entry `start`
    ///
    /// Column `c` of `block` receives entry `start + c`. Stops at the first
    /// failing entry.
    pub fn solve_block(&self, start: usize, block: &mut ArrayViewMut2<T>) -> Result<(), TrainingError> {
        for (offset, mut column) in block.columns_mut().into_iter().enumerate() {
            self.solve_entry(start + offset, &mut column)?;
        }
        Ok(())
    }
}
