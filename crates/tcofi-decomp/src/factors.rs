//! Factor matrix storage
//!
//! One dense `d × cardᵢ` matrix per dimension; column `j` of matrix `i` is
//! the latent vector of value `j` in dimension `i`. All matrices share the
//! latent rank `d`.

use crate::error::TrainingError;
use scirs2_core::ndarray_ext::{Array2, ArrayView2, ArrayViewMut2};
use scirs2_core::random::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use tcofi_kernels::FactorScalar;

/// Owned set of factor matrices with a common latent rank
#[derive(Debug, Clone, PartialEq)]
pub struct FactorStore<T> {
    factors: Vec<Array2<T>>,
    rank: usize,
}

impl<T: FactorScalar> FactorStore<T> {
    /// Initialize every matrix uniformly in `[0, 1)`
    ///
    /// Matrices are filled in dimension order, each row-major, from a single
    /// generator. The same seed and shape always produce the same store.
    ///
    /// # Examples
    ///
    /// ```
    /// use tcofi_decomp::FactorStore;
    ///
    /// let a = FactorStore::<f64>::random(3, &[4, 2], Some(9));
    /// let b = FactorStore::<f64>::random(3, &[4, 2], Some(9));
    ///
    /// assert_eq!(a, b);
    /// assert_eq!(a.factor(0).dim(), (3, 4));
    /// assert!(a.factor(1).iter().all(|&x| (0.0..1.0).contains(&x)));
    /// ```
    pub fn random(rank: usize, cardinalities: &[usize], seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| thread_rng().random::<u64>());
        let mut rng = StdRng::seed_from_u64(seed);

        let factors = cardinalities
            .iter()
            .map(|&card| {
                Array2::from_shape_fn((rank, card), |_| {
                    T::from_f64(rng.random::<f64>()).unwrap_or_else(T::zero)
                })
            })
            .collect();

        Self { factors, rank }
    }

    /// Wrap existing matrices
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::Kernel`] with a rank mismatch if the matrices
    /// disagree on the number of rows, or [`TrainingError::DimensionMismatch`]
    /// if no matrix is given.
    pub fn from_factors(factors: Vec<Array2<T>>) -> Result<Self, TrainingError> {
        let rank = match factors.first() {
            Some(f) => f.nrows(),
            None => {
                return Err(TrainingError::DimensionMismatch {
                    expected: 1,
                    actual: 0,
                })
            }
        };

        for (i, f) in factors.iter().enumerate() {
            if f.nrows() != rank {
                return Err(
                    tcofi_kernels::KernelError::rank_mismatch("FactorStore", rank, f.nrows(), i)
                        .into(),
                );
            }
        }

        Ok(Self { factors, rank })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn n_dims(&self) -> usize {
        self.factors.len()
    }

    pub fn factor(&self, dimension: usize) -> &Array2<T> {
        &self.factors[dimension]
    }

    pub fn factors(&self) -> &[Array2<T>] {
        &self.factors
    }

    pub fn views(&self) -> Vec<ArrayView2<'_, T>> {
        self.factors.iter().map(|f| f.view()).collect()
    }

    pub fn into_factors(self) -> Vec<Array2<T>> {
        self.factors
    }

    /// Borrow `dimension` mutably and every other matrix immutably
    ///
    /// The immutable views are tagged with their dimension number, in
    /// increasing order.
    ///
    /// # Panics
    ///
    /// Panics if `dimension >= n_dims()`.
    pub fn split_for_update(
        &mut self,
        dimension: usize,
    ) -> (ArrayViewMut2<'_, T>, Vec<(usize, ArrayView2<'_, T>)>) {
        let (before, rest) = self.factors.split_at_mut(dimension);
        let (target, after) = rest
            .split_first_mut()
            .expect("dimension out of range for factor store");

        let others = before
            .iter()
            .enumerate()
            .chain(
                after
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (dimension + 1 + i, f)),
            )
            .map(|(i, f)| (i, f.view()))
            .collect();

        (target.view_mut(), others)
    }
}
