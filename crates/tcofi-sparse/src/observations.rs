//! Observation storage in coordinate (COO) layout
//!
//! An observation set holds `n` interaction rows over `k` dimensions:
//!
//! ```text
//! (v₀, v₁, ..., vₖ₋₁, score)
//! ```
//!
//! Coordinates are kept exactly as delivered by the data source, which means
//! 1-based. Conversion to 0-based storage happens when a
//! [`TensorIndex`](crate::TensorIndex) is built, together with the bounds check
//! against the declared cardinalities.
//!
//! # Examples
//!
//! ```
//! use tcofi_sparse::ObservationSet;
//!
//! // user, item, score
//! let rows = vec![vec![1, 1], vec![1, 2], vec![2, 1]];
//! let scores = vec![5.0, 1.0, 3.0];
//!
//! let obs = ObservationSet::new(rows, scores).unwrap();
//! assert_eq!(obs.len(), 3);
//! assert_eq!(obs.arity(), 2);
//! assert_eq!(obs.row(2), &[2, 1]);
//! ```
//!
//! # SciRS2 Integration
//!
//! Matrix input uses `scirs2_core::ndarray_ext`.

use scirs2_core::ndarray_ext::ArrayView2;
use scirs2_core::numeric::Float;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObservationError {
    #[error(
        "Dimension bounds violated: row {row} has value {value} in dimension {dimension}, \
         expected 1..={cardinality}"
    )]
    DimensionBounds {
        dimension: usize,
        row: usize,
        value: usize,
        cardinality: usize,
    },

    #[error("Arity mismatch: row {row} has {actual} coordinates but {expected} dimensions are declared")]
    ArityMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Length mismatch: {rows} coordinate rows but {scores} scores")]
    LengthMismatch { rows: usize, scores: usize },

    #[error("Non-integral index {value} at row {row}, column {column}")]
    NonIntegralIndex { row: usize, column: usize, value: f64 },

    #[error("Observation matrix needs at least 2 columns, got {0}")]
    MatrixTooNarrow(usize),

    #[error("At least one dimension is required")]
    EmptyDimensions,

    #[error("Dimension {0} has zero cardinality")]
    ZeroCardinality(usize),
}

/// Immutable set of weighted observations in COO layout.
///
/// Coordinates are stored row-major in a single flat buffer
/// (`arity` entries per row), 1-based as delivered.
#[derive(Debug, Clone)]
pub struct ObservationSet<T> {
    coords: Vec<usize>,
    scores: Vec<T>,
    arity: usize,
}

impl<T: Float> ObservationSet<T> {
    /// Create an observation set from coordinate rows and scores
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Rows and scores have different lengths
    /// - Rows do not all have the same number of coordinates
    /// - Rows are zero-width
    pub fn new(rows: Vec<Vec<usize>>, scores: Vec<T>) -> Result<Self, ObservationError> {
        if rows.len() != scores.len() {
            return Err(ObservationError::LengthMismatch {
                rows: rows.len(),
                scores: scores.len(),
            });
        }

        let arity = rows.first().map_or(0, Vec::len);
        if !rows.is_empty() && arity == 0 {
            return Err(ObservationError::EmptyDimensions);
        }

        let mut coords = Vec::with_capacity(rows.len() * arity);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != arity {
                return Err(ObservationError::ArityMismatch {
                    row: r,
                    expected: arity,
                    actual: row.len(),
                });
            }
            coords.extend_from_slice(row);
        }

        Ok(Self {
            coords,
            scores,
            arity,
        })
    }

    /// An observation set with no rows over `arity` dimensions
    pub fn empty(arity: usize) -> Self {
        Self {
            coords: Vec::new(),
            scores: Vec::new(),
            arity,
        }
    }

    /// Create an observation set from a dense matrix
    ///
    /// Every row is `[v₀, ..., vₖ₋₁, score]`: all columns but the last hold
    /// integral 1-based indices, the last column holds the score.
    ///
    /// # Errors
    ///
    /// Returns error if the matrix has fewer than two columns, or if an index
    /// cell is negative, non-finite or has a fractional part.
    ///
    /// # Examples
    ///
    /// ```
    /// use scirs2_core::ndarray_ext::array;
    /// use tcofi_sparse::ObservationSet;
    ///
    /// let data = array![[1.0, 1.0, 5.0], [3.0, 2.0, -4.0]];
    /// let obs = ObservationSet::from_matrix(&data.view()).unwrap();
    ///
    /// assert_eq!(obs.arity(), 2);
    /// assert_eq!(obs.row(1), &[3, 2]);
    /// assert_eq!(obs.score(1), -4.0);
    /// ```
    pub fn from_matrix(data: &ArrayView2<T>) -> Result<Self, ObservationError> {
        let (n_rows, n_cols) = data.dim();
        if n_cols < 2 {
            return Err(ObservationError::MatrixTooNarrow(n_cols));
        }

        let arity = n_cols - 1;
        let mut coords = Vec::with_capacity(n_rows * arity);
        let mut scores = Vec::with_capacity(n_rows);

        for r in 0..n_rows {
            for c in 0..arity {
                let cell = data[[r, c]];
                let index = if cell.is_finite() && cell >= T::zero() && cell.fract() == T::zero()
                {
                    cell.to_usize()
                } else {
                    None
                };

                match index {
                    Some(v) => coords.push(v),
                    None => {
                        return Err(ObservationError::NonIntegralIndex {
                            row: r,
                            column: c,
                            value: cell.to_f64().unwrap_or(f64::NAN),
                        })
                    }
                }
            }
            scores.push(data[[r, arity]]);
        }

        Ok(Self {
            coords,
            scores,
            arity,
        })
    }

    /// Number of observation rows
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of dimensions each row addresses
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Coordinates of row `r` (1-based, as delivered)
    pub fn row(&self, r: usize) -> &[usize] {
        &self.coords[r * self.arity..(r + 1) * self.arity]
    }

    pub fn score(&self, r: usize) -> T {
        self.scores[r]
    }

    pub fn scores(&self) -> &[T] {
        &self.scores
    }

    /// Iterate `(coordinates, score)` pairs in row order
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], T)> + '_ {
        // chunks_exact panics on a zero chunk size
        let width = self.arity.max(1);
        self.coords
            .chunks_exact(width)
            .zip(self.scores.iter().copied())
    }

    /// Largest value observed in each dimension
    ///
    /// Useful to derive cardinalities when the source does not declare them.
    pub fn max_per_dimension(&self) -> Vec<usize> {
        let mut max = vec![0; self.arity];
        for (row, _) in self.iter() {
            for (m, &v) in max.iter_mut().zip(row) {
                *m = (*m).max(v);
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_observation_creation() {
        let obs = ObservationSet::new(vec![vec![1, 2, 1], vec![2, 1, 3]], vec![1.0, -2.0]).unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs.arity(), 3);
        assert_eq!(obs.row(0), &[1, 2, 1]);
        assert_eq!(obs.row(1), &[2, 1, 3]);
        assert_eq!(obs.score(1), -2.0);
    }

    #[test]
    fn test_length_mismatch() {
        let result = ObservationSet::new(vec![vec![1, 1]], vec![1.0, 2.0]);
        assert_eq!(
            result.unwrap_err(),
            ObservationError::LengthMismatch { rows: 1, scores: 2 }
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let result = ObservationSet::new(vec![vec![1, 1], vec![1, 1, 1]], vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ObservationError::ArityMismatch {
                row: 1,
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_from_matrix() {
        let data = array![[1.0, 2.0, 0.5], [2.0, 1.0, -1.5]];
        let obs = ObservationSet::from_matrix(&data.view()).unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs.arity(), 2);
        assert_eq!(obs.row(0), &[1, 2]);
        assert_eq!(obs.scores(), &[0.5, -1.5]);
    }

    #[test]
    fn test_from_matrix_rejects_fractional_index() {
        let data = array![[1.0, 2.5, 0.5]];
        let result = ObservationSet::from_matrix(&data.view());
        assert!(matches!(
            result,
            Err(ObservationError::NonIntegralIndex {
                row: 0,
                column: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_from_matrix_rejects_negative_index() {
        let data = array![[-1.0, 2.0, 0.5]];
        assert!(ObservationSet::from_matrix(&data.view()).is_err());
    }

    #[test]
    fn test_from_matrix_too_narrow() {
        let data = array![[1.0], [2.0]];
        assert_eq!(
            ObservationSet::from_matrix(&data.view()).unwrap_err(),
            ObservationError::MatrixTooNarrow(1)
        );
    }

    #[test]
    fn test_iter_and_max() {
        let obs = ObservationSet::new(vec![vec![1, 4], vec![3, 2]], vec![1.0f32, 1.0]).unwrap();
        let collected: Vec<_> = obs.iter().map(|(c, s)| (c.to_vec(), s)).collect();

        assert_eq!(collected, vec![(vec![1, 4], 1.0), (vec![3, 2], 1.0)]);
        assert_eq!(obs.max_per_dimension(), vec![3, 4]);
    }

    #[test]
    fn test_empty() {
        let obs = ObservationSet::<f64>::empty(3);
        assert!(obs.is_empty());
        assert_eq!(obs.iter().count(), 0);
        assert_eq!(obs.max_per_dimension(), vec![0, 0, 0]);
    }
}
