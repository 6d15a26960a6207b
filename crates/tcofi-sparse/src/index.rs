//! Per-mode tensor index over an observation set
//!
//! For every dimension `i` and every value `j ∈ 0..cardᵢ` the index stores the
//! ordered list of observation rows whose `i`-th coordinate is `j` (0-based).
//! Values that never occur map to an empty list, so the index always covers
//! the full declared range.
//!
//! # Format
//!
//! Each mode is stored in a compressed layout, the same idea as CSR row
//! pointers:
//! - `offsets`: `Vec<usize>` of length `cardᵢ + 1`
//! - `rows`: `Vec<usize>` of length `nnz`, grouped by value, increasing row
//!   order inside each group
//!
//! Rows touching value `j` are `rows[offsets[j]..offsets[j + 1]]`.
//!
//! # Examples
//!
//! ```
//! use tcofi_sparse::{ObservationSet, TensorIndex};
//!
//! let obs = ObservationSet::new(
//!     vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![3, 2]],
//!     vec![5.0, 1.0, 3.0, 4.0],
//! ).unwrap();
//!
//! let index = TensorIndex::build(&obs, &[3, 2]).unwrap();
//!
//! // User 0 (delivered as 1) appears in rows 0 and 1
//! assert_eq!(index.rows(0, 0), &[0, 1]);
//! // Item 1 (delivered as 2) appears in rows 1 and 3
//! assert_eq!(index.rows(1, 1), &[1, 3]);
//! assert_eq!(index.occurrence_counts(0), vec![2, 1, 1]);
//! ```

use crate::observations::{ObservationError, ObservationSet};
use scirs2_core::numeric::Float;

/// Row lists for one dimension
#[derive(Debug, Clone)]
struct ModeIndex {
    offsets: Vec<usize>,
    rows: Vec<usize>,
}

impl ModeIndex {
    fn entry(&self, value: usize) -> &[usize] {
        &self.rows[self.offsets[value]..self.offsets[value + 1]]
    }
}

/// Inverted index from (dimension, value) to observation rows, plus the
/// 0-based coordinates of every observation.
#[derive(Debug, Clone)]
pub struct TensorIndex {
    cardinalities: Vec<usize>,
    modes: Vec<ModeIndex>,
    /// 0-based coordinates, row-major, `arity` per row
    coords: Vec<usize>,
    n_rows: usize,
}

impl TensorIndex {
    /// Build the index for `observations` against declared `cardinalities`
    ///
    /// # Errors
    ///
    /// - [`ObservationError::EmptyDimensions`] if no cardinality is given
    /// - [`ObservationError::ZeroCardinality`] if a dimension is empty
    /// - [`ObservationError::ArityMismatch`] if rows do not address exactly
    ///   `cardinalities.len()` dimensions
    /// - [`ObservationError::DimensionBounds`] if any 1-based value lies
    ///   outside `1..=cardᵢ`
    ///
    /// # Complexity
    ///
    /// Time: O(k × (n + Σᵢ cardᵢ))
    /// Space: O(k × n + Σᵢ cardᵢ)
    pub fn build<T: Float>(
        observations: &ObservationSet<T>,
        cardinalities: &[usize],
    ) -> Result<Self, ObservationError> {
        let k = cardinalities.len();
        if k == 0 {
            return Err(ObservationError::EmptyDimensions);
        }
        if let Some(dim) = cardinalities.iter().position(|&c| c == 0) {
            return Err(ObservationError::ZeroCardinality(dim));
        }
        if !observations.is_empty() && observations.arity() != k {
            return Err(ObservationError::ArityMismatch {
                row: 0,
                expected: k,
                actual: observations.arity(),
            });
        }

        let n_rows = observations.len();

        // Validate and convert to 0-based in one pass
        let mut coords = Vec::with_capacity(n_rows * k);
        for (r, (row, _)) in observations.iter().enumerate() {
            for (dimension, (&value, &cardinality)) in row.iter().zip(cardinalities).enumerate() {
                if value == 0 || value > cardinality {
                    return Err(ObservationError::DimensionBounds {
                        dimension,
                        row: r,
                        value,
                        cardinality,
                    });
                }
                coords.push(value - 1);
            }
        }

        // Counting sort per mode keeps rows in increasing order within each value
        let modes = cardinalities
            .iter()
            .enumerate()
            .map(|(dim, &cardinality)| {
                let mut offsets = vec![0usize; cardinality + 1];
                for r in 0..n_rows {
                    offsets[coords[r * k + dim] + 1] += 1;
                }
                for v in 0..cardinality {
                    offsets[v + 1] += offsets[v];
                }

                let mut cursor = offsets.clone();
                let mut rows = vec![0usize; n_rows];
                for r in 0..n_rows {
                    let v = coords[r * k + dim];
                    rows[cursor[v]] = r;
                    cursor[v] += 1;
                }

                ModeIndex { offsets, rows }
            })
            .collect();

        log::debug!(
            "built tensor index: {} observations over cardinalities {:?}",
            n_rows,
            cardinalities
        );

        Ok(Self {
            cardinalities: cardinalities.to_vec(),
            modes,
            coords,
            n_rows,
        })
    }

    /// Number of dimensions
    pub fn n_dims(&self) -> usize {
        self.cardinalities.len()
    }

    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    pub fn cardinality(&self, dimension: usize) -> usize {
        self.cardinalities[dimension]
    }

    /// Number of indexed observation rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Ordered observation rows touching `value` (0-based) of `dimension`
    pub fn rows(&self, dimension: usize, value: usize) -> &[usize] {
        self.modes[dimension].entry(value)
    }

    /// 0-based coordinates of observation row `r`
    pub fn coordinates(&self, r: usize) -> &[usize] {
        let k = self.n_dims();
        &self.coords[r * k..(r + 1) * k]
    }

    /// Number of observation rows referencing each value of `dimension`
    pub fn occurrence_counts(&self, dimension: usize) -> Vec<usize> {
        self.modes[dimension]
            .offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect()
    }

    /// Occurrence counts for all dimensions, in dimension order
    pub fn all_occurrence_counts(&self) -> Vec<Vec<usize>> {
        (0..self.n_dims())
            .map(|d| self.occurrence_counts(d))
            .collect()
    }
}
