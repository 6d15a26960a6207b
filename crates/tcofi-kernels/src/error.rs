//! Error types for factor kernel operations
//!
//! Structured errors for the Gram, Hadamard and solve kernels, carrying the
//! operation name so callers can attach their own context (dimension,
//! entry, iteration).

use std::fmt;

/// Error type for factor kernel operations
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Dimension mismatch between operands
    DimensionMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// Invalid mode/dimension specification
    InvalidMode {
        mode: usize,
        max_mode: usize,
        context: String,
    },

    /// Latent rank differs between factor matrices
    RankMismatch {
        operation: String,
        expected_rank: usize,
        actual_rank: usize,
        factor_index: usize,
    },

    /// Empty input not allowed
    EmptyInput {
        operation: String,
        parameter: String,
    },

    /// Cholesky factorization broke down
    NotPositiveDefinite { operation: String, message: String },

    /// A NaN or infinite value entered the kernel
    NonFinite { operation: String, what: String },

    /// Factorization succeeded but the system is numerically degenerate
    IllConditioned { operation: String, condition: f64 },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::DimensionMismatch {
                operation,
                expected,
                actual,
                context,
            } => write!(
                f,
                "{}: dimension mismatch - expected {:?}, got {:?}. {}",
                operation, expected, actual, context
            ),

            KernelError::InvalidMode {
                mode,
                max_mode,
                context,
            } => write!(
                f,
                "Invalid mode {}: must be < {}. {}",
                mode, max_mode, context
            ),

            KernelError::RankMismatch {
                operation,
                expected_rank,
                actual_rank,
                factor_index,
            } => write!(
                f,
                "{}: rank mismatch at factor {}: expected rank {}, got {}",
                operation, factor_index, expected_rank, actual_rank
            ),

            KernelError::EmptyInput {
                operation,
                parameter,
            } => write!(
                f,
                "{}: empty input not allowed for parameter '{}'",
                operation, parameter
            ),

            KernelError::NotPositiveDefinite { operation, message } => write!(
                f,
                "{}: matrix is not positive definite: {}",
                operation, message
            ),

            KernelError::NonFinite { operation, what } => {
                write!(f, "{}: non-finite values in {}", operation, what)
            }

            KernelError::IllConditioned {
                operation,
                condition,
            } => write!(
                f,
                "{}: ill-conditioned system (condition estimate {:.3e})",
                operation, condition
            ),
        }
    }
}

impl std::error::Error for KernelError {}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create an invalid mode error
    pub fn invalid_mode(mode: usize, max_mode: usize, context: impl Into<String>) -> Self {
        KernelError::InvalidMode {
            mode,
            max_mode,
            context: context.into(),
        }
    }

    /// Create a rank mismatch error
    pub fn rank_mismatch(
        operation: impl Into<String>,
        expected_rank: usize,
        actual_rank: usize,
        factor_index: usize,
    ) -> Self {
        KernelError::RankMismatch {
            operation: operation.into(),
            expected_rank,
            actual_rank,
            factor_index,
        }
    }

    /// Create an empty input error
    pub fn empty_input(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        KernelError::EmptyInput {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    pub fn not_positive_definite(operation: impl Into<String>, message: impl Into<String>) -> Self {
        KernelError::NotPositiveDefinite {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn non_finite(operation: impl Into<String>, what: impl Into<String>) -> Self {
        KernelError::NonFinite {
            operation: operation.into(),
            what: what.into(),
        }
    }

    pub fn ill_conditioned(operation: impl Into<String>, condition: f64) -> Self {
        KernelError::IllConditioned {
            operation: operation.into(),
            condition,
        }
    }

    /// Conditioning diagnostic attached to a solve failure
    ///
    /// Infinite when the factorization broke down, NaN when the input was
    /// not finite, `None` for errors unrelated to solving.
    pub fn condition(&self) -> Option<f64> {
        match self {
            KernelError::NotPositiveDefinite { .. } => Some(f64::INFINITY),
            KernelError::NonFinite { .. } => Some(f64::NAN),
            KernelError::IllConditioned { condition, .. } => Some(*condition),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = KernelError::dimension_mismatch(
            "rank_one_update",
            vec![4, 4],
            vec![3],
            "Vector length must match matrix order",
        );

        let msg = format!("{}", err);
        assert!(msg.contains("rank_one_update"));
        assert!(msg.contains("dimension mismatch"));
        assert!(msg.contains("[4, 4]"));
        assert!(msg.contains("[3]"));
    }

    #[test]
    fn test_invalid_mode_display() {
        let err = KernelError::invalid_mode(3, 3, "Model has only 3 dimensions");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid mode 3"));
        assert!(msg.contains("must be < 3"));
    }

    #[test]
    fn test_rank_mismatch_display() {
        let err = KernelError::rank_mismatch("gram_hadamard", 5, 3, 2);

        let msg = format!("{}", err);
        assert!(msg.contains("gram_hadamard"));
        assert!(msg.contains("factor 2"));
        assert!(msg.contains("expected rank 5"));
        assert!(msg.contains("got 3"));
    }

    #[test]
    fn test_not_positive_definite_display() {
        let err = KernelError::not_positive_definite("spd_inverse", "pivot 1 is -0.5");

        let msg = format!("{}", err);
        assert!(msg.contains("spd_inverse"));
        assert!(msg.contains("not positive definite"));
        assert!(msg.contains("pivot 1"));
    }

    #[test]
    fn test_non_finite_display() {
        let err = KernelError::non_finite("spd_inverse", "input matrix");
        assert_eq!(err.to_string(), "spd_inverse: non-finite values in input matrix");
        assert!(err.condition().unwrap().is_nan());
    }

    #[test]
    fn test_condition_diagnostic() {
        let err = KernelError::ill_conditioned("spd_inverse", 1e17);
        assert_eq!(err.condition(), Some(1e17));
        assert!(err.to_string().contains("1.000e17"));

        let err = KernelError::not_positive_definite("spd_inverse", "pivot 0");
        assert_eq!(err.condition(), Some(f64::INFINITY));

        let err = KernelError::empty_input("gram_hadamard", "factors");
        assert_eq!(err.condition(), None);
    }
}
