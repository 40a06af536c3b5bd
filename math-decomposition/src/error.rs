//! Error type shared by all factorizations

use thiserror::Error;

/// Errors that can occur while factoring, solving or updating
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error("Matrix is not square: {rows} x {cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Matrix is singular")]
    Singular,
    #[error("Matrix is not positive definite (failed at row {row})")]
    NotPositiveDefinite { row: usize },
    #[error("Matrix dimensions are incompatible: expected {expected}, got {got}")]
    IncompatibleDimensions { expected: String, got: String },
    #[error("Downdate would make the matrix indefinite (norm {norm} >= 1)")]
    DowndateInfeasible { norm: f64 },
}

impl FactorError {
    /// Integer status code for this error.
    ///
    /// `-1` not square (or infeasible downdate), `-2` singular, `-3`
    /// incompatible dimensions. A matrix that is not positive definite
    /// reports the 1-based row at which the factorization stopped.
    pub fn code(&self) -> i32 {
        match self {
            FactorError::NotSquare { .. } => -1,
            FactorError::Singular => -2,
            FactorError::NotPositiveDefinite { row } => *row as i32,
            FactorError::IncompatibleDimensions { .. } => -3,
            FactorError::DowndateInfeasible { .. } => -1,
        }
    }

    pub(crate) fn not_square(rows: usize, cols: usize) -> Self {
        FactorError::NotSquare { rows, cols }
    }

    pub(crate) fn shape_mismatch(expected: (usize, usize), got: (usize, usize)) -> Self {
        FactorError::IncompatibleDimensions {
            expected: format!("{} x {}", expected.0, expected.1),
            got: format!("{} x {}", got.0, got.1),
        }
    }

    pub(crate) fn length_mismatch(expected: usize, got: usize) -> Self {
        FactorError::IncompatibleDimensions {
            expected: format!("length {}", expected),
            got: format!("length {}", got),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FactorError::not_square(2, 3).code(), -1);
        assert_eq!(FactorError::Singular.code(), -2);
        assert_eq!(FactorError::shape_mismatch((3, 1), (2, 1)).code(), -3);
        assert_eq!(FactorError::NotPositiveDefinite { row: 2 }.code(), 2);
        assert_eq!(FactorError::DowndateInfeasible { norm: 1.5 }.code(), -1);
    }

    #[test]
    fn test_messages() {
        let err = FactorError::shape_mismatch((3, 1), (2, 1));
        assert_eq!(
            err.to_string(),
            "Matrix dimensions are incompatible: expected 3 x 1, got 2 x 1"
        );
        assert_eq!(
            FactorError::length_mismatch(4, 3).to_string(),
            "Matrix dimensions are incompatible: expected length 4, got length 3"
        );
    }
}
