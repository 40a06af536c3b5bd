//! Core traits for dense factorizations
//!
//! This module defines the abstractions shared by every decomposition in the crate:
//! - [`RealField`]: Trait for the scalar types the factorizations operate on
//! - [`LinearSolver`]: Capability interface implemented by each factorization family

use crate::error::FactorError;
use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display};

/// Trait for scalar types that can be used in the factorizations.
///
/// The algorithms only need field arithmetic, comparison against zero,
/// `abs` and `sqrt`, all of which come with [`Float`].
///
/// # Implementations
///
/// Blanket-implemented, in practice for:
/// - `f64` (default for most applications)
/// - `f32` (for memory-constrained applications)
pub trait RealField:
    Float + NumAssign + FromPrimitive + Debug + Display + Send + Sync + 'static
{
    /// Sign of the value, with zero mapped to `+1`
    #[inline]
    fn signum_or_one(self) -> Self {
        if self < Self::zero() {
            -Self::one()
        } else {
            Self::one()
        }
    }

    /// Create from an `f64` constant
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::nan)
    }
}

impl<T> RealField for T where
    T: Float + NumAssign + FromPrimitive + Debug + Display + Send + Sync + 'static
{
}

/// Result of a factor-and-compute operation.
///
/// Carries the computed value together with the pivoting that the
/// factorization performed to obtain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<V> {
    /// Computed value (solution, inverse or determinant)
    pub value: V,
    /// Pivoting performed by the underlying factorization
    pub pivoting: crate::pivot::Pivoting,
}

/// Trait for factorizations that can be used to solve linear systems.
///
/// Every family (LU, Cholesky, QR) implements this capability interface.
/// Methods that take `&mut Array2<T>` overwrite the input with the compact
/// factorization; callers that need the original must copy it first.
pub trait LinearSolver<T: RealField> {
    /// Factor `a` in place and return the determinant of the original matrix
    fn determinant(&mut self, a: &mut Array2<T>) -> Result<Solution<T>, FactorError>;

    /// Factor `a` in place and return the inverse of the original matrix
    fn inverse(&mut self, a: &mut Array2<T>) -> Result<Solution<Array2<T>>, FactorError>;

    /// Solve `A X = B` without modifying `a` or `b`
    fn solve(&mut self, a: &Array2<T>, b: &Array2<T>)
    -> Result<Solution<Array2<T>>, FactorError>;

    /// Solve `A x = b` for a single right-hand side
    fn solve_vector(
        &mut self,
        a: &Array2<T>,
        b: &Array1<T>,
    ) -> Result<Solution<Array1<T>>, FactorError> {
        let rhs = b.clone().insert_axis(ndarray::Axis(1));
        let solution = self.solve(a, &rhs)?;
        Ok(Solution {
            value: solution.value.column(0).to_owned(),
            pivoting: solution.pivoting,
        })
    }
}
