//! Tridiagonal LU factorization
//!
//! O(n) elimination of a square tridiagonal matrix without pivoting. The
//! factors are bidiagonal: `L` keeps the sub-diagonal of `A` and carries the
//! pivots, `U` is unit upper with a single super-diagonal. Entries outside
//! the band are never read.

use super::lu::{LuFactor, impl_linear_solver_for_lu};
use crate::dense::ensure_square;
use crate::error::FactorError;
use crate::pivot::{PivotState, PivotType, Pivoting, TriangularMatrixType};
use crate::traits::RealField;
use ndarray::Array2;
use std::marker::PhantomData;

/// Tridiagonal LU solver
///
/// The input must be tridiagonal. Entries off the band are ignored, so a
/// dense matrix is treated as its tridiagonal part and the results refer to
/// that part alone.
#[derive(Debug, Clone, Default)]
pub struct TridiagonalLu<T: RealField> {
    state: PivotState,
    _marker: PhantomData<T>,
}

impl<T: RealField> TridiagonalLu<T> {
    pub fn new() -> Self {
        Self {
            state: PivotState::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: RealField> LuFactor<T> for TridiagonalLu<T> {
    fn triangular_type(&self) -> TriangularMatrixType {
        TriangularMatrixType::Upper
    }

    fn pivot_state(&self) -> &PivotState {
        &self.state
    }

    /// Fails with [`FactorError::Singular`] on an exact zero pivot, since
    /// the band structure leaves no row to pivot with.
    fn factor(&mut self, a: &mut Array2<T>) -> Result<Pivoting, FactorError> {
        ensure_square(a)?;
        let n = a.nrows();
        self.state.initialize(PivotType::Row, n);
        for i in 0..n {
            if i > 0 {
                let correction = a[[i, i - 1]] * a[[i - 1, i]];
                a[[i, i]] -= correction;
            }
            let pivot = a[[i, i]];
            if pivot == T::zero() {
                log::warn!("Tridiagonal LU: zero pivot at row {}", i);
                return Err(FactorError::Singular);
            }
            if i + 1 < n {
                a[[i, i + 1]] /= pivot;
            }
        }
        log::debug!("Tridiagonal LU: {} x {}", n, n);
        Ok(Pivoting::NONE)
    }

    fn solve_lower(&self, lu: &Array2<T>, z: &mut Array2<T>) {
        let n = lu.nrows();
        for j in 0..z.ncols() {
            for i in 0..n {
                let mut value = z[[i, j]];
                if i > 0 {
                    value -= lu[[i, i - 1]] * z[[i - 1, j]];
                }
                z[[i, j]] = value / lu[[i, i]];
            }
        }
    }

    fn solve_upper(&self, lu: &Array2<T>, y: &mut Array2<T>) {
        let n = lu.nrows();
        for j in 0..y.ncols() {
            for i in (0..n.saturating_sub(1)).rev() {
                let next = y[[i + 1, j]];
                y[[i, j]] -= lu[[i, i + 1]] * next;
            }
        }
    }

    fn make_lower_unit_upper(&self, lu: &mut Array2<T>) -> Result<(), FactorError> {
        let n = lu.nrows();
        for j in 0..n {
            let d = lu[[j, j]];
            if d == T::zero() {
                return Err(FactorError::Singular);
            }
            if j + 1 < n {
                lu[[j + 1, j]] /= d;
                lu[[j, j + 1]] *= d;
            }
        }
        Ok(())
    }

    fn make_unit_lower_upper(&self, lu: &mut Array2<T>) -> Result<(), FactorError> {
        let n = lu.nrows();
        for j in 0..n {
            let d = lu[[j, j]];
            if d == T::zero() {
                return Err(FactorError::Singular);
            }
            if j + 1 < n {
                lu[[j + 1, j]] *= d;
                lu[[j, j + 1]] /= d;
            }
        }
        Ok(())
    }
}

impl_linear_solver_for_lu!(TridiagonalLu);
