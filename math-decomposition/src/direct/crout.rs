//! Crout LU factorization
//!
//! Column-oriented dual of Doolittle: each step finishes a column of the
//! general lower factor, then the matching row of the unit upper factor.

use super::doolittle::prepare_bennett;
use super::lu::{LuFactor, impl_linear_solver_for_lu, reduce_column, reduce_row};
use crate::error::FactorError;
use crate::pivot::{PivotState, PivotType, Pivoting, TriangularMatrixType};
use crate::traits::RealField;
use ndarray::{Array1, Array2};
use std::marker::PhantomData;

/// Crout LU solver
#[derive(Debug, Clone, Default)]
pub struct CroutLu<T: RealField> {
    state: PivotState,
    _marker: PhantomData<T>,
}

impl<T: RealField> CroutLu<T> {
    pub fn new() -> Self {
        Self {
            state: PivotState::new(),
            _marker: PhantomData,
        }
    }

    /// Rank-one update of a compact square Crout factorization.
    ///
    /// Bennett's recurrence carried out on the unit-upper convention: the
    /// lower column and upper row of each step are rescaled by the old and
    /// new pivot so that `U` stays unit triangular.
    pub fn update(
        &self,
        lu: &mut Array2<T>,
        x: &Array1<T>,
        y: &Array1<T>,
        p: Option<&[usize]>,
    ) -> Result<(), FactorError> {
        let (mut x, mut y) = prepare_bennett(lu, x, y, p)?;
        let n = lu.nrows();
        for i in 0..n {
            let xi = x[i];
            let old_pivot = lu[[i, i]];
            if old_pivot == T::zero() {
                return Err(FactorError::Singular);
            }
            let pivot = old_pivot + xi * y[i];
            if pivot == T::zero() {
                log::warn!("Crout update: zero pivot at row {}", i);
                return Err(FactorError::Singular);
            }
            lu[[i, i]] = pivot;
            let yi = y[i] / pivot;
            y[i] = yi;
            for j in (i + 1)..n {
                let beta = lu[[j, i]] / old_pivot;
                x[j] -= xi * beta;
                lu[[j, i]] = pivot * (beta + yi * x[j]);
            }
            for j in (i + 1)..n {
                let beta = lu[[i, j]] * old_pivot + xi * y[j];
                lu[[i, j]] = beta / pivot;
                y[j] -= yi * beta;
            }
        }
        Ok(())
    }
}

impl<T: RealField> LuFactor<T> for CroutLu<T> {
    fn triangular_type(&self) -> TriangularMatrixType {
        TriangularMatrixType::Upper
    }

    fn pivot_state(&self) -> &PivotState {
        &self.state
    }

    fn factor(&mut self, a: &mut Array2<T>) -> Result<Pivoting, FactorError> {
        let (m, n) = a.dim();
        self.state.initialize(PivotType::Row, m);
        let mut pivoting = Pivoting::NONE;
        for i in 0..m.min(n) {
            reduce_column(a, i);
            if i + 1 < m && self.state.row_pivot(a, i) {
                pivoting.row = true;
            }
            reduce_row(a, i);
            let pivot = a[[i, i]];
            if pivot != T::zero() {
                for j in (i + 1)..n {
                    a[[i, j]] /= pivot;
                }
            }
        }
        log::debug!(
            "Crout LU: {} x {}, {} row swaps",
            m,
            n,
            self.state.row_swaps()
        );
        Ok(pivoting)
    }
}

impl_linear_solver_for_lu!(CroutLu);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LinearSolver;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, epsilon: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = epsilon);
        }
    }

    #[test]
    fn test_unit_upper_convention() {
        let a = array![[4.0, 2.0], [2.0, 5.0]];
        let mut lu = a.clone();
        let mut solver = CroutLu::new();
        assert_eq!(solver.factor(&mut lu), Ok(Pivoting::NONE));
        // L = [[4, 0], [2, 4]], U = [[1, 0.5], [0, 1]]
        assert_relative_eq!(lu[[0, 0]], 4.0);
        assert_relative_eq!(lu[[0, 1]], 0.5);
        assert_relative_eq!(lu[[1, 0]], 2.0);
        assert_relative_eq!(lu[[1, 1]], 4.0);

        let u = solver.upper_triangle(&lu);
        assert_eq!(u, array![[1.0, 0.5], [0.0, 1.0]]);
        assert_close(&solver.lower_triangle(&lu).dot(&u), &a, 1e-14);
    }

    #[test]
    fn test_solve_and_determinant() {
        let a = array![[1.0, 3.0, -2.0], [5.0, -1.0, 0.0], [2.0, 2.0, 7.0]];
        let b = array![[1.0, 0.0], [2.0, 1.0], [-1.0, 3.0]];
        let mut solver = CroutLu::new();
        let x = solver.solve(&a, &b).expect("solve should succeed");
        assert!(x.pivoting.row);
        assert_close(&a.dot(&x.value), &b, 1e-12);

        // det = 1*(-7) - 3*35 + (-2)*12
        let det = solver
            .determinant(&mut a.clone())
            .expect("determinant should succeed");
        assert_relative_eq!(det.value, -136.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_matches_refactor() {
        let a = array![[5.0, 1.0, -1.0], [2.0, 6.0, 1.0], [-1.0, 1.0, 4.0]];
        let x = array![0.4, -0.6, 0.2];
        let y = array![-0.3, 0.5, 0.7];
        let mut lu = a.clone();
        let mut solver = CroutLu::new();
        assert_eq!(solver.factor(&mut lu), Ok(Pivoting::NONE));
        solver.update(&mut lu, &x, &y, None).expect("update should succeed");

        let mut updated = a.clone();
        for i in 0..3 {
            for j in 0..3 {
                updated[[i, j]] += x[i] * y[j];
            }
        }
        let mut expected = updated.clone();
        assert_eq!(solver.factor(&mut expected), Ok(Pivoting::NONE));
        assert_close(&lu, &expected, 1e-12);
    }
}
