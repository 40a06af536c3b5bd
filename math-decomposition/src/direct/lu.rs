//! Shared LU pipeline
//!
//! Every LU variant factors `P A = L U` into a single compact matrix: the
//! strictly lower entries hold `L`, the diagonal and above hold `U`, and
//! whichever factor is unit triangular (see [`TriangularMatrixType`]) has its
//! diagonal left implicit. Only [`LuFactor::factor`] differs between the
//! elimination orders; determinant, solve and inverse are composed from it
//! here.

use crate::dense::{diagonal_product, ensure_rhs, ensure_square, has_nonzero_diagonal};
use crate::error::FactorError;
use crate::pivot::{self, PivotState, PivotType, Pivoting, TriangularMatrixType};
use crate::traits::{RealField, Solution};
use ndarray::Array2;

/// Shared contract of the LU family
pub trait LuFactor<T: RealField> {
    /// Which factor is unit triangular in the compact storage
    fn triangular_type(&self) -> TriangularMatrixType;

    /// Permutation state of the last factorization
    fn pivot_state(&self) -> &PivotState;

    /// Factor `a` in place into its compact `L U` form.
    ///
    /// A zero pivot is not an error here; callers test the product with
    /// [`LuFactor::is_product_nonsingular`] before solving.
    fn factor(&mut self, a: &mut Array2<T>) -> Result<Pivoting, FactorError>;

    /// Whether `L U` is nonsingular (every pivot is non-zero)
    fn is_product_nonsingular(&self, lu: &Array2<T>) -> bool {
        has_nonzero_diagonal(lu)
    }

    /// Forward substitution `L Z = B`, overwriting `z`
    fn solve_lower(&self, lu: &Array2<T>, z: &mut Array2<T>) {
        let unit = self.triangular_type() == TriangularMatrixType::Lower;
        pivot::solve_lower(lu, z, unit);
    }

    /// Back substitution `U Y = Z`, overwriting `y`
    fn solve_upper(&self, lu: &Array2<T>, y: &mut Array2<T>) {
        let unit = self.triangular_type() == TriangularMatrixType::Upper;
        pivot::solve_upper(lu, y, unit);
    }

    /// Explicit `L` factor (`m x min(m, n)`) of a compact factorization
    fn lower_triangle(&self, lu: &Array2<T>) -> Array2<T> {
        let (m, n) = lu.dim();
        let r = m.min(n);
        let unit = self.triangular_type() == TriangularMatrixType::Lower;
        let mut l = Array2::zeros((m, r));
        for i in 0..m {
            for j in 0..r.min(i + 1) {
                l[[i, j]] = if i == j && unit { T::one() } else { lu[[i, j]] };
            }
        }
        l
    }

    /// Explicit `U` factor (`min(m, n) x n`) of a compact factorization
    fn upper_triangle(&self, lu: &Array2<T>) -> Array2<T> {
        let (m, n) = lu.dim();
        let r = m.min(n);
        let unit = self.triangular_type() == TriangularMatrixType::Upper;
        let mut u = Array2::zeros((r, n));
        for i in 0..r {
            for j in i..n {
                u[[i, j]] = if i == j && unit { T::one() } else { lu[[i, j]] };
            }
        }
        u
    }

    /// Convert a unit-upper compact factorization into the unit-lower
    /// convention in place (columns of `L` divided, rows of `U` multiplied
    /// by the diagonal).
    fn make_lower_unit_upper(&self, lu: &mut Array2<T>) -> Result<(), FactorError> {
        let (m, n) = lu.dim();
        for j in 0..m.min(n) {
            let d = lu[[j, j]];
            if d == T::zero() {
                return Err(FactorError::Singular);
            }
            for i in (j + 1)..m {
                lu[[i, j]] /= d;
            }
            for k in (j + 1)..n {
                lu[[j, k]] *= d;
            }
        }
        Ok(())
    }

    /// Convert a unit-lower compact factorization into the unit-upper
    /// convention in place.
    fn make_unit_lower_upper(&self, lu: &mut Array2<T>) -> Result<(), FactorError> {
        let (m, n) = lu.dim();
        for j in 0..m.min(n) {
            let d = lu[[j, j]];
            if d == T::zero() {
                return Err(FactorError::Singular);
            }
            for i in (j + 1)..m {
                lu[[i, j]] *= d;
            }
            for k in (j + 1)..n {
                lu[[j, k]] /= d;
            }
        }
        Ok(())
    }

    /// Solve `L U X = B` against an existing compact factorization.
    ///
    /// No permutation is applied; pass `P B` when the factorization pivoted,
    /// or use [`LuFactor::solve_factored`].
    fn solve_lower_upper(&self, lu: &Array2<T>, b: &Array2<T>) -> Result<Array2<T>, FactorError> {
        ensure_square(lu)?;
        ensure_rhs(lu, b)?;
        if !self.is_product_nonsingular(lu) {
            log::warn!("LU solve: zero pivot in factorization");
            return Err(FactorError::Singular);
        }
        let mut x = b.clone();
        self.solve_lower(lu, &mut x);
        self.solve_upper(lu, &mut x);
        Ok(x)
    }

    /// Solve `A X = B` against the compact factorization of `A` produced by
    /// the last call to [`LuFactor::factor`], applying its row permutation.
    ///
    /// Fails with [`FactorError::IncompatibleDimensions`] when the stored
    /// permutation does not belong to a factorization of `lu`'s size.
    fn solve_factored(&self, lu: &Array2<T>, b: &Array2<T>) -> Result<Array2<T>, FactorError> {
        ensure_square(lu)?;
        ensure_rhs(lu, b)?;
        if !self.is_product_nonsingular(lu) {
            log::warn!("LU solve: zero pivot in factorization");
            return Err(FactorError::Singular);
        }
        let p = self.pivot_state().permutation_vector(PivotType::Row);
        if p.len() != lu.nrows() {
            return Err(FactorError::length_mismatch(lu.nrows(), p.len()));
        }
        let mut x = Array2::zeros(b.raw_dim());
        for (i, &pi) in p.iter().enumerate() {
            x.row_mut(i).assign(&b.row(pi));
        }
        self.solve_lower(lu, &mut x);
        self.solve_upper(lu, &mut x);
        Ok(x)
    }

    /// Factor `a` in place and solve `A X = B`
    fn factor_solve(
        &mut self,
        a: &mut Array2<T>,
        b: &Array2<T>,
    ) -> Result<Solution<Array2<T>>, FactorError> {
        ensure_square(a)?;
        ensure_rhs(a, b)?;
        let pivoting = self.factor(a)?;
        let value = self.solve_factored(a, b)?;
        Ok(Solution { value, pivoting })
    }

    /// Factor `a` in place and return `det(A)`
    fn lu_determinant(&mut self, a: &mut Array2<T>) -> Result<Solution<T>, FactorError> {
        ensure_square(a)?;
        let pivoting = self.factor(a)?;
        let mut value = diagonal_product(a);
        if self.pivot_state().is_odd() {
            value = -value;
        }
        Ok(Solution { value, pivoting })
    }

    /// Factor `a` in place and return `A^-1`
    fn lu_inverse(&mut self, a: &mut Array2<T>) -> Result<Solution<Array2<T>>, FactorError> {
        ensure_square(a)?;
        let pivoting = self.factor(a)?;
        if !self.is_product_nonsingular(a) {
            log::warn!("LU inverse: matrix is singular");
            return Err(FactorError::Singular);
        }
        let mut value = if pivoting.row {
            self.pivot_state().permutation_matrix(PivotType::Row)
        } else {
            crate::dense::identity(a.nrows())
        };
        self.solve_lower(a, &mut value);
        self.solve_upper(a, &mut value);
        Ok(Solution { value, pivoting })
    }
}

/// Implement [`crate::LinearSolver`] for an LU variant by delegating to its
/// [`LuFactor`] pipeline.
macro_rules! impl_linear_solver_for_lu {
    ($ty:ident) => {
        impl<T: $crate::traits::RealField> $crate::traits::LinearSolver<T> for $ty<T> {
            fn determinant(
                &mut self,
                a: &mut ndarray::Array2<T>,
            ) -> Result<$crate::traits::Solution<T>, $crate::error::FactorError> {
                $crate::direct::LuFactor::lu_determinant(self, a)
            }

            fn inverse(
                &mut self,
                a: &mut ndarray::Array2<T>,
            ) -> Result<$crate::traits::Solution<ndarray::Array2<T>>, $crate::error::FactorError>
            {
                $crate::direct::LuFactor::lu_inverse(self, a)
            }

            fn solve(
                &mut self,
                a: &ndarray::Array2<T>,
                b: &ndarray::Array2<T>,
            ) -> Result<$crate::traits::Solution<ndarray::Array2<T>>, $crate::error::FactorError>
            {
                let mut lu = a.clone();
                $crate::direct::LuFactor::factor_solve(self, &mut lu, b)
            }
        }
    };
}

pub(crate) use impl_linear_solver_for_lu;

/// Reduce column `i` of the compact factorization for rows `i..m` by the
/// already computed parts of `L` and `U`.
pub(crate) fn reduce_column<T: RealField>(a: &mut Array2<T>, i: usize) {
    let m = a.nrows();
    for k in i..m {
        let mut sum = T::zero();
        for p in 0..i {
            sum += a[[k, p]] * a[[p, i]];
        }
        a[[k, i]] -= sum;
    }
}

/// Reduce row `i` of the compact factorization for columns `i + 1..n`
pub(crate) fn reduce_row<T: RealField>(a: &mut Array2<T>, i: usize) {
    let n = a.ncols();
    for j in (i + 1)..n {
        let mut sum = T::zero();
        for p in 0..i {
            sum += a[[i, p]] * a[[p, j]];
        }
        a[[i, j]] -= sum;
    }
}
