//! Cholesky factorization of symmetric positive definite matrices
//!
//! The lower factor `L` with `A = L L^T` is computed in place; the strictly
//! upper triangle is cleared. Rank-one [`CholeskyFactor::update`] and
//! [`CholeskyFactor::downdate`] modify an existing factor with a sequence of
//! plane rotations in O(n^2), following LINPACK `dchud`/`dchdd`.

use crate::dense::{
    diagonal_product, ensure_rhs, ensure_square, identity, inner_product, vector_norm,
};
use crate::error::FactorError;
use crate::pivot::{Pivoting, solve_lower, solve_upper};
use crate::traits::{LinearSolver, RealField, Solution};
use crate::transform::Givens;
use ndarray::{Array1, Array2, s};
use std::marker::PhantomData;

/// Outcome of an augmented downdate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DowndateStatus {
    /// Every residual norm was downdated
    Complete,
    /// At least one residual norm could not be downdated and was set to `-1`
    PartialResiduals,
}

/// Cholesky solver
#[derive(Debug, Clone, Default)]
pub struct CholeskyFactor<T: RealField> {
    _marker: PhantomData<T>,
}

impl<T: RealField> CholeskyFactor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Overwrite `a` with its lower Cholesky factor.
    ///
    /// Only the lower triangle of `a` is read. Fails with
    /// [`FactorError::NotPositiveDefinite`] carrying the 1-based row whose
    /// reduced diagonal is not positive.
    pub fn factor(&self, a: &mut Array2<T>) -> Result<(), FactorError> {
        ensure_square(a)?;
        let n = a.nrows();
        for i in 0..n {
            for j in 0..i {
                let mut sum = T::zero();
                for k in 0..j {
                    sum += a[[i, k]] * a[[j, k]];
                }
                a[[i, j]] = (a[[i, j]] - sum) / a[[j, j]];
            }
            let mut diagonal = a[[i, i]];
            for k in 0..i {
                diagonal -= a[[i, k]] * a[[i, k]];
            }
            if diagonal <= T::zero() {
                log::debug!("Cholesky: non-positive pivot {} at row {}", diagonal, i);
                return Err(FactorError::NotPositiveDefinite { row: i + 1 });
            }
            a[[i, i]] = diagonal.sqrt();
        }
        for i in 0..n {
            for j in (i + 1)..n {
                a[[i, j]] = T::zero();
            }
        }
        log::debug!("Cholesky: {} x {}", n, n);
        Ok(())
    }

    /// Solve `L L^T X = B` against an existing factor
    pub fn solve_factored(&self, l: &Array2<T>, b: &Array2<T>) -> Result<Array2<T>, FactorError> {
        ensure_square(l)?;
        ensure_rhs(l, b)?;
        let mut x = b.clone();
        solve_lower(l, &mut x, false);
        let lt = l.t().to_owned();
        solve_upper(&lt, &mut x, false);
        Ok(x)
    }

    /// Rank-one update: overwrite `l` with the factor of `L L^T + x x^T`.
    ///
    /// Returns the rotations applied, one per column.
    pub fn update(&self, l: &mut Array2<T>, x: &Array1<T>) -> Result<Vec<Givens<T>>, FactorError> {
        check_factor_and_vector(l, x)?;
        let n = l.nrows();
        let mut rotations: Vec<Givens<T>> = Vec::with_capacity(n);
        for j in 0..n {
            let mut xj = x[j];
            // rotations of the previous columns act on row j
            for (i, rotation) in rotations.iter().enumerate() {
                let (r, rest) = rotation.rotate(l[[j, i]], xj);
                l[[j, i]] = r;
                xj = rest;
            }
            let mut rotation = Givens::identity();
            let mut rjj = l[[j, j]];
            rotation.compute_rotation(&mut rjj, &mut xj);
            l[[j, j]] = rjj;
            rotations.push(rotation);
        }
        Ok(rotations)
    }

    /// Rank-one update that also carries right-hand sides.
    ///
    /// `z` holds `n x k` vectors `Z` of a least-squares system with the
    /// extra observations `y` (length `k`) and residual norms `rho`; all
    /// three are updated alongside `l`. A negative `rho[j]` marks a residual
    /// that is not tracked and is left as is.
    pub fn update_augmented(
        &self,
        l: &mut Array2<T>,
        x: &Array1<T>,
        z: &mut Array2<T>,
        y: &Array1<T>,
        rho: &mut Array1<T>,
    ) -> Result<Vec<Givens<T>>, FactorError> {
        check_augmented(l, z, y, rho)?;
        let rotations = self.update(l, x)?;
        for j in 0..z.ncols() {
            let mut zeta = y[j];
            for (i, rotation) in rotations.iter().enumerate() {
                let (value, rest) = rotation.rotate(z[[i, j]], zeta);
                z[[i, j]] = value;
                zeta = rest;
            }
            let azeta = zeta.abs();
            if azeta != T::zero() && rho[j] >= T::zero() {
                let scale = azeta + rho[j];
                let a = azeta / scale;
                let b = rho[j] / scale;
                rho[j] = scale * (a * a + b * b).sqrt();
            }
        }
        Ok(rotations)
    }

    /// Rank-one downdate: overwrite `l` with the factor of `L L^T - x x^T`.
    ///
    /// Fails with [`FactorError::DowndateInfeasible`] (leaving `l` untouched)
    /// when `||L^-1 x|| >= 1`, i.e. when the result would not be positive
    /// definite.
    pub fn downdate(
        &self,
        l: &mut Array2<T>,
        x: &Array1<T>,
    ) -> Result<Vec<Givens<T>>, FactorError> {
        check_factor_and_vector(l, x)?;
        let n = l.nrows();
        if l.diag().iter().any(|&d| d == T::zero()) {
            return Err(FactorError::Singular);
        }

        let mut w = x.clone();
        for j in 0..n {
            let reduced = w[j] - inner_product(l.slice(s![j, ..j]), w.slice(s![..j]));
            w[j] = reduced / l[[j, j]];
        }
        let norm = vector_norm(&w);
        if norm >= T::one() {
            let norm = norm.to_f64().unwrap_or(f64::INFINITY);
            log::warn!("Cholesky downdate infeasible: ||L^-1 x|| = {}", norm);
            return Err(FactorError::DowndateInfeasible { norm });
        }

        let mut alpha = (T::one() - norm * norm).sqrt();
        let mut rotations = vec![Givens::identity(); n];
        for i in (0..n).rev() {
            let scale = alpha + w[i].abs();
            let a = alpha / scale;
            let b = w[i] / scale;
            let nrm = (a * a + b * b).sqrt();
            rotations[i] = Givens::new(a / nrm, -(b / nrm));
            alpha = scale * nrm;
        }

        for j in 0..n {
            let mut xx = T::zero();
            for i in (0..=j).rev() {
                let (value, r) = rotations[i].rotate(xx, l[[j, i]]);
                xx = value;
                l[[j, i]] = r;
            }
        }
        Ok(rotations)
    }

    /// Rank-one downdate that also carries right-hand sides.
    ///
    /// Counterpart of [`CholeskyFactor::update_augmented`]. A residual norm
    /// that cannot be downdated is set to `-1` and reported through
    /// [`DowndateStatus::PartialResiduals`]; the other columns are still
    /// processed.
    pub fn downdate_augmented(
        &self,
        l: &mut Array2<T>,
        x: &Array1<T>,
        z: &mut Array2<T>,
        y: &Array1<T>,
        rho: &mut Array1<T>,
    ) -> Result<DowndateStatus, FactorError> {
        check_augmented(l, z, y, rho)?;
        let rotations = self.downdate(l, x)?;
        let mut status = DowndateStatus::Complete;
        for j in 0..z.ncols() {
            let mut zeta = y[j];
            for (i, rotation) in rotations.iter().enumerate() {
                let (c, s) = (rotation.cos(), rotation.sin());
                let value = (z[[i, j]] + s * zeta) / c;
                z[[i, j]] = value;
                zeta = c * zeta + s * value;
            }
            let azeta = zeta.abs();
            if azeta > rho[j] {
                log::warn!("Cholesky downdate: residual norm {} rejected", j);
                rho[j] = -T::one();
                status = DowndateStatus::PartialResiduals;
            } else if rho[j] > T::zero() {
                let ratio = azeta / rho[j];
                rho[j] *= (T::one() - ratio * ratio).sqrt();
            }
        }
        Ok(status)
    }
}

fn check_factor_and_vector<T: RealField>(l: &Array2<T>, x: &Array1<T>) -> Result<(), FactorError> {
    ensure_square(l)?;
    if x.len() != l.nrows() {
        return Err(FactorError::length_mismatch(l.nrows(), x.len()));
    }
    Ok(())
}

fn check_augmented<T: RealField>(
    l: &Array2<T>,
    z: &Array2<T>,
    y: &Array1<T>,
    rho: &Array1<T>,
) -> Result<(), FactorError> {
    if z.nrows() != l.nrows() {
        return Err(FactorError::shape_mismatch(
            (l.nrows(), z.ncols()),
            z.dim(),
        ));
    }
    if y.len() != z.ncols() {
        return Err(FactorError::length_mismatch(z.ncols(), y.len()));
    }
    if rho.len() != z.ncols() {
        return Err(FactorError::length_mismatch(z.ncols(), rho.len()));
    }
    Ok(())
}

impl<T: RealField> LinearSolver<T> for CholeskyFactor<T> {
    fn determinant(&mut self, a: &mut Array2<T>) -> Result<Solution<T>, FactorError> {
        self.factor(a)?;
        let root = diagonal_product(a);
        Ok(Solution {
            value: root * root,
            pivoting: Pivoting::NONE,
        })
    }

    fn inverse(&mut self, a: &mut Array2<T>) -> Result<Solution<Array2<T>>, FactorError> {
        self.factor(a)?;
        let value = self.solve_factored(a, &identity(a.nrows()))?;
        Ok(Solution {
            value,
            pivoting: Pivoting::NONE,
        })
    }

    fn solve(&mut self, a: &Array2<T>, b: &Array2<T>) -> Result<Solution<Array2<T>>, FactorError> {
        ensure_square(a)?;
        ensure_rhs(a, b)?;
        let mut l = a.clone();
        self.factor(&mut l)?;
        let value = self.solve_factored(&l, b)?;
        Ok(Solution {
            value,
            pivoting: Pivoting::NONE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, epsilon: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = epsilon);
        }
    }

    fn spd() -> Array2<f64> {
        array![[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]]
    }

    fn outer(x: &Array1<f64>) -> Array2<f64> {
        let column = x.clone().insert_axis(ndarray::Axis(1));
        column.dot(&column.t())
    }

    #[test]
    fn test_factor_known_matrix() {
        let mut l = spd();
        let solver = CholeskyFactor::new();
        solver.factor(&mut l).expect("factor should succeed");
        let expected = array![[2.0, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]];
        assert_close(&l, &expected, 1e-14);
        assert_close(&l.dot(&l.t()), &spd(), 1e-12);
    }

    #[test]
    fn test_not_positive_definite() {
        let solver = CholeskyFactor::new();
        let mut a = array![[1.0, 2.0], [2.0, 1.0]];
        let err = solver.factor(&mut a).unwrap_err();
        assert_eq!(err, FactorError::NotPositiveDefinite { row: 2 });
        assert_eq!(err.code(), 2);

        let mut negative = array![[-1.0]];
        assert_eq!(solver.factor(&mut negative).unwrap_err().code(), 1);

        let mut rect = Array2::<f64>::zeros((2, 3));
        assert_eq!(solver.factor(&mut rect).unwrap_err().code(), -1);
    }

    #[test]
    fn test_determinant_inverse_solve() {
        let mut solver = CholeskyFactor::new();
        let det = solver.determinant(&mut spd()).expect("det should succeed");
        // (2 * 1 * 3)^2
        assert_relative_eq!(det.value, 36.0, epsilon = 1e-10);

        let inv = solver.inverse(&mut spd()).expect("inverse should succeed");
        assert_close(&spd().dot(&inv.value), &Array2::eye(3), 1e-10);

        let b = array![1.0, 2.0, 3.0];
        let x = solver.solve_vector(&spd(), &b).expect("solve should succeed");
        let ax = spd().dot(&x.value);
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
        }
        assert_eq!(x.pivoting, Pivoting::NONE);
    }

    #[test]
    fn test_update_matches_refactor() {
        let solver = CholeskyFactor::new();
        let x = array![1.0, -2.0, 0.5];
        let mut l = spd();
        solver.factor(&mut l).expect("factor should succeed");
        let rotations = solver.update(&mut l, &x).expect("update should succeed");
        assert_eq!(rotations.len(), 3);

        let mut expected = spd() + outer(&x);
        solver.factor(&mut expected).expect("factor should succeed");
        assert_close(&l, &expected, 1e-12);
    }

    #[test]
    fn test_update_from_zero_diagonal() {
        // all edge cases of the rotation: zero diagonal and zero x entries
        let solver = CholeskyFactor::new();
        let mut l = Array2::<f64>::zeros((2, 2));
        solver
            .update(&mut l, &array![3.0, 0.0])
            .expect("update should succeed");
        assert_close(&l, &array![[3.0, 0.0], [0.0, 0.0]], 1e-14);
    }

    #[test]
    fn test_downdate_matches_refactor() {
        let solver = CholeskyFactor::new();
        let x = array![0.2, 0.5, 0.1];
        let mut l = spd();
        solver.factor(&mut l).expect("factor should succeed");
        solver.downdate(&mut l, &x).expect("downdate should succeed");

        let mut expected = spd() - outer(&x);
        solver.factor(&mut expected).expect("factor should succeed");
        assert_close(&l, &expected, 1e-12);
    }

    #[test]
    fn test_downdate_infeasible_leaves_factor() {
        let solver = CholeskyFactor::new();
        let mut l = spd();
        solver.factor(&mut l).expect("factor should succeed");
        let before = l.clone();
        // x = L e_0 * 2 gives ||L^-1 x|| = 2
        let x = array![4.0, 12.0, -16.0];
        match solver.downdate(&mut l, &x) {
            Err(FactorError::DowndateInfeasible { norm }) => assert_relative_eq!(norm, 2.0),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(l, before);
    }

    #[test]
    fn test_augmented_update_and_downdate() {
        let solver = CholeskyFactor::new();
        let mut l = spd();
        solver.factor(&mut l).expect("factor should succeed");
        let original_l = l.clone();

        let mut z = array![[1.0], [2.0], [3.0]];
        let original_z = z.clone();
        let mut rho = array![0.5];
        let x = array![0.5, -0.5, 1.0];
        let y = array![0.75];

        solver
            .update_augmented(&mut l, &x, &mut z, &y, &mut rho)
            .expect("update should succeed");
        assert!(rho[0] > 0.5);

        // downdating the same observation restores the original system
        let status = solver
            .downdate_augmented(&mut l, &x, &mut z, &y, &mut rho)
            .expect("downdate should succeed");
        assert_eq!(status, DowndateStatus::Complete);
        assert_close(&l, &original_l, 1e-10);
        assert_close(&z, &original_z, 1e-10);
        assert_relative_eq!(rho[0], 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_augmented_downdate_rejects_residual() {
        let solver = CholeskyFactor::new();
        let mut l = spd();
        solver.factor(&mut l).expect("factor should succeed");
        let mut z = array![[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]];
        let mut rho = array![0.1, 10.0];
        let y = array![5.0, 5.0];
        let status = solver
            .downdate_augmented(&mut l, &array![0.1, 0.0, 0.0], &mut z, &y, &mut rho)
            .expect("downdate should succeed");
        assert_eq!(status, DowndateStatus::PartialResiduals);
        assert_relative_eq!(rho[0], -1.0);
        assert!(rho[1] > 0.0 && rho[1] < 10.0);
    }
}
