//! Householder QR factorization with column pivoting
//!
//! `factor` overwrites an `m x n` matrix with `R` on and above the diagonal
//! and the trailing coefficients of each Householder vector below it; the
//! lead coefficients go to a separate vector `u`. `Q` is never formed unless
//! asked for: products with `Q` and `Q^T` replay the stored reflectors.
//!
//! With column pivoting the factorization satisfies `A P = Q R`.

use crate::config::QrConfig;
use crate::dense::{ensure_rhs, ensure_square, identity, permute_rows, upper_triangle};
use crate::error::FactorError;
use crate::pivot::{PivotState, PivotType, Pivoting, solve_upper};
use crate::traits::{LinearSolver, RealField, Solution};
use crate::transform::Givens;
use ndarray::{Array1, Array2, s};
use std::marker::PhantomData;

/// QR solver
#[derive(Debug, Clone)]
pub struct QrFactor<T: RealField> {
    state: PivotState,
    config: QrConfig,
    workspace: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: RealField> Default for QrFactor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField> QrFactor<T> {
    /// Create a solver with max-norm column pivoting
    pub fn new() -> Self {
        Self::with_config(QrConfig::default())
    }

    /// Create a solver with a custom configuration
    pub fn with_config(config: QrConfig) -> Self {
        Self {
            state: PivotState::new(),
            config,
            workspace: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn config(&self) -> &QrConfig {
        &self.config
    }

    /// Permutation state of the last factorization
    pub fn pivot_state(&self) -> &PivotState {
        &self.state
    }

    /// Householder triangularization of `qr` in place.
    ///
    /// `u` is reallocated to `max(m, n)` entries if shorter; entry `k` holds
    /// the lead coefficient of the `k`-th reflector.
    pub fn factor(&mut self, qr: &mut Array2<T>, u: &mut Array1<T>) -> Result<Pivoting, FactorError> {
        let (m, n) = qr.dim();
        if u.len() < m.max(n) {
            *u = Array1::zeros(m.max(n));
        }
        self.state.initialize(PivotType::Column, n);
        let mut pivoting = Pivoting::NONE;
        let two = T::one() + T::one();

        for i in 0..m.min(n) {
            if let Some(strategy) = self.config.column_pivot {
                if i + 1 < n && self.state.column_pivot(qr, i, i, strategy) {
                    pivoting.column = true;
                }
            }

            let mut norm_sqr = T::zero();
            for k in i..m {
                norm_sqr += qr[[k, i]] * qr[[k, i]];
            }
            if norm_sqr == T::zero() {
                // zero column: the reflector is the identity
                u[i] = T::zero();
                continue;
            }

            for k in i..m {
                u[k] = qr[[k, i]];
            }
            let y = u[i].signum_or_one() * norm_sqr.sqrt();
            let nrm = (norm_sqr + y * (y + two * u[i])).sqrt();
            u[i] += y;
            for k in i..m {
                u[k] /= nrm;
            }

            for j in i..n {
                let mut dot = T::zero();
                for k in i..m {
                    dot += u[k] * qr[[k, j]];
                }
                let scale = two * dot;
                for k in i..m {
                    qr[[k, j]] -= scale * u[k];
                }
            }
            for k in (i + 1)..m {
                qr[[k, i]] = u[k];
            }
        }

        log::debug!(
            "Householder QR: {} x {}, {} column swaps",
            m,
            n,
            self.state.column_swaps()
        );
        Ok(pivoting)
    }

    /// Apply reflector `k` (`I - 2 v v^T`) to the rows `k..m` of `b`
    fn apply_reflector(qr: &Array2<T>, u: &Array1<T>, k: usize, b: &mut Array2<T>) {
        let m = qr.nrows();
        let two = T::one() + T::one();
        for j in 0..b.ncols() {
            let mut dot = u[k] * b[[k, j]];
            for i in (k + 1)..m {
                dot += qr[[i, k]] * b[[i, j]];
            }
            if dot == T::zero() {
                continue;
            }
            let scale = two * dot;
            b[[k, j]] -= scale * u[k];
            for i in (k + 1)..m {
                b[[i, j]] -= scale * qr[[i, k]];
            }
        }
    }

    fn check_factorization(qr: &Array2<T>, u: &Array1<T>, b: &Array2<T>) -> Result<(), FactorError> {
        let (m, n) = qr.dim();
        if u.len() < m.min(n) {
            return Err(FactorError::length_mismatch(m.min(n), u.len()));
        }
        ensure_rhs(qr, b)
    }

    /// `Q^T B` for the factorization in `qr`/`u`
    pub fn form_qtb_product(
        &self,
        qr: &Array2<T>,
        u: &Array1<T>,
        b: &Array2<T>,
    ) -> Result<Array2<T>, FactorError> {
        Self::check_factorization(qr, u, b)?;
        let mut out = b.clone();
        for k in 0..qr.nrows().min(qr.ncols()) {
            Self::apply_reflector(qr, u, k, &mut out);
        }
        Ok(out)
    }

    /// `Q X` for the factorization in `qr`/`u`
    pub fn form_qx_product(
        &self,
        qr: &Array2<T>,
        u: &Array1<T>,
        x: &Array2<T>,
    ) -> Result<Array2<T>, FactorError> {
        Self::check_factorization(qr, u, x)?;
        let mut out = x.clone();
        for k in (0..qr.nrows().min(qr.ncols())).rev() {
            Self::apply_reflector(qr, u, k, &mut out);
        }
        Ok(out)
    }

    /// Explicit `m x m` orthogonal factor `Q`
    pub fn orthogonal_matrix(&self, qr: &Array2<T>, u: &Array1<T>) -> Result<Array2<T>, FactorError> {
        self.form_qx_product(qr, u, &identity(qr.nrows()))
    }

    /// Explicit `m x n` upper triangular factor `R`
    pub fn upper_triangle(&self, qr: &Array2<T>) -> Array2<T> {
        upper_triangle(qr, 0)
    }

    /// Back-substitute `R X = Q^T B` and undo the column permutation
    fn solve_factored(
        &mut self,
        qr: &Array2<T>,
        u: &Array1<T>,
        b: &Array2<T>,
    ) -> Result<Array2<T>, FactorError> {
        let (m, n) = qr.dim();
        if (0..m.min(n)).any(|i| qr[[i, i]] == T::zero()) {
            log::warn!("QR solve: R is singular");
            return Err(FactorError::Singular);
        }
        let mut y = self.form_qtb_product(qr, u, b)?;
        solve_upper(qr, &mut y, false);
        let mut x = y.slice(s![..n, ..]).to_owned();
        if self.state.column_swaps() > 0 {
            let w = self.state.inverse_column_permutation();
            permute_rows(&mut x, w, &mut self.workspace);
        }
        Ok(x)
    }

    /// Rank-one update of an explicit factorization `A P = Q R` to that of
    /// `(A + x y^T) P`.
    ///
    /// `q` is `m x m` and `r` is `m x n`; `p` is the column permutation
    /// (`None` when the factorization did not pivot). Both factors are
    /// overwritten.
    pub fn update(
        &self,
        q: &mut Array2<T>,
        r: &mut Array2<T>,
        x: &Array1<T>,
        y: &Array1<T>,
        p: Option<&[usize]>,
    ) -> Result<(), FactorError> {
        let (m, n) = r.dim();
        if q.dim() != (m, m) {
            return Err(FactorError::shape_mismatch((m, m), q.dim()));
        }
        if x.len() != m {
            return Err(FactorError::length_mismatch(m, x.len()));
        }
        if y.len() != n {
            return Err(FactorError::length_mismatch(n, y.len()));
        }
        if let Some(p) = p {
            if p.len() != n {
                return Err(FactorError::length_mismatch(n, p.len()));
            }
        }
        if m == 0 {
            return Ok(());
        }

        // w = Q^T x
        let mut w = q.t().dot(x);

        // reduce w to a multiple of e_0 from the bottom up; R becomes
        // upper Hessenberg
        for i in (1..m).rev() {
            let mut rotation = Givens::identity();
            let (mut a, mut b) = (w[i - 1], w[i]);
            rotation.compute_rotation(&mut a, &mut b);
            w[i - 1] = a;
            w[i] = b;
            rotation.pre_multiply(r, i - 1, i, (i - 1)..n, false);
            rotation.post_multiply(q, i - 1, i, 0..m, true);
        }

        for j in 0..n {
            let yj = match p {
                Some(p) => y[p[j]],
                None => y[j],
            };
            r[[0, j]] += w[0] * yj;
        }

        // restore the triangle from the top down
        for i in 0..(m - 1).min(n) {
            let mut rotation = Givens::identity();
            let (mut a, mut b) = (r[[i, i]], r[[i + 1, i]]);
            rotation.compute_rotation(&mut a, &mut b);
            r[[i, i]] = a;
            r[[i + 1, i]] = b;
            rotation.pre_multiply(r, i, i + 1, (i + 1)..n, false);
            rotation.post_multiply(q, i, i + 1, 0..m, true);
        }
        log::debug!("QR rank-one update: {} x {}", m, n);
        Ok(())
    }
}

impl<T: RealField> LinearSolver<T> for QrFactor<T> {
    /// `det(A) = (-1)^k prod R_ii`, with `k` the number of reflectors plus
    /// the number of column swaps.
    fn determinant(&mut self, a: &mut Array2<T>) -> Result<Solution<T>, FactorError> {
        ensure_square(a)?;
        let mut u = Array1::zeros(a.nrows());
        let pivoting = self.factor(a, &mut u)?;
        let mut value = T::one();
        for i in 0..a.nrows() {
            value *= -a[[i, i]];
        }
        if self.state.column_swaps() % 2 == 1 {
            value = -value;
        }
        Ok(Solution { value, pivoting })
    }

    fn inverse(&mut self, a: &mut Array2<T>) -> Result<Solution<Array2<T>>, FactorError> {
        ensure_square(a)?;
        let mut u = Array1::zeros(a.nrows());
        let pivoting = self.factor(a, &mut u)?;
        let value = self.solve_factored(a, &u, &identity(a.nrows()))?;
        Ok(Solution { value, pivoting })
    }

    /// Solves square systems exactly and overdetermined systems (`m > n`)
    /// in the least-squares sense.
    fn solve(&mut self, a: &Array2<T>, b: &Array2<T>) -> Result<Solution<Array2<T>>, FactorError> {
        let (m, n) = a.dim();
        if m < n {
            return Err(FactorError::IncompatibleDimensions {
                expected: format!("at least {} rows", n),
                got: format!("{} x {}", m, n),
            });
        }
        ensure_rhs(a, b)?;
        let mut qr = a.clone();
        let mut u = Array1::zeros(m);
        let pivoting = self.factor(&mut qr, &mut u)?;
        let value = self.solve_factored(&qr, &u, b)?;
        Ok(Solution { value, pivoting })
    }
}
