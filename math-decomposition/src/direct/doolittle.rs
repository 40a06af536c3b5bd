//! Doolittle LU factorization
//!
//! Row-oriented elimination with partial row pivoting producing a unit lower
//! `L` and a general upper `U`. Also provides two rank-one updates of an
//! existing factorization:
//! - [`DoolittleLu::update`]: Bennett's algorithm, no new pivoting
//! - [`DoolittleLu::update_pivoted`]: Schwetlick/Kielbasinski re-triangularization
//!   with stability-gated row interchanges

use super::lu::{LuFactor, impl_linear_solver_for_lu, reduce_column, reduce_row};
use crate::config::LuUpdateConfig;
use crate::error::FactorError;
use crate::pivot::{PivotState, PivotType, Pivoting, TriangularMatrixType, solve_lower_permuted};
use crate::traits::RealField;
use ndarray::{Array1, Array2};
use std::marker::PhantomData;

/// Doolittle LU solver
#[derive(Debug, Clone)]
pub struct DoolittleLu<T: RealField> {
    state: PivotState,
    config: LuUpdateConfig,
    _marker: PhantomData<T>,
}

impl<T: RealField> Default for DoolittleLu<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField> DoolittleLu<T> {
    /// Create a solver with the default update configuration
    pub fn new() -> Self {
        Self::with_config(LuUpdateConfig::default())
    }

    /// Create a solver with a custom update configuration
    pub fn with_config(config: LuUpdateConfig) -> Self {
        Self {
            state: PivotState::new(),
            config,
            _marker: PhantomData,
        }
    }

    /// Update configuration
    pub fn config(&self) -> &LuUpdateConfig {
        &self.config
    }

    /// Rank-one update of a compact square factorization (Bennett).
    ///
    /// Given the factorization of `P A` in `lu`, overwrite it with the
    /// factorization of `P (A + x y^T)` without re-pivoting. `p` is the row
    /// permutation of the existing factorization, if it pivoted.
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
            lu[[i, i]] += xi * y[i];
            let pivot = lu[[i, i]];
            if pivot == T::zero() {
                log::warn!("Bennett update: zero pivot at row {}", i);
                return Err(FactorError::Singular);
            }
            let yi = y[i] / pivot;
            y[i] = yi;
            for j in (i + 1)..n {
                x[j] -= xi * lu[[j, i]];
                lu[[j, i]] += yi * x[j];
            }
            for j in (i + 1)..n {
                lu[[i, j]] += xi * y[j];
                y[j] -= yi * lu[[i, j]];
            }
        }
        Ok(())
    }

    /// Rank-one update with row interchanges (Schwetlick/Kielbasinski).
    ///
    /// `l` is the `m x m` unit lower factor, `u` the `m x n` upper factor and
    /// `p` the row permutation with `P A = L U`. On return they describe
    /// `P' (A + x y^T) = L' U'`; `p` is updated in place.
    ///
    /// The rank-one term is first folded into the first row of `U` by
    /// eliminating `L^-1 P x` from the bottom up, which leaves `U` upper
    /// Hessenberg; a top-down sweep then restores the triangle. Whenever the
    /// pivot of a 2x2 elimination is smaller than `stability_threshold` times
    /// the pivot an interchange would produce, the two rows are swapped first.
    pub fn update_pivoted(
        &mut self,
        l: &mut Array2<T>,
        u: &mut Array2<T>,
        p: &mut [usize],
        x: &Array1<T>,
        y: &Array1<T>,
    ) -> Result<(), FactorError> {
        let m = l.nrows();
        let n = u.ncols();
        if l.ncols() != m {
            return Err(FactorError::not_square(m, l.ncols()));
        }
        if u.nrows() != m {
            return Err(FactorError::shape_mismatch((m, n), u.dim()));
        }
        if x.len() != m {
            return Err(FactorError::length_mismatch(m, x.len()));
        }
        if y.len() != n {
            return Err(FactorError::length_mismatch(n, y.len()));
        }
        if p.len() != m {
            return Err(FactorError::length_mismatch(m, p.len()));
        }
        self.state.initialize_from(PivotType::Row, p)?;
        if m == 0 {
            return Ok(());
        }
        let tau = T::from_f64_lossy(self.config.stability_threshold);
        let mut interchanges = 0usize;

        // w = L^-1 P x
        let rhs = x.clone().insert_axis(ndarray::Axis(1));
        let mut w = solve_lower_permuted(l, p, &rhs, true).column(0).to_owned();

        for i in (1..m).rev() {
            let candidate = l[[i, i - 1]] * w[i - 1] + w[i];
            if needs_interchange(w[i - 1], w[i], candidate, tau) {
                w.swap(i, i - 1);
                self.interchange(l, u, i - 1, i - 1);
                let wi = w[i];
                w[i - 1] += l_fix(l, u, i - 1, i - 1) * wi;
                interchanges += 1;
            }
            if w[i] != T::zero() {
                let scale = -w[i] / w[i - 1];
                w[i] = T::zero();
                for k in i..m {
                    let l_ki = l[[k, i]];
                    l[[k, i - 1]] -= scale * l_ki;
                }
                for j in (i - 1)..n {
                    let u_prev = u[[i - 1, j]];
                    u[[i, j]] += scale * u_prev;
                }
            }
        }

        for j in 0..n {
            u[[0, j]] += w[0] * y[j];
        }

        for i in 0..(m - 1).min(n) {
            let candidate = l[[i + 1, i]] * u[[i, i]] + u[[i + 1, i]];
            if needs_interchange(u[[i, i]], u[[i + 1, i]], candidate, tau) {
                self.interchange(l, u, i, i);
                l_fix(l, u, i, i);
                interchanges += 1;
            }
            let sub = u[[i + 1, i]];
            if sub != T::zero() {
                let scale = -sub / u[[i, i]];
                u[[i + 1, i]] = T::zero();
                for j in (i + 1)..n {
                    let u_ij = u[[i, j]];
                    u[[i + 1, j]] += scale * u_ij;
                }
                for k in (i + 1)..m {
                    let l_next = l[[k, i + 1]];
                    l[[k, i]] -= scale * l_next;
                }
            }
        }

        p.copy_from_slice(self.state.permutation_vector(PivotType::Row));
        log::debug!(
            "Pivoted LU update: {} x {}, {} interchanges",
            m,
            n,
            interchanges
        );
        Ok(())
    }

    /// Interchange rows `i` and `i + 1` of the product: rows and columns of
    /// `L`, rows of `U` from column `from` on, and the row permutation.
    fn interchange(&mut self, l: &mut Array2<T>, u: &mut Array2<T>, i: usize, from: usize) {
        let m = l.nrows();
        let n = u.ncols();
        self.state.row_swap(l, i, i + 1, 0..(i + 2), false);
        self.state.column_swap(l, i, i + 1, i..m, false);
        self.state.row_swap(u, i, i + 1, from..n, true);
    }
}

/// Whether a 2x2 elimination with `pivot` above `below` should interchange
/// the rows first. `candidate` is the pivot the interchange would produce.
fn needs_interchange<T: RealField>(pivot: T, below: T, candidate: T, tau: T) -> bool {
    if pivot == T::zero() {
        below != T::zero()
    } else {
        pivot.abs() < tau * candidate.abs()
    }
}

/// Remove the super-diagonal entry `L[i, i + 1]` left by [`DoolittleLu::interchange`]
/// by a column operation on `L` and the matching row operation on `U`.
/// Returns the eliminated multiplier.
fn l_fix<T: RealField>(l: &mut Array2<T>, u: &mut Array2<T>, i: usize, from: usize) -> T {
    let m = l.nrows();
    let n = u.ncols();
    let factor = l[[i, i + 1]];
    for k in i..m {
        let l_ki = l[[k, i]];
        l[[k, i + 1]] -= factor * l_ki;
    }
    for j in from..n {
        let u_next = u[[i + 1, j]];
        u[[i, j]] += factor * u_next;
    }
    factor
}

/// Validate a Bennett update and return working copies of `P x` and `y`
pub(crate) fn prepare_bennett<T: RealField>(
    lu: &Array2<T>,
    x: &Array1<T>,
    y: &Array1<T>,
    p: Option<&[usize]>,
) -> Result<(Array1<T>, Array1<T>), FactorError> {
    let (n, cols) = lu.dim();
    if n != cols {
        return Err(FactorError::not_square(n, cols));
    }
    if x.len() != n {
        return Err(FactorError::length_mismatch(n, x.len()));
    }
    if y.len() != n {
        return Err(FactorError::length_mismatch(n, y.len()));
    }
    let x = match p {
        Some(p) => {
            if p.len() != n {
                return Err(FactorError::length_mismatch(n, p.len()));
            }
            p.iter().map(|&k| x[k]).collect()
        }
        None => x.clone(),
    };
    Ok((x, y.clone()))
}

impl<T: RealField> LuFactor<T> for DoolittleLu<T> {
    fn triangular_type(&self) -> TriangularMatrixType {
        TriangularMatrixType::Lower
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
                for k in (i + 1)..m {
                    a[[k, i]] /= pivot;
                }
            }
        }
        log::debug!(
            "Doolittle LU: {} x {}, {} row swaps",
            m,
            n,
            self.state.row_swaps()
        );
        Ok(pivoting)
    }
}

impl_linear_solver_for_lu!(DoolittleLu);
