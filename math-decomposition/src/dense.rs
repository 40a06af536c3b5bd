//! Dense matrix helpers
//!
//! The factorizations operate on `ndarray::Array2` directly. This module
//! supplies the handful of container operations they need on top of it:
//! triangle extraction, diagonal assignment, in-place row permutation and
//! dimension checks, plus the small vector kernels used by the updates.

use crate::error::FactorError;
use crate::traits::RealField;
use ndarray::{Array1, Array2, ArrayView1};

/// Whether `a` has as many rows as columns
#[inline]
pub fn is_square<T>(a: &Array2<T>) -> bool {
    a.nrows() == a.ncols()
}

/// Fail with [`FactorError::NotSquare`] unless `a` is square
#[inline]
pub fn ensure_square<T>(a: &Array2<T>) -> Result<(), FactorError> {
    if is_square(a) {
        Ok(())
    } else {
        Err(FactorError::not_square(a.nrows(), a.ncols()))
    }
}

/// Check that `A X = B` is well formed for an `X` of shape `(x_rows, x_cols)`
pub fn is_compatible<T>(a: &Array2<T>, x_rows: usize, x_cols: usize, b: &Array2<T>) -> bool {
    a.ncols() == x_rows && x_cols == b.ncols() && a.nrows() == b.nrows()
}

/// Fail with [`FactorError::IncompatibleDimensions`] unless `b` has as many
/// rows as `a`
#[inline]
pub fn ensure_rhs<T>(a: &Array2<T>, b: &Array2<T>) -> Result<(), FactorError> {
    if is_compatible(a, a.ncols(), b.ncols(), b) {
        Ok(())
    } else {
        Err(FactorError::shape_mismatch(
            (a.nrows(), b.ncols()),
            (b.nrows(), b.ncols()),
        ))
    }
}

/// `n x n` identity matrix
#[inline]
pub fn identity<T: RealField>(n: usize) -> Array2<T> {
    let mut a = Array2::zeros((n, n));
    set_band(&mut a, T::one(), T::zero());
    a
}

/// Entries of `a` on or below diagonal offset `k`, zero elsewhere.
///
/// `k = 0` keeps the main diagonal, `k = -1` starts strictly below it.
pub fn lower_triangle<T: RealField>(a: &Array2<T>, k: isize) -> Array2<T> {
    let mut out = a.clone();
    for ((i, j), value) in out.indexed_iter_mut() {
        if (j as isize) - (i as isize) > k {
            *value = T::zero();
        }
    }
    out
}

/// Entries of `a` on or above diagonal offset `k`, zero elsewhere.
///
/// `k = 0` keeps the main diagonal, `k = 1` starts strictly above it.
pub fn upper_triangle<T: RealField>(a: &Array2<T>, k: isize) -> Array2<T> {
    let mut out = a.clone();
    for ((i, j), value) in out.indexed_iter_mut() {
        if (j as isize) - (i as isize) < k {
            *value = T::zero();
        }
    }
    out
}

/// Set every main-diagonal entry of `a` to `value`
pub fn set_diagonal<T: RealField>(a: &mut Array2<T>, value: T) {
    a.diag_mut().fill(value);
}

/// Set the main diagonal of `a` to `diagonal` and every other entry to
/// `off_diagonal`
pub fn set_band<T: RealField>(a: &mut Array2<T>, diagonal: T, off_diagonal: T) {
    for ((i, j), value) in a.indexed_iter_mut() {
        *value = if i == j { diagonal } else { off_diagonal };
    }
}

/// Whether every main-diagonal entry of `a` is non-zero
pub fn has_nonzero_diagonal<T: RealField>(a: &Array2<T>) -> bool {
    a.diag().iter().all(|&d| d != T::zero())
}

/// Product of the main-diagonal entries of `a`
pub fn diagonal_product<T: RealField>(a: &Array2<T>) -> T {
    a.diag().iter().fold(T::one(), |acc, &d| acc * d)
}

/// Permute the rows of `a` in place so that row `i` becomes the former row
/// `perm[i]`.
///
/// `workspace` is resized to `perm.len()` and used to track visited cycles,
/// so no copy of the matrix is made.
pub fn permute_rows<T: RealField>(a: &mut Array2<T>, perm: &[usize], workspace: &mut Vec<usize>) {
    let n = a.ncols();
    workspace.clear();
    workspace.extend_from_slice(perm);
    for start in 0..perm.len() {
        if workspace[start] == usize::MAX {
            continue;
        }
        let mut i = start;
        loop {
            let next = workspace[i];
            workspace[i] = usize::MAX;
            if next == start {
                break;
            }
            for j in 0..n {
                a.swap([i, j], [next, j]);
            }
            i = next;
        }
    }
}

/// Dot product of two views of equal length
#[inline]
pub fn inner_product<T: RealField>(x: ArrayView1<T>, y: ArrayView1<T>) -> T {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Euclidean norm
#[inline]
pub fn vector_norm<T: RealField>(x: &Array1<T>) -> T {
    inner_product(x.view(), x.view()).sqrt()
}

/// Largest absolute entry-wise difference between two matrices of equal shape
pub fn max_abs_diff<T: RealField>(a: &Array2<T>, b: &Array2<T>) -> T {
    assert_eq!(a.dim(), b.dim(), "Matrix shapes must match");
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc.max((x - y).abs()))
}
