//! Generic dense triangular substitution

use crate::traits::RealField;
use ndarray::Array2;

/// Solve `U Y = Z` in place, overwriting `y` (which holds `Z` on entry).
///
/// Only the leading `n x n` upper triangle of `u` is referenced, where
/// `n = u.ncols()`; rows of `y` beyond `n` are left untouched. When `unit`
/// is set the diagonal of `u` is taken to be one.
pub fn solve_upper<T: RealField>(u: &Array2<T>, y: &mut Array2<T>, unit: bool) {
    let n = u.ncols();
    let p = y.ncols();
    for i in (0..n).rev() {
        let u_ii = u[[i, i]];
        for j in 0..p {
            let mut sum = T::zero();
            for k in (i + 1)..n {
                sum += u[[i, k]] * y[[k, j]];
            }
            let mut value = y[[i, j]] - sum;
            if !unit {
                value /= u_ii;
            }
            y[[i, j]] = value;
        }
    }
}

/// Solve `L Z = B` in place, overwriting `z` (which holds `B` on entry).
///
/// The first `l.nrows()` rows are solved. When `unit` is set the diagonal
/// of `l` is taken to be one.
pub fn solve_lower<T: RealField>(l: &Array2<T>, z: &mut Array2<T>, unit: bool) {
    let m = l.nrows();
    let q = z.ncols();
    for i in 0..m {
        let l_ii = l[[i, i]];
        for j in 0..q {
            let mut sum = T::zero();
            for k in 0..i {
                sum += l[[i, k]] * z[[k, j]];
            }
            let mut value = z[[i, j]] - sum;
            if !unit {
                value /= l_ii;
            }
            z[[i, j]] = value;
        }
    }
}

/// Solve `L Z = P B` where `P` is the row permutation `p`.
///
/// Returns `Z`; `b` is left untouched.
pub fn solve_lower_permuted<T: RealField>(
    l: &Array2<T>,
    p: &[usize],
    b: &Array2<T>,
    unit: bool,
) -> Array2<T> {
    let m = l.nrows();
    let mut z = Array2::zeros((m, b.ncols()));
    for (i, &pi) in p.iter().enumerate().take(m) {
        z.row_mut(i).assign(&b.row(pi));
    }
    solve_lower(l, &mut z, unit);
    z
}
