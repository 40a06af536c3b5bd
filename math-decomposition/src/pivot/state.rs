//! Permutation bookkeeping for pivoted factorizations

use super::{ColumnPivotStrategy, PivotType, select_pivot_column};
use crate::error::FactorError;
use crate::traits::RealField;
use ndarray::Array2;
use std::ops::Range;

/// Row/column permutation state of a factorization.
///
/// Reset at the start of every factorization and read afterwards by the
/// solve, inverse and determinant paths. The vectors always hold a
/// bijection on `[0, n)`; the parity of the swap counters gives the sign
/// of the permutation.
#[derive(Debug, Clone, Default)]
pub struct PivotState {
    /// Row permutation: row `i` of `P A` is row `p[i]` of `A`
    p: Vec<usize>,
    /// Column permutation: column `j` of `A Q` is column `q[j]` of `A`
    q: Vec<usize>,
    /// Scratch permutation (inverse of `q` once computed)
    w: Vec<usize>,
    row_swaps: usize,
    column_swaps: usize,
}

impl PivotState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the permutation of the given type to the identity of `size`
    /// and clear both swap counters.
    pub fn initialize(&mut self, pivot_type: PivotType, size: usize) {
        let target = self.vector_mut(pivot_type);
        target.clear();
        target.extend(0..size);
        if pivot_type == PivotType::Column {
            self.w.resize(size, 0);
        }
        self.row_swaps = 0;
        self.column_swaps = 0;
    }

    /// Reset the permutation of the given type from an existing permutation
    /// vector and clear both swap counters.
    pub fn initialize_from(
        &mut self,
        pivot_type: PivotType,
        permutation: &[usize],
    ) -> Result<(), FactorError> {
        if !is_permutation(permutation) {
            return Err(FactorError::IncompatibleDimensions {
                expected: format!("permutation of 0..{}", permutation.len()),
                got: format!("{:?}", permutation),
            });
        }
        let size = permutation.len();
        let target = self.vector_mut(pivot_type);
        target.clear();
        target.extend_from_slice(permutation);
        if pivot_type == PivotType::Column {
            self.w.resize(size, 0);
        }
        self.row_swaps = 0;
        self.column_swaps = 0;
        Ok(())
    }

    fn vector_mut(&mut self, pivot_type: PivotType) -> &mut Vec<usize> {
        match pivot_type {
            PivotType::Row => &mut self.p,
            PivotType::Column => &mut self.q,
        }
    }

    /// Number of row interchanges since the last initialization
    pub fn row_swaps(&self) -> usize {
        self.row_swaps
    }

    /// Number of column interchanges since the last initialization
    pub fn column_swaps(&self) -> usize {
        self.column_swaps
    }

    /// Whether the combined permutation is odd (flips a determinant's sign)
    pub fn is_odd(&self) -> bool {
        (self.row_swaps + self.column_swaps) % 2 == 1
    }

    /// Row or column permutation vector
    pub fn permutation_vector(&self, pivot_type: PivotType) -> &[usize] {
        match pivot_type {
            PivotType::Row => &self.p,
            PivotType::Column => &self.q,
        }
    }

    /// Row or column permutation matrix.
    ///
    /// The row matrix `P` satisfies `P A = A[p, :]`; the column matrix `Q`
    /// satisfies `A Q = A[:, q]`.
    pub fn permutation_matrix<T: RealField>(&self, pivot_type: PivotType) -> Array2<T> {
        let perm = self.permutation_vector(pivot_type);
        let n = perm.len();
        let mut matrix = Array2::zeros((n, n));
        for (i, &pi) in perm.iter().enumerate() {
            match pivot_type {
                PivotType::Row => matrix[[i, pi]] = T::one(),
                PivotType::Column => matrix[[pi, i]] = T::one(),
            }
        }
        matrix
    }

    /// Compute the inverse of the column permutation into the workspace
    pub fn inverse_column_permutation(&mut self) -> &[usize] {
        self.w.resize(self.q.len(), 0);
        for (j, &qj) in self.q.iter().enumerate() {
            self.w[qj] = j;
        }
        &self.w
    }

    /// Partial pivoting on column `i`: move the largest magnitude entry of
    /// rows `i..m` into row `i`. Returns `true` if rows were swapped.
    pub fn row_pivot<T: RealField>(&mut self, a: &mut Array2<T>, i: usize) -> bool {
        let (m, n) = a.dim();
        let mut k = i;
        for j in (i + 1)..m {
            if a[[k, i]].abs() < a[[j, i]].abs() {
                k = j;
            }
        }
        self.row_swap(a, i, k, 0..n, true)
    }

    /// Swap rows `i` and `k` of `a` over `columns`.
    ///
    /// The swap is always counted; the row permutation vector is only
    /// updated when `update_permutation` is set.
    pub fn row_swap<T: RealField>(
        &mut self,
        a: &mut Array2<T>,
        i: usize,
        k: usize,
        columns: Range<usize>,
        update_permutation: bool,
    ) -> bool {
        if i == k {
            return false;
        }
        self.row_swaps += 1;
        if update_permutation {
            self.p.swap(i, k);
        }
        for j in columns {
            a.swap([i, j], [k, j]);
        }
        log::trace!("row swap {} <-> {}", i, k);
        true
    }

    /// Column pivoting at step `j` using `strategy` (scanning `row` where the
    /// strategy needs a row). Returns `true` if columns were swapped.
    pub fn column_pivot<T: RealField>(
        &mut self,
        a: &mut Array2<T>,
        j: usize,
        row: usize,
        strategy: ColumnPivotStrategy,
    ) -> bool {
        let k = select_pivot_column(a, j, row, strategy);
        let m = a.nrows();
        self.column_swap(a, j, k, 0..m, true)
    }

    /// Swap columns `j` and `k` of `a` over `rows`.
    pub fn column_swap<T: RealField>(
        &mut self,
        a: &mut Array2<T>,
        j: usize,
        k: usize,
        rows: Range<usize>,
        update_permutation: bool,
    ) -> bool {
        if j == k {
            return false;
        }
        self.column_swaps += 1;
        if update_permutation {
            self.q.swap(j, k);
        }
        for i in rows {
            a.swap([i, j], [i, k]);
        }
        log::trace!("column swap {} <-> {}", j, k);
        true
    }
}

/// Check that `perm` is a bijection on `[0, perm.len())`
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &index in perm {
        if index >= perm.len() || seen[index] {
            return false;
        }
        seen[index] = true;
    }
    true
}

/// Inverse of a permutation vector: `inverse[perm[i]] == i`
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &pi) in perm.iter().enumerate() {
        inverse[pi] = i;
    }
    inverse
}
