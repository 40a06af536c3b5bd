//! Pivoting and permutation core
//!
//! This module provides the pieces shared by every elimination order:
//! - [`PivotState`]: row/column permutation bookkeeping and pivot search
//! - [`select_pivot_column`]: column selection rule for a [`ColumnPivotStrategy`]
//! - [`solve_upper`] / [`solve_lower`]: generic triangular substitution

mod state;
mod substitution;

pub use state::{PivotState, inverse_permutation, is_permutation};
pub use substitution::{solve_lower, solve_lower_permuted, solve_upper};

use crate::traits::RealField;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a permutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotType {
    /// Row permutation (`P A`)
    Row,
    /// Column permutation (`A Q`)
    Column,
}

/// Rule used to pick the pivot column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPivotStrategy {
    /// Column holding the largest magnitude entry of the pivot row
    MaxElement,
    /// Remaining column with the largest 2-norm over the trailing rows
    MaxNorm,
    /// First column whose entry in the pivot row is non-zero
    NonZeroElement,
}

/// Which triangle of a compact factorization carries the pivots
///
/// `Lower` means the lower factor is unit triangular (the pivots live on the
/// diagonal of `U`), `Upper` means the upper factor is unit triangular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangularMatrixType {
    /// Unit lower triangle, general upper triangle (Doolittle)
    Lower,
    /// General lower triangle, unit upper triangle (Crout, tridiagonal)
    Upper,
}

impl fmt::Display for PivotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotType::Row => write!(f, "Row"),
            PivotType::Column => write!(f, "Column"),
        }
    }
}

impl fmt::Display for ColumnPivotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnPivotStrategy::MaxElement => write!(f, "MaxElement"),
            ColumnPivotStrategy::MaxNorm => write!(f, "MaxNorm"),
            ColumnPivotStrategy::NonZeroElement => write!(f, "NonZeroElement"),
        }
    }
}

impl fmt::Display for TriangularMatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriangularMatrixType::Lower => write!(f, "Lower"),
            TriangularMatrixType::Upper => write!(f, "Upper"),
        }
    }
}

/// Pivoting performed by a factorization
///
/// Reported as a bitmask through [`Pivoting::code`]: 1 = row, 2 = column,
/// 3 = both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pivoting {
    /// At least one row interchange occurred
    pub row: bool,
    /// At least one column interchange occurred
    pub column: bool,
}

impl Pivoting {
    /// No pivoting
    pub const NONE: Pivoting = Pivoting {
        row: false,
        column: false,
    };

    /// Integer bitmask of the pivoting that occurred
    pub fn code(self) -> i32 {
        (self.row as i32) | ((self.column as i32) << 1)
    }

    /// Whether any interchange occurred
    pub fn any(self) -> bool {
        self.row || self.column
    }
}

/// Pick the pivot column for step `j` according to `strategy`.
///
/// `row` is the row scanned by [`ColumnPivotStrategy::MaxElement`] and
/// [`ColumnPivotStrategy::NonZeroElement`]. The returned index is `>= j`;
/// it equals `j` when no better column exists.
pub fn select_pivot_column<T: RealField>(
    a: &Array2<T>,
    j: usize,
    row: usize,
    strategy: ColumnPivotStrategy,
) -> usize {
    let (m, n) = a.dim();
    match strategy {
        ColumnPivotStrategy::MaxElement => {
            let mut k = j;
            for i in (j + 1)..n {
                if a[[row, k]].abs() < a[[row, i]].abs() {
                    k = i;
                }
            }
            k
        }
        ColumnPivotStrategy::MaxNorm => {
            let mut k = j;
            let mut max_norm_sqr = T::zero();
            for l in j..n {
                let norm_sqr = (j..m).fold(T::zero(), |acc, r| acc + a[[r, l]] * a[[r, l]]);
                if norm_sqr > max_norm_sqr {
                    max_norm_sqr = norm_sqr;
                    k = l;
                }
            }
            k
        }
        ColumnPivotStrategy::NonZeroElement => {
            (j..n).find(|&k| a[[row, k]] != T::zero()).unwrap_or(j)
        }
    }
}
