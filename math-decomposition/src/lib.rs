//! Dense matrix factorizations and linear solves
//!
//! This crate provides a family of direct decompositions built over a shared
//! pivoting core, each able to factor, solve, invert and compute a
//! determinant, plus incremental rank-one updates that avoid re-factoring.
//!
//! # Features
//!
//! - **LU**: Doolittle and Crout with partial row pivoting, O(n) tridiagonal
//! - **Cholesky**: SPD factorization with LINPACK-style update/downdate
//! - **QR**: Householder with selectable column pivoting, implicit `Q`
//! - **Rank-one updates**: Bennett and pivoted LU updates, Givens QR update
//! - **Generic Scalar Types**: Works with f64 and f32
//!
//! # Example
//!
//! ```
//! use math_audio_decomposition::{DoolittleLu, LinearSolver};
//! use ndarray::array;
//!
//! let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
//! let b = array![[1.0], [2.0]];
//!
//! let mut solver = DoolittleLu::new();
//! let x = solver.solve(&a, &b).expect("system is nonsingular");
//! assert!((a.dot(&x.value) - &b).iter().all(|r| r.abs() < 1e-12));
//! ```

pub mod config;
pub mod dense;
pub mod direct;
pub mod error;
pub mod pivot;
pub mod traits;
pub mod transform;

// Re-export main types
pub use config::{DecompositionConfig, LuUpdateConfig, QrConfig};
pub use error::FactorError;
pub use traits::{LinearSolver, RealField, Solution};

// Re-export pivoting core
pub use pivot::{
    ColumnPivotStrategy, PivotState, PivotType, Pivoting, TriangularMatrixType, solve_lower,
    solve_upper,
};

// Re-export factorizations
pub use direct::{
    CholeskyFactor, CroutLu, DoolittleLu, DowndateStatus, LuFactor, QrFactor, TridiagonalLu,
};
pub use transform::Givens;
