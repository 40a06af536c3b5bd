//! Direct factorizations
//!
//! This module provides the dense decompositions:
//! - [`DoolittleLu`], [`CroutLu`], [`TridiagonalLu`]: LU family sharing the [`LuFactor`] pipeline
//! - [`CholeskyFactor`]: symmetric positive definite systems, with rank-one update/downdate
//! - [`QrFactor`]: Householder QR with column pivoting and Givens rank-one update

mod cholesky;
mod crout;
mod doolittle;
mod lu;
mod qr;
mod tridiagonal;

pub use cholesky::{CholeskyFactor, DowndateStatus};
pub use crout::CroutLu;
pub use doolittle::DoolittleLu;
pub use lu::LuFactor;
pub use qr::QrFactor;
pub use tridiagonal::TridiagonalLu;
