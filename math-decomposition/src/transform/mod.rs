//! Orthogonal transformations used by the update algorithms

mod givens;

pub use givens::Givens;
