//! # EEM Solver Module
//!
//! Assembly and solution of the per-molecule Electronegativity Equalization
//! Method linear system.
//!
//! For a molecule of `n` atoms, the charges `q` and the equalized
//! electronegativity `X` satisfy, for every atom `i`,
//!
//! ```text
//! A_i + B_i * q_i + kappa * sum_{j != i} q_j / R_ij = X
//! sum_i q_i = Q
//! ```
//!
//! which is a symmetric indefinite (n+1)x(n+1) system assembled in packed
//! upper-triangular storage and solved with a pivoted factorization.

pub mod eem;
pub mod packed;
