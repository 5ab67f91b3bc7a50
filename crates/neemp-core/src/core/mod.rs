//! # Core Module
//!
//! Stateless building blocks of NEEMP: the molecular data model, the EEM linear
//! solver, file formats and small utilities.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, molecules, atom types and the training set
//! - **Linear Algebra** ([`solver`]) - Packed EEM system assembly and pivoted solve
//! - **File I/O** ([`io`]) - Training-set, parameter and charge files
//! - **Utilities** ([`utils`]) - The bit set used for molecule selection masks

pub mod io;
pub mod models;
pub mod solver;
pub mod utils;
