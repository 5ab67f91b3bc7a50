//! # NEEMP Core Library
//!
//! Parameterization of the Electronegativity Equalization Method (EEM): given a
//! training set of molecules with reference partial charges, find the coupling
//! strength `kappa` and the per-atom-type `alpha`/`beta` parameters whose EEM charges
//! best reproduce the references.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data models (`TrainingSet`, `Molecule`),
//!   the EEM linear system and its solver, the molecule-selection bit set and file I/O.
//!
//! - **[`engine`]: The Logic Core.** The run context, subset arena, ranking rule,
//!   parameter fitting and statistics, and the search tasks (kappa scan, Brent
//!   polish, molecule discarding).
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: parameterize a
//!   training set, compute charges from a parameter set, cross-validate.

pub mod core;
pub mod engine;
pub mod workflows;
