//! # Workflows Module
//!
//! End-to-end procedures built from the engine's tasks. Each workflow prepares its
//! own working copy of the training set, sizes the worker pool, reports progress
//! and returns plain result structures.
//!
//! - **Parameterization** ([`parameterize`]) - Kappa search on the full training set,
//!   optionally followed by the discard search, yielding a parameter set.
//! - **Charges** ([`charges`]) - EEM charges from an existing parameter set, and
//!   cross-validation of those charges against reference charges.
//! - **Info** ([`info`]) - A summary of a training set's composition.

pub mod charges;
pub mod info;
pub mod parameterize;
