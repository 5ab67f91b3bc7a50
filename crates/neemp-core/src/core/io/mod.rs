//! Readers and writers for the file formats a parameterization run consumes and produces.
//!
//! - [`training`] - training-set molecules (TOML) with optional inline reference charges.
//! - [`parameters`] - EEM parameter sets (TOML): kappa plus per-atom-type alpha/beta.
//! - [`chg`] - plain-text `.chg` charge files, read as reference charges or written as results.
//! - [`chgs`] - per-molecule charge statistics (`.chgs`), written next to computed charges.

pub mod chg;
pub mod chgs;
pub mod parameters;
pub mod training;
