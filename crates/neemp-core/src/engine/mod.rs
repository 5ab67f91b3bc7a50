//! # Engine Module
//!
//! The search machinery of a parameterization run.
//!
//! ## Overview
//!
//! A run evaluates candidate kappa values on a molecule subset: for every trial the
//! per-atom-type parameters are fitted, charges are solved for the selected molecules
//! and agreement statistics are computed. The best trial of a subset is chosen by a
//! single ranking rule. The discard search then repeatedly derives subsets with one
//! molecule toggled and keeps whichever subset ranks best.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Kappa strategy, ranking statistic, precision and discard budgets
//! - **Run Context** ([`context`]) - Everything a task needs, passed explicitly, plus the capped worker pool
//! - **Subsets** ([`subset`], [`kappa_data`]) - Molecule masks with their trial records, owned by an arena
//! - **Ranking** ([`ranking`]) - The one table mapping a statistic to extraction and comparison
//! - **Collaborators** ([`fitting`], [`stats`]) - Parameter fitting and statistics behind traits
//! - **Tasks** ([`tasks`]) - Charge calculation, kappa search and discard search
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level failures

pub mod config;
pub mod context;
pub mod error;
pub mod fitting;
pub mod kappa_data;
pub mod progress;
pub mod ranking;
pub mod stats;
pub mod subset;
pub mod tasks;
