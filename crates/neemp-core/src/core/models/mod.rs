//! # Core Models Module
//!
//! Data structures describing the training set that EEM parameterization and
//! charge calculation operate on.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom with element, bond order, coordinates and reference charge
//! - [`atom_type`] - Atom-type classification sharing one pair of EEM parameters
//! - [`element`] - Element symbol lookup
//! - [`molecule`] - A molecule with its total charge and optional distance cache
//! - [`training_set`] - The immutable molecule collection with atom-type table and offsets
//!
//! ## Usage
//!
//! ```ignore
//! use neemp::core::models::{atom::Atom, molecule::Molecule, training_set::TrainingSet};
//!
//! let water = Molecule::new("water", atoms, 0.0);
//! let set = TrainingSet::new(vec![water], AtomTypeClassification::ElementBond)?;
//! ```

pub mod atom;
pub mod atom_type;
pub mod element;
pub mod molecule;
pub mod training_set;
