use crate::core::models::atom::Atom;
use crate::core::models::atom_type::AtomTypeClassification;
use crate::core::models::element;
use crate::core::models::molecule::Molecule;
use crate::core::models::training_set::{TrainingSet, TrainingSetError};
use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingSetFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Molecule '{molecule}' contains an atom of unknown element '{element}'")]
    UnknownElement { molecule: String, element: String },
    #[error("Invalid training set: {0}")]
    TrainingSet(#[from] TrainingSetError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TrainingSetDocument {
    #[serde(rename = "molecule", default)]
    molecules: Vec<MoleculeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct MoleculeRecord {
    name: String,
    #[serde(default)]
    total_charge: f64,
    #[serde(rename = "atom", default)]
    atoms: Vec<AtomRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct AtomRecord {
    element: String,
    #[serde(default = "default_bond_order")]
    bond_order: u8,
    position: [f64; 3],
    #[serde(default)]
    charge: Option<f64>,
}

fn default_bond_order() -> u8 {
    1
}

impl MoleculeRecord {
    fn into_molecule(self) -> Result<Molecule, TrainingSetFileError> {
        let mut atoms = Vec::with_capacity(self.atoms.len());
        for record in self.atoms {
            let symbol = element::normalize_symbol(&record.element);
            let atomic_number = element::atomic_number(&symbol).ok_or_else(|| {
                TrainingSetFileError::UnknownElement {
                    molecule: self.name.clone(),
                    element: record.element.clone(),
                }
            })?;
            let [x, y, z] = record.position;
            let mut atom = Atom::new(&symbol, atomic_number, record.bond_order, Point3::new(x, y, z));
            atom.reference_charge = record.charge;
            atoms.push(atom);
        }
        Ok(Molecule::new(self.name, atoms, self.total_charge))
    }
}

/// Parses the molecules of a TOML training-set document.
pub fn parse_molecules(content: &str) -> Result<Vec<Molecule>, TrainingSetFileError> {
    let document: TrainingSetDocument = toml::from_str(content)?;
    document
        .molecules
        .into_iter()
        .map(MoleculeRecord::into_molecule)
        .collect()
}

pub fn read_molecules(path: &Path) -> Result<Vec<Molecule>, TrainingSetFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| TrainingSetFileError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_molecules(&content)
}

/// Loads a training set and derives its atom-type table from the molecules.
pub fn load_training_set(
    path: &Path,
    classification: AtomTypeClassification,
) -> Result<TrainingSet, TrainingSetFileError> {
    let molecules = read_molecules(path)?;
    Ok(TrainingSet::new(molecules, classification)?)
}
