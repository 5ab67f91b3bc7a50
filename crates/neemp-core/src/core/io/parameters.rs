use crate::core::models::atom_type::{AtomType, AtomTypeClassification};
use crate::core::models::element;
use crate::core::models::training_set::TrainingSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParameterFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Unknown element '{0}' in parameter set")]
    UnknownElement(String),
    #[error("No parameters for atom type '{0}'")]
    MissingAtomType(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AtomTypeParameters {
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond_order: Option<u8>,
    pub alpha: f64,
    pub beta: f64,
}

/// A complete EEM parameter set: the coupling strength plus one `(alpha, beta)`
/// pair per atom type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParameterSet {
    pub kappa: f64,
    #[serde(default)]
    pub classification: AtomTypeClassification,
    #[serde(rename = "atom-type", default)]
    pub atom_types: Vec<AtomTypeParameters>,
}

impl ParameterSet {
    /// Collects the parameters of a fitted record, in the training set's atom-type order.
    pub fn from_fit(training_set: &TrainingSet, kappa: f64, alpha: &[f64], beta: &[f64]) -> Self {
        let atom_types = training_set
            .atom_types()
            .iter()
            .zip(alpha.iter().zip(beta))
            .map(|(ty, (&alpha, &beta))| AtomTypeParameters {
                element: ty.element.clone(),
                bond_order: ty.bond_order,
                alpha,
                beta,
            })
            .collect();
        Self {
            kappa,
            classification: training_set.classification(),
            atom_types,
        }
    }

    /// Resolves the atom-type table described by this set.
    pub fn atom_type_table(&self) -> Result<Vec<AtomType>, ParameterFileError> {
        self.atom_types
            .iter()
            .map(|p| {
                let symbol = element::normalize_symbol(&p.element);
                let atomic_number = element::atomic_number(&symbol)
                    .ok_or_else(|| ParameterFileError::UnknownElement(p.element.clone()))?;
                Ok(AtomType {
                    atomic_number,
                    element: symbol,
                    bond_order: match self.classification {
                        AtomTypeClassification::Element => None,
                        AtomTypeClassification::ElementBond => p.bond_order,
                    },
                })
            })
            .collect()
    }

    /// Alpha and beta vectors aligned with `training_set.atom_types()`.
    pub fn aligned_with(
        &self,
        training_set: &TrainingSet,
    ) -> Result<(Vec<f64>, Vec<f64>), ParameterFileError> {
        let table = self.atom_type_table()?;
        let mut alpha = Vec::with_capacity(training_set.atom_types_count());
        let mut beta = Vec::with_capacity(training_set.atom_types_count());
        for ty in training_set.atom_types() {
            let idx = table
                .iter()
                .position(|candidate| candidate == ty)
                .ok_or_else(|| ParameterFileError::MissingAtomType(ty.to_string().trim().to_string()))?;
            alpha.push(self.atom_types[idx].alpha);
            beta.push(self.atom_types[idx].beta);
        }
        Ok((alpha, beta))
    }

    pub fn read_from_path(path: &Path) -> Result<Self, ParameterFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParameterFileError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), ParameterFileError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ParameterFileError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::Molecule;
    use nalgebra::Point3;
    use tempfile::tempdir;

    fn training_set() -> TrainingSet {
        let atoms = vec![
            Atom::new("C", 6, 2, Point3::origin()),
            Atom::new("O", 8, 2, Point3::new(1.2, 0.0, 0.0)),
        ];
        TrainingSet::new(
            vec![Molecule::new("co", atoms, 0.0)],
            AtomTypeClassification::ElementBond,
        )
        .unwrap()
    }

    #[test]
    fn file_round_trip_preserves_parameters() {
        let set = training_set();
        let params = ParameterSet::from_fit(&set, 0.25, &[2.5, 3.1], &[0.9, 1.4]);
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.toml");
        params.write_to_path(&path).unwrap();

        let loaded = ParameterSet::read_from_path(&path).unwrap();
        assert_eq!(loaded, params);
        assert_eq!(loaded.atom_types[0].bond_order, Some(2));
    }

    #[test]
    fn alignment_follows_training_set_order() {
        let set = training_set();
        let params = ParameterSet {
            kappa: 0.3,
            classification: AtomTypeClassification::ElementBond,
            atom_types: vec![
                AtomTypeParameters {
                    element: "O".into(),
                    bond_order: Some(2),
                    alpha: 3.0,
                    beta: 1.0,
                },
                AtomTypeParameters {
                    element: "c".into(),
                    bond_order: Some(2),
                    alpha: 2.0,
                    beta: 0.5,
                },
            ],
        };
        let (alpha, beta) = params.aligned_with(&set).unwrap();
        assert_eq!(alpha, vec![2.0, 3.0]);
        assert_eq!(beta, vec![0.5, 1.0]);
    }

    #[test]
    fn missing_atom_type_is_reported() {
        let set = training_set();
        let params = ParameterSet {
            kappa: 0.3,
            classification: AtomTypeClassification::ElementBond,
            atom_types: vec![AtomTypeParameters {
                element: "C".into(),
                bond_order: Some(2),
                alpha: 2.0,
                beta: 0.5,
            }],
        };
        assert!(matches!(
            params.aligned_with(&set),
            Err(ParameterFileError::MissingAtomType(label)) if label == "O 2"
        ));
    }

    #[test]
    fn parses_hand_written_file() {
        let params: ParameterSet = toml::from_str(
            r#"
            kappa = 0.1
            classification = "element"

            [[atom-type]]
            element = "H"
            alpha = 2.4
            beta = 0.9
            "#,
        )
        .unwrap();
        let table = params.atom_type_table().unwrap();
        assert_eq!(table[0].atomic_number, 1);
        assert_eq!(table[0].bond_order, None);
    }
}
