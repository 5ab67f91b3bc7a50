use crate::core::models::atom_type::{AtomType, AtomTypeClassification};
use crate::core::models::training_set::TrainingSet;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSetSummary {
    pub molecules: usize,
    pub atoms: usize,
    pub classification: AtomTypeClassification,
    /// Each atom type with the number of atoms and molecules containing it.
    pub atom_types: Vec<AtomTypeCount>,
    pub has_reference_charges: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomTypeCount {
    pub atom_type: AtomType,
    pub atoms: usize,
    pub molecules: usize,
}

pub fn summarize(training_set: &TrainingSet) -> TrainingSetSummary {
    let mut molecules_with = vec![0usize; training_set.atom_types_count()];
    for molecule in training_set.molecules() {
        let mut seen = vec![false; training_set.atom_types_count()];
        for atom in molecule.atoms() {
            seen[atom.atom_type] = true;
        }
        for (count, present) in molecules_with.iter_mut().zip(seen) {
            *count += usize::from(present);
        }
    }

    let atom_types = training_set
        .atom_types()
        .iter()
        .zip(training_set.atom_type_counts())
        .zip(molecules_with)
        .map(|((atom_type, atoms), molecules)| AtomTypeCount {
            atom_type: atom_type.clone(),
            atoms,
            molecules,
        })
        .collect();

    TrainingSetSummary {
        molecules: training_set.molecules_count(),
        atoms: training_set.atoms_count(),
        classification: training_set.classification(),
        atom_types,
        has_reference_charges: training_set.ensure_reference_charges().is_ok(),
    }
}
