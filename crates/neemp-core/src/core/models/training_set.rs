use super::atom_type::{AtomType, AtomTypeClassification};
use super::molecule::Molecule;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrainingSetError {
    #[error("The training set contains no molecules")]
    Empty,
    #[error("Molecule '{0}' contains no atoms")]
    EmptyMolecule(String),
    #[error("Atom {atom} of molecule '{molecule}' has no matching atom type")]
    UnknownAtomType { molecule: String, atom: usize },
    #[error("Molecule '{molecule}' has {expected} atoms but {found} reference charges were given")]
    ChargeCountMismatch {
        molecule: String,
        expected: usize,
        found: usize,
    },
    #[error("Molecule '{molecule}' is missing reference charges")]
    MissingReferenceCharges { molecule: String },
}

/// Immutable collection of molecules used for a parameterization run.
///
/// Atom types are assigned on construction and every atom's `atom_type` field
/// indexes [`TrainingSet::atom_types`]. The per-molecule charge offsets are the
/// exclusive prefix sum of atom counts, so each molecule owns a disjoint range
/// of any flat per-atom array.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    molecules: Vec<Molecule>,
    atom_types: Vec<AtomType>,
    classification: AtomTypeClassification,
    offsets: Vec<usize>,
    atoms_count: usize,
}

impl TrainingSet {
    /// Builds a training set, deriving the atom-type table from the molecules.
    ///
    /// Atom types are sorted by atomic number, then by bond order.
    pub fn new(
        molecules: Vec<Molecule>,
        classification: AtomTypeClassification,
    ) -> Result<Self, TrainingSetError> {
        let atom_types: BTreeSet<AtomType> = molecules
            .iter()
            .flat_map(|m| m.atoms().iter())
            .map(|a| AtomType::of_atom(a, classification))
            .collect();
        Self::with_atom_types(molecules, atom_types.into_iter().collect(), classification)
    }

    /// Builds a training set against a fixed atom-type table, e.g. one read from
    /// a parameter file. Every atom must match one of the given types.
    pub fn with_atom_types(
        mut molecules: Vec<Molecule>,
        atom_types: Vec<AtomType>,
        classification: AtomTypeClassification,
    ) -> Result<Self, TrainingSetError> {
        if molecules.is_empty() {
            return Err(TrainingSetError::Empty);
        }

        let mut offsets = Vec::with_capacity(molecules.len());
        let mut atoms_count = 0;
        for molecule in &mut molecules {
            if molecule.atoms_count() == 0 {
                return Err(TrainingSetError::EmptyMolecule(molecule.name().to_string()));
            }
            offsets.push(atoms_count);
            atoms_count += molecule.atoms_count();

            let name = molecule.name().to_string();
            for (idx, atom) in molecule.atoms_mut().iter_mut().enumerate() {
                atom.atom_type = atom_types
                    .iter()
                    .position(|t| t.matches(atom))
                    .ok_or_else(|| TrainingSetError::UnknownAtomType {
                        molecule: name.clone(),
                        atom: idx + 1,
                    })?;
            }
        }

        Ok(Self {
            molecules,
            atom_types,
            classification,
            offsets,
            atoms_count,
        })
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn molecule(&self, idx: usize) -> &Molecule {
        &self.molecules[idx]
    }

    pub fn molecules_count(&self) -> usize {
        self.molecules.len()
    }

    pub fn atoms_count(&self) -> usize {
        self.atoms_count
    }

    pub fn atom_types(&self) -> &[AtomType] {
        &self.atom_types
    }

    pub fn atom_types_count(&self) -> usize {
        self.atom_types.len()
    }

    pub fn classification(&self) -> AtomTypeClassification {
        self.classification
    }

    /// Start index of each molecule's atoms in a flat per-atom array.
    pub fn molecule_offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The range of a flat per-atom array owned by molecule `idx`.
    pub fn atom_range(&self, idx: usize) -> std::ops::Range<usize> {
        let start = self.offsets[idx];
        start..start + self.molecules[idx].atoms_count()
    }

    /// Precomputes reciprocal distances of every molecule.
    pub fn cache_reciprocal_distances(&mut self) {
        for molecule in &mut self.molecules {
            molecule.cache_reciprocal_distances();
        }
    }

    /// Replaces the reference charges of molecule `idx`.
    pub fn set_reference_charges(
        &mut self,
        idx: usize,
        charges: &[f64],
    ) -> Result<(), TrainingSetError> {
        let molecule = &mut self.molecules[idx];
        if charges.len() != molecule.atoms_count() {
            return Err(TrainingSetError::ChargeCountMismatch {
                molecule: molecule.name().to_string(),
                expected: molecule.atoms_count(),
                found: charges.len(),
            });
        }
        for (atom, &q) in molecule.atoms_mut().iter_mut().zip(charges) {
            atom.reference_charge = Some(q);
        }
        Ok(())
    }

    /// Fails on the first molecule lacking reference charges.
    pub fn ensure_reference_charges(&self) -> Result<(), TrainingSetError> {
        match self.molecules.iter().find(|m| !m.has_reference_charges()) {
            Some(m) => Err(TrainingSetError::MissingReferenceCharges {
                molecule: m.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Number of atoms of each atom type across the whole set.
    pub fn atom_type_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.atom_types.len()];
        for atom in self.molecules.iter().flat_map(|m| m.atoms()) {
            counts[atom.atom_type] += 1;
        }
        counts
    }
}
