#![allow(dead_code)]

use nalgebra::Point3;
use neemp::core::io::parameters::{AtomTypeParameters, ParameterSet};
use neemp::core::models::atom::Atom;
use neemp::core::models::atom_type::AtomTypeClassification;
use neemp::core::models::molecule::{DistanceSource, Molecule};
use neemp::core::models::training_set::TrainingSet;
use neemp::core::solver::eem::{EemSystem, SolverPrecision};

pub const TRUE_KAPPA: f64 = 0.4;
// Element classification orders types H, C, O.
pub const TRUE_ALPHA: [f64; 3] = [2.40, 2.50, 2.95];
pub const TRUE_BETA: [f64; 3] = [0.95, 0.70, 1.10];

fn molecule(idx: usize) -> Molecule {
    let t = idx as f64;
    let atoms = vec![
        Atom::new("C", 6, 1, Point3::new(0.0, 0.0, 0.0)),
        Atom::new("O", 8, 1, Point3::new(1.40 + 0.04 * t, 0.0, 0.05 * t)),
        Atom::new("H", 1, 1, Point3::new(-0.55, 0.90 + 0.03 * t, 0.0)),
        Atom::new("H", 1, 1, Point3::new(-0.50, -0.95, 0.08 * t)),
        Atom::new("H", 1, 1, Point3::new(1.80 + 0.02 * t, 0.85, -0.10)),
    ];
    Molecule::new(format!("mol{idx}"), atoms, 0.0)
}

/// A training set whose reference charges are exact EEM charges of the
/// `TRUE_*` parameters.
pub fn synthetic_training_set(count: usize) -> TrainingSet {
    let bare = TrainingSet::new((0..count).map(molecule).collect(), AtomTypeClassification::Element)
        .expect("synthetic training set");
    let mut set = bare.clone();
    for (idx, m) in bare.molecules().iter().enumerate() {
        let solution = EemSystem::assemble(m, TRUE_KAPPA, &TRUE_ALPHA, &TRUE_BETA, DistanceSource::Geometry)
            .solve(SolverPrecision::Fast)
            .expect("solvable synthetic molecule");
        set.set_reference_charges(idx, &solution.charges)
            .expect("matching charge count");
    }
    set
}

pub fn true_parameters() -> ParameterSet {
    let types = [("H", TRUE_ALPHA[0], TRUE_BETA[0]), ("C", TRUE_ALPHA[1], TRUE_BETA[1]), ("O", TRUE_ALPHA[2], TRUE_BETA[2])];
    ParameterSet {
        kappa: TRUE_KAPPA,
        classification: AtomTypeClassification::Element,
        atom_types: types
            .iter()
            .map(|&(element, alpha, beta)| AtomTypeParameters {
                element: element.to_string(),
                bond_order: None,
                alpha,
                beta,
            })
            .collect(),
    }
}
