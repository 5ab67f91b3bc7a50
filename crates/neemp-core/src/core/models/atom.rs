use nalgebra::Point3;

/// A single atom of a training-set molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Canonical element symbol (e.g. `"C"`, `"Cl"`).
    pub element: String,
    pub atomic_number: u8,
    /// Highest order of any bond the atom takes part in.
    pub bond_order: u8,
    pub position: Point3<f64>,
    /// Reference (typically quantum-mechanical) partial charge, if known.
    pub reference_charge: Option<f64>,
    /// Index into the training set's atom-type table. Assigned by the training set.
    pub atom_type: usize,
}

impl Atom {
    pub fn new(element: &str, atomic_number: u8, bond_order: u8, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            atomic_number,
            bond_order,
            position,
            reference_charge: None,
            atom_type: 0,
        }
    }

    pub fn with_reference_charge(mut self, charge: f64) -> Self {
        self.reference_charge = Some(charge);
        self
    }

    /// Reciprocal of the Euclidean distance to `other`.
    #[inline]
    pub fn reciprocal_distance(&self, other: &Atom) -> f64 {
        1.0 / (self.position - other.position).norm()
    }
}
