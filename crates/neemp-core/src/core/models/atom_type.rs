use super::atom::Atom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How atoms are grouped into atom types sharing one pair of EEM parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomTypeClassification {
    /// One atom type per element.
    Element,
    /// One atom type per element and highest bond order.
    #[default]
    ElementBond,
}

impl fmt::Display for AtomTypeClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::ElementBond => write!(f, "element + bond order"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomType {
    pub atomic_number: u8,
    pub element: String,
    /// `None` when the classification ignores bond orders.
    pub bond_order: Option<u8>,
}

impl AtomType {
    pub fn of_atom(atom: &Atom, classification: AtomTypeClassification) -> Self {
        let bond_order = match classification {
            AtomTypeClassification::Element => None,
            AtomTypeClassification::ElementBond => Some(atom.bond_order),
        };
        Self {
            atomic_number: atom.atomic_number,
            element: atom.element.clone(),
            bond_order,
        }
    }

    /// Whether `atom` belongs to this type.
    pub fn matches(&self, atom: &Atom) -> bool {
        self.atomic_number == atom.atomic_number
            && self.bond_order.is_none_or(|order| order == atom.bond_order)
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bond_order {
            Some(order) => write!(f, "{:>2} {}", self.element, order),
            None => write!(f, "{:>2}", self.element),
        }
    }
}
