use phf::{Map, phf_map};

#[rustfmt::skip]
static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "H"  => 1,  "He" => 2,
    "Li" => 3,  "Be" => 4,  "B"  => 5,  "C"  => 6,  "N"  => 7,  "O"  => 8,  "F"  => 9,  "Ne" => 10,
    "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P"  => 15, "S"  => 16, "Cl" => 17, "Ar" => 18,
    "K"  => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V"  => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26,
    "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34,
    "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y"  => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43, "Ru" => 44,
    "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50, "Sb" => 51, "Te" => 52,
    "I"  => 53, "Xe" => 54,
};

#[rustfmt::skip]
static PAULING_ELECTRONEGATIVITIES: Map<&'static str, f64> = phf_map! {
    "H"  => 2.20,
    "Li" => 0.98, "Be" => 1.57, "B"  => 2.04, "C"  => 2.55, "N"  => 3.04, "O"  => 3.44, "F"  => 3.98,
    "Na" => 0.93, "Mg" => 1.31, "Al" => 1.61, "Si" => 1.90, "P"  => 2.19, "S"  => 2.58, "Cl" => 3.16,
    "K"  => 0.82, "Ca" => 1.00, "Sc" => 1.36, "Ti" => 1.54, "V"  => 1.63, "Cr" => 1.66, "Mn" => 1.55,
    "Fe" => 1.83, "Co" => 1.88, "Ni" => 1.91, "Cu" => 1.90, "Zn" => 1.65, "Ga" => 1.81, "Ge" => 2.01,
    "As" => 2.18, "Se" => 2.55, "Br" => 2.96, "Kr" => 3.00,
    "Rb" => 0.82, "Sr" => 0.95, "Y"  => 1.22, "Zr" => 1.33, "Nb" => 1.60, "Mo" => 2.16, "Tc" => 1.90,
    "Ru" => 2.20, "Rh" => 2.28, "Pd" => 2.20, "Ag" => 1.93, "Cd" => 1.69, "In" => 1.78, "Sn" => 1.96,
    "Sb" => 2.05, "Te" => 2.10, "I"  => 2.66, "Xe" => 2.60,
};

/// Normalizes an element symbol to its canonical capitalization (`cl` -> `Cl`).
pub fn normalize_symbol(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Looks up the atomic number of an element symbol, case-insensitively.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    ATOMIC_NUMBERS.get(normalize_symbol(symbol).as_str()).copied()
}

/// Pauling electronegativity of an element; `None` for elements without one (He, Ne, Ar).
pub fn pauling_electronegativity(symbol: &str) -> Option<f64> {
    PAULING_ELECTRONEGATIVITIES
        .get(normalize_symbol(symbol).as_str())
        .copied()
}
