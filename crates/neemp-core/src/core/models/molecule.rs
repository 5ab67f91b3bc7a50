use super::atom::Atom;

/// Where the solver takes reciprocal interatomic distances from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSource {
    /// Use the per-molecule cache (filled by [`Molecule::cache_reciprocal_distances`]);
    /// falls back to the geometry when the cache is absent.
    Cached,
    /// Recompute every distance from atomic coordinates.
    Geometry,
}

/// Index into a strictly upper-triangular packed array, `i < j`.
#[inline]
fn strict_upper_index(i: usize, j: usize) -> usize {
    debug_assert!(i < j);
    i + j * (j - 1) / 2
}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    name: String,
    atoms: Vec<Atom>,
    total_charge: f64,
    rdists: Option<Vec<f64>>,
}

impl Molecule {
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>, total_charge: f64) -> Self {
        Self {
            name: name.into(),
            atoms,
            total_charge,
            rdists: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn atoms_count(&self) -> usize {
        self.atoms.len()
    }

    /// Fixed total (formal) charge of the molecule.
    pub fn total_charge(&self) -> f64 {
        self.total_charge
    }

    /// Precomputes all pairwise reciprocal distances for repeated kappa sweeps.
    pub fn cache_reciprocal_distances(&mut self) {
        let n = self.atoms.len();
        let mut rdists = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for j in 1..n {
            for i in 0..j {
                rdists.push(self.atoms[i].reciprocal_distance(&self.atoms[j]));
            }
        }
        self.rdists = Some(rdists);
    }

    pub fn has_cached_distances(&self) -> bool {
        self.rdists.is_some()
    }

    /// Reciprocal distance between atoms `i` and `j` (`i != j`).
    #[inline]
    pub fn reciprocal_distance(&self, i: usize, j: usize, source: DistanceSource) -> f64 {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        match (source, &self.rdists) {
            (DistanceSource::Cached, Some(cache)) => cache[strict_upper_index(lo, hi)],
            _ => self.atoms[lo].reciprocal_distance(&self.atoms[hi]),
        }
    }

    /// Whether every atom carries a reference charge.
    pub fn has_reference_charges(&self) -> bool {
        self.atoms.iter().all(|a| a.reference_charge.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn triatomic() -> Molecule {
        Molecule::new(
            "tri",
            vec![
                Atom::new("O", 8, 1, Point3::new(0.0, 0.0, 0.0)),
                Atom::new("H", 1, 1, Point3::new(2.0, 0.0, 0.0)),
                Atom::new("H", 1, 1, Point3::new(0.0, 4.0, 0.0)),
            ],
            0.0,
        )
    }

    #[test]
    fn geometry_distances_are_reciprocal_and_symmetric() {
        let m = triatomic();
        assert!((m.reciprocal_distance(0, 1, DistanceSource::Geometry) - 0.5).abs() < 1e-12);
        assert!((m.reciprocal_distance(2, 0, DistanceSource::Geometry) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn cached_distances_match_geometry() {
        let mut m = triatomic();
        assert!(!m.has_cached_distances());
        m.cache_reciprocal_distances();
        assert!(m.has_cached_distances());
        for (i, j) in [(0, 1), (0, 2), (1, 2), (2, 1)] {
            let cached = m.reciprocal_distance(i, j, DistanceSource::Cached);
            let direct = m.reciprocal_distance(i, j, DistanceSource::Geometry);
            assert!((cached - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn cached_source_falls_back_to_geometry_without_cache() {
        let m = triatomic();
        let value = m.reciprocal_distance(1, 2, DistanceSource::Cached);
        assert!((value - 1.0 / 20f64.sqrt()).abs() < 1e-12);
    }
}
