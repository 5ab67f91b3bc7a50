use super::kappa_data::KappaData;
use crate::core::models::element;
use crate::core::models::molecule::{DistanceSource, Molecule};
use crate::core::models::training_set::TrainingSet;
use crate::core::utils::bitset::BitSet;
use tracing::debug;

/// Fits per-atom-type `alpha`/`beta` for the record's kappa on the selected molecules.
///
/// A fit that cannot be determined writes NaN parameters; the trial then ranks worst.
pub trait ParameterFitter: Sync {
    fn fit(&self, training_set: &TrainingSet, molecules: &BitSet, kd: &mut KappaData);
}

/// Per-atom-type linear regression of the EEM equations.
///
/// Each atom `i` of type `t` in molecule `m` satisfies
/// `alpha_t + beta_t * q_i = X_m - kappa * sum_{j != i} q_j / R_ij`, with `q` the
/// reference charges and `X_m` the Sanderson electronegativity of the molecule.
/// The intercept and slope of type `t`'s points are its `alpha` and `beta`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquaresFitter;

impl ParameterFitter for LeastSquaresFitter {
    fn fit(&self, training_set: &TrainingSet, molecules: &BitSet, kd: &mut KappaData) {
        let mut points: Vec<Vec<(f64, f64)>> = vec![Vec::new(); training_set.atom_types_count()];

        for idx in molecules.iter_set() {
            let molecule = training_set.molecule(idx);
            let chi = sanderson_electronegativity(molecule);
            let atoms = molecule.atoms();
            for (i, atom) in atoms.iter().enumerate() {
                let potential: f64 = atoms
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, other)| {
                        other.reference_charge.unwrap_or(f64::NAN)
                            * molecule.reciprocal_distance(i, j, DistanceSource::Cached)
                    })
                    .sum();
                points[atom.atom_type].push((
                    atom.reference_charge.unwrap_or(f64::NAN),
                    chi - kd.kappa * potential,
                ));
            }
        }

        for (ty, type_points) in points.iter().enumerate() {
            let (alpha, beta) = linear_regression(type_points).unwrap_or_else(|| {
                debug!(
                    atom_type = %training_set.atom_types()[ty],
                    points = type_points.len(),
                    kappa = kd.kappa,
                    "Atom type parameters are undetermined."
                );
                (f64::NAN, f64::NAN)
            });
            kd.parameters_alpha[ty] = alpha;
            kd.parameters_beta[ty] = beta;
        }
    }
}

/// Geometric mean of the Pauling electronegativities of a molecule's atoms.
///
/// Atoms of elements without a Pauling value are skipped; NaN when none remain.
pub fn sanderson_electronegativity(molecule: &Molecule) -> f64 {
    let (log_sum, count) = molecule
        .atoms()
        .iter()
        .filter_map(|a| element::pauling_electronegativity(&a.element))
        .fold((0.0, 0usize), |(sum, n), chi| (sum + chi.ln(), n + 1));
    if count == 0 {
        f64::NAN
    } else {
        (log_sum / count as f64).exp()
    }
}

/// Ordinary least-squares line through `(x, y)` points as `(intercept, slope)`.
///
/// `None` for fewer than two distinct `x` values or non-finite input.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 || points.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), &(x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    if sxx <= 1e-12 {
        return None;
    }

    let slope = sxy / sxx;
    Some((mean_y - slope * mean_x, slope))
}
