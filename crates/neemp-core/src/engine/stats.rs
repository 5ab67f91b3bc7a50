use super::kappa_data::KappaData;
use crate::core::models::training_set::TrainingSet;
use crate::core::utils::bitset::BitSet;

/// Agreement between computed and reference charges over some set of atoms.
///
/// Every field is NaN when undefined (no atoms, a non-finite charge, or zero
/// variance for `r`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Pearson correlation coefficient.
    pub r: f64,
    pub r2: f64,
    pub rmsd: f64,
    /// Mean squared error.
    pub mse: f64,
    /// Mean absolute difference.
    pub d_avg: f64,
    /// Maximum absolute difference.
    pub d_max: f64,
    /// Condition number of the EEM system(s) involved; 0 when not estimated.
    pub cond: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            r: f64::NAN,
            r2: f64::NAN,
            rmsd: f64::NAN,
            mse: f64::NAN,
            d_avg: f64::NAN,
            d_max: f64::NAN,
            cond: 0.0,
        }
    }
}

impl Stats {
    /// Computes the statistics of `(computed, reference)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut n = 0usize;
        let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        let (mut sum_sq, mut sum_abs, mut max_abs) = (0.0, 0.0, 0.0f64);

        for (x, y) in pairs {
            if !(x.is_finite() && y.is_finite()) {
                return Self::default();
            }
            n += 1;
            sx += x;
            sy += y;
            sxx += x * x;
            syy += y * y;
            sxy += x * y;
            let d = (x - y).abs();
            sum_sq += d * d;
            sum_abs += d;
            max_abs = max_abs.max(d);
        }

        if n == 0 {
            return Self::default();
        }

        let nf = n as f64;
        let cov = sxy - sx * sy / nf;
        let var_x = sxx - sx * sx / nf;
        let var_y = syy - sy * sy / nf;
        let denom = (var_x * var_y).sqrt();
        let r = if denom > 0.0 { (cov / denom).clamp(-1.0, 1.0) } else { f64::NAN };
        let mse = sum_sq / nf;

        Self {
            r,
            r2: r * r,
            rmsd: mse.sqrt(),
            mse,
            d_avg: sum_abs / nf,
            d_max: max_abs,
            cond: 0.0,
        }
    }
}

/// Fills the statistics of a trial record whose charges have been solved.
pub trait StatisticsCalculator: Sync {
    /// Computes `full_stats`, `per_atom_type_stats` and the selected entries of
    /// `per_molecule_stats`, preserving each molecule's `cond`.
    fn compute(&self, training_set: &TrainingSet, molecules: &BitSet, kd: &mut KappaData);
}

/// Compares solved charges against the training set's reference charges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeStatistics;

impl StatisticsCalculator for ChargeStatistics {
    fn compute(&self, training_set: &TrainingSet, molecules: &BitSet, kd: &mut KappaData) {
        let pairs_of = |idx: usize| {
            let range = training_set.atom_range(idx);
            training_set
                .molecule(idx)
                .atoms()
                .iter()
                .zip(&kd.charges[range])
                .map(|(atom, &q)| (q, atom.reference_charge.unwrap_or(f64::NAN)))
        };

        let mut per_molecule = Vec::new();
        let mut max_cond = 0.0f64;
        for idx in molecules.iter_set() {
            let cond = kd.per_molecule_stats[idx].cond;
            per_molecule.push((idx, Stats { cond, ..Stats::from_pairs(pairs_of(idx)) }));
            if cond.is_nan() || cond > max_cond {
                max_cond = cond;
            }
        }

        let mut full = Stats::from_pairs(molecules.iter_set().flat_map(pairs_of));
        full.cond = max_cond;

        let per_type: Vec<Stats> = (0..training_set.atom_types_count())
            .map(|ty| {
                Stats::from_pairs(molecules.iter_set().flat_map(|idx| {
                    let range = training_set.atom_range(idx);
                    training_set
                        .molecule(idx)
                        .atoms()
                        .iter()
                        .zip(&kd.charges[range])
                        .filter(move |(atom, _)| atom.atom_type == ty)
                        .map(|(atom, &q)| (q, atom.reference_charge.unwrap_or(f64::NAN)))
                }))
            })
            .collect();

        kd.full_stats = full;
        kd.per_atom_type_stats = per_type;
        for (idx, stats) in per_molecule {
            kd.per_molecule_stats[idx] = stats;
        }
    }
}

/// Largest per-atom difference between EEM and reference charge (in e) that
/// [`check_charges`] accepts.
pub const DEFAULT_MAX_CHARGE_DIFFERENCE: f64 = 0.5;

/// An atom whose EEM charge is non-finite or far from its reference charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeAnomaly {
    pub molecule: usize,
    /// 0-based index within the molecule.
    pub atom: usize,
    pub element: String,
    pub computed: f64,
    pub reference: f64,
}

impl ChargeAnomaly {
    pub fn difference(&self) -> f64 {
        (self.computed - self.reference).abs()
    }
}

/// Scans the selected molecules of `kd` for atoms whose computed charge differs
/// from the reference by more than `max_difference`. Atoms without a reference
/// charge are skipped.
pub fn check_charges(
    training_set: &TrainingSet,
    molecules: &BitSet,
    kd: &KappaData,
    max_difference: f64,
) -> Vec<ChargeAnomaly> {
    molecules
        .iter_set()
        .flat_map(move |idx| {
            let range = training_set.atom_range(idx);
            training_set
                .molecule(idx)
                .atoms()
                .iter()
                .zip(&kd.charges[range])
                .enumerate()
                .filter_map(move |(atom, (a, &computed))| {
                    let reference = a.reference_charge?;
                    let abnormal = !computed.is_finite() || (computed - reference).abs() > max_difference;
                    abnormal.then(|| ChargeAnomaly {
                        molecule: idx,
                        atom,
                        element: a.element.clone(),
                        computed,
                        reference,
                    })
                })
        })
        .collect()
}
