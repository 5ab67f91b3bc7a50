use crate::core::models::training_set::TrainingSet;
use crate::core::solver::eem::{EemSystem, SolveError, SolverPrecision, WARN_MAX_COND};
use crate::core::utils::bitset::BitSet;
use crate::engine::context::{RunContext, RunMode};
use crate::engine::kappa_data::KappaData;
use crate::engine::stats::Stats;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

struct MoleculeJob<'k> {
    idx: usize,
    charges: &'k mut [f64],
    stats: &'k mut Stats,
}

/// Splits a flat per-atom vector into one disjoint slice per molecule.
fn split_by_molecule<'k>(training_set: &TrainingSet, charges: &'k mut [f64]) -> Vec<&'k mut [f64]> {
    let mut slices = Vec::with_capacity(training_set.molecules_count());
    let mut rest = charges;
    for molecule in training_set.molecules() {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(molecule.atoms_count());
        slices.push(head);
        rest = tail;
    }
    slices
}

/// Solves the EEM system of every selected molecule with the record's kappa
/// and parameters, writing charges and per-molecule condition numbers.
///
/// A molecule whose system is non-finite or singular gets NaN charges; this
/// never fails the call. Unselected molecules are left untouched.
pub fn calculate_charges(ctx: &RunContext, molecules: &BitSet, kd: &mut KappaData) {
    let training_set = ctx.training_set;
    let KappaData {
        kappa,
        parameters_alpha,
        parameters_beta,
        charges,
        per_molecule_stats,
        ..
    } = kd;
    let (kappa, alpha, beta) = (*kappa, &parameters_alpha[..], &parameters_beta[..]);

    let jobs: Vec<MoleculeJob> = split_by_molecule(training_set, charges)
        .into_iter()
        .zip(per_molecule_stats.iter_mut())
        .enumerate()
        .filter(|(idx, _)| molecules.get(*idx))
        .map(|(idx, (charges, stats))| MoleculeJob { idx, charges, stats })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.into_iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.into_par_iter();

    iterator.for_each(|job| solve_molecule(ctx, kappa, alpha, beta, job));
}

fn solve_molecule(ctx: &RunContext, kappa: f64, alpha: &[f64], beta: &[f64], job: MoleculeJob) {
    let molecule = ctx.training_set.molecule(job.idx);
    let precision = ctx.config.precision;
    let system = EemSystem::assemble(molecule, kappa, alpha, beta, ctx.mode.distance_source());
    let warn_failures = ctx.mode == RunMode::Charges;

    match system.solve(precision) {
        Ok(solution) => {
            job.charges.copy_from_slice(&solution.charges);
            let cond = solution.condition_number.unwrap_or(0.0);
            job.stats.cond = cond;
            if cond > WARN_MAX_COND {
                if warn_failures {
                    warn!(
                        molecule = molecule.name(),
                        cond, "Ill-conditioned EEM system, charges might be inaccurate."
                    );
                } else {
                    debug!(molecule = molecule.name(), cond, kappa, "Ill-conditioned EEM system.");
                }
            }
        }
        Err(error) => {
            job.charges.fill(f64::NAN);
            job.stats.cond = match (error, precision) {
                (SolveError::Singular, SolverPrecision::ExtraPrecise) => f64::INFINITY,
                (SolveError::NonFinite, _) => f64::NAN,
                _ => 0.0,
            };
            if warn_failures {
                warn!(molecule = molecule.name(), %error, "Setting charges to NaN.");
            } else {
                debug!(molecule = molecule.name(), %error, kappa, "Setting charges to NaN.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::atom_type::AtomTypeClassification;
    use crate::core::models::molecule::Molecule;
    use crate::engine::config::SearchConfigBuilder;
    use crate::engine::fitting::LeastSquaresFitter;
    use crate::engine::progress::ProgressReporter;
    use crate::engine::stats::ChargeStatistics;
    use nalgebra::Point3;

    fn training_set() -> TrainingSet {
        let co = |name: &str, shift: f64| {
            Molecule::new(
                name,
                vec![
                    Atom::new("C", 6, 1, Point3::new(shift, 0.0, 0.0)),
                    Atom::new("O", 8, 1, Point3::new(shift + 1.0, 0.0, 0.0)),
                ],
                0.0,
            )
        };
        TrainingSet::new(
            vec![co("a", 0.0), co("b", 5.0), co("c", -3.0)],
            AtomTypeClassification::Element,
        )
        .unwrap()
    }

    #[test]
    fn solves_only_selected_molecules() {
        let set = training_set();
        let config = SearchConfigBuilder::new().kappa(0.5).build().unwrap();
        let reporter = ProgressReporter::new();
        let ctx = RunContext::new(
            &set,
            &config,
            RunMode::Parameterization,
            &LeastSquaresFitter,
            &ChargeStatistics,
            &reporter,
        );

        let mut kd = KappaData::with_kappa(&set, 0.5);
        kd.parameters_alpha = vec![5.0, 7.0];
        kd.parameters_beta = vec![10.0, 12.0];
        kd.charges.fill(-42.0);

        let mut selection = BitSet::new(3);
        selection.set(0);
        selection.set(2);
        calculate_charges(&ctx, &selection, &mut kd);

        assert!((kd.charges[0] - 2.0 / 21.0).abs() < 1e-10);
        assert!((kd.charges[1] + 2.0 / 21.0).abs() < 1e-10);
        assert_eq!(&kd.charges[2..4], &[-42.0, -42.0]);
        assert!((kd.charges[4] - 2.0 / 21.0).abs() < 1e-10);
    }

    #[test]
    fn failing_molecules_get_nan_charges() {
        let set = training_set();
        let config = SearchConfigBuilder::new().kappa(0.5).build().unwrap();
        let reporter = ProgressReporter::new();
        let ctx = RunContext::new(
            &set,
            &config,
            RunMode::Charges,
            &LeastSquaresFitter,
            &ChargeStatistics,
            &reporter,
        );

        let mut kd = KappaData::with_kappa(&set, 0.5);
        kd.parameters_alpha = vec![5.0, f64::NAN];
        kd.parameters_beta = vec![10.0, 12.0];
        let mut all = BitSet::new(3);
        all.set_all();
        calculate_charges(&ctx, &all, &mut kd);

        assert!(kd.charges.iter().all(|q| q.is_nan()));
        assert!(kd.per_molecule_stats[1].cond.is_nan());
    }
}
