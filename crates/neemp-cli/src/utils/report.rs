use neemp::core::models::training_set::TrainingSet;
use neemp::engine::kappa_data::KappaData;
use neemp::engine::ranking::{RankingRule, RankingStatistic};
use neemp::engine::stats::ChargeAnomaly;
use neemp::workflows::info::TrainingSetSummary;
use neemp::workflows::parameterize::ParameterizationResult;
use std::fmt::Write;

/// Per-atom-type parameters next to the statistics of that type's atoms.
pub fn atom_type_table(training_set: &TrainingSet, kd: &KappaData) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
        "Atom type", "alpha", "beta", "R", "RMSD", "D_avg", "D_max"
    );
    for (idx, atom_type) in training_set.atom_types().iter().enumerate() {
        let s = &kd.per_atom_type_stats[idx];
        let _ = writeln!(
            out,
            "{:<10} {:>10.4} {:>10.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            atom_type.to_string().trim(),
            kd.parameters_alpha[idx],
            kd.parameters_beta[idx],
            s.r,
            s.rmsd,
            s.d_avg,
            s.d_max
        );
    }
    out
}

pub fn parameterization_report(
    training_set: &TrainingSet,
    result: &ParameterizationResult,
    ranking: RankingStatistic,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.best.summary(ranking));
    let _ = writeln!(
        out,
        "Molecules used: {}/{}",
        result.used_molecules.len(),
        training_set.molecules_count()
    );

    let discarded: Vec<&str> = (0..training_set.molecules_count())
        .filter(|idx| result.used_molecules.binary_search(idx).is_err())
        .map(|idx| training_set.molecule(idx).name())
        .collect();
    if !discarded.is_empty() {
        let _ = writeln!(out, "Discarded: {}", discarded.join(", "));
    }

    out.push('\n');
    out.push_str(&atom_type_table(training_set, &result.best));
    out
}

/// The `count` molecules whose charges deviate most, ranked by `ranking`.
pub fn worst_molecules(
    training_set: &TrainingSet,
    kd: &KappaData,
    ranking: RankingStatistic,
    count: usize,
) -> String {
    let rule = RankingRule::new(ranking);
    let mut order: Vec<usize> = (0..training_set.molecules_count()).collect();
    order.sort_by(|&a, &b| {
        rule.is_better_value(
            rule.value_of(&kd.per_molecule_stats[a]),
            rule.value_of(&kd.per_molecule_stats[b]),
        )
        .cmp(&rule.is_better_value(
            rule.value_of(&kd.per_molecule_stats[b]),
            rule.value_of(&kd.per_molecule_stats[a]),
        ))
    });

    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:>8} {:>8} {:>8}", "Molecule", "R", "RMSD", "D_max");
    for &idx in order.iter().take(count) {
        let s = &kd.per_molecule_stats[idx];
        let _ = writeln!(
            out,
            "{:<24} {:>8.4} {:>8.4} {:>8.4}",
            training_set.molecule(idx).name(),
            s.r,
            s.rmsd,
            s.d_max
        );
    }
    out
}

pub fn training_set_report(summary: &TrainingSetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Molecules: {}", summary.molecules);
    let _ = writeln!(out, "Atoms: {}", summary.atoms);
    let _ = writeln!(out, "Classification: {}", summary.classification);
    let _ = writeln!(
        out,
        "Reference charges: {}",
        if summary.has_reference_charges {
            "present"
        } else {
            "missing"
        }
    );
    let _ = writeln!(out, "\n{:<10} {:>8} {:>10}", "Atom type", "atoms", "molecules");
    for entry in &summary.atom_types {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>10}",
            entry.atom_type.to_string().trim(),
            entry.atoms,
            entry.molecules
        );
    }
    out
}

/// Atoms flagged by the charge check, one line each, grouped by molecule.
pub fn charge_anomalies(training_set: &TrainingSet, anomalies: &[ChargeAnomaly]) -> String {
    let mut out = String::new();
    let mut current = None;
    for anomaly in anomalies {
        if current != Some(anomaly.molecule) {
            current = Some(anomaly.molecule);
            let _ = writeln!(out, "{}:", training_set.molecule(anomaly.molecule).name());
        }
        let _ = writeln!(
            out,
            "  atom {:>4} {:<2}  EEM {:>8.4}  reference {:>8.4}  diff {:>8.4}",
            anomaly.atom + 1,
            anomaly.element,
            anomaly.computed,
            anomaly.reference,
            anomaly.difference()
        );
    }
    out
}
