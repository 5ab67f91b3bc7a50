use crate::cli::{ChargeReportArgs, ChargesArgs};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::utils::report;
use neemp::{
    core::{
        io::{
            chg::{ChgFile, apply_reference_charges},
            chgs::ChgStatsFile,
            parameters::ParameterSet,
            training::load_training_set,
        },
        models::training_set::TrainingSet,
        solver::eem::SolverPrecision,
        utils::bitset::BitSet,
    },
    engine::{
        kappa_data::KappaData,
        progress::ProgressReporter,
        stats::{DEFAULT_MAX_CHARGE_DIFFERENCE, check_charges},
    },
    workflows::{self, charges::ChargeOptions},
};
use tracing::{info, warn};

pub fn run(args: ChargesArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    info!("Loading parameters from {:?}", &args.parameters);
    let parameters = ParameterSet::read_from_path(&args.parameters)?;

    info!("Loading molecules from {:?}", &args.training_set);
    let mut molecules = load_training_set(&args.training_set, parameters.classification)?;
    if let Some(path) = &args.reference_charges {
        info!("Loading reference charges from {:?}", path);
        let records = ChgFile::read_from_path(path)?;
        apply_reference_charges(&mut molecules, &records)?;
    }

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let options = ChargeOptions {
        precision: precision(args.extra_precise),
        max_threads: threads,
    };

    println!(
        "Calculating charges for {} molecule(s)...",
        molecules.molecules_count()
    );
    let kd = if args.report.needs_references() {
        workflows::charges::cross_validate(&molecules, &parameters, options, &reporter)?
    } else {
        workflows::charges::calculate(&molecules, &parameters, options, &reporter)?
    };

    let failed: Vec<&str> = molecules
        .molecules()
        .iter()
        .enumerate()
        .filter(|(idx, _)| kd.charges[molecules.atom_range(*idx)].iter().any(|q| !q.is_finite()))
        .map(|(_, m)| m.name())
        .collect();
    if !failed.is_empty() {
        warn!("No valid charges for: {}", failed.join(", "));
        println!(
            "Warning: {} molecule(s) have no valid charges.",
            failed.len()
        );
    }

    ChgFile::write_to_path(&molecules, &kd.charges, &args.output)?;
    println!("✓ Charges written to: {}", args.output.display());
    write_charge_reports(&args.report, &molecules, &kd)
}

pub(crate) fn precision(extra_precise: bool) -> SolverPrecision {
    if extra_precise {
        SolverPrecision::ExtraPrecise
    } else {
        SolverPrecision::Fast
    }
}

/// Runs the charge check and writes the `.chgs` file for a record evaluated
/// on every molecule of `training_set`.
pub(crate) fn write_charge_reports(
    args: &ChargeReportArgs,
    training_set: &TrainingSet,
    kd: &KappaData,
) -> Result<()> {
    if args.check_charges {
        let mut all = BitSet::new(training_set.molecules_count());
        all.set_all();
        let anomalies = check_charges(training_set, &all, kd, DEFAULT_MAX_CHARGE_DIFFERENCE);
        if anomalies.is_empty() {
            println!("✓ No atom differs from its reference charge by more than {DEFAULT_MAX_CHARGE_DIFFERENCE}.");
        } else {
            warn!(
                atoms = anomalies.len(),
                threshold = DEFAULT_MAX_CHARGE_DIFFERENCE,
                "Abnormal differences between EEM and reference charges."
            );
            println!(
                "Warning: {} atom(s) differ from their reference charge by more than {DEFAULT_MAX_CHARGE_DIFFERENCE}:",
                anomalies.len()
            );
            print!("{}", report::charge_anomalies(training_set, &anomalies));
        }
    }

    if let Some(path) = &args.stats_output {
        ChgStatsFile::write_to_path(training_set, kd, path)?;
        println!("✓ Charge statistics written to: {}", path.display());
    }
    Ok(())
}
