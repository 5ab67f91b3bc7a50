use super::charges::{precision, write_charge_reports};
use crate::cli::CrossArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::utils::report;
use neemp::{
    core::io::{
        chg::{ChgFile, apply_reference_charges},
        parameters::ParameterSet,
        training::load_training_set,
    },
    engine::{progress::ProgressReporter, ranking::RankingStatistic},
    workflows::{self, charges::ChargeOptions},
};
use tracing::info;

const WORST_MOLECULES_SHOWN: usize = 10;

pub fn run(args: CrossArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    info!("Loading parameters from {:?}", &args.parameters);
    let parameters = ParameterSet::read_from_path(&args.parameters)?;

    info!("Loading training set from {:?}", &args.training_set);
    let mut training_set = load_training_set(&args.training_set, parameters.classification)?;
    if let Some(path) = &args.reference_charges {
        info!("Loading reference charges from {:?}", path);
        let records = ChgFile::read_from_path(path)?;
        apply_reference_charges(&mut training_set, &records)?;
    }

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let options = ChargeOptions {
        precision: precision(args.extra_precise),
        max_threads: threads,
    };

    println!(
        "Cross-validating parameters on {} molecule(s)...",
        training_set.molecules_count()
    );
    let kd = workflows::charges::cross_validate(&training_set, &parameters, options, &reporter)?;

    println!();
    println!("{}", kd.summary(RankingStatistic::R));
    println!();
    print!("{}", report::atom_type_table(&training_set, &kd));
    println!();
    print!(
        "{}",
        report::worst_molecules(
            &training_set,
            &kd,
            RankingStatistic::Rmsd,
            WORST_MOLECULES_SHOWN
        )
    );

    if let Some(path) = &args.output {
        ChgFile::write_to_path(&training_set, &kd.charges, path)?;
        println!("✓ Charges written to: {}", path.display());
    }
    write_charge_reports(&args.report, &training_set, &kd)
}
