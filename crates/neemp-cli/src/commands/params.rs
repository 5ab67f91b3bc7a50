use super::charges::write_charge_reports;
use crate::cli::ParamsArgs;
use crate::config::PartialParameterizationConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::utils::report;
use neemp::{
    core::io::{
        chg::{ChgFile, apply_reference_charges},
        training::load_training_set,
    },
    engine::progress::ProgressReporter,
    workflows::{self, charges::ChargeOptions},
};
use tracing::info;

pub fn run(args: ParamsArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialParameterizationConfig::from_file(path)?,
        None => PartialParameterizationConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args, threads)?;
    let config = &app_config.search;

    info!("Loading training set from {:?}", &args.training_set);
    let mut training_set = load_training_set(&args.training_set, app_config.classification)?;
    if let Some(path) = &args.reference_charges {
        info!("Loading reference charges from {:?}", path);
        let records = ChgFile::read_from_path(path)?;
        apply_reference_charges(&mut training_set, &records)?;
    }

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting parameterization ({}, ranked by {})...",
        config.kappa_search.name(),
        config.ranking
    );
    let result = workflows::parameterize::run(&training_set, config, &reporter)?;

    println!();
    print!(
        "{}",
        report::parameterization_report(&training_set, &result, config.ranking)
    );

    result.parameters.write_to_path(&args.output)?;
    println!("✓ Parameters written to: {}", args.output.display());

    if args.charges_output.is_some() || args.report.needs_references() {
        let options = ChargeOptions {
            precision: config.precision,
            max_threads: config.max_threads,
        };
        let kd = workflows::charges::cross_validate(&training_set, &result.parameters, options, &reporter)?;
        if let Some(path) = &args.charges_output {
            ChgFile::write_to_path(&training_set, &kd.charges, path)?;
            println!("✓ Charges written to: {}", path.display());
        }
        write_charge_reports(&args.report, &training_set, &kd)?;
    }

    Ok(())
}
