mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 NEEMP CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let threads = cli.threads;
    let quiet = cli.quiet;
    let command_result = match cli.command {
        Commands::Params(args) => {
            info!("Dispatching to 'params' command.");
            commands::params::run(args, threads, quiet)
        }
        Commands::Charges(args) => {
            info!("Dispatching to 'charges' command.");
            commands::charges::run(args, threads, quiet)
        }
        Commands::Cross(args) => {
            info!("Dispatching to 'cross' command.");
            commands::cross::run(args, threads, quiet)
        }
        Commands::Info(args) => {
            info!("Dispatching to 'info' command.");
            commands::info::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
