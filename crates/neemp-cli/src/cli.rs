use crate::utils::parser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use neemp::core::models::atom_type::AtomTypeClassification;
use neemp::engine::config::DiscardPolicy;
use neemp::engine::ranking::RankingStatistic;
use std::path::PathBuf;
use std::time::Duration;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tomas Racek",
    version,
    about = "NEEMP CLI - Parameterization and calculation of EEM (Electronegativity Equalization Method) atomic charges.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit EEM parameters (kappa, alpha, beta) to the reference charges of a training set.
    Params(ParamsArgs),
    /// Calculate EEM charges for a set of molecules with an existing parameter set.
    Charges(ChargesArgs),
    /// Compare charges from an existing parameter set with reference charges.
    Cross(CrossArgs),
    /// Print a summary of a training set: molecules, atoms and atom types.
    Info(InfoArgs),
}

/// Atom-type classification as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationArg {
    /// One atom type per element.
    Element,
    /// One atom type per element and highest bond order.
    ElementBond,
}

impl From<ClassificationArg> for AtomTypeClassification {
    fn from(arg: ClassificationArg) -> Self {
        match arg {
            ClassificationArg::Element => AtomTypeClassification::Element,
            ClassificationArg::ElementBond => AtomTypeClassification::ElementBond,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardArg {
    /// Try to drop molecules in input order.
    Simple,
    /// Try to drop randomly drawn molecules.
    Iterative,
}

impl From<DiscardArg> for DiscardPolicy {
    fn from(arg: DiscardArg) -> Self {
        match arg {
            DiscardArg::Simple => DiscardPolicy::Simple,
            DiscardArg::Iterative => DiscardPolicy::Iterative,
        }
    }
}

/// Arguments for the `params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    // --- Core Arguments ---
    /// Path to the training set (TOML).
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub training_set: PathBuf,

    /// Path for the fitted parameter file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Reference charges (.chg) overriding the charges stored in the training set.
    #[arg(short = 'r', long, value_name = "PATH")]
    pub reference_charges: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the charges computed with the fitted parameters (.chg).
    #[arg(long, value_name = "PATH")]
    pub charges_output: Option<PathBuf>,

    #[command(flatten)]
    pub report: ChargeReportArgs,

    /// How atoms are grouped into atom types.
    #[arg(long, value_enum, value_name = "KIND")]
    pub classification: Option<ClassificationArg>,

    // --- Kappa Search ---
    #[command(flatten)]
    pub kappa: KappaArgs,

    /// Statistic used to rank trial parameter sets (R, RMSD, MSE, D_avg, D_max).
    #[arg(long, value_parser = parser::parse_statistic, value_name = "STAT")]
    pub sort_by: Option<RankingStatistic>,

    /// Refine every solve and compute its condition number.
    #[arg(long)]
    pub extra_precise: bool,

    // --- Discard Search ---
    /// Search for a subset of molecules that improves the fit.
    #[arg(long, value_enum, value_name = "MODE")]
    pub discard: Option<DiscardArg>,

    /// Maximum number of discard iterations.
    #[arg(long = "limit-iters", value_name = "INT")]
    pub iteration_limit: Option<usize>,

    /// Wall-clock budget of the discard search (HH:MM:SS).
    #[arg(long = "limit-time", value_parser = parser::parse_duration, value_name = "HH:MM:SS")]
    pub time_limit: Option<Duration>,

    /// Seed for the iterative discard mode.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S discard.iteration-limit=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Extra outputs derived from computed charges and their reference charges.
#[derive(Args, Debug, Clone, Default)]
pub struct ChargeReportArgs {
    /// Write per-molecule charge statistics (.chgs).
    #[arg(long = "chg-stats-output", value_name = "PATH")]
    pub stats_output: Option<PathBuf>,

    /// Warn about atoms whose EEM charge differs abnormally from the reference charge.
    #[arg(long)]
    pub check_charges: bool,
}

impl ChargeReportArgs {
    /// Whether any output needs reference charges of every molecule.
    pub fn needs_references(&self) -> bool {
        self.stats_output.is_some() || self.check_charges
    }
}

/// Either a single kappa or the bounds of a kappa scan.
#[derive(Args, Debug, Clone, Default)]
pub struct KappaArgs {
    /// Use this kappa instead of searching for one.
    #[arg(long, value_name = "FLOAT", conflicts_with_all = ["kappa_max", "step", "preset", "full_scan_only"])]
    pub kappa: Option<f64>,

    /// Upper bound of the kappa scan.
    #[arg(long, value_name = "FLOAT")]
    pub kappa_max: Option<f64>,

    /// Step of the kappa scan.
    #[arg(long, value_name = "FLOAT")]
    pub step: Option<f64>,

    /// Named scan bounds: 'small' (molecules) or 'protein'.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Skip the Brent refinement after the scan.
    #[arg(long)]
    pub full_scan_only: bool,
}

/// Arguments for the `charges` subcommand.
#[derive(Args, Debug)]
pub struct ChargesArgs {
    /// Path to the molecule set (TOML).
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub training_set: PathBuf,

    /// Path to the parameter file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub parameters: PathBuf,

    /// Path for the computed charges (.chg).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Reference charges (.chg) for the statistics and the charge check.
    #[arg(short = 'r', long, value_name = "PATH")]
    pub reference_charges: Option<PathBuf>,

    #[command(flatten)]
    pub report: ChargeReportArgs,

    /// Refine every solve and compute its condition number.
    #[arg(long)]
    pub extra_precise: bool,
}

/// Arguments for the `cross` subcommand.
#[derive(Args, Debug)]
pub struct CrossArgs {
    /// Path to the training set (TOML).
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub training_set: PathBuf,

    /// Path to the parameter file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub parameters: PathBuf,

    /// Reference charges (.chg) overriding the charges stored in the training set.
    #[arg(short = 'r', long, value_name = "PATH")]
    pub reference_charges: Option<PathBuf>,

    /// Also write the computed charges (.chg).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub report: ChargeReportArgs,

    /// Refine every solve and compute its condition number.
    #[arg(long)]
    pub extra_precise: bool,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the training set (TOML).
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub training_set: PathBuf,

    /// How atoms are grouped into atom types.
    #[arg(long, value_enum, value_name = "KIND", default_value = "element-bond")]
    pub classification: ClassificationArg,
}
