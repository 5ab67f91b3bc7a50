use crate::core::io::parameters::ParameterSet;
use crate::core::models::training_set::TrainingSet;
use crate::core::solver::eem::SolverPrecision;
use crate::core::utils::bitset::BitSet;
use crate::engine::config::{DiscardConfig, KappaSearchStrategy, SearchConfig};
use crate::engine::context::{RunContext, RunMode, WorkerPool};
use crate::engine::error::EngineError;
use crate::engine::fitting::LeastSquaresFitter;
use crate::engine::kappa_data::KappaData;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::ranking::RankingStatistic;
use crate::engine::stats::{ChargeStatistics, StatisticsCalculator};
use crate::engine::tasks::charges::calculate_charges;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChargeOptions {
    pub precision: SolverPrecision,
    pub max_threads: Option<usize>,
}

/// Computes EEM charges of every molecule with a fixed parameter set.
///
/// The returned record carries the parameters aligned to the training set's
/// atom types, the charges and each molecule's condition number.
#[instrument(skip_all, name = "charges_workflow")]
pub fn calculate(
    training_set: &TrainingSet,
    parameters: &ParameterSet,
    options: ChargeOptions,
    reporter: &ProgressReporter,
) -> Result<KappaData, EngineError> {
    evaluate(training_set, parameters, options, false, reporter)
}

/// Computes charges like [`calculate`] and compares them with the training
/// set's reference charges.
#[instrument(skip_all, name = "cross_validation_workflow")]
pub fn cross_validate(
    training_set: &TrainingSet,
    parameters: &ParameterSet,
    options: ChargeOptions,
    reporter: &ProgressReporter,
) -> Result<KappaData, EngineError> {
    training_set.ensure_reference_charges()?;
    evaluate(training_set, parameters, options, true, reporter)
}

fn evaluate(
    training_set: &TrainingSet,
    parameters: &ParameterSet,
    options: ChargeOptions,
    with_statistics: bool,
    reporter: &ProgressReporter,
) -> Result<KappaData, EngineError> {
    let (alpha, beta) = parameters.aligned_with(training_set)?;
    let config = SearchConfig {
        kappa_search: KappaSearchStrategy::Fixed {
            kappa: parameters.kappa,
        },
        ranking: RankingStatistic::default(),
        precision: options.precision,
        discard: DiscardConfig::default(),
        max_threads: options.max_threads,
    };
    let pool = WorkerPool::new(options.max_threads)?;
    let ctx = RunContext::new(
        training_set,
        &config,
        RunMode::Charges,
        &LeastSquaresFitter,
        &ChargeStatistics,
        reporter,
    );

    let mut kd = KappaData::with_kappa(training_set, parameters.kappa);
    kd.parameters_alpha = alpha;
    kd.parameters_beta = beta;
    let mut all = BitSet::new(training_set.molecules_count());
    all.set_all();

    reporter.report(Progress::PhaseStart {
        name: "Charge Calculation",
    });
    pool.install(|| calculate_charges(&ctx, &all, &mut kd));
    if with_statistics {
        ChargeStatistics.compute(training_set, &all, &mut kd);
    }
    reporter.report(Progress::PhaseFinish);

    let failed = training_set
        .molecules()
        .iter()
        .enumerate()
        .filter(|(idx, _)| kd.charges[training_set.atom_range(*idx)].iter().any(|q| !q.is_finite()))
        .count();
    if failed > 0 {
        warn!(failed, "Some molecules have no valid charges.");
    }
    info!(
        molecules = training_set.molecules_count(),
        kappa = parameters.kappa,
        "Charge calculation complete."
    );
    Ok(kd)
}
