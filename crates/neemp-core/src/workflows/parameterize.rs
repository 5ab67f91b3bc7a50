use crate::core::io::parameters::ParameterSet;
use crate::core::models::training_set::TrainingSet;
use crate::engine::config::{DiscardPolicy, SearchConfig};
use crate::engine::context::{RunContext, RunMode, WorkerPool};
use crate::engine::error::EngineError;
use crate::engine::fitting::{LeastSquaresFitter, ParameterFitter};
use crate::engine::kappa_data::KappaData;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::stats::{ChargeStatistics, StatisticsCalculator};
use crate::engine::subset::{Subset, SubsetArena};
use crate::engine::tasks::discard::{self, DiscardStep};
use crate::engine::tasks::kappa_search::{ParameterSearch, find_the_best_parameters};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ParameterizationResult {
    pub parameters: ParameterSet,
    /// The best trial record, sized for the whole training set.
    pub best: KappaData,
    /// Indices of the molecules the best subset selects, ascending.
    pub used_molecules: Vec<usize>,
    pub discard_steps: Vec<DiscardStep>,
}

/// Pluggable collaborators of a parameterization run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub fitter: &'a dyn ParameterFitter,
    pub statistics: &'a dyn StatisticsCalculator,
    /// Replaces the configured kappa strategy when set.
    pub search: Option<&'a dyn ParameterSearch>,
}

impl Default for Collaborators<'_> {
    fn default() -> Self {
        Self {
            fitter: &LeastSquaresFitter,
            statistics: &ChargeStatistics,
            search: None,
        }
    }
}

#[instrument(skip_all, name = "parameterization_workflow")]
pub fn run(
    training_set: &TrainingSet,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<ParameterizationResult, EngineError> {
    run_with(training_set, config, Collaborators::default(), reporter)
}

pub fn run_with(
    training_set: &TrainingSet,
    config: &SearchConfig,
    collaborators: Collaborators,
    reporter: &ProgressReporter,
) -> Result<ParameterizationResult, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    training_set.ensure_reference_charges()?;
    let mut working_set = training_set.clone();
    working_set.cache_reciprocal_distances();
    let pool = WorkerPool::new(config.max_threads)?;
    info!(
        molecules = working_set.molecules_count(),
        atoms = working_set.atoms_count(),
        atom_types = working_set.atom_types_count(),
        threads = pool.threads(),
        strategy = config.kappa_search.name(),
        ranking = %config.ranking,
        "Starting parameterization."
    );
    reporter.report(Progress::PhaseFinish);

    let mut ctx = RunContext::new(
        &working_set,
        config,
        RunMode::Parameterization,
        collaborators.fitter,
        collaborators.statistics,
        reporter,
    );
    if let Some(search) = collaborators.search {
        ctx = ctx.with_search(search);
    }

    pool.install(|| {
        let mut arena = SubsetArena::new();

        // === Phase 1: Kappa search on the full training set ===
        let mut root = Subset::full(&working_set);
        reporter.phase("Kappa Search", || find_the_best_parameters(&ctx, &mut root))?;
        let root_id = arena.insert(root);

        // === Phase 2: Discard search (optional) ===
        let (best_id, discard_steps) = if config.discard.policy == DiscardPolicy::Off {
            (root_id, Vec::new())
        } else {
            let outcome = reporter.phase("Discarding", || discard::run(&ctx, &mut arena, root_id))?;
            (outcome.best, outcome.steps)
        };

        // === Phase 3: Collect results ===
        let best_subset = arena
            .get(best_id)
            .ok_or_else(|| EngineError::Internal("best subset is not in the arena".into()))?;
        let best = best_subset
            .best()
            .ok_or(EngineError::SubsetNotEvaluated)?
            .clone();
        let used_molecules: Vec<usize> = best_subset.molecules().iter_set().collect();
        let parameters = ParameterSet::from_fit(
            &working_set,
            best.kappa,
            &best.parameters_alpha,
            &best.parameters_beta,
        );

        info!(
            molecules_used = used_molecules.len(),
            "Parameterization complete. {}",
            best.summary(config.ranking)
        );
        Ok(ParameterizationResult {
            parameters,
            best,
            used_molecules,
            discard_steps,
        })
    })
}
