use super::kappa_search::find_the_best_parameters;
use crate::engine::config::DiscardPolicy;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::subset::{Subset, SubsetArena, SubsetId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{info, instrument};

/// One examined candidate of the discard search.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardStep {
    /// 1-based iteration number.
    pub iteration: usize,
    pub molecule_index: usize,
    pub molecule_name: String,
    /// Molecules selected by the candidate subset.
    pub molecules_used: usize,
    /// The candidate's ranking value; NaN when it was not evaluated.
    pub value: f64,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscardOutcome {
    /// The best subset found; the root when nothing improved on it.
    pub best: SubsetId,
    pub steps: Vec<DiscardStep>,
}

/// Source of the molecule index toggled in each iteration.
enum Picker {
    Sequential,
    Random(StdRng),
}

impl Picker {
    fn next(&mut self, iteration: usize, molecules: usize) -> usize {
        match self {
            Self::Sequential => iteration,
            Self::Random(rng) => rng.gen_range(0..molecules),
        }
    }
}

/// Greedy search over molecule subsets starting from the evaluated `root`.
///
/// Each iteration toggles one molecule of the current best subset, searches
/// kappa on the result and keeps it when it ranks strictly better. Rejected
/// candidates are dropped; a superseded non-root best is compacted to its best
/// record. Budgets are checked between iterations only.
#[instrument(skip_all, name = "discard_search", fields(policy = ?ctx.config.discard.policy))]
pub fn run(
    ctx: &RunContext,
    arena: &mut SubsetArena,
    root: SubsetId,
) -> Result<DiscardOutcome, EngineError> {
    let discard = &ctx.config.discard;
    let molecules_count = ctx.training_set.molecules_count();

    let root_subset = arena
        .get(root)
        .ok_or_else(|| EngineError::Internal("discard root is not in the arena".into()))?;
    if root_subset.best().is_none() {
        return Err(EngineError::SubsetNotEvaluated);
    }

    let (mut picker, iterations) = match discard.policy {
        DiscardPolicy::Off => {
            return Ok(DiscardOutcome {
                best: root,
                steps: Vec::new(),
            });
        }
        DiscardPolicy::Simple => (
            Picker::Sequential,
            molecules_count.min(discard.iteration_limit),
        ),
        DiscardPolicy::Iterative => {
            let rng = match discard.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            (Picker::Random(rng), discard.iteration_limit)
        }
    };

    info!(iterations, "Starting discard search.");
    let started = Instant::now();
    let mut current = root;
    let mut steps = Vec::with_capacity(iterations);

    for i in 0..iterations {
        if let Some(limit) = discard.time_limit {
            if started.elapsed() >= limit {
                info!(elapsed = ?started.elapsed(), "Time limit reached, stopping discard search.");
                break;
            }
        }

        let iteration = i + 1;
        let molecule_index = picker.next(i, molecules_count);
        let molecule_name = ctx.training_set.molecule(molecule_index).name().to_string();

        let parent = arena
            .get(current)
            .ok_or_else(|| EngineError::Internal("current best subset vanished from the arena".into()))?;
        let mut candidate = Subset::derived(current, parent);
        candidate.molecules_mut().flip(molecule_index);
        let molecules_used = candidate.molecules().count_set();

        info!(
            "Iteration no. {iteration}. Molecule discarded: {molecule_name}. Molecules used: {molecules_used}"
        );

        let (value, accepted) = if molecules_used == 0 {
            info!("Candidate selects no molecules, skipping.");
            (f64::NAN, false)
        } else {
            find_the_best_parameters(ctx, &mut candidate)?;
            let candidate_best = candidate.best().ok_or(EngineError::SubsetNotEvaluated)?;
            let current_best = parent.best().ok_or(EngineError::SubsetNotEvaluated)?;
            (
                ctx.ranking.extract_value(candidate_best),
                ctx.ranking.is_better(candidate_best, current_best),
            )
        };

        if accepted {
            info!("We found a better solution.");
            let candidate_id = arena.insert(candidate);
            if current != root {
                if let Some(superseded) = arena.get_mut(current) {
                    superseded.retain_best_only();
                }
            }
            current = candidate_id;
        } else {
            info!("We didn't find a better solution.");
        }

        ctx.reporter.report(Progress::Message(format!(
            "Iteration {iteration}: toggled '{molecule_name}' ({molecules_used} used), {} = {value:.4}, {}",
            ctx.ranking.statistic(),
            if accepted { "accepted" } else { "rejected" }
        )));

        steps.push(DiscardStep {
            iteration,
            molecule_index,
            molecule_name,
            molecules_used,
            value,
            accepted,
        });
    }

    info!(
        examined = steps.len(),
        accepted = steps.iter().filter(|s| s.accepted).count(),
        "Discard search finished."
    );
    Ok(DiscardOutcome {
        best: current,
        steps,
    })
}
