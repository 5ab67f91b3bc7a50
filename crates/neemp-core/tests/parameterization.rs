mod common;

use common::synthetic_training_set;
use neemp::core::models::training_set::TrainingSet;
use neemp::engine::config::{DiscardPolicy, SearchConfig, SearchConfigBuilder};
use neemp::engine::context::{RunContext, RunMode};
use neemp::engine::error::EngineError;
use neemp::engine::fitting::LeastSquaresFitter;
use neemp::engine::progress::ProgressReporter;
use neemp::engine::ranking::{RankingRule, RankingStatistic};
use neemp::engine::stats::ChargeStatistics;
use neemp::engine::subset::{BestRecord, Subset, SubsetArena};
use neemp::engine::tasks::kappa_search::{FullScanBrent, find_the_best_parameters};
use neemp::engine::tasks::discard;
use neemp::workflows::parameterize;
use std::time::Duration;

fn scan_config() -> SearchConfigBuilder {
    SearchConfigBuilder::new()
        .kappa_max(1.0)
        .step(0.1)
        .full_scan_only(true)
        .max_threads(2)
}

fn context<'a>(
    set: &'a TrainingSet,
    config: &'a SearchConfig,
    reporter: &'a ProgressReporter<'a>,
) -> RunContext<'a> {
    RunContext::new(
        set,
        config,
        RunMode::Parameterization,
        &LeastSquaresFitter,
        &ChargeStatistics,
        reporter,
    )
}

#[test]
fn simple_discard_toggles_leading_molecules_in_order() {
    let set = synthetic_training_set(5);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Simple)
        .build()
        .unwrap();
    let result = parameterize::run(&set, &config, &ProgressReporter::new()).unwrap();

    let visited: Vec<usize> = result.discard_steps.iter().map(|s| s.molecule_index).collect();
    assert_eq!(visited, vec![0, 1, 2]);
    let iterations: Vec<usize> = result.discard_steps.iter().map(|s| s.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3]);

    assert!(result.used_molecules.len() >= 2);
    for idx in 3..5 {
        assert!(result.used_molecules.contains(&idx));
    }
    assert_eq!(result.parameters.atom_types.len(), set.atom_types_count());
}

#[test]
fn simple_discard_is_bounded_by_molecule_count() {
    let set = synthetic_training_set(2);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Simple)
        .iteration_limit(10)
        .build()
        .unwrap();
    let result = parameterize::run(&set, &config, &ProgressReporter::new()).unwrap();
    assert_eq!(result.discard_steps.len(), 2);
}

#[test]
fn discard_never_worsens_the_root() {
    let set = synthetic_training_set(6);
    let reporter = ProgressReporter::new();
    let plain = parameterize::run(&set, &scan_config().build().unwrap(), &reporter).unwrap();
    let config = scan_config()
        .discard_policy(DiscardPolicy::Iterative)
        .iteration_limit(4)
        .seed(7)
        .build()
        .unwrap();
    let discarded = parameterize::run(&set, &config, &reporter).unwrap();

    let rule = RankingRule::new(RankingStatistic::R);
    assert!(!rule.is_better(&plain.best, &discarded.best));
    assert_eq!(discarded.discard_steps.len(), 4);
    assert!(plain.discard_steps.is_empty());
    assert_eq!(plain.used_molecules, (0..6).collect::<Vec<_>>());
}

#[test]
fn simple_discard_never_worsens_the_root() {
    let set = synthetic_training_set(5);
    let reporter = ProgressReporter::new();
    for statistic in [RankingStatistic::R, RankingStatistic::Mse, RankingStatistic::DAvg] {
        let plain_config = scan_config().ranking(statistic).build().unwrap();
        let plain = parameterize::run(&set, &plain_config, &reporter).unwrap();
        let config = scan_config()
            .ranking(statistic)
            .discard_policy(DiscardPolicy::Simple)
            .build()
            .unwrap();
        let discarded = parameterize::run(&set, &config, &reporter).unwrap();

        let rule = RankingRule::new(statistic);
        assert!(!rule.is_better(&plain.best, &discarded.best), "ranked by {statistic}");
        assert!(!discarded.discard_steps.is_empty());
    }
}

#[test]
fn iterative_discard_is_reproducible_with_a_seed() {
    let set = synthetic_training_set(5);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Iterative)
        .iteration_limit(3)
        .seed(42)
        .build()
        .unwrap();
    let reporter = ProgressReporter::new();
    let first = parameterize::run(&set, &config, &reporter).unwrap();
    let second = parameterize::run(&set, &config, &reporter).unwrap();
    let picks = |r: &parameterize::ParameterizationResult| -> Vec<usize> {
        r.discard_steps.iter().map(|s| s.molecule_index).collect()
    };
    assert_eq!(picks(&first), picks(&second));
    assert_eq!(first.used_molecules, second.used_molecules);
}

#[test]
fn exhausted_time_budget_stops_before_first_iteration() {
    let set = synthetic_training_set(4);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Simple)
        .time_limit(Duration::ZERO)
        .build()
        .unwrap();
    let result = parameterize::run(&set, &config, &ProgressReporter::new()).unwrap();
    assert!(result.discard_steps.is_empty());
    assert_eq!(result.used_molecules.len(), 4);
}

#[test]
fn accepted_candidates_form_a_lineage_to_the_root() {
    let set = synthetic_training_set(5);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Simple)
        .build()
        .unwrap();
    let reporter = ProgressReporter::new();
    let ctx = context(&set, &config, &reporter);

    let mut arena = SubsetArena::new();
    let mut root = Subset::full(&set);
    find_the_best_parameters(&ctx, &mut root).unwrap();
    let root_id = arena.insert(root);
    let outcome = discard::run(&ctx, &mut arena, root_id).unwrap();

    let accepted = outcome.steps.iter().filter(|s| s.accepted).count();
    assert_eq!(arena.len(), 1 + accepted);
    let lineage = arena.lineage(outcome.best);
    assert_eq!(lineage.len(), 1 + accepted);
    assert_eq!(lineage.last(), Some(&root_id));
    assert_eq!(arena.get(root_id).unwrap().data().len(), 10);
}

#[test]
fn discard_requires_an_evaluated_root() {
    let set = synthetic_training_set(3);
    let config = scan_config()
        .discard_policy(DiscardPolicy::Simple)
        .build()
        .unwrap();
    let reporter = ProgressReporter::new();
    let ctx = context(&set, &config, &reporter);
    let mut arena = SubsetArena::new();
    let root = arena.insert(Subset::full(&set));
    assert!(matches!(
        discard::run(&ctx, &mut arena, root),
        Err(EngineError::SubsetNotEvaluated)
    ));
}

#[test]
fn full_scan_best_is_not_beaten_by_any_grid_record() {
    for statistic in [RankingStatistic::R, RankingStatistic::Rmsd, RankingStatistic::DMax] {
        let set = synthetic_training_set(4);
        let config = scan_config().ranking(statistic).build().unwrap();
        let reporter = ProgressReporter::new();
        let ctx = context(&set, &config, &reporter);

        let mut subset = Subset::full(&set);
        find_the_best_parameters(&ctx, &mut subset).unwrap();

        let best = subset.best().unwrap();
        assert!(subset.data().iter().all(|kd| !ctx.ranking.is_better(kd, best)));
        let kappas: Vec<f64> = subset.data().iter().map(|kd| kd.kappa).collect();
        assert_eq!(kappas.len(), 10);
        assert_eq!(kappas[0], 0.0);
        assert!((kappas[9] - 0.9).abs() < 1e-12);
        assert!(kappas.iter().all(|&k| k < 1.0));
    }
}

#[test]
fn brent_refines_inside_the_bracket() {
    let set = synthetic_training_set(4);
    let config = SearchConfigBuilder::new()
        .kappa_max(1.0)
        .step(0.1)
        .build()
        .unwrap();
    let reporter = ProgressReporter::new();
    let ctx = context(&set, &config, &reporter);

    let mut subset = Subset::full(&set);
    find_the_best_parameters(&ctx, &mut subset).unwrap();

    assert_eq!(subset.best_record(), Some(BestRecord::Polish));
    let grid_best = ctx.ranking.best_index(subset.data()).unwrap();
    let lo = grid_best.saturating_sub(1) as f64 * 0.1;
    let hi = (grid_best + 1).min(9) as f64 * 0.1;
    let polished = subset.best().unwrap();
    assert!(polished.kappa >= lo - 1e-12 && polished.kappa <= hi + 1e-12);
    assert!(polished.full_stats.r.is_finite());
}

#[test]
fn brent_needs_three_grid_points() {
    let set = synthetic_training_set(3);
    let config = SearchConfigBuilder::new()
        .kappa_max(0.2)
        .step(0.1)
        .build()
        .unwrap();
    let reporter = ProgressReporter::new();
    let ctx = context(&set, &config, &reporter);

    let mut subset = Subset::full(&set);
    assert!(matches!(
        find_the_best_parameters(&ctx, &mut subset),
        Err(EngineError::BrentBracket { points: 2 })
    ));
}

#[test]
fn custom_search_can_replace_the_configured_strategy() {
    let set = synthetic_training_set(3);
    let config = scan_config().build().unwrap();
    let reporter = ProgressReporter::new();
    let brent = FullScanBrent::new(0.5, 0.1);
    let ctx = context(&set, &config, &reporter).with_search(&brent);

    let mut subset = Subset::full(&set);
    find_the_best_parameters(&ctx, &mut subset).unwrap();
    assert_eq!(subset.data().len(), 5);
    assert_eq!(subset.best_record(), Some(BestRecord::Polish));
}

#[test]
fn empty_subset_is_rejected() {
    let set = synthetic_training_set(3);
    let config = scan_config().build().unwrap();
    let reporter = ProgressReporter::new();
    let ctx = context(&set, &config, &reporter);

    let mut subset = Subset::full(&set);
    subset.molecules_mut().clear_all();
    assert!(matches!(
        find_the_best_parameters(&ctx, &mut subset),
        Err(EngineError::EmptySubset)
    ));
}

#[test]
fn fixed_kappa_evaluates_a_single_record() {
    let set = synthetic_training_set(3);
    let config = SearchConfigBuilder::new().kappa(0.4).build().unwrap();
    let result = parameterize::run(&set, &config, &ProgressReporter::new()).unwrap();
    assert_eq!(result.best.kappa, 0.4);
    assert_eq!(result.parameters.kappa, 0.4);
    assert!(result.discard_steps.is_empty());
}

#[test]
fn missing_reference_charges_fail_early() {
    let set = synthetic_training_set(2);
    let bare = TrainingSet::new(
        set.molecules()
            .iter()
            .map(|m| {
                neemp::core::models::molecule::Molecule::new(
                    m.name(),
                    m.atoms()
                        .iter()
                        .cloned()
                        .map(|mut a| {
                            a.reference_charge = None;
                            a
                        })
                        .collect(),
                    m.total_charge(),
                )
            })
            .collect(),
        set.classification(),
    )
    .unwrap();
    let config = SearchConfigBuilder::new().kappa(0.4).build().unwrap();
    assert!(matches!(
        parameterize::run(&bare, &config, &ProgressReporter::new()),
        Err(EngineError::TrainingSet(_))
    ));
}
