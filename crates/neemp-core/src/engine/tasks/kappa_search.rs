use super::charges::calculate_charges;
use crate::core::utils::bitset::BitSet;
use crate::core::utils::brent::{self, BrentOptions};
use crate::engine::config::KappaSearchStrategy;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::kappa_data::KappaData;
use crate::engine::progress::Progress;
use crate::engine::subset::{BestRecord, Subset};
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A strategy that evaluates kappa trials on a subset and points its `best` at
/// the winning record.
pub trait ParameterSearch: Sync {
    fn name(&self) -> &'static str;

    fn search(&self, ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError>;
}

/// The per-trial pipeline: fit parameters, solve charges, compute statistics.
pub fn perform_calculations(ctx: &RunContext, molecules: &BitSet, kd: &mut KappaData) {
    ctx.fitter.fit(ctx.training_set, molecules, kd);
    calculate_charges(ctx, molecules, kd);
    ctx.statistics.compute(ctx.training_set, molecules, kd);
}

/// Number of points of the grid `0, step, 2*step, ... < kappa_max`.
///
/// `kappa_max` itself is never evaluated; the small epsilon only absorbs
/// float error when `kappa_max` is a multiple of `step`.
pub fn grid_len(kappa_max: f64, step: f64) -> usize {
    (kappa_max / step + 1e-9).floor() as usize
}

/// Runs the context's parameter search on `subset`.
#[instrument(skip_all, name = "kappa_search", fields(strategy = ctx.search.name()))]
pub fn find_the_best_parameters(ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError> {
    let selected = subset.molecules().count_set();
    if selected == 0 {
        return Err(EngineError::EmptySubset);
    }

    ctx.search.search(ctx, subset)?;

    let best = subset.best().ok_or_else(|| {
        EngineError::Internal(format!("search '{}' did not select a best record", ctx.search.name()))
    })?;
    debug!(molecules = selected, "Best: {}", best.summary(ctx.ranking.statistic()));
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedKappa {
    pub kappa: f64,
}

impl ParameterSearch for FixedKappa {
    fn name(&self) -> &'static str {
        "fixed kappa"
    }

    fn search(&self, ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError> {
        subset.reset_data(ctx.training_set, 1, false);
        let (molecules, data, _) = subset.records_mut();
        let kd = &mut data[0];
        kd.kappa = self.kappa;
        perform_calculations(ctx, molecules, kd);
        subset.set_best(BestRecord::Grid(0));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullScan {
    pub kappa_max: f64,
    pub step: f64,
}

impl ParameterSearch for FullScan {
    fn name(&self) -> &'static str {
        "full scan"
    }

    fn search(&self, ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError> {
        scan(ctx, subset, self.kappa_max, self.step, false)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullScanBrent {
    pub kappa_max: f64,
    pub step: f64,
    pub options: BrentOptions,
}

impl FullScanBrent {
    pub fn new(kappa_max: f64, step: f64) -> Self {
        Self {
            kappa_max,
            step,
            options: BrentOptions::default(),
        }
    }
}

impl ParameterSearch for FullScanBrent {
    fn name(&self) -> &'static str {
        "full scan + Brent"
    }

    fn search(&self, ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError> {
        let points = grid_len(self.kappa_max, self.step);
        if points < 3 {
            return Err(EngineError::BrentBracket { points });
        }

        let best_idx = scan(ctx, subset, self.kappa_max, self.step, true)?;
        let (left, right) = bracket(best_idx, points);

        let (molecules, data, polish) = subset.records_mut();
        let (a, b) = (data[left].kappa, data[right].kappa);
        let polish = polish.get_or_insert_with(|| KappaData::new(ctx.training_set));

        let minimum = brent::minimize(
            |kappa| {
                polish.kappa = kappa;
                perform_calculations(ctx, molecules, polish);
                trace!("B> {}", polish.summary(ctx.ranking.statistic()));
                ctx.ranking.loss(polish)
            },
            a,
            b,
            &self.options,
        );

        if minimum.last_evaluated != minimum.x {
            polish.kappa = minimum.x;
            perform_calculations(ctx, molecules, polish);
        }
        debug!(
            iterations = minimum.iterations,
            converged = minimum.converged,
            kappa = minimum.x,
            "Brent refinement finished."
        );

        subset.set_best(BestRecord::Polish);
        Ok(())
    }
}

/// Grid indices enclosing `best_idx`, shifted inward at the edges.
fn bracket(best_idx: usize, points: usize) -> (usize, usize) {
    if best_idx == 0 {
        (0, 1)
    } else if best_idx + 1 >= points {
        (points - 2, points - 1)
    } else {
        (best_idx - 1, best_idx + 1)
    }
}

/// Evaluates the whole grid and selects the best grid record.
fn scan(
    ctx: &RunContext,
    subset: &mut Subset,
    kappa_max: f64,
    step: f64,
    with_polish: bool,
) -> Result<usize, EngineError> {
    let points = grid_len(kappa_max, step);
    subset.reset_data(ctx.training_set, points, with_polish);
    ctx.reporter.report(Progress::TaskStart {
        total_steps: points as u64,
    });

    let (molecules, data, _) = subset.records_mut();
    let evaluate = |(i, kd): (usize, &mut KappaData)| {
        kd.kappa = i as f64 * step;
        perform_calculations(ctx, molecules, kd);
        trace!("F> {}", kd.summary(ctx.ranking.statistic()));
        ctx.reporter.report(Progress::TaskIncrement);
    };

    #[cfg(not(feature = "parallel"))]
    data.iter_mut().enumerate().for_each(evaluate);

    #[cfg(feature = "parallel")]
    data.par_iter_mut().enumerate().for_each(evaluate);

    ctx.reporter.report(Progress::TaskFinish);

    subset
        .select_best_grid(&ctx.ranking)
        .ok_or_else(|| EngineError::Internal("kappa scan produced no records".into()))
}

impl ParameterSearch for KappaSearchStrategy {
    fn name(&self) -> &'static str {
        KappaSearchStrategy::name(self)
    }

    fn search(&self, ctx: &RunContext, subset: &mut Subset) -> Result<(), EngineError> {
        match *self {
            Self::Fixed { kappa } => FixedKappa { kappa }.search(ctx, subset),
            Self::FullScan { kappa_max, step } => FullScan { kappa_max, step }.search(ctx, subset),
            Self::FullScanBrent { kappa_max, step } => {
                FullScanBrent::new(kappa_max, step).search(ctx, subset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_stops_short_of_kappa_max() {
        assert_eq!(grid_len(1.5, 0.001), 1500);
        assert_eq!(grid_len(0.01, 0.0001), 100);
        assert_eq!(grid_len(1.0, 0.1), 10);
        assert_eq!(grid_len(0.3, 0.1), 3);
        assert_eq!(grid_len(0.25, 0.1), 2);
        assert_eq!(grid_len(0.1, 0.1), 1);
    }

    #[test]
    fn bracket_shifts_inward_at_edges() {
        assert_eq!(bracket(0, 5), (0, 1));
        assert_eq!(bracket(4, 5), (3, 4));
        assert_eq!(bracket(2, 5), (1, 3));
    }
}
