use super::config::SearchConfig;
use super::error::EngineError;
use super::fitting::ParameterFitter;
use super::progress::ProgressReporter;
use super::ranking::RankingRule;
use super::stats::StatisticsCalculator;
use super::tasks::kappa_search::ParameterSearch;
use crate::core::models::molecule::DistanceSource;
use crate::core::models::training_set::TrainingSet;

/// What the charges of a run are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Kappa sweeps over a training set with cached distances; failing
    /// molecules are expected and only logged at debug level.
    Parameterization,
    /// Charges for a fixed parameter set; failing molecules are warned about.
    Charges,
}

impl RunMode {
    pub fn distance_source(self) -> DistanceSource {
        match self {
            Self::Parameterization => DistanceSource::Cached,
            Self::Charges => DistanceSource::Geometry,
        }
    }
}

/// Worker pool bounding every parallel loop of a run, nested ones included.
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Builds a pool of `max_threads` workers, or one per available core.
    pub fn new(max_threads: Option<usize>) -> Result<Self, EngineError> {
        let threads = max_threads
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1);

        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|idx| format!("neemp-worker-{idx}"))
                .build()
                .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
            Ok(Self { pool, threads })
        }

        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self {
                threads: threads.min(1),
            })
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `op` with every parallel iterator inside it scheduled on this pool.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(op)
        }

        #[cfg(not(feature = "parallel"))]
        {
            op()
        }
    }
}

/// Everything a task needs, passed explicitly instead of through globals.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub training_set: &'a TrainingSet,
    pub config: &'a SearchConfig,
    pub ranking: RankingRule,
    pub mode: RunMode,
    pub fitter: &'a dyn ParameterFitter,
    pub statistics: &'a dyn StatisticsCalculator,
    pub search: &'a dyn ParameterSearch,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> RunContext<'a> {
    /// A context using the configured kappa strategy as the parameter search.
    pub fn new(
        training_set: &'a TrainingSet,
        config: &'a SearchConfig,
        mode: RunMode,
        fitter: &'a dyn ParameterFitter,
        statistics: &'a dyn StatisticsCalculator,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            training_set,
            config,
            ranking: RankingRule::new(config.ranking),
            mode,
            fitter,
            statistics,
            search: &config.kappa_search,
            reporter,
        }
    }

    /// Replaces the parameter search, e.g. with an external optimizer.
    pub fn with_search(mut self, search: &'a dyn ParameterSearch) -> Self {
        self.search = search;
        self
    }
}
