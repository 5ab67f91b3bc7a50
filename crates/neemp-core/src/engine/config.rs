use super::ranking::RankingStatistic;
use crate::core::solver::eem::SolverPrecision;
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Iterations of the discard search when no explicit limit is given.
pub const DEFAULT_DISCARD_ITERATIONS: usize = 3;
pub const MAX_DISCARD_ITERATIONS: usize = 100_000;
pub const MAX_DISCARD_TIME: Duration = Duration::from_secs(1000 * 3600);

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
    #[error("Unknown kappa preset '{0}' (expected one of: small, protein)")]
    UnknownPreset(String),
}

/// Grid bounds of a named kappa preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KappaPreset {
    pub kappa_max: f64,
    pub step: f64,
}

static KAPPA_PRESETS: Map<&'static str, KappaPreset> = phf_map! {
    "small" => KappaPreset { kappa_max: 1.5, step: 0.001 },
    "protein" => KappaPreset { kappa_max: 0.01, step: 0.0001 },
};

pub fn kappa_preset(name: &str) -> Result<KappaPreset, ConfigError> {
    KAPPA_PRESETS
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KappaSearchStrategy {
    /// Evaluate a single, user-supplied kappa.
    Fixed { kappa: f64 },
    /// Evaluate the grid `0, step, 2*step, ... < kappa_max`.
    FullScan { kappa_max: f64, step: f64 },
    /// Full scan followed by a Brent refinement around the best grid point.
    FullScanBrent { kappa_max: f64, step: f64 },
}

impl KappaSearchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed kappa",
            Self::FullScan { .. } => "full scan",
            Self::FullScanBrent { .. } => "full scan + Brent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardPolicy {
    #[default]
    Off,
    /// Toggle molecules `0, 1, 2, ...` in order.
    Simple,
    /// Toggle a uniformly drawn molecule each iteration.
    Iterative,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardConfig {
    pub policy: DiscardPolicy,
    pub iteration_limit: usize,
    pub time_limit: Option<Duration>,
    /// Seed for the iterative policy; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for DiscardConfig {
    fn default() -> Self {
        Self {
            policy: DiscardPolicy::Off,
            iteration_limit: DEFAULT_DISCARD_ITERATIONS,
            time_limit: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub kappa_search: KappaSearchStrategy,
    pub ranking: RankingStatistic,
    pub precision: SolverPrecision,
    pub discard: DiscardConfig,
    /// Worker cap; all available cores when `None`.
    pub max_threads: Option<usize>,
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    kappa: Option<f64>,
    kappa_max: Option<f64>,
    step: Option<f64>,
    full_scan_only: Option<bool>,
    ranking: Option<RankingStatistic>,
    precision: Option<SolverPrecision>,
    discard_policy: Option<DiscardPolicy>,
    iteration_limit: Option<usize>,
    time_limit: Option<Duration>,
    seed: Option<u64>,
    max_threads: Option<usize>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kappa(mut self, kappa: f64) -> Self {
        self.kappa = Some(kappa);
        self
    }
    pub fn kappa_max(mut self, kappa_max: f64) -> Self {
        self.kappa_max = Some(kappa_max);
        self
    }
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
    /// Fills the grid bounds from a named preset; explicit bounds set later win.
    pub fn preset(mut self, name: &str) -> Result<Self, ConfigError> {
        let preset = kappa_preset(name)?;
        self.kappa_max = Some(preset.kappa_max);
        self.step = Some(preset.step);
        Ok(self)
    }
    pub fn full_scan_only(mut self, only: bool) -> Self {
        self.full_scan_only = Some(only);
        self
    }
    pub fn ranking(mut self, statistic: RankingStatistic) -> Self {
        self.ranking = Some(statistic);
        self
    }
    pub fn precision(mut self, precision: SolverPrecision) -> Self {
        self.precision = Some(precision);
        self
    }
    pub fn discard_policy(mut self, policy: DiscardPolicy) -> Self {
        self.discard_policy = Some(policy);
        self
    }
    pub fn iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn max_threads(mut self, threads: usize) -> Self {
        self.max_threads = Some(threads);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let kappa_search = match self.kappa {
            Some(kappa) => {
                if self.kappa_max.is_some() || self.step.is_some() || self.full_scan_only.is_some() {
                    return Err(invalid(
                        "kappa",
                        "a fixed kappa cannot be combined with scan bounds or a scan mode",
                    ));
                }
                if !(kappa.is_finite() && kappa > 0.0) {
                    return Err(invalid("kappa", "must be a positive number"));
                }
                KappaSearchStrategy::Fixed { kappa }
            }
            None => {
                let kappa_max = self.kappa_max.ok_or(ConfigError::MissingParameter("kappa_max"))?;
                let step = self.step.ok_or(ConfigError::MissingParameter("step"))?;
                if !(kappa_max.is_finite() && kappa_max > 0.0) {
                    return Err(invalid("kappa_max", "must be a positive number"));
                }
                if !(step.is_finite() && step > 0.0) {
                    return Err(invalid("step", "must be a positive number"));
                }
                if step > kappa_max {
                    return Err(invalid("step", "must not exceed kappa_max"));
                }
                if self.full_scan_only.unwrap_or(false) {
                    KappaSearchStrategy::FullScan { kappa_max, step }
                } else {
                    KappaSearchStrategy::FullScanBrent { kappa_max, step }
                }
            }
        };

        let iteration_limit = self.iteration_limit.unwrap_or(DEFAULT_DISCARD_ITERATIONS);
        if iteration_limit > MAX_DISCARD_ITERATIONS {
            return Err(invalid(
                "iteration_limit",
                format!("must not exceed {MAX_DISCARD_ITERATIONS}"),
            ));
        }
        if self.time_limit.is_some_and(|t| t > MAX_DISCARD_TIME) {
            return Err(invalid("time_limit", "must not exceed 1000 hours"));
        }
        if self.max_threads == Some(0) {
            return Err(invalid("max_threads", "must be at least 1"));
        }

        Ok(SearchConfig {
            kappa_search,
            ranking: self.ranking.unwrap_or_default(),
            precision: self.precision.unwrap_or_default(),
            discard: DiscardConfig {
                policy: self.discard_policy.unwrap_or_default(),
                iteration_limit,
                time_limit: self.time_limit,
                seed: self.seed,
            },
            max_threads: self.max_threads,
        })
    }
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}
