mod defaults;

pub use defaults::DefaultsConfig;

use crate::cli::ParamsArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use neemp::core::models::atom_type::AtomTypeClassification;
use neemp::core::solver::eem::SolverPrecision;
use neemp::engine::config::{self as core_config, DiscardPolicy, SearchConfigBuilder};
use neemp::engine::ranking::RankingStatistic;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialKappaConfig {
    /// A fixed kappa; excludes the scan settings below.
    value: Option<f64>,
    preset: Option<String>,
    #[serde(rename = "kappa-max")]
    kappa_max: Option<f64>,
    step: Option<f64>,
    #[serde(rename = "full-scan-only")]
    full_scan_only: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDiscardConfig {
    policy: Option<DiscardPolicy>,
    #[serde(rename = "iteration-limit")]
    iteration_limit: Option<usize>,
    /// `HH:MM:SS`
    #[serde(rename = "time-limit")]
    time_limit: Option<String>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialParameterizationConfig {
    classification: Option<AtomTypeClassification>,
    #[serde(rename = "sort-by")]
    sort_by: Option<RankingStatistic>,
    #[serde(rename = "extra-precise")]
    extra_precise: Option<bool>,
    kappa: Option<PartialKappaConfig>,
    discard: Option<PartialDiscardConfig>,
}

/// Fully resolved settings of a `params` run.
#[derive(Debug)]
pub struct AppConfig {
    pub classification: AtomTypeClassification,
    pub search: core_config::SearchConfig,
}

impl PartialParameterizationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves every setting as command line, then config file, then defaults.
    pub fn merge_with_cli(mut self, args: &ParamsArgs, threads: Option<usize>) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let kappa_file = self.kappa.take().unwrap_or_default();
        let discard_file = self.discard.take().unwrap_or_default();

        let mut builder = SearchConfigBuilder::new();
        builder = Self::merge_kappa(builder, args, kappa_file, &defaults)?;

        let ranking = args.sort_by.or(self.sort_by).unwrap_or(defaults.ranking);
        let extra_precise = args.extra_precise
            || self.extra_precise.unwrap_or(defaults.extra_precise);
        builder = builder.ranking(ranking).precision(if extra_precise {
            SolverPrecision::ExtraPrecise
        } else {
            SolverPrecision::Fast
        });

        builder = Self::merge_discard(builder, args, discard_file)?;
        if let Some(threads) = threads {
            builder = builder.max_threads(threads);
        }

        let search = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        let classification = args
            .classification
            .map(Into::into)
            .or(self.classification)
            .unwrap_or(defaults.classification);

        Ok(AppConfig {
            classification,
            search,
        })
    }

    fn merge_kappa(
        builder: SearchConfigBuilder,
        args: &ParamsArgs,
        file: PartialKappaConfig,
        defaults: &DefaultsConfig,
    ) -> Result<SearchConfigBuilder> {
        let cli = &args.kappa;
        let cli_scans = cli.kappa_max.is_some()
            || cli.step.is_some()
            || cli.preset.is_some()
            || cli.full_scan_only;

        // A scan requested on the command line outranks a fixed kappa from the file.
        let fixed = cli.kappa.or(if cli_scans { None } else { file.value });
        if let Some(kappa) = fixed {
            return Ok(builder.kappa(kappa));
        }

        let preset = cli
            .preset
            .as_deref()
            .or(file.preset.as_deref())
            .unwrap_or(&defaults.kappa_preset);
        let mut builder = builder
            .preset(preset)
            .map_err(|e| CliError::Config(e.to_string()))?;
        if let Some(kappa_max) = cli.kappa_max.or(file.kappa_max) {
            builder = builder.kappa_max(kappa_max);
        }
        if let Some(step) = cli.step.or(file.step) {
            builder = builder.step(step);
        }
        let full_scan_only = cli.full_scan_only
            || file.full_scan_only.unwrap_or(defaults.full_scan_only);
        Ok(builder.full_scan_only(full_scan_only))
    }

    fn merge_discard(
        mut builder: SearchConfigBuilder,
        args: &ParamsArgs,
        file: PartialDiscardConfig,
    ) -> Result<SearchConfigBuilder> {
        let policy = args
            .discard
            .map(Into::into)
            .or(file.policy)
            .unwrap_or_default();
        builder = builder.discard_policy(policy);

        if let Some(limit) = args.iteration_limit.or(file.iteration_limit) {
            builder = builder.iteration_limit(limit);
        }

        let file_time_limit = file
            .time_limit
            .as_deref()
            .map(parser::parse_duration)
            .transpose()
            .map_err(|e| CliError::Config(format!("`discard.time-limit`: {}", e)))?;
        if let Some(limit) = args.time_limit.or(file_time_limit) {
            builder = builder.time_limit(limit);
        }

        if let Some(seed) = args.seed.or(file.seed) {
            builder = builder.seed(seed);
        }
        Ok(builder)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            let float = || -> Result<f64> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })
            };
            let integer = || -> Result<u64> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid integer value for {}: {}", key, value_str))
                })
            };

            match key {
                "sort-by" => {
                    self.sort_by = Some(
                        parser::parse_statistic(value_str)
                            .map_err(|e| CliError::Config(e.to_string()))?,
                    );
                }
                "extra-precise" => {
                    self.extra_precise = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                    })?);
                }
                "kappa.value" => {
                    self.kappa.get_or_insert_with(Default::default).value = Some(float()?);
                }
                "kappa.kappa-max" => {
                    self.kappa.get_or_insert_with(Default::default).kappa_max = Some(float()?);
                }
                "kappa.step" => {
                    self.kappa.get_or_insert_with(Default::default).step = Some(float()?);
                }
                "kappa.preset" => {
                    self.kappa.get_or_insert_with(Default::default).preset =
                        Some(value_str.to_string());
                }
                "discard.iteration-limit" => {
                    self.discard
                        .get_or_insert_with(Default::default)
                        .iteration_limit = Some(integer()? as usize);
                }
                "discard.time-limit" => {
                    self.discard.get_or_insert_with(Default::default).time_limit =
                        Some(value_str.to_string());
                }
                "discard.seed" => {
                    self.discard.get_or_insert_with(Default::default).seed = Some(integer()?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use neemp::engine::config::KappaSearchStrategy;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("neemp.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn params_args(extra: &[&str]) -> ParamsArgs {
        let mut args = vec!["neemp", "params", "-t", "set.toml", "-o", "out.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Params(args) => args,
            _ => panic!("Expected 'params' subcommand"),
        }
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = PartialParameterizationConfig::default()
            .merge_with_cli(&params_args(&[]), None)
            .unwrap();

        assert_eq!(config.classification, AtomTypeClassification::ElementBond);
        assert_eq!(
            config.search.kappa_search,
            KappaSearchStrategy::FullScanBrent {
                kappa_max: 1.5,
                step: 0.001
            }
        );
        assert_eq!(config.search.ranking, RankingStatistic::R);
        assert_eq!(config.search.precision, SolverPrecision::Fast);
        assert_eq!(config.search.discard.policy, DiscardPolicy::Off);
        assert_eq!(config.search.max_threads, None);
    }

    #[test]
    fn file_values_are_loaded_and_merged() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            classification = "element"
            sort-by = "d-max"
            extra-precise = true

            [kappa]
            preset = "protein"
            full-scan-only = true

            [discard]
            policy = "iterative"
            iteration-limit = 50
            time-limit = "00:05:00"
            seed = 7
            "#,
        );

        let config = PartialParameterizationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&params_args(&[]), Some(2))
            .unwrap();

        assert_eq!(config.classification, AtomTypeClassification::Element);
        assert_eq!(
            config.search.kappa_search,
            KappaSearchStrategy::FullScan {
                kappa_max: 0.01,
                step: 0.0001
            }
        );
        assert_eq!(config.search.ranking, RankingStatistic::DMax);
        assert_eq!(config.search.precision, SolverPrecision::ExtraPrecise);
        assert_eq!(config.search.discard.policy, DiscardPolicy::Iterative);
        assert_eq!(config.search.discard.iteration_limit, 50);
        assert_eq!(config.search.discard.time_limit, Some(Duration::from_secs(300)));
        assert_eq!(config.search.discard.seed, Some(7));
        assert_eq!(config.search.max_threads, Some(2));
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            sort-by = "rmsd"

            [kappa]
            value = 0.25

            [discard]
            policy = "simple"
            iteration-limit = 10
            "#,
        );

        let args = params_args(&[
            "--sort-by",
            "MSE",
            "--kappa-max",
            "0.5",
            "--step",
            "0.01",
            "--discard",
            "iterative",
            "--limit-iters",
            "20",
        ]);
        let config = PartialParameterizationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, None)
            .unwrap();

        assert_eq!(config.search.ranking, RankingStatistic::Mse);
        assert_eq!(
            config.search.kappa_search,
            KappaSearchStrategy::FullScanBrent {
                kappa_max: 0.5,
                step: 0.01
            }
        );
        assert_eq!(config.search.discard.policy, DiscardPolicy::Iterative);
        assert_eq!(config.search.discard.iteration_limit, 20);
    }

    #[test]
    fn fixed_kappa_from_file_is_used_without_scan_flags() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[kappa]\nvalue = 0.25\n");
        let config = PartialParameterizationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&params_args(&[]), None)
            .unwrap();
        assert_eq!(
            config.search.kappa_search,
            KappaSearchStrategy::Fixed { kappa: 0.25 }
        );
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[discard]\niteration-limit = 10\n");
        let args = params_args(&[
            "-S",
            "discard.iteration-limit=99",
            "-S",
            "kappa.step=0.05",
        ]);
        let config = PartialParameterizationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, None)
            .unwrap();
        assert_eq!(config.search.discard.iteration_limit, 99);
        assert_eq!(
            config.search.kappa_search,
            KappaSearchStrategy::FullScanBrent {
                kappa_max: 1.5,
                step: 0.05
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[kappa]\nmaximum = 1.0\n");
        assert!(matches!(
            PartialParameterizationConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let args = params_args(&["-S", "kappa.maximum=1.0"]);
        assert!(matches!(
            PartialParameterizationConfig::default().merge_with_cli(&args, None),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let too_many = params_args(&["--limit-iters", "100001"]);
        assert!(matches!(
            PartialParameterizationConfig::default().merge_with_cli(&too_many, None),
            Err(CliError::Config(_))
        ));

        let bad_preset = params_args(&["--preset", "huge"]);
        assert!(matches!(
            PartialParameterizationConfig::default().merge_with_cli(&bad_preset, None),
            Err(CliError::Config(_))
        ));

        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[discard]\ntime-limit = \"5 minutes\"\n");
        assert!(matches!(
            PartialParameterizationConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&params_args(&[]), None),
            Err(CliError::Config(_))
        ));
    }
}
