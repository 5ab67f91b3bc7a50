use neemp::core::models::atom_type::AtomTypeClassification;
use neemp::engine::ranking::RankingStatistic;

/// Values used when neither the command line nor the config file sets them.
pub struct DefaultsConfig {
    pub classification: AtomTypeClassification,
    pub kappa_preset: String,
    pub ranking: RankingStatistic,
    pub extra_precise: bool,
    pub full_scan_only: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            classification: AtomTypeClassification::ElementBond,
            kappa_preset: "small".to_string(),
            ranking: RankingStatistic::R,
            extra_precise: false,
            full_scan_only: false,
        }
    }
}
