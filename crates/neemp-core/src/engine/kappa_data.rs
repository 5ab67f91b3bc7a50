use super::ranking::RankingStatistic;
use super::stats::Stats;
use crate::core::models::training_set::TrainingSet;
use std::fmt::Write;

/// One kappa trial: fitted parameters, solved charges and their statistics.
///
/// Every vector is sized from the whole training set, independent of how many
/// molecules the owning subset selects. Charges of unselected molecules are
/// left untouched by a trial and carry no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct KappaData {
    pub kappa: f64,
    pub parameters_alpha: Vec<f64>,
    pub parameters_beta: Vec<f64>,
    pub charges: Vec<f64>,
    pub full_stats: Stats,
    pub per_atom_type_stats: Vec<Stats>,
    pub per_molecule_stats: Vec<Stats>,
}

impl KappaData {
    pub fn new(training_set: &TrainingSet) -> Self {
        Self::with_kappa(training_set, 0.0)
    }

    pub fn with_kappa(training_set: &TrainingSet, kappa: f64) -> Self {
        let types = training_set.atom_types_count();
        Self {
            kappa,
            parameters_alpha: vec![0.0; types],
            parameters_beta: vec![0.0; types],
            charges: vec![0.0; training_set.atoms_count()],
            full_stats: Stats::default(),
            per_atom_type_stats: vec![Stats::default(); types],
            per_molecule_stats: vec![Stats::default(); training_set.molecules_count()],
        }
    }

    /// One-line summary of the full statistics; the ranking statistic is starred.
    pub fn summary(&self, ranking: RankingStatistic) -> String {
        let s = &self.full_stats;
        let fields = [
            (RankingStatistic::R, "R", s.r),
            (RankingStatistic::Rmsd, "RMSD", s.rmsd),
            (RankingStatistic::Mse, "MSE", s.mse),
            (RankingStatistic::DAvg, "D_avg", s.d_avg),
            (RankingStatistic::DMax, "D_max", s.d_max),
        ];

        let mut line = format!("K: {:6.4}", self.kappa);
        for (statistic, label, value) in fields {
            let star = if statistic == ranking { "*" } else { "" };
            let _ = write!(line, " | {label}{star}: {value:6.4}");
        }
        let _ = write!(line, " | R2: {:6.4}", s.r2);
        line
    }
}
