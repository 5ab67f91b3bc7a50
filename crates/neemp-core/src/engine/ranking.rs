use super::kappa_data::KappaData;
use super::stats::Stats;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The statistic trial records are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingStatistic {
    #[default]
    R,
    Rmsd,
    Mse,
    DAvg,
    DMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

struct RankingEntry {
    statistic: RankingStatistic,
    label: &'static str,
    extract: fn(&Stats) -> f64,
    direction: Direction,
}

static RANKING_TABLE: [RankingEntry; 5] = [
    RankingEntry {
        statistic: RankingStatistic::R,
        label: "R",
        extract: |s| s.r,
        direction: Direction::HigherIsBetter,
    },
    RankingEntry {
        statistic: RankingStatistic::Rmsd,
        label: "RMSD",
        extract: |s| s.rmsd,
        direction: Direction::LowerIsBetter,
    },
    RankingEntry {
        statistic: RankingStatistic::Mse,
        label: "MSE",
        extract: |s| s.mse,
        direction: Direction::LowerIsBetter,
    },
    RankingEntry {
        statistic: RankingStatistic::DAvg,
        label: "D_avg",
        extract: |s| s.d_avg,
        direction: Direction::LowerIsBetter,
    },
    RankingEntry {
        statistic: RankingStatistic::DMax,
        label: "D_max",
        extract: |s| s.d_max,
        direction: Direction::LowerIsBetter,
    },
];

impl RankingStatistic {
    fn entry(self) -> &'static RankingEntry {
        &RANKING_TABLE[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }

    pub fn direction(self) -> Direction {
        self.entry().direction
    }
}

impl fmt::Display for RankingStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RankingStatistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RANKING_TABLE
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(s.trim()) || e.label.replace('_', "").eq_ignore_ascii_case(s.trim()))
            .map(|e| e.statistic)
            .ok_or_else(|| format!("unknown statistic '{s}' (expected R, RMSD, MSE, D_avg or D_max)"))
    }
}

/// Orders trial records by one statistic. NaN always ranks worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingRule {
    statistic: RankingStatistic,
}

impl RankingRule {
    pub fn new(statistic: RankingStatistic) -> Self {
        Self { statistic }
    }

    pub fn statistic(&self) -> RankingStatistic {
        self.statistic
    }

    #[inline]
    pub fn value_of(&self, stats: &Stats) -> f64 {
        (self.statistic.entry().extract)(stats)
    }

    #[inline]
    pub fn extract_value(&self, kd: &KappaData) -> f64 {
        self.value_of(&kd.full_stats)
    }

    /// Whether value `a` is strictly better than `b`.
    pub fn is_better_value(&self, a: f64, b: f64) -> bool {
        match (a.is_nan(), b.is_nan()) {
            (true, _) => false,
            (false, true) => true,
            (false, false) => match self.statistic.direction() {
                Direction::HigherIsBetter => a > b,
                Direction::LowerIsBetter => a < b,
            },
        }
    }

    /// Whether record `a` is strictly better than `b`.
    pub fn is_better(&self, a: &KappaData, b: &KappaData) -> bool {
        self.is_better_value(self.extract_value(a), self.extract_value(b))
    }

    /// Total order of records, best first.
    pub fn compare(&self, a: &KappaData, b: &KappaData) -> Ordering {
        if self.is_better(a, b) {
            Ordering::Less
        } else if self.is_better(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// The quantity a minimizer should drive down; NaN maps to +inf.
    pub fn loss(&self, kd: &KappaData) -> f64 {
        let value = self.extract_value(kd);
        if value.is_nan() {
            return f64::INFINITY;
        }
        match self.statistic.direction() {
            Direction::HigherIsBetter => -value,
            Direction::LowerIsBetter => value,
        }
    }

    /// Index of the best record; the earliest wins ties.
    pub fn best_index(&self, records: &[KappaData]) -> Option<usize> {
        let mut best = None;
        for (idx, kd) in records.iter().enumerate() {
            match best {
                None => best = Some(idx),
                Some(current) if self.is_better(kd, &records[current]) => best = Some(idx),
                Some(_) => {}
            }
        }
        best
    }
}
