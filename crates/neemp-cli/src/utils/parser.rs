use neemp::engine::ranking::RankingStatistic;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid duration '{0}'. Expected 'HH:MM:SS' (e.g., '01:30:00').")]
    InvalidDuration(String),

    #[error("Component '{component}' of duration '{value}' must be below 60.")]
    ComponentOutOfRange {
        component: &'static str,
        value: String,
    },

    #[error("Unknown ranking statistic '{0}'. Expected one of: R, RMSD, MSE, D_avg, D_max.")]
    UnknownStatistic(String),
}

/// Parses an `HH:MM:SS` wall-clock budget. Hours are not bounded here.
pub fn parse_duration(value: &str) -> Result<Duration, ParseError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(ParseError::InvalidDuration(value.to_string()));
    };

    let number = |s: &str| -> Result<u64, ParseError> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidDuration(value.to_string()));
        }
        s.parse()
            .map_err(|_| ParseError::InvalidDuration(value.to_string()))
    };

    let (hours, minutes, seconds) = (number(hours)?, number(minutes)?, number(seconds)?);
    if minutes >= 60 {
        return Err(ParseError::ComponentOutOfRange {
            component: "minutes",
            value: value.to_string(),
        });
    }
    if seconds >= 60 {
        return Err(ParseError::ComponentOutOfRange {
            component: "seconds",
            value: value.to_string(),
        });
    }

    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

pub fn parse_statistic(value: &str) -> Result<RankingStatistic, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::UnknownStatistic(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_durations() {
        assert_eq!(parse_duration("00:00:00"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("01:30:15"), Ok(Duration::from_secs(5415)));
        assert_eq!(parse_duration("1000:00:00"), Ok(Duration::from_secs(3_600_000)));
    }

    #[test]
    fn rejects_malformed_durations() {
        for value in ["", "10", "01:30", "aa:bb:cc", "01:-1:00", "1:2:3:4", "01::00"] {
            assert_eq!(
                parse_duration(value),
                Err(ParseError::InvalidDuration(value.to_string())),
                "{value}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(matches!(
            parse_duration("00:60:00"),
            Err(ParseError::ComponentOutOfRange {
                component: "minutes",
                ..
            })
        ));
        assert!(matches!(
            parse_duration("00:00:75"),
            Err(ParseError::ComponentOutOfRange {
                component: "seconds",
                ..
            })
        ));
    }

    #[test]
    fn parses_statistics_case_insensitively() {
        assert_eq!(parse_statistic("rmsd"), Ok(RankingStatistic::Rmsd));
        assert_eq!(parse_statistic("D_max"), Ok(RankingStatistic::DMax));
        assert_eq!(parse_statistic("R"), Ok(RankingStatistic::R));
        assert!(parse_statistic("chi2").is_err());
    }
}
