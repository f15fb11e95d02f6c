//! Error taxonomy for rating, spread and edge computation.
//!
//! Callers decide per kind whether to abort or log-and-continue:
//! - `Configuration` is fatal for the whole run
//! - `InsufficientData` is fatal for one team only
//! - `MissingLine` / `MissingRating` drop a single matchup

use thiserror::Error;

/// Coarse classification of a [`RatingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InsufficientData,
    MissingLine,
    MissingRating,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("Invalid configuration: {parameter} {reason}")]
    Configuration { parameter: String, reason: String },

    #[error("Insufficient data for {team} in season {season}: no games and no prior rating")]
    InsufficientData { team: String, season: i32 },

    #[error("No market line for {matchup}")]
    MissingLine { matchup: String },

    #[error("No rating available for {team}")]
    MissingRating { team: String },
}

impl RatingError {
    pub(crate) fn config(parameter: &str, reason: impl Into<String>) -> Self {
        RatingError::Configuration {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RatingError::Configuration { .. } => ErrorKind::Configuration,
            RatingError::InsufficientData { .. } => ErrorKind::InsufficientData,
            RatingError::MissingLine { .. } => ErrorKind::MissingLine,
            RatingError::MissingRating { .. } => ErrorKind::MissingRating,
        }
    }

    /// Everything except a bad configuration can be isolated to one team or matchup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RatingError::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, RatingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_recoverability() {
        let fatal = RatingError::config("recency_decay", "must be in (0, 1]");
        assert_eq!(fatal.kind(), ErrorKind::Configuration);
        assert!(!fatal.is_recoverable());

        let team = RatingError::InsufficientData {
            team: "NYJ".to_string(),
            season: 2024,
        };
        assert_eq!(team.kind(), ErrorKind::InsufficientData);
        assert!(team.is_recoverable());

        let line = RatingError::MissingLine {
            matchup: "2024 W3 BUF @ MIA".to_string(),
        };
        assert_eq!(line.kind(), ErrorKind::MissingLine);
        assert!(line.is_recoverable());
    }

    #[test]
    fn test_error_messages_name_the_subject() {
        let err = RatingError::config("opponent_adjustment_iterations", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: opponent_adjustment_iterations must be >= 1"
        );

        let err = RatingError::MissingRating {
            team: "KC".to_string(),
        };
        assert!(err.to_string().contains("KC"));
    }
}
