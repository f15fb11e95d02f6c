//! Rating configuration.
//!
//! All tunable parameters for a run live in one immutable value that is
//! passed into every entry point. Nothing here is global.

use crate::error::{RatingError, Result};
use serde::{Deserialize, Serialize};

/// How much weight the prior-season rating keeps, keyed by games played this season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendSchedule {
    /// Weight 1.0 up to `full_weight_games`, falling linearly to 0.0 at `zero_weight_games`
    Linear {
        full_weight_games: u32,
        zero_weight_games: u32,
    },
    /// Explicit weights indexed by games played; 0.0 past the end
    Table(Vec<f64>),
}

impl BlendSchedule {
    pub fn weight(&self, games_played: u32) -> f64 {
        match self {
            BlendSchedule::Linear {
                full_weight_games,
                zero_weight_games,
            } => {
                if games_played >= *zero_weight_games {
                    return 0.0;
                }
                if games_played <= *full_weight_games {
                    return 1.0;
                }
                let span = (*zero_weight_games - *full_weight_games) as f64;
                (*zero_weight_games - games_played) as f64 / span
            }
            BlendSchedule::Table(weights) => weights
                .get(games_played as usize)
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Games played at which the prior stops contributing
    pub fn threshold(&self) -> u32 {
        match self {
            BlendSchedule::Linear {
                zero_weight_games, ..
            } => *zero_weight_games,
            BlendSchedule::Table(weights) => weights
                .iter()
                .rposition(|w| *w > 0.0)
                .map(|i| i as u32 + 1)
                .unwrap_or(0),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            BlendSchedule::Linear {
                full_weight_games,
                zero_weight_games,
            } => {
                if zero_weight_games <= full_weight_games {
                    return Err(RatingError::config(
                        "prior_season_blend_schedule",
                        format!(
                            "zero_weight_games ({}) must exceed full_weight_games ({})",
                            zero_weight_games, full_weight_games
                        ),
                    ));
                }
            }
            BlendSchedule::Table(weights) => {
                if let Some(w) = weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
                    return Err(RatingError::config(
                        "prior_season_blend_schedule",
                        format!("weight {} is outside [0, 1]", w),
                    ));
                }
                if weights.windows(2).any(|pair| pair[1] > pair[0]) {
                    return Err(RatingError::config(
                        "prior_season_blend_schedule",
                        "weights must not increase with games played",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for BlendSchedule {
    fn default() -> Self {
        BlendSchedule::Linear {
            full_weight_games: 1,
            zero_weight_games: 9,
        }
    }
}

/// Tunable parameters for one rating run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Per-game decay; game i back (0 = most recent) counts decay^i
    pub recency_decay: f64,
    /// Home field advantage in points
    pub home_field_advantage: f64,
    /// 0.0 = trust turnover margin, 1.0 = replace it with the league average
    pub turnover_regression_factor: f64,
    pub weight_off_epa: f64,
    pub weight_def_epa: f64,
    pub weight_turnover_adj: f64,
    pub weight_special_teams: f64,
    /// Minimum |model - market| in points to flag an edge
    pub min_edge_threshold: f64,
    pub opponent_adjustment_iterations: u32,
    pub prior_season_blend_schedule: BlendSchedule,
    /// Converts EPA/play into points per game
    pub plays_per_game: f64,
    /// Points swing attributed to one turnover
    pub points_per_turnover: f64,
    /// Share of last season's rating carried into the new season
    pub prior_rating_retention: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            recency_decay: 0.92,
            home_field_advantage: 2.5,
            turnover_regression_factor: 0.50,
            weight_off_epa: 0.35,
            weight_def_epa: 0.35,
            weight_turnover_adj: 0.20,
            weight_special_teams: 0.10,
            min_edge_threshold: 5.0,
            opponent_adjustment_iterations: 10,
            prior_season_blend_schedule: BlendSchedule::default(),
            plays_per_game: 65.0,
            points_per_turnover: 3.5,
            prior_rating_retention: 0.67,
        }
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.recency_decay > 0.0 && self.recency_decay <= 1.0) {
            return Err(RatingError::config(
                "recency_decay",
                format!("must be in (0, 1], got {}", self.recency_decay),
            ));
        }
        if self.opponent_adjustment_iterations < 1 {
            return Err(RatingError::config(
                "opponent_adjustment_iterations",
                "must be >= 1",
            ));
        }
        check_unit_interval("turnover_regression_factor", self.turnover_regression_factor)?;
        check_unit_interval("prior_rating_retention", self.prior_rating_retention)?;

        for (name, value) in [
            ("home_field_advantage", self.home_field_advantage),
            ("weight_off_epa", self.weight_off_epa),
            ("weight_def_epa", self.weight_def_epa),
            ("weight_turnover_adj", self.weight_turnover_adj),
            ("weight_special_teams", self.weight_special_teams),
            ("points_per_turnover", self.points_per_turnover),
        ] {
            if !value.is_finite() {
                return Err(RatingError::config(name, format!("must be finite, got {}", value)));
            }
        }
        if !(self.min_edge_threshold >= 0.0) {
            return Err(RatingError::config(
                "min_edge_threshold",
                format!("must be >= 0, got {}", self.min_edge_threshold),
            ));
        }
        if !(self.plays_per_game > 0.0) {
            return Err(RatingError::config(
                "plays_per_game",
                format!("must be > 0, got {}", self.plays_per_game),
            ));
        }
        self.prior_season_blend_schedule.validate()
    }

    /// Sum of the four component weights (1.0 by convention, not enforced)
    pub fn weight_sum(&self) -> f64 {
        self.weight_off_epa + self.weight_def_epa + self.weight_turnover_adj + self.weight_special_teams
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RatingError::config(
            name,
            format!("must be in [0, 1], got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = RatingConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weight_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_recency_decay_bounds() {
        for bad in [0.0, -0.5, 1.01, f64::NAN] {
            let config = RatingConfig {
                recency_decay: bad,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "decay {} accepted", bad);
        }

        let config = RatingConfig {
            recency_decay: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok(), "decay of exactly 1.0 is allowed");
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = RatingConfig {
            opponent_adjustment_iterations: 0,
            ..Default::default()
        };
        match config.validate() {
            Err(RatingError::Configuration { parameter, .. }) => {
                assert_eq!(parameter, "opponent_adjustment_iterations")
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_linear_schedule_weights() {
        let schedule = BlendSchedule::default();
        assert_eq!(schedule.weight(0), 1.0);
        assert_eq!(schedule.weight(1), 1.0);
        assert!((schedule.weight(5) - 0.5).abs() < 1e-12);
        assert_eq!(schedule.weight(9), 0.0);
        assert_eq!(schedule.weight(17), 0.0);
        assert_eq!(schedule.threshold(), 9);

        let mut last = f64::INFINITY;
        for games in 0..20 {
            let w = schedule.weight(games);
            assert!(w <= last, "weight rose at {} games", games);
            last = w;
        }
    }

    #[test]
    fn test_table_schedule() {
        let schedule = BlendSchedule::Table(vec![1.0, 0.8, 0.5, 0.2]);
        assert_eq!(schedule.weight(2), 0.5);
        assert_eq!(schedule.weight(4), 0.0);
        assert_eq!(schedule.threshold(), 4);

        let rising = RatingConfig {
            prior_season_blend_schedule: BlendSchedule::Table(vec![0.5, 0.7]),
            ..Default::default()
        };
        assert!(rising.validate().is_err());

        let inverted = RatingConfig {
            prior_season_blend_schedule: BlendSchedule::Linear {
                full_weight_games: 6,
                zero_weight_games: 6,
            },
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RatingConfig =
            serde_json::from_str(r#"{"recency_decay": 0.85, "min_edge_threshold": 3.0}"#).unwrap();
        assert_eq!(config.recency_decay, 0.85);
        assert_eq!(config.min_edge_threshold, 3.0);
        assert_eq!(
            config,
            RatingConfig {
                recency_decay: 0.85,
                min_edge_threshold: 3.0,
                ..Default::default()
            }
        );
        assert!(config.validate().is_ok());

        let table: RatingConfig = serde_json::from_str(
            r#"{"prior_season_blend_schedule": {"table": [1.0, 0.5]}, "opponent_adjustment_iterations": 0}"#,
        )
        .unwrap();
        assert_eq!(table.prior_season_blend_schedule, BlendSchedule::Table(vec![1.0, 0.5]));
        assert_eq!(table.home_field_advantage, 2.5);
        let err = table.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
