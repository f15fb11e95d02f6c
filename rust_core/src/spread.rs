//! Point spread prediction from composite ratings.
//!
//! Sign convention matches the market line: negative favors the home team.

use crate::error::{RatingError, Result};
use crate::types::RatingTable;

/// Predicted spread for `away @ home`. Negative = home favored.
#[inline]
pub fn predict_spread(away_rating: f64, home_rating: f64, home_field_advantage: f64) -> f64 {
    (away_rating - home_rating) - home_field_advantage
}

/// Look both teams up in a rating table and predict the spread.
pub fn predict_matchup(
    ratings: &RatingTable,
    away_team: &str,
    home_team: &str,
    home_field_advantage: f64,
) -> Result<f64> {
    let rating_of = |team: &str| {
        ratings
            .get(team)
            .map(|r| r.composite_rating)
            .ok_or_else(|| RatingError::MissingRating {
                team: team.to_string(),
            })
    };
    Ok(predict_spread(
        rating_of(away_team)?,
        rating_of(home_team)?,
        home_field_advantage,
    ))
}

/// Nearest half point, the granularity markets quote spreads in.
pub fn round_to_half_point(spread: f64) -> f64 {
    (spread * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TeamRating;

    fn rating(team: &str, composite: f64) -> TeamRating {
        TeamRating {
            team: team.to_string(),
            games_played: 8,
            off_rating: 0.0,
            def_rating: 0.0,
            turnover_rating: 0.0,
            special_teams_rating: 0.0,
            composite_rating: composite,
            prior_blend_weight: 0.0,
        }
    }

    #[test]
    fn test_sign_convention() {
        assert_eq!(predict_spread(3.0, 0.0, 2.5), 0.5);
        assert_eq!(predict_spread(0.0, 0.0, 2.5), -2.5);
        // Much better home team: clearly negative
        assert!(predict_spread(-4.0, 6.0, 2.5) < -10.0);
    }

    #[test]
    fn test_predict_matchup_lookup() {
        let mut table = RatingTable::new();
        table.insert("KC".to_string(), rating("KC", 6.0));
        table.insert("CAR".to_string(), rating("CAR", -5.0));

        let spread = predict_matchup(&table, "CAR", "KC", 2.5).unwrap();
        assert_eq!(spread, -13.5);

        match predict_matchup(&table, "CAR", "SEA", 2.5) {
            Err(RatingError::MissingRating { team }) => assert_eq!(team, "SEA"),
            other => panic!("expected missing rating, got {:?}", other),
        }
    }

    #[test]
    fn test_round_to_half_point() {
        assert_eq!(round_to_half_point(-3.2), -3.0);
        assert_eq!(round_to_half_point(-3.3), -3.5);
        assert_eq!(round_to_half_point(6.74), 6.5);
        assert_eq!(round_to_half_point(6.76), 7.0);
    }
}
