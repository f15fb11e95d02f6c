// Shared data model for rating, spread and edge computation
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Game Records (input)
// ============================================================================

/// One team's view of one game. Every matchup produces two mirrored records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub season: i32,
    pub week: u32,
    pub team: String,
    pub opponent: String,
    pub is_home: bool,
    /// Offensive EPA per play (higher is better)
    pub off_epa_per_play: f64,
    /// EPA per play allowed by the defense (lower is better)
    pub def_epa_per_play: f64,
    /// Turnovers forced minus turnovers committed
    pub turnover_margin: f64,
    pub special_teams_epa: f64,
    /// Signed from the home team's perspective, negative = home favored
    #[serde(default)]
    pub market_spread_line: Option<f64>,
    /// Team points minus opponent points, when the game is final
    #[serde(default)]
    pub point_margin: Option<f64>,
}

impl GameRecord {
    pub fn home_team(&self) -> &str {
        if self.is_home {
            &self.team
        } else {
            &self.opponent
        }
    }

    pub fn away_team(&self) -> &str {
        if self.is_home {
            &self.opponent
        } else {
            &self.team
        }
    }

    /// True when `other` is the opposite side of the same game
    pub fn mirrors(&self, other: &GameRecord) -> bool {
        self.season == other.season
            && self.week == other.week
            && self.team == other.opponent
            && self.opponent == other.team
            && self.is_home != other.is_home
    }
}

// ============================================================================
// Team Ratings (output)
// ============================================================================

/// Ratings for one team, recomputed on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team: String,
    pub games_played: u32,
    /// Opponent-adjusted offensive EPA/play relative to league average
    pub off_rating: f64,
    /// Opponent-adjusted EPA/play allowed relative to league average (negative = good)
    pub def_rating: f64,
    /// Regressed turnover margin per game
    pub turnover_rating: f64,
    /// Recency-weighted special teams EPA/play
    pub special_teams_rating: f64,
    /// Points above/below league average; league mean is 0
    pub composite_rating: f64,
    /// Weight given to the prior-season rating (0 = current season only)
    pub prior_blend_weight: f64,
}

/// Team abbreviation -> rating, ordered for deterministic iteration
pub type RatingTable = BTreeMap<String, TeamRating>;

// ============================================================================
// Matchups & Edges
// ============================================================================

/// A single game seen from the schedule: who hosts whom and at what line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub season: i32,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    /// Negative = home favored
    pub market_line: Option<f64>,
    /// Home points minus away points, when final
    pub home_margin: Option<f64>,
}

impl Matchup {
    pub fn new(season: i32, week: u32, home_team: &str, away_team: &str) -> Self {
        Self {
            season,
            week,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            market_line: None,
            home_margin: None,
        }
    }

    pub fn with_line(mut self, line: f64) -> Self {
        self.market_line = Some(line);
        self
    }

    pub fn with_result(mut self, home_margin: f64) -> Self {
        self.home_margin = Some(home_margin);
        self
    }
}

impl fmt::Display for Matchup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} W{} {} @ {}",
            self.season, self.week, self.away_team, self.home_team
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    Home,
    Away,
}

/// Edge classification for one matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub matchup: Matchup,
    pub predicted_spread: f64,
    pub market_spread_line: f64,
    /// predicted - market; negative = model likes the home side more than the market
    pub edge: f64,
    pub flagged: bool,
    pub bet_side: Option<BetSide>,
}

impl EdgeRecord {
    pub fn bet_team(&self) -> Option<&str> {
        match self.bet_side? {
            BetSide::Home => Some(&self.matchup.home_team),
            BetSide::Away => Some(&self.matchup.away_team),
        }
    }
}

/// Against-the-spread result of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsOutcome {
    Win,
    Loss,
    Push,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(team: &str, opponent: &str, is_home: bool) -> GameRecord {
        GameRecord {
            season: 2024,
            week: 5,
            team: team.to_string(),
            opponent: opponent.to_string(),
            is_home,
            off_epa_per_play: 0.0,
            def_epa_per_play: 0.0,
            turnover_margin: 0.0,
            special_teams_epa: 0.0,
            market_spread_line: Some(-3.0),
            point_margin: None,
        }
    }

    #[test]
    fn test_home_away_resolution() {
        let home = record("KC", "BUF", true);
        let away = record("BUF", "KC", false);
        assert_eq!(home.home_team(), "KC");
        assert_eq!(away.home_team(), "KC");
        assert_eq!(away.away_team(), "BUF");
        assert!(home.mirrors(&away));
        assert!(!home.mirrors(&home));
    }

    #[test]
    fn test_bet_team() {
        let matchup = Matchup::new(2024, 5, "KC", "BUF").with_line(-3.0);
        let edge = EdgeRecord {
            matchup,
            predicted_spread: 3.0,
            market_spread_line: -3.0,
            edge: 6.0,
            flagged: true,
            bet_side: Some(BetSide::Away),
        };
        assert_eq!(edge.bet_team(), Some("BUF"));
        assert_eq!(edge.matchup.to_string(), "2024 W5 BUF @ KC");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{
            "season": 2023, "week": 1, "team": "DET", "opponent": "KC",
            "is_home": false, "off_epa_per_play": 0.05, "def_epa_per_play": -0.02,
            "turnover_margin": 1.0, "special_teams_epa": 0.01
        }"#;
        let rec: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.market_spread_line, None);
        assert_eq!(rec.point_margin, None);
        assert_eq!(rec.home_team(), "KC");
    }
}
