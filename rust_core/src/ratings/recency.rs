//! Recency weighting and per-team raw aggregates.
//!
//! A team's games are ordered most-recent-first and game `i` carries weight
//! `decay^i`. Every per-team statistic (offense, defense, turnovers, special
//! teams, and the opponent mix) is averaged with the same weights.

use crate::types::GameRecord;
use rustc_hash::FxHashMap;

/// `decay^i` for i in 0..n
pub fn recency_weights(n: usize, decay: f64) -> Vec<f64> {
    let mut weights = Vec::with_capacity(n);
    let mut w = 1.0;
    for _ in 0..n {
        weights.push(w);
        w *= decay;
    }
    weights
}

/// Weighted arithmetic mean; `None` when there is nothing to average.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    debug_assert_eq!(values.len(), weights.len());
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return None;
    }
    let sum: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(sum / total)
}

/// Raw (unadjusted) recency-weighted aggregates for one team
#[derive(Debug, Clone)]
pub(crate) struct TeamProfile {
    pub team: String,
    pub games_played: u32,
    pub raw_off: f64,
    pub raw_def: f64,
    pub raw_turnover: f64,
    pub raw_special_teams: f64,
    /// Profile index of each game's opponent, aligned with `weights`
    opponents: Vec<Option<usize>>,
    weights: Vec<f64>,
    weight_total: f64,
}

impl TeamProfile {
    /// Build from a team's games in any order. Returns `None` for an empty slate.
    pub fn build(
        team: &str,
        games: &[&GameRecord],
        decay: f64,
        index: &FxHashMap<&str, usize>,
    ) -> Option<Self> {
        if games.is_empty() {
            return None;
        }

        // Most recent first; opponent name breaks ties so the order is stable
        let mut ordered: Vec<&GameRecord> = games.to_vec();
        ordered.sort_by(|a, b| b.week.cmp(&a.week).then_with(|| a.opponent.cmp(&b.opponent)));

        let weights = recency_weights(ordered.len(), decay);
        let column = |f: fn(&GameRecord) -> f64| -> f64 {
            let values: Vec<f64> = ordered.iter().map(|g| f(g)).collect();
            weighted_mean(&values, &weights).unwrap_or(0.0)
        };

        Some(Self {
            team: team.to_string(),
            games_played: ordered.len() as u32,
            raw_off: column(|g| g.off_epa_per_play),
            raw_def: column(|g| g.def_epa_per_play),
            raw_turnover: column(|g| g.turnover_margin),
            raw_special_teams: column(|g| g.special_teams_epa),
            opponents: ordered
                .iter()
                .map(|g| index.get(g.opponent.as_str()).copied())
                .collect(),
            weight_total: weights.iter().sum(),
            weights,
        })
    }

    /// Recency-weighted mean of `factors` over the opponents faced.
    /// Opponents without a profile count as league average (0).
    pub fn opponent_mean(&self, factors: &[f64]) -> f64 {
        let sum: f64 = self
            .opponents
            .iter()
            .zip(&self.weights)
            .map(|(opp, w)| opp.map_or(0.0, |i| factors[i]) * w)
            .sum();
        sum / self.weight_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(week: u32, opponent: &str, off: f64) -> GameRecord {
        GameRecord {
            season: 2024,
            week,
            team: "A".to_string(),
            opponent: opponent.to_string(),
            is_home: week % 2 == 0,
            off_epa_per_play: off,
            def_epa_per_play: -off,
            turnover_margin: week as f64,
            special_teams_epa: 0.01,
            market_spread_line: None,
            point_margin: None,
        }
    }

    #[test]
    fn test_weights_decay_geometrically() {
        let w = recency_weights(4, 0.5);
        assert_eq!(w, vec![1.0, 0.5, 0.25, 0.125]);
        assert!(recency_weights(0, 0.9).is_empty());
        assert_eq!(recency_weights(3, 1.0), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean(&[], &[]), None);
        assert_eq!(weighted_mean(&[2.0, 4.0], &[1.0, 1.0]), Some(3.0));
        assert_eq!(weighted_mean(&[2.0, 4.0], &[3.0, 1.0]), Some(2.5));
    }

    #[test]
    fn test_profile_orders_most_recent_first() {
        // Supplied out of order; week 3 is most recent and must get weight 1
        let g1 = game(1, "B", 0.05);
        let g3 = game(3, "B", 0.10);
        let g2 = game(2, "C", 0.08);
        let games = vec![&g1, &g3, &g2];

        let mut index = FxHashMap::default();
        index.insert("B", 0usize);

        let profile = TeamProfile::build("A", &games, 0.92, &index).unwrap();
        let expected = (0.10 + 0.08 * 0.92 + 0.05 * 0.92 * 0.92) / (1.0 + 0.92 + 0.92 * 0.92);
        assert!((profile.raw_off - expected).abs() < 1e-12);
        assert_eq!(profile.games_played, 3);

        // Opponent C has no profile and counts as 0; B carries factor 2.0
        let mean = profile.opponent_mean(&[2.0]);
        let expected = 2.0 * (1.0 + 0.92 * 0.92) / (1.0 + 0.92 + 0.92 * 0.92);
        assert!((mean - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_slate_has_no_profile() {
        let index = FxHashMap::default();
        assert!(TeamProfile::build("A", &[], 0.92, &index).is_none());
    }
}
