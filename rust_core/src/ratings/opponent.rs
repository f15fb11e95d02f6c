//! Iterative opponent adjustment.
//!
//! Each pass reads every team's previous-pass factors from an immutable
//! snapshot and writes a fresh vector, so teams can be processed in parallel
//! with results identical to a sequential run. The pass count is fixed.

use super::recency::TeamProfile;
use rayon::prelude::*;
use tracing::debug;

/// Per-team offensive and defensive adjustment factors, indexed like the profiles
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AdjustmentFactors {
    pub offense: Vec<f64>,
    pub defense: Vec<f64>,
}

impl AdjustmentFactors {
    fn zeros(n: usize) -> Self {
        Self {
            offense: vec![0.0; n],
            defense: vec![0.0; n],
        }
    }
}

/// Run exactly `iterations` passes starting from all-zero factors.
///
/// offense = raw offensive EPA - mean(opponent defensive factor)
/// defense = raw EPA allowed  - mean(opponent offensive factor)
///
/// Both vectors are re-centered to a league mean of 0 after every pass.
pub(crate) fn adjust_for_opponents(profiles: &[TeamProfile], iterations: u32) -> AdjustmentFactors {
    let mut factors = AdjustmentFactors::zeros(profiles.len());

    for pass in 0..iterations {
        let snapshot = &factors;
        let next: Vec<(f64, f64)> = profiles
            .par_iter()
            .map(|p| {
                let off = p.raw_off - p.opponent_mean(&snapshot.defense);
                let def = p.raw_def - p.opponent_mean(&snapshot.offense);
                (off, def)
            })
            .collect();

        let (mut offense, mut defense): (Vec<f64>, Vec<f64>) = next.into_iter().unzip();
        center(&mut offense);
        center(&mut defense);

        let shift = max_abs_diff(&offense, &factors.offense).max(max_abs_diff(&defense, &factors.defense));
        debug!("Opponent adjustment pass {}: max factor change {:.6}", pass + 1, shift);

        factors = AdjustmentFactors { offense, defense };
    }

    factors
}

/// Subtract the mean so the values sum to ~0. Summation runs in index order.
pub(crate) fn center(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    for v in values.iter_mut() {
        *v -= mean;
    }
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameRecord;
    use rustc_hash::FxHashMap;

    fn record(team: &str, opponent: &str, week: u32, off: f64, def: f64) -> GameRecord {
        GameRecord {
            season: 2024,
            week,
            team: team.to_string(),
            opponent: opponent.to_string(),
            is_home: team < opponent,
            off_epa_per_play: off,
            def_epa_per_play: def,
            turnover_margin: 0.0,
            special_teams_epa: 0.0,
            market_spread_line: None,
            point_margin: None,
        }
    }

    /// Three teams, full round robin twice, each game mirrored
    fn profiles() -> Vec<TeamProfile> {
        let teams = ["A", "B", "C"];
        // (offense, defense allowed) intrinsic levels
        let level = |t: &str| match t {
            "A" => (0.15, -0.05),
            "B" => (0.00, 0.00),
            _ => (-0.10, 0.08),
        };

        let mut records = Vec::new();
        let mut week = 1;
        for _ in 0..2 {
            for (i, home) in teams.iter().enumerate() {
                for away in teams.iter().skip(i + 1) {
                    let (h_off, h_def) = level(home);
                    let (a_off, a_def) = level(away);
                    records.push(record(home, away, week, h_off + a_def, a_off + h_def));
                    records.push(record(away, home, week, a_off + h_def, h_off + a_def));
                    week += 1;
                }
            }
        }

        let index: FxHashMap<&str, usize> =
            teams.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        teams
            .iter()
            .map(|t| {
                let games: Vec<&GameRecord> = records.iter().filter(|r| r.team == *t).collect();
                TeamProfile::build(t, &games, 1.0, &index).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_center() {
        let mut values = vec![1.0, 2.0, 6.0];
        center(&mut values);
        assert_eq!(values, vec![-2.0, -1.0, 3.0]);

        let mut empty: Vec<f64> = Vec::new();
        center(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_factors_are_centered_every_pass() {
        let profiles = profiles();
        for iterations in [1, 2, 7] {
            let f = adjust_for_opponents(&profiles, iterations);
            let off_sum: f64 = f.offense.iter().sum();
            let def_sum: f64 = f.defense.iter().sum();
            assert!(off_sum.abs() < 1e-12, "offense sum {} after {}", off_sum, iterations);
            assert!(def_sum.abs() < 1e-12, "defense sum {} after {}", def_sum, iterations);
        }
    }

    #[test]
    fn test_single_pass_is_centered_raw() {
        let profiles = profiles();
        let f = adjust_for_opponents(&profiles, 1);
        let mut raw: Vec<f64> = profiles.iter().map(|p| p.raw_off).collect();
        center(&mut raw);
        for (got, want) in f.offense.iter().zip(&raw) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_adjustment_preserves_ordering_and_is_repeatable() {
        let profiles = profiles();
        let first = adjust_for_opponents(&profiles, 10);
        let second = adjust_for_opponents(&profiles, 10);
        assert_eq!(first, second);

        // A has the best offense and the stingiest defense
        assert!(first.offense[0] > first.offense[1]);
        assert!(first.offense[1] > first.offense[2]);
        assert!(first.defense[0] < first.defense[1]);
        assert!(first.defense[1] < first.defense[2]);
    }
}
