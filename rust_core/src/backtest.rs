//! Walk-forward backtest against historical market lines.
//!
//! Week `w` is predicted with ratings computed from weeks `1..w` only, so
//! no result leaks into its own prediction. Flagged edges with a final score
//! are graded against the spread at standard -110 pricing.

use crate::config::RatingConfig;
use crate::edge::{detect_edges, grade_ats};
use crate::error::Result;
use crate::games;
use crate::ratings::RatingEngine;
use crate::types::{AtsOutcome, EdgeRecord, GameRecord, RatingTable};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Win rate needed to break even at -110
pub const BREAKEVEN_PCT: f64 = 52.38;

/// Edge-size buckets reported in the summary: `[low, high)` in points
pub const EDGE_BUCKETS: [(f64, f64, &str); 3] = [
    (2.0, 3.0, "2-3 pts"),
    (3.0, 5.0, "3-5 pts"),
    (5.0, f64::INFINITY, "5+ pts"),
];

// ============================================================================
// Results
// ============================================================================

/// A flagged edge together with its against-the-spread outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedBet {
    pub edge: EdgeRecord,
    pub outcome: AtsOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BacktestResult {
    pub season: i32,
    pub weeks_evaluated: u32,
    /// Graded bets in week order
    pub bets: Vec<GradedBet>,
    /// Flagged edges without a final margin
    pub ungraded: usize,
    /// Matchups skipped for a missing line or rating
    pub skipped: usize,
}

impl BacktestResult {
    pub fn summary(&self) -> BacktestSummary {
        BacktestSummary::from_bets(&self.bets)
    }
}

/// Win/loss/push tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AtsRecord {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
}

impl AtsRecord {
    pub fn add(&mut self, outcome: AtsOutcome) {
        match outcome {
            AtsOutcome::Win => self.wins += 1,
            AtsOutcome::Loss => self.losses += 1,
            AtsOutcome::Push => self.pushes += 1,
        }
    }

    /// Bets with a winner; pushes are refunded and excluded
    pub fn decided(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        match self.decided() {
            0 => 0.0,
            n => self.wins as f64 / n as f64 * 100.0,
        }
    }

    /// Return on risk at -110: risk 110 to win 100
    pub fn roi_pct(&self) -> f64 {
        match self.decided() {
            0 => 0.0,
            n => {
                let profit = self.wins as f64 * 100.0 - self.losses as f64 * 110.0;
                profit / (n as f64 * 110.0) * 100.0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeBucket {
    pub label: &'static str,
    pub record: AtsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub bets: usize,
    pub record: AtsRecord,
    pub win_pct: f64,
    pub roi_pct: f64,
    /// Mean absolute edge over decided bets
    pub avg_edge: f64,
    pub breakeven_pct: f64,
    pub buckets: Vec<EdgeBucket>,
}

impl BacktestSummary {
    pub fn from_bets(bets: &[GradedBet]) -> Self {
        let mut record = AtsRecord::default();
        let mut buckets: Vec<EdgeBucket> = EDGE_BUCKETS
            .iter()
            .map(|(_, _, label)| EdgeBucket {
                label: *label,
                record: AtsRecord::default(),
            })
            .collect();
        let mut edge_total = 0.0;

        for bet in bets {
            record.add(bet.outcome);
            if bet.outcome == AtsOutcome::Push {
                continue;
            }
            let size = bet.edge.edge.abs();
            edge_total += size;
            if let Some(i) = EDGE_BUCKETS
                .iter()
                .position(|(low, high, _)| size >= *low && size < *high)
            {
                buckets[i].record.add(bet.outcome);
            }
        }

        let avg_edge = match record.decided() {
            0 => 0.0,
            n => edge_total / n as f64,
        };

        Self {
            bets: bets.len(),
            win_pct: record.win_pct(),
            roi_pct: record.roi_pct(),
            record,
            avg_edge,
            breakeven_pct: BREAKEVEN_PCT,
            buckets,
        }
    }

    /// Merge several seasons into one summary
    pub fn combined(results: &[BacktestResult]) -> Self {
        let bets: Vec<GradedBet> = results.iter().flat_map(|r| r.bets.iter().cloned()).collect();
        Self::from_bets(&bets)
    }
}

// ============================================================================
// Backtester
// ============================================================================

#[derive(Debug, Clone)]
pub struct Backtester {
    engine: RatingEngine,
}

impl Backtester {
    pub fn new(config: RatingConfig) -> Result<Self> {
        Ok(Self {
            engine: RatingEngine::new(config)?,
        })
    }

    pub fn from_engine(engine: RatingEngine) -> Self {
        Self { engine }
    }

    /// Backtest one season. Weeks are evaluated in parallel; output keeps week order.
    pub fn run_season(
        &self,
        records: &[GameRecord],
        season: i32,
        prior: Option<&RatingTable>,
    ) -> BacktestResult {
        let Some(last_week) = games::max_week(records, season) else {
            return BacktestResult {
                season,
                ..Default::default()
            };
        };

        let config = self.engine.config();
        let weekly: Vec<(Vec<GradedBet>, usize, usize)> = (2..=last_week)
            .into_par_iter()
            .map(|week| {
                let report = self.engine.compute_through(records, season, week - 1, prior);
                let matchups = games::matchups_for_week(records, season, week);
                let scan = detect_edges(&matchups, &report.ratings, config);

                let mut bets = Vec::new();
                let mut ungraded = 0;
                for record in scan.records.into_iter().filter(|r| r.flagged) {
                    match (record.bet_side, record.matchup.home_margin) {
                        (Some(side), Some(margin)) => {
                            let outcome = grade_ats(side, record.market_spread_line, margin);
                            bets.push(GradedBet {
                                edge: record,
                                outcome,
                            });
                        }
                        _ => ungraded += 1,
                    }
                }
                (bets, ungraded, scan.skipped.len())
            })
            .collect();

        let mut result = BacktestResult {
            season,
            weeks_evaluated: last_week.saturating_sub(1),
            ..Default::default()
        };
        for (bets, ungraded, skipped) in weekly {
            result.bets.extend(bets);
            result.ungraded += ungraded;
            result.skipped += skipped;
        }

        let summary = result.summary();
        info!(
            "Backtest {}: {} bets, {}-{}-{}, ROI {:+.1}%",
            season,
            summary.bets,
            summary.record.wins,
            summary.record.losses,
            summary.record.pushes,
            summary.roi_pct
        );
        result
    }

    /// Backtest every season after the first, each using the previous
    /// season's final ratings as its prior. A single-season input is
    /// backtested without a prior.
    pub fn run_all(&self, records: &[GameRecord]) -> Vec<BacktestResult> {
        let seasons = games::seasons(records);
        if seasons.len() == 1 {
            return vec![self.run_season(records, seasons[0], None)];
        }

        let finals = self.engine.final_ratings_by_season(records);
        seasons
            .iter()
            .skip(1)
            .map(|season| {
                let prior = finals.get(&(season - 1)).map(|r| &r.ratings);
                self.run_season(records, *season, prior)
            })
            .collect()
    }
}
