//! Edge detection: model spread vs market line.
//!
//! Both spreads use the same convention (negative = home favored), so
//! `edge = predicted - market` is negative when the model likes the home
//! side more than the market does and positive when it likes the away side.

use crate::config::RatingConfig;
use crate::error::{RatingError, Result};
use crate::spread::predict_matchup;
use crate::types::{AtsOutcome, BetSide, EdgeRecord, Matchup, RatingTable};
use tracing::{debug, info};

/// Classify one matchup given an already-predicted spread.
///
/// Flags the matchup when `|edge| >= min_edge_threshold` (inclusive).
pub fn classify_edge(
    matchup: &Matchup,
    predicted_spread: f64,
    min_edge_threshold: f64,
) -> Result<EdgeRecord> {
    let market = matchup.market_line.ok_or_else(|| RatingError::MissingLine {
        matchup: matchup.to_string(),
    })?;

    let edge = predicted_spread - market;
    let flagged = edge.abs() >= min_edge_threshold;
    let bet_side = if edge < 0.0 {
        Some(BetSide::Home)
    } else if edge > 0.0 {
        Some(BetSide::Away)
    } else {
        None
    };

    Ok(EdgeRecord {
        matchup: matchup.clone(),
        predicted_spread,
        market_spread_line: market,
        edge,
        flagged,
        bet_side,
    })
}

/// Outcome of scanning a slate of matchups
#[derive(Debug, Clone, Default)]
pub struct EdgeScan {
    /// One record per classifiable matchup, flagged or not
    pub records: Vec<EdgeRecord>,
    /// Matchups left out (missing line or unrated team)
    pub skipped: Vec<RatingError>,
}

impl EdgeScan {
    pub fn flagged(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.records.iter().filter(|r| r.flagged)
    }
}

/// Predict and classify every matchup. Matchups that cannot be classified
/// are skipped, never fatal.
pub fn detect_edges(matchups: &[Matchup], ratings: &RatingTable, config: &RatingConfig) -> EdgeScan {
    let mut scan = EdgeScan::default();

    for matchup in matchups {
        let classified = predict_matchup(
            ratings,
            &matchup.away_team,
            &matchup.home_team,
            config.home_field_advantage,
        )
        .and_then(|predicted| classify_edge(matchup, predicted, config.min_edge_threshold));

        match classified {
            Ok(record) => {
                if record.flagged {
                    debug!(
                        "EDGE: {} model={:+.1} market={:+.1} edge={:+.1}",
                        matchup, record.predicted_spread, record.market_spread_line, record.edge
                    );
                }
                scan.records.push(record);
            }
            Err(e) => {
                debug!("Skipping {}: {}", matchup, e);
                scan.skipped.push(e);
            }
        }
    }

    info!(
        "Scanned {} matchups: {} flagged, {} skipped",
        matchups.len(),
        scan.flagged().count(),
        scan.skipped.len()
    );
    scan
}

/// Grade a spread bet. The home side covers when `home_margin + market_line > 0`.
pub fn grade_ats(side: BetSide, market_line: f64, home_margin: f64) -> AtsOutcome {
    let cover_margin = home_margin + market_line;
    if cover_margin == 0.0 {
        return AtsOutcome::Push;
    }
    let home_covered = cover_margin > 0.0;
    match (side, home_covered) {
        (BetSide::Home, true) | (BetSide::Away, false) => AtsOutcome::Win,
        _ => AtsOutcome::Loss,
    }
}
