//! Power Ratings Core - opponent-adjusted team ratings and spread edges.
//!
//! This module provides:
//! - Recency-weighted, iteratively opponent-adjusted team power ratings
//! - Prior-season blending early in a season
//! - Point spread prediction with home field advantage
//! - Edge detection against market spread lines
//! - Walk-forward ATS backtesting with rayon
//!
//! The library never installs a tracing subscriber; binaries decide where
//! events go.

pub mod backtest;
pub mod config;
pub mod edge;
pub mod error;
pub mod games;
pub mod ratings;
pub mod spread;
mod types;

pub use backtest::{Backtester, BacktestResult, BacktestSummary, GradedBet, BREAKEVEN_PCT};
pub use config::{BlendSchedule, RatingConfig};
pub use edge::{classify_edge, detect_edges, grade_ats, EdgeScan};
pub use error::{ErrorKind, RatingError, Result};
pub use ratings::{compute_ratings, RatingEngine, RatingReport};
pub use spread::{predict_matchup, predict_spread, round_to_half_point};
pub use types::*;
