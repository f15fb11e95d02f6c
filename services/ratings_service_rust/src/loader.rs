//! Game record loading from a JSON export.
//!
//! The export is a flat array of per-team `GameRecord` objects produced by an
//! external play-by-play pipeline.

use anyhow::{Context, Result};
use power_ratings_core::{games, GameRecord};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn load_games(path: &Path, seasons: &[i32]) -> Result<Vec<GameRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read game records from {}", path.display()))?;
    let records = parse_games(&raw, seasons)
        .with_context(|| format!("Failed to parse game records in {}", path.display()))?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a JSON array and keep only the requested seasons
pub fn parse_games(raw: &str, seasons: &[i32]) -> Result<Vec<GameRecord>> {
    let all: Vec<GameRecord> = serde_json::from_str(raw)?;
    let total = all.len();
    let records: Vec<GameRecord> = all
        .into_iter()
        .filter(|r| seasons.contains(&r.season))
        .collect();
    if records.len() < total {
        info!("Dropped {} records outside seasons {:?}", total - records.len(), seasons);
    }

    let unpaired = games::unpaired_records(&records);
    for record in unpaired.iter().take(5) {
        warn!(
            "{} {} W{} vs {} has no mirrored record",
            record.team, record.season, record.week, record.opponent
        );
    }
    if unpaired.len() > 5 {
        warn!("{} more unpaired records", unpaired.len() - 5);
    }

    Ok(records)
}
