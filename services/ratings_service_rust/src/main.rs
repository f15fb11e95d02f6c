mod config;
mod loader;
mod report;
mod synthetic;

use crate::config::ServiceConfig;
use crate::synthetic::SyntheticLeague;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use dotenv::dotenv;
use power_ratings_core::{detect_edges, games, BacktestSummary, Backtester, RatingEngine};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Power Ratings Service...");

    let config = ServiceConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Seasons {:?}, decay {}, HFA {}, min edge {}",
        config.seasons,
        config.rating.recency_decay,
        config.rating.home_field_advantage,
        config.rating.min_edge_threshold
    );

    // [1] Data
    let records = if config.use_synthetic {
        SyntheticLeague::new(config.synthetic_seed).generate(&config.seasons)?
    } else {
        let path = config
            .games_path
            .as_deref()
            .ok_or_else(|| anyhow!("GAMES_PATH must be set when USE_SYNTHETIC=false"))?;
        loader::load_games(path, &config.seasons)?
    };
    let seasons = games::seasons(&records);
    let Some(&current_season) = seasons.last() else {
        warn!("No game records for seasons {:?}; nothing to rate", config.seasons);
        return Ok(());
    };

    println!("Power Rating Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("{} records across {} seasons", records.len(), seasons.len());

    // [2] Historical ratings, chained season to season
    let engine = RatingEngine::new(config.rating.clone())
        .map_err(|e| anyhow!("Invalid rating configuration: {}", e))?;
    let finals = engine.final_ratings_by_season(&records);
    for (season, report) in &finals {
        info!(
            "{}: rated {} teams through week {}",
            season,
            report.ratings.len(),
            report.through_week.unwrap_or(0)
        );
    }

    // [3] Current ratings
    let Some(current) = finals.get(&current_season) else {
        return Err(anyhow!("No ratings computed for {}", current_season));
    };
    print!("{}", report::ratings_table(current, config.top_n));

    // [4] Backtest: every season after the first is walked forward from last season's finals
    let backtester = Backtester::from_engine(engine.clone());
    let prior = finals.get(&(current_season - 1)).map(|r| &r.ratings);
    let results = if seasons.len() >= 2 {
        backtester.run_all(&records)
    } else {
        vec![backtester.run_season(&records, current_season, prior)]
    };
    if let Some(latest) = results.last() {
        print!(
            "{}",
            report::backtest_summary(
                &format!("BACKTEST RESULTS: {}", latest.season),
                &latest.summary(),
                config.rating.min_edge_threshold
            )
        );
    }
    if seasons.len() >= 2 {
        print!(
            "{}",
            report::season_backtests(&results, config.rating.min_edge_threshold)
        );
        let combined = BacktestSummary::combined(&results);
        info!(
            "All seasons: {} bets, {:.1}% wins, ROI {:+.1}%",
            combined.bets, combined.win_pct, combined.roi_pct
        );
    }

    // [5] Example predictions
    let predictions = report::example_predictions(current, config.rating.home_field_advantage);
    print!(
        "{}",
        report::predictions_section(
            &format!(
                "EXAMPLE PREDICTIONS ({} Week {} ratings)",
                current_season,
                current.through_week.unwrap_or(0)
            ),
            &predictions
        )
    );

    // [6] Sample week edges, rated through the week before
    let last_week = current.through_week.unwrap_or(1);
    let sample_week = config.sample_week.clamp(2.min(last_week), last_week);
    let rated = engine.compute_through(&records, current_season, sample_week.saturating_sub(1), prior);
    let matchups = games::matchups_for_week(&records, current_season, sample_week);
    let scan = detect_edges(&matchups, &rated.ratings, &config.rating);
    print!(
        "{}",
        report::edge_section(
            &format!("SAMPLE EDGE ANALYSIS: {} Week {}", current_season, sample_week),
            &scan,
            config.rating.min_edge_threshold
        )
    );

    info!("Done");
    Ok(())
}
