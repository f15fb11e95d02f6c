//! Plain-text report sections printed by the binary.

use power_ratings_core::{
    grade_ats, predict_spread, round_to_half_point, AtsOutcome, BacktestResult, BacktestSummary,
    EdgeScan, RatingReport,
};

const RULE: usize = 55;

pub fn tier(rating: f64) -> &'static str {
    if rating > 5.0 {
        "Elite"
    } else if rating > 2.0 {
        "Contender"
    } else if rating > -2.0 {
        "Average"
    } else if rating > -5.0 {
        "Below Avg"
    } else {
        "Rebuild"
    }
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE);
    format!("\n{}\n  {}\n{}\n", rule, title, rule)
}

pub fn ratings_table(report: &RatingReport, top_n: usize) -> String {
    let title = match (report.season, report.through_week) {
        (Some(season), Some(week)) => format!("POWER RATINGS: {} Season, Through Week {}", season, week),
        _ => "POWER RATINGS".to_string(),
    };
    let mut out = banner(&title);
    out.push_str(&format!(
        "  {:<6} {:<6} {:>8} {:>7} {:>7}  {}\n",
        "Rank", "Team", "Rating", "Off", "Def", "Tier"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(45)));

    for (i, rating) in report.ranked().into_iter().take(top_n).enumerate() {
        out.push_str(&format!(
            "  {:<6} {:<6} {:>+8.2} {:>+7.3} {:>+7.3}  {}\n",
            i + 1,
            rating.team,
            rating.composite_rating,
            rating.off_rating,
            rating.def_rating,
            tier(rating.composite_rating)
        ));
    }

    for failure in &report.failures {
        out.push_str(&format!("  ! {}\n", failure));
    }
    out
}

pub fn backtest_summary(title: &str, summary: &BacktestSummary, min_edge_threshold: f64) -> String {
    let mut out = banner(title);
    if summary.bets == 0 {
        out.push_str("  No edges found in backtest.\n");
        return out;
    }

    let record = &summary.record;
    out.push_str(&format!(
        "  Total bets:        {} ({} pushes excluded)\n",
        record.decided(),
        record.pushes
    ));
    out.push_str(&format!("  Record:            {}-{}\n", record.wins, record.losses));
    out.push_str(&format!("  Win %:             {:.1}%\n", summary.win_pct));
    out.push_str(&format!("  Breakeven:         {:.1}%\n", summary.breakeven_pct));
    out.push_str(&format!("  Estimated ROI:     {:+.1}%\n", summary.roi_pct));
    out.push_str(&format!("  Avg edge:          {:.1} pts\n", summary.avg_edge));
    out.push_str(&format!("  Min edge filter:   {} pts\n", min_edge_threshold));

    out.push_str("\n  Performance by Edge Size:\n");
    out.push_str(&format!("  {:<15} {:>6} {:>8} {:>8}\n", "Edge Range", "Bets", "Win%", "ROI"));
    out.push_str(&format!("  {}\n", "-".repeat(40)));
    for bucket in summary.buckets.iter().filter(|b| b.record.decided() > 0) {
        out.push_str(&format!(
            "  {:<15} {:>6} {:>7.1}% {:>+7.1}%\n",
            bucket.label,
            bucket.record.decided(),
            bucket.record.win_pct(),
            bucket.record.roi_pct()
        ));
    }
    out
}

/// One record line per season, then the pooled summary across all of them
pub fn season_backtests(results: &[BacktestResult], min_edge_threshold: f64) -> String {
    let mut out = banner("BACKTEST BY SEASON");
    out.push_str(&format!(
        "  {:<8} {:>6} {:>9} {:>7} {:>8}\n",
        "Season", "Bets", "Record", "Win%", "ROI"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(42)));

    for result in results {
        let summary = result.summary();
        let record = &summary.record;
        if record.decided() == 0 {
            out.push_str(&format!("  {:<8} {:>6}   no graded bets\n", result.season, 0));
            continue;
        }
        out.push_str(&format!(
            "  {:<8} {:>6} {:>9} {:>6.1}% {:>+7.1}%\n",
            result.season,
            record.decided(),
            format!("{}-{}", record.wins, record.losses),
            summary.win_pct,
            summary.roi_pct
        ));
    }

    let combined = BacktestSummary::combined(results);
    let title = match (results.first(), results.last()) {
        (Some(first), Some(last)) if first.season != last.season => {
            format!("COMBINED BACKTEST: {}-{}", first.season, last.season)
        }
        _ => "COMBINED BACKTEST".to_string(),
    };
    out.push_str(&backtest_summary(&title, &combined, min_edge_threshold));
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePrediction {
    pub home: String,
    pub away: String,
    pub home_rating: f64,
    pub away_rating: f64,
    pub spread: f64,
}

/// Best vs worst, best vs middle, middle vs worst; the first team hosts
pub fn example_predictions(report: &RatingReport, home_field_advantage: f64) -> Vec<ExamplePrediction> {
    let ranked = report.ranked();
    if ranked.len() < 3 {
        return Vec::new();
    }
    let best = ranked[0];
    let mid = ranked[(ranked.len() / 2).saturating_sub(1)];
    let worst = ranked[ranked.len() - 1];

    [(best, worst), (best, mid), (mid, worst)]
        .into_iter()
        .map(|(home, away)| ExamplePrediction {
            home: home.team.clone(),
            away: away.team.clone(),
            home_rating: home.composite_rating,
            away_rating: away.composite_rating,
            spread: predict_spread(away.composite_rating, home.composite_rating, home_field_advantage),
        })
        .collect()
}

pub fn predictions_section(title: &str, predictions: &[ExamplePrediction]) -> String {
    let mut out = banner(title);
    for p in predictions {
        out.push_str(&format!(
            "\n  {} ({:+.1}) @ {} ({:+.1})\n",
            p.away, p.away_rating, p.home, p.home_rating
        ));
        out.push_str(&format!(
            "  Predicted spread: {} {:+.1}\n",
            p.home,
            round_to_half_point(p.spread)
        ));
    }
    out
}

pub fn edge_section(title: &str, scan: &EdgeScan, min_edge_threshold: f64) -> String {
    let mut out = banner(title);
    let mut any = false;
    for edge in scan.flagged() {
        any = true;
        let m = &edge.matchup;
        out.push_str(&format!("  {} @ {}\n", m.away_team, m.home_team));
        out.push_str(&format!(
            "    Model: {:+.1}  Market: {:+.1}  Edge: {:.1} pts\n",
            edge.predicted_spread,
            edge.market_spread_line,
            edge.edge.abs()
        ));

        let result = match (edge.bet_side, m.home_margin) {
            (Some(side), Some(margin)) => match grade_ats(side, edge.market_spread_line, margin) {
                AtsOutcome::Win => "W",
                AtsOutcome::Loss => "L",
                AtsOutcome::Push => "P",
            },
            _ => "-",
        };
        out.push_str(&format!(
            "    Bet: {}  Result: {}\n",
            edge.bet_team().unwrap_or("-"),
            result
        ));
    }
    if !any {
        out.push_str(&format!("  No edges >= {} pts found\n", min_edge_threshold));
    }
    if !scan.skipped.is_empty() {
        out.push_str(&format!("  ({} matchups skipped)\n", scan.skipped.len()));
    }
    out
}
