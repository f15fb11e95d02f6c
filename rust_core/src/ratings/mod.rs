//! Rating engine: recency-weighted, opponent-adjusted team power ratings.
//!
//! Pipeline for one season slice:
//! 1. Aggregate each team's games with recency weights
//! 2. Opponent-adjust offense and defense over a fixed number of passes
//! 3. Regress turnover margin toward the league average
//! 4. Combine the four components into points, blend with last season early on
//! 5. Re-center so the league mean composite is exactly 0

mod opponent;
mod recency;

pub use recency::{recency_weights, weighted_mean};

use crate::config::RatingConfig;
use crate::error::{RatingError, Result};
use crate::games;
use crate::types::{GameRecord, RatingTable, TeamRating};
use opponent::adjust_for_opponents;
use recency::TeamProfile;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Result of one rating run. Teams that could not be rated are listed in
/// `failures` instead of aborting the run.
#[derive(Debug, Clone, Default)]
pub struct RatingReport {
    pub season: Option<i32>,
    pub through_week: Option<u32>,
    pub ratings: RatingTable,
    pub failures: Vec<RatingError>,
    pub league_turnover_average: f64,
}

impl RatingReport {
    pub fn get(&self, team: &str) -> Option<&TeamRating> {
        self.ratings.get(team)
    }

    /// Ratings sorted best to worst
    pub fn ranked(&self) -> Vec<&TeamRating> {
        let mut ranked: Vec<&TeamRating> = self.ratings.values().collect();
        ranked.sort_by(|a, b| {
            b.composite_rating
                .total_cmp(&a.composite_rating)
                .then_with(|| a.team.cmp(&b.team))
        });
        ranked
    }

    pub fn mean_composite(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        self.ratings.values().map(|r| r.composite_rating).sum::<f64>() / self.ratings.len() as f64
    }
}

/// Component ratings converted to points and weighted. Defense is negated
/// because a lower EPA allowed is better.
pub fn composite_points(
    off_rating: f64,
    def_rating: f64,
    turnover_rating: f64,
    special_teams_rating: f64,
    config: &RatingConfig,
) -> f64 {
    let ppg = config.plays_per_game;
    config.weight_off_epa * off_rating * ppg
        + config.weight_def_epa * (-def_rating) * ppg
        + config.weight_turnover_adj * turnover_rating * config.points_per_turnover
        + config.weight_special_teams * special_teams_rating * ppg
}

/// Regress a team's turnover margin toward the league average.
pub fn regress_turnovers(team_rate: f64, league_average: f64, regression_factor: f64) -> f64 {
    regression_factor * league_average + (1.0 - regression_factor) * team_rate
}

/// Rate every team in `records`, optionally blending with last season's table.
///
/// Fails only on an invalid configuration; per-team problems are reported in
/// [`RatingReport::failures`].
pub fn compute_ratings(
    records: &[GameRecord],
    config: &RatingConfig,
    prior_ratings: Option<&RatingTable>,
) -> Result<RatingReport> {
    let engine = RatingEngine::new(config.clone())?;
    Ok(engine.compute(records, prior_ratings))
}

/// Rating engine bound to a validated configuration
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: RatingConfig,
}

impl RatingEngine {
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        let weight_sum = config.weight_sum();
        if (weight_sum - 1.0).abs() > 1e-9 {
            warn!(
                "Component weights sum to {:.4}, composites will be scaled by the same factor",
                weight_sum
            );
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Rate the latest season present in `records`.
    pub fn compute(&self, records: &[GameRecord], prior: Option<&RatingTable>) -> RatingReport {
        let Some(season) = records.iter().map(|r| r.season).max() else {
            return RatingReport::default();
        };

        let current: Vec<&GameRecord> = records.iter().filter(|r| r.season == season).collect();
        if current.len() < records.len() {
            debug!(
                "Ignoring {} records from seasons before {}",
                records.len() - current.len(),
                season
            );
        }
        let through_week = current.iter().map(|r| r.week).max();

        // Every team named on either side of a record is expected to get a rating
        let universe: BTreeSet<&str> = current
            .iter()
            .flat_map(|r| [r.team.as_str(), r.opponent.as_str()])
            .collect();

        let mut games_by_team: BTreeMap<&str, Vec<&GameRecord>> = BTreeMap::new();
        for &record in &current {
            games_by_team.entry(record.team.as_str()).or_default().push(record);
        }

        let index: FxHashMap<&str, usize> = games_by_team
            .keys()
            .enumerate()
            .map(|(i, team)| (*team, i))
            .collect();

        let profiles: Vec<TeamProfile> = games_by_team
            .iter()
            .filter_map(|(team, games)| {
                TeamProfile::build(team, games, self.config.recency_decay, &index)
            })
            .collect();

        let league_turnover_average = if current.is_empty() {
            0.0
        } else {
            current.iter().map(|r| r.turnover_margin).sum::<f64>() / current.len() as f64
        };

        let factors = adjust_for_opponents(&profiles, self.config.opponent_adjustment_iterations);

        let mut ratings = RatingTable::new();
        for (i, profile) in profiles.iter().enumerate() {
            let rating = self.rate_profile(
                profile,
                factors.offense[i],
                factors.defense[i],
                league_turnover_average,
                prior.and_then(|p| p.get(&profile.team)),
            );
            ratings.insert(profile.team.clone(), rating);
        }

        let mut failures = Vec::new();
        for team in universe.iter().filter(|t| !games_by_team.contains_key(*t)) {
            match prior.and_then(|p| p.get(*team)) {
                Some(previous) => {
                    debug!("{} has no games in {}, carrying prior rating", team, season);
                    ratings.insert(team.to_string(), self.carry_prior(previous));
                }
                None => {
                    warn!("{} has no games in {} and no prior rating", team, season);
                    failures.push(RatingError::InsufficientData {
                        team: team.to_string(),
                        season,
                    });
                }
            }
        }

        center_composites(&mut ratings);

        info!(
            "Computed {} power ratings for {} through week {} ({} failures)",
            ratings.len(),
            season,
            through_week.unwrap_or(0),
            failures.len()
        );

        RatingReport {
            season: Some(season),
            through_week,
            ratings,
            failures,
            league_turnover_average,
        }
    }

    /// Rate `season` using only games up to and including `through_week`.
    pub fn compute_through(
        &self,
        records: &[GameRecord],
        season: i32,
        through_week: u32,
        prior: Option<&RatingTable>,
    ) -> RatingReport {
        let slice = games::season_slice(records, season, through_week);
        self.compute(&slice, prior)
    }

    /// Full-season ratings for every season, oldest first. Each season's final
    /// table is the prior for the following season.
    pub fn final_ratings_by_season(&self, records: &[GameRecord]) -> BTreeMap<i32, RatingReport> {
        let mut finals: BTreeMap<i32, RatingReport> = BTreeMap::new();
        for season in games::seasons(records) {
            let Some(last_week) = games::max_week(records, season) else {
                continue;
            };
            let prior = finals.get(&(season - 1)).map(|r| &r.ratings);
            let report = self.compute_through(records, season, last_week, prior);
            finals.insert(season, report);
        }
        finals
    }

    fn rate_profile(
        &self,
        profile: &TeamProfile,
        off_rating: f64,
        def_rating: f64,
        league_turnover_average: f64,
        prior: Option<&TeamRating>,
    ) -> TeamRating {
        let cfg = &self.config;
        let turnover_rating = regress_turnovers(
            profile.raw_turnover,
            league_turnover_average,
            cfg.turnover_regression_factor,
        );
        let special_teams_rating = profile.raw_special_teams;
        let current = composite_points(
            off_rating,
            def_rating,
            turnover_rating,
            special_teams_rating,
            cfg,
        );

        let schedule = &cfg.prior_season_blend_schedule;
        let (composite_rating, prior_blend_weight) = match prior {
            Some(_) if profile.games_played >= schedule.threshold() => (current, 0.0),
            Some(previous) => {
                let w = schedule.weight(profile.games_played);
                let blended = (1.0 - w) * current
                    + w * cfg.prior_rating_retention * previous.composite_rating;
                (blended, w)
            }
            None => (current, 0.0),
        };

        TeamRating {
            team: profile.team.clone(),
            games_played: profile.games_played,
            off_rating,
            def_rating,
            turnover_rating,
            special_teams_rating,
            composite_rating,
            prior_blend_weight,
        }
    }

    fn carry_prior(&self, previous: &TeamRating) -> TeamRating {
        let keep = self.config.prior_rating_retention;
        TeamRating {
            team: previous.team.clone(),
            games_played: 0,
            off_rating: keep * previous.off_rating,
            def_rating: keep * previous.def_rating,
            turnover_rating: keep * previous.turnover_rating,
            special_teams_rating: keep * previous.special_teams_rating,
            composite_rating: keep * previous.composite_rating,
            prior_blend_weight: 1.0,
        }
    }
}

fn center_composites(ratings: &mut RatingTable) {
    let mut composites: Vec<f64> = ratings.values().map(|r| r.composite_rating).collect();
    opponent::center(&mut composites);
    for (rating, centered) in ratings.values_mut().zip(composites) {
        rating.composite_rating = centered;
    }
}
