//! Season slicing and schedule helpers over flat `GameRecord` collections.

use crate::types::{GameRecord, Matchup};
use std::collections::BTreeSet;

/// Records of `season` up to and including `through_week`
pub fn season_slice(records: &[GameRecord], season: i32, through_week: u32) -> Vec<GameRecord> {
    records
        .iter()
        .filter(|r| r.season == season && r.week <= through_week)
        .cloned()
        .collect()
}

/// Distinct seasons in ascending order
pub fn seasons(records: &[GameRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.season)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn max_week(records: &[GameRecord], season: i32) -> Option<u32> {
    records
        .iter()
        .filter(|r| r.season == season)
        .map(|r| r.week)
        .max()
}

/// One matchup per game in the given week, taken from the home side's record.
pub fn matchups_for_week(records: &[GameRecord], season: i32, week: u32) -> Vec<Matchup> {
    let mut matchups: Vec<Matchup> = records
        .iter()
        .filter(|r| r.season == season && r.week == week && r.is_home)
        .map(|r| Matchup {
            season,
            week,
            home_team: r.team.clone(),
            away_team: r.opponent.clone(),
            market_line: r.market_spread_line,
            home_margin: r.point_margin,
        })
        .collect();
    matchups.sort_by(|a, b| a.home_team.cmp(&b.home_team));
    matchups
}

/// Records whose mirrored opposite-side record is absent
pub fn unpaired_records(records: &[GameRecord]) -> Vec<&GameRecord> {
    let keys: BTreeSet<(i32, u32, &str, &str, bool)> = records
        .iter()
        .map(|r| (r.season, r.week, r.team.as_str(), r.opponent.as_str(), r.is_home))
        .collect();

    records
        .iter()
        .filter(|r| {
            !keys.contains(&(
                r.season,
                r.week,
                r.opponent.as_str(),
                r.team.as_str(),
                !r.is_home,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(season: i32, week: u32, home: &str, away: &str, line: Option<f64>) -> [GameRecord; 2] {
        let base = GameRecord {
            season,
            week,
            team: home.to_string(),
            opponent: away.to_string(),
            is_home: true,
            off_epa_per_play: 0.0,
            def_epa_per_play: 0.0,
            turnover_margin: 0.0,
            special_teams_epa: 0.0,
            market_spread_line: line,
            point_margin: Some(7.0),
        };
        let mirror = GameRecord {
            team: away.to_string(),
            opponent: home.to_string(),
            is_home: false,
            point_margin: Some(-7.0),
            ..base.clone()
        };
        [base, mirror]
    }

    fn league() -> Vec<GameRecord> {
        let mut records = Vec::new();
        records.extend(pair(2023, 17, "KC", "LV", Some(-9.5)));
        records.extend(pair(2024, 1, "KC", "BAL", Some(-3.0)));
        records.extend(pair(2024, 1, "BUF", "ARI", None));
        records.extend(pair(2024, 2, "ARI", "LAR", Some(1.5)));
        records
    }

    #[test]
    fn test_slice_and_weeks() {
        let records = league();
        assert_eq!(seasons(&records), vec![2023, 2024]);
        assert_eq!(max_week(&records, 2024), Some(2));
        assert_eq!(max_week(&records, 2019), None);

        let slice = season_slice(&records, 2024, 1);
        assert_eq!(slice.len(), 4);
        assert!(slice.iter().all(|r| r.season == 2024 && r.week == 1));
    }

    #[test]
    fn test_matchups_come_from_home_records() {
        let records = league();
        let week1 = matchups_for_week(&records, 2024, 1);
        assert_eq!(week1.len(), 2);
        assert_eq!(week1[0].home_team, "BUF");
        assert_eq!(week1[0].away_team, "ARI");
        assert_eq!(week1[0].market_line, None);
        assert_eq!(week1[1].home_team, "KC");
        assert_eq!(week1[1].market_line, Some(-3.0));
        assert_eq!(week1[1].home_margin, Some(7.0));
    }

    #[test]
    fn test_unpaired_records_detected() {
        let mut records = league();
        assert!(unpaired_records(&records).is_empty());

        // Drop LAR's side of week 2
        records.retain(|r| !(r.team == "LAR" && r.week == 2));
        let unpaired = unpaired_records(&records);
        assert_eq!(unpaired.len(), 1);
        assert_eq!(unpaired[0].team, "ARI");
    }
}
