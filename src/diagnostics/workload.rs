use serde::Serialize;

use crate::league::name_key;
use crate::scheduler::{Fixture, FixtureStatus};
use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamWorkload {
    pub team: String,
    pub total_fixtures: usize,
    pub home: usize,
    pub away: usize,
    pub played: usize,
    pub remaining: usize,
    /// `None` with fewer than two fixtures.
    pub min_rest_days: Option<i64>,
    pub avg_rest_days: Option<f64>,
    /// Most fixtures packed into any window of `window_days` days.
    pub busiest_window: usize,
}

/// One entry per registered team, in registration order.
pub fn analyse_team_workload(snapshot: &AnalysisSnapshot<'_>, window_days: i64) -> Vec<TeamWorkload> {
    let results = snapshot.results_by_match();
    snapshot
        .teams
        .iter()
        .map(|team| {
            let key = name_key(&team.name);
            let fixtures = snapshot.team_fixtures(&team.name);
            let home = fixtures.iter().filter(|f| name_key(&f.home) == key).count();
            let played = fixtures
                .iter()
                .filter(|f| f.status == FixtureStatus::Played || results.contains_key(&f.match_id))
                .count();

            let gaps: Vec<i64> = fixtures
                .windows(2)
                .map(|w| (w[1].date - w[0].date).num_days())
                .collect();
            let avg_rest_days = (!gaps.is_empty()).then(|| gaps.iter().sum::<i64>() as f64 / gaps.len() as f64);

            TeamWorkload {
                team: team.name.clone(),
                total_fixtures: fixtures.len(),
                home,
                away: fixtures.len() - home,
                played,
                remaining: fixtures.len() - played,
                min_rest_days: gaps.iter().copied().min(),
                avg_rest_days,
                busiest_window: busiest_window(&fixtures, window_days),
            }
        })
        .collect()
}

/// Largest count of date-sorted fixtures whose first and last fall within
/// `window_days - 1` days of each other.
pub(crate) fn busiest_window(fixtures: &[&Fixture], window_days: i64) -> usize {
    let span = window_days.max(1) - 1;
    let mut best = 0;
    let mut start = 0;
    for end in 0..fixtures.len() {
        while (fixtures[end].date - fixtures[start].date).num_days() > span {
            start += 1;
        }
        best = best.max(end - start + 1);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Team;
    use crate::results::MatchResult;
    use crate::scheduler::Leg;
    use chrono::NaiveDate;

    fn fixture(id: u32, day: u32, home: &str, away: &str) -> Fixture {
        Fixture {
            match_id: id,
            round: id,
            leg: Leg::First,
            home: home.to_string(),
            away: away.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            status: FixtureStatus::Scheduled,
        }
    }

    fn teams(names: &[&str]) -> Vec<Team> {
        names
            .iter()
            .map(|n| Team {
                name: n.to_string(),
                stadium: String::new(),
            })
            .collect()
    }

    #[test]
    fn one_zeroed_entry_per_team_without_fixtures() {
        let teams = teams(&["A", "B"]);
        let snapshot = AnalysisSnapshot::new(&teams, &[], &[]);
        let out = analyse_team_workload(&snapshot, 14);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].total_fixtures, 0);
        assert_eq!(out[0].min_rest_days, None);
        assert_eq!(out[0].busiest_window, 0);
    }

    #[test]
    fn counts_venues_rest_and_busiest_window() {
        let teams = teams(&["A", "B", "C"]);
        let mut first = fixture(1, 1, "A", "B");
        first.status = FixtureStatus::Played;
        let fixtures = vec![first, fixture(2, 4, "C", "A"), fixture(3, 20, "A", "C")];
        let results = vec![MatchResult {
            match_id: 1,
            home_score: 2,
            away_score: 0,
        }];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &results);
        let out = analyse_team_workload(&snapshot, 7);
        let a = &out[0];
        assert_eq!(a.total_fixtures, 3);
        assert_eq!(a.home, 2);
        assert_eq!(a.away, 1);
        assert_eq!(a.played, 1);
        assert_eq!(a.remaining, 2);
        assert_eq!(a.min_rest_days, Some(3));
        assert_eq!(a.avg_rest_days, Some(9.5));
        assert_eq!(a.busiest_window, 2);
    }
}
