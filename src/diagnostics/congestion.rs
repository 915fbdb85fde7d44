use chrono::NaiveDate;
use serde::Serialize;

use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CongestionZone {
    pub team: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub matches: usize,
    pub match_ids: Vec<u32>,
}

/// Per team, every maximal run of fixtures that fits inside `window_days` and
/// holds more than `max_matches` matches. A run contained in an earlier
/// reported run is not repeated.
pub fn identify_fixture_congestion(
    snapshot: &AnalysisSnapshot<'_>,
    window_days: i64,
    max_matches: usize,
) -> Vec<CongestionZone> {
    let span = window_days.max(1) - 1;
    let mut zones = Vec::new();

    for team in snapshot.teams {
        let fixtures = snapshot.team_fixtures(&team.name);
        let mut end = 0;
        let mut last_emitted: Option<usize> = None;
        for start in 0..fixtures.len() {
            end = end.max(start);
            while end + 1 < fixtures.len() && (fixtures[end + 1].date - fixtures[start].date).num_days() <= span {
                end += 1;
            }
            let count = end - start + 1;
            if count <= max_matches || last_emitted.is_some_and(|prev| end <= prev) {
                continue;
            }
            last_emitted = Some(end);
            zones.push(CongestionZone {
                team: team.name.clone(),
                start: fixtures[start].date,
                end: fixtures[end].date,
                matches: count,
                match_ids: fixtures[start..=end].iter().map(|f| f.match_id).collect(),
            });
        }
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Team;
    use crate::scheduler::{Fixture, FixtureStatus, Leg};

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

    fn teams() -> Vec<Team> {
        ["A", "B"]
            .iter()
            .map(|n| Team {
                name: n.to_string(),
                stadium: String::new(),
            })
            .collect()
    }

    #[test]
    fn weekly_calendar_is_not_congested() {
        let teams = teams();
        let fixtures = vec![fixture(1, 1, "A", "B"), fixture(2, 8, "B", "A"), fixture(3, 15, "A", "B")];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &[]);
        assert!(identify_fixture_congestion(&snapshot, 7, 1).is_empty());
    }

    #[test]
    fn reports_maximal_windows_once() {
        let teams = teams();
        let fixtures = vec![
            fixture(1, 1, "A", "B"),
            fixture(2, 3, "B", "A"),
            fixture(3, 5, "A", "B"),
            fixture(4, 20, "B", "A"),
        ];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &[]);
        let zones = identify_fixture_congestion(&snapshot, 7, 1);
        // Days 1..5 fit one window; the run starting on day 3 is inside it.
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].team, "A");
        assert_eq!(zones[0].match_ids, vec![1, 2, 3]);
        assert_eq!(zones[0].matches, 3);
        assert_eq!(zones[1].team, "B");
    }

    #[test]
    fn threshold_controls_what_counts_as_congested() {
        let teams = teams();
        let fixtures = vec![fixture(1, 1, "A", "B"), fixture(2, 3, "B", "A")];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &[]);
        assert_eq!(identify_fixture_congestion(&snapshot, 7, 1).len(), 2);
        assert!(identify_fixture_congestion(&snapshot, 7, 2).is_empty());
    }
}
