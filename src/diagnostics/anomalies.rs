use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::league::name_key;
use crate::scheduler::{DATE_FORMAT, FixtureStatus};
use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SelfMatch,
    UnknownTeam,
    DuplicateMatchId,
    DoubleBooking,
    RoundDateRegression,
    MissingResult,
    OrphanResult,
    ResultOnScheduledFixture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub match_id: Option<u32>,
    pub team: Option<String>,
    pub date: Option<NaiveDate>,
    pub detail: String,
}

/// Structural oddities in the calendar and its results, in fixture order.
pub fn detect_scheduling_anomalies(snapshot: &AnalysisSnapshot<'_>) -> Vec<Anomaly> {
    let mut out = Vec::new();
    let known: HashSet<String> = snapshot.teams.iter().map(|t| name_key(&t.name)).collect();
    let results = snapshot.results_by_match();

    let mut ids = HashSet::new();
    // Keyed on the normalised name; keeps the first spelling seen for display.
    let mut bookings: BTreeMap<(NaiveDate, String), (String, Vec<u32>)> = BTreeMap::new();
    let mut round_dates: BTreeMap<u32, NaiveDate> = BTreeMap::new();

    for f in snapshot.fixtures {
        if !ids.insert(f.match_id) {
            out.push(Anomaly {
                kind: AnomalyKind::DuplicateMatchId,
                match_id: Some(f.match_id),
                team: None,
                date: Some(f.date),
                detail: format!("match id {} is used more than once", f.match_id),
            });
        }
        if name_key(&f.home) == name_key(&f.away) {
            out.push(Anomaly {
                kind: AnomalyKind::SelfMatch,
                match_id: Some(f.match_id),
                team: Some(f.home.clone()),
                date: Some(f.date),
                detail: format!("{} is drawn against itself", f.home),
            });
        }
        for side in [&f.home, &f.away] {
            if !known.contains(&name_key(side)) {
                out.push(Anomaly {
                    kind: AnomalyKind::UnknownTeam,
                    match_id: Some(f.match_id),
                    team: Some(side.clone()),
                    date: Some(f.date),
                    detail: format!("{side} is not a registered team"),
                });
            }
            bookings
                .entry((f.date, name_key(side)))
                .or_insert_with(|| (side.clone(), Vec::new()))
                .1
                .push(f.match_id);
        }

        let round_date = round_dates.entry(f.round).or_insert(f.date);
        if *round_date > f.date {
            *round_date = f.date;
        }

        let has_result = results.contains_key(&f.match_id);
        match (f.status, has_result) {
            (FixtureStatus::Played, false) => out.push(Anomaly {
                kind: AnomalyKind::MissingResult,
                match_id: Some(f.match_id),
                team: None,
                date: Some(f.date),
                detail: format!("match {} is marked played but has no result", f.match_id),
            }),
            (FixtureStatus::Scheduled, true) => out.push(Anomaly {
                kind: AnomalyKind::ResultOnScheduledFixture,
                match_id: Some(f.match_id),
                team: None,
                date: Some(f.date),
                detail: format!("match {} has a result but is still scheduled", f.match_id),
            }),
            _ => {}
        }
    }

    for ((date, _), (team, matches)) in &bookings {
        if matches.len() > 1 {
            out.push(Anomaly {
                kind: AnomalyKind::DoubleBooking,
                match_id: matches.last().copied(),
                team: Some(team.clone()),
                date: Some(*date),
                detail: format!(
                    "{team} plays {} matches on {}",
                    matches.len(),
                    date.format(DATE_FORMAT)
                ),
            });
        }
    }

    let mut latest: Option<(u32, NaiveDate)> = None;
    for (round, date) in &round_dates {
        if let Some((prev_round, prev_date)) = latest {
            if *date < prev_date {
                out.push(Anomaly {
                    kind: AnomalyKind::RoundDateRegression,
                    match_id: None,
                    team: None,
                    date: Some(*date),
                    detail: format!(
                        "round {round} starts {} before round {prev_round} on {}",
                        date.format(DATE_FORMAT),
                        prev_date.format(DATE_FORMAT)
                    ),
                });
            }
        }
        if latest.is_none_or(|(_, d)| *date >= d) {
            latest = Some((*round, *date));
        }
    }

    for r in snapshot.results {
        if !ids.contains(&r.match_id) {
            out.push(Anomaly {
                kind: AnomalyKind::OrphanResult,
                match_id: Some(r.match_id),
                team: None,
                date: None,
                detail: format!("result for unknown match {}", r.match_id),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Team;
    use crate::results::MatchResult;
    use crate::scheduler::{Fixture, Leg};

    fn team(name: &str) -> Team {
        Team {
            name: name.to_string(),
            stadium: String::new(),
        }
    }

    fn fixture(id: u32, round: u32, day: u32, home: &str, away: &str) -> Fixture {
        Fixture {
            match_id: id,
            round,
            leg: Leg::First,
            home: home.to_string(),
            away: away.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            status: FixtureStatus::Scheduled,
        }
    }

    #[test]
    fn empty_snapshot_has_no_anomalies() {
        assert!(detect_scheduling_anomalies(&AnalysisSnapshot::empty()).is_empty());
    }

    #[test]
    fn flags_structural_problems() {
        let teams = vec![team("A"), team("B"), team("C")];
        let mut played = fixture(3, 2, 1, "B", "C");
        played.status = FixtureStatus::Played;
        let fixtures = vec![
            fixture(1, 1, 8, "A", "A"),
            fixture(2, 1, 8, "A", "Ghosts"),
            played,
        ];
        let results = vec![MatchResult {
            match_id: 99,
            home_score: 1,
            away_score: 0,
        }];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &results);
        let kinds: HashSet<AnomalyKind> = detect_scheduling_anomalies(&snapshot)
            .into_iter()
            .map(|a| a.kind)
            .collect();
        for expected in [
            AnomalyKind::SelfMatch,
            AnomalyKind::UnknownTeam,
            AnomalyKind::DoubleBooking,
            AnomalyKind::RoundDateRegression,
            AnomalyKind::MissingResult,
            AnomalyKind::OrphanResult,
        ] {
            assert!(kinds.contains(&expected), "missing {expected:?}");
        }
        assert!(!kinds.contains(&AnomalyKind::DuplicateMatchId));
    }

    #[test]
    fn double_booking_ignores_name_case() {
        let teams = vec![team("Rovers"), team("City"), team("Town")];
        let fixtures = vec![fixture(1, 1, 8, "Rovers", "City"), fixture(2, 1, 8, "Town", "rovers ")];
        let snapshot = AnalysisSnapshot::new(&teams, &fixtures, &[]);
        let doubles: Vec<Anomaly> = detect_scheduling_anomalies(&snapshot)
            .into_iter()
            .filter(|a| a.kind == AnomalyKind::DoubleBooking)
            .collect();
        assert_eq!(doubles.len(), 1);
        assert_eq!(doubles[0].team.as_deref(), Some("Rovers"));
        assert_eq!(doubles[0].match_id, Some(2));
    }
}
