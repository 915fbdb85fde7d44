use chrono::NaiveDate;

use league_toolkit::LeagueError;
use league_toolkit::diagnostics::DiagnosticsEngine;
use league_toolkit::league::{League, LeagueManager};
use league_toolkit::results::ResultsLedger;
use league_toolkit::scheduler::{FixtureScheduler, FixtureStatus};

fn four_team_league() -> League {
    let mut manager = LeagueManager::new();
    manager.create_league("Premier League", "2024/25").unwrap();
    for (name, stadium) in [
        ("Arsenal", "Emirates Stadium"),
        ("Chelsea", "Stamford Bridge"),
        ("Liverpool", "Anfield"),
        ("Manchester United", "Old Trafford"),
    ] {
        manager.add_team(name, stadium).unwrap();
    }
    manager.validate_for_scheduling().unwrap();
    manager.into_league().unwrap()
}

#[test]
fn four_teams_full_season_workflow() {
    let league = four_team_league();
    let mut scheduler = FixtureScheduler::new(&league);
    let msg = scheduler.generate_fixtures("2024-12-01").unwrap();
    assert!(msg.contains("6 fixtures"), "{msg}");

    let fixtures = scheduler.get_all_fixtures();
    assert_eq!(fixtures.len(), 6);
    assert_eq!(scheduler.round_count(), 3);
    for round in 1..=3u32 {
        let in_round = scheduler.fixtures_for_round(round);
        assert_eq!(in_round.len(), 2);
        let expected = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap() + chrono::Duration::days(7 * (round as i64 - 1));
        assert!(in_round.iter().all(|f| f.date == expected));
    }
    assert!(scheduler.validate_fixtures().is_valid());

    let mut ledger = ResultsLedger::new(scheduler.into_fixtures());
    let ids: Vec<u32> = ledger.fixtures().iter().take(4).map(|f| f.match_id).collect();
    for (i, id) in ids.iter().enumerate() {
        ledger.record_result(*id, (i % 3) as u32, 1).unwrap();
    }
    assert_eq!(ledger.fixture(ids[0]).unwrap().status, FixtureStatus::Played);
    assert!(matches!(
        ledger.record_result(ids[0], 5, 5),
        Err(LeagueError::Precondition(_))
    ));

    let table = ledger.get_league_table(league.teams());
    assert_eq!(table.len(), 4);
    assert_eq!(table.iter().map(|r| r.played).sum::<u32>(), 8);
    assert!(table.windows(2).all(|w| w[0].points >= w[1].points));

    let engine = DiagnosticsEngine::default();
    let snapshot = ledger.snapshot(league.teams());
    assert!(engine.detect_scheduling_anomalies(&snapshot, false).is_empty());
    assert_eq!(engine.analyse_team_workload(&snapshot, false).len(), 4);
    assert_eq!(engine.predict_outcome_trends(&snapshot, false).len(), 4);
    assert!(engine.identify_fixture_congestion(&snapshot, false).is_empty());
    let summary = engine.generate_season_summary(&snapshot, false);
    assert_eq!(summary.matches_played, 4);
    assert_eq!(summary.total_fixtures, 6);
    assert!(summary.leader.is_some());
}

#[test]
fn scheduling_requires_validation() {
    let mut manager = LeagueManager::new();
    manager.create_league("Cup", "2025").unwrap();
    manager.add_team("A", "").unwrap();
    manager.add_team("B", "").unwrap();
    let draft = manager.league().unwrap().clone();

    let mut scheduler = FixtureScheduler::new(&draft);
    let err = scheduler.generate_fixtures("2025-01-01").unwrap_err();
    assert!(matches!(err, LeagueError::Precondition(_)));
    assert!(scheduler.get_all_fixtures().is_empty());
}

#[test]
fn league_error_messages_read_as_sentences() {
    let mut manager = LeagueManager::new();
    let err = manager.add_team("A", "Ground").unwrap_err();
    assert!(err.to_string().contains("create a league first"));

    manager.create_league("Cup", "2025").unwrap();
    manager.add_team("A", "Ground").unwrap();
    let err = manager.validate_for_scheduling().unwrap_err();
    assert!(err.to_string().contains("insufficient teams"));

    let err = manager.add_team(" a ", "Other").unwrap_err();
    assert!(err.to_string().contains("duplicate team"));
}
