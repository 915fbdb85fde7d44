use std::collections::{HashMap, HashSet};

use league_toolkit::LeagueError;
use league_toolkit::league::{League, LeagueManager};
use league_toolkit::scheduler::{FixtureScheduler, Leg, RoundRobinMode, ScheduleOptions};

fn league_of(n: usize) -> League {
    let mut manager = LeagueManager::new();
    manager.create_league("Test League", "2025").unwrap();
    for i in 0..n {
        manager.add_team(&format!("Team {i:02}"), &format!("Ground {i:02}")).unwrap();
    }
    manager.validate_for_scheduling().unwrap();
    manager.into_league().unwrap()
}

fn pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[test]
fn single_round_robin_meets_every_pair_once() {
    for n in 2..=12 {
        let league = league_of(n);
        let mut scheduler = FixtureScheduler::new(&league);
        scheduler.generate_fixtures("2025-08-16").unwrap();
        let fixtures = scheduler.get_all_fixtures();
        assert_eq!(fixtures.len(), n * (n - 1) / 2, "n={n}");

        let pairs: HashSet<_> = fixtures.iter().map(|f| pair(&f.home, &f.away)).collect();
        assert_eq!(pairs.len(), fixtures.len(), "n={n}: repeated pairing");
        assert!(fixtures.iter().all(|f| f.home != f.away));

        let mut booked = HashSet::new();
        for f in fixtures {
            assert!(booked.insert((f.date, f.home.clone())), "n={n}: {} twice on {}", f.home, f.date);
            assert!(booked.insert((f.date, f.away.clone())), "n={n}: {} twice on {}", f.away, f.date);
        }
        assert!(scheduler.validate_fixtures().is_valid(), "n={n}");
    }
}

#[test]
fn venues_stay_balanced() {
    for n in 2..=16 {
        let league = league_of(n);
        let mut scheduler = FixtureScheduler::new(&league);
        scheduler.generate_fixtures("2025-08-16").unwrap();
        let mut home: HashMap<&str, i64> = HashMap::new();
        for f in scheduler.get_all_fixtures() {
            *home.entry(f.home.as_str()).or_default() += 1;
            *home.entry(f.away.as_str()).or_default() -= 1;
        }
        assert!(home.values().all(|d| d.abs() <= 1), "n={n}: {home:?}");
    }
}

#[test]
fn odd_league_rests_one_team_per_round() {
    let league = league_of(5);
    let mut scheduler = FixtureScheduler::new(&league);
    scheduler.generate_fixtures("2025-01-04").unwrap();
    assert_eq!(scheduler.round_count(), 5);
    for round in 1..=5 {
        assert_eq!(scheduler.fixtures_for_round(round).len(), 2);
    }
    for team in league.team_names() {
        assert_eq!(scheduler.fixtures_for_team(&team).len(), 4);
    }
}

#[test]
fn double_round_robin_reverses_venues() {
    let league = league_of(6);
    let options = ScheduleOptions {
        mode: RoundRobinMode::Double,
        round_interval_days: 3,
    };
    let mut scheduler = FixtureScheduler::with_options(&league, options);
    scheduler.generate_fixtures("2025-08-16").unwrap();
    let fixtures = scheduler.get_all_fixtures();
    assert_eq!(fixtures.len(), 30);
    assert_eq!(scheduler.round_count(), 10);

    let venues: HashSet<(String, String)> = fixtures.iter().map(|f| (f.home.clone(), f.away.clone())).collect();
    assert_eq!(venues.len(), 30);
    for f in fixtures.iter().filter(|f| f.leg == Leg::First) {
        assert!(venues.contains(&(f.away.clone(), f.home.clone())));
    }
    let last = fixtures.iter().map(|f| f.date).max().unwrap();
    let first = fixtures.iter().map(|f| f.date).min().unwrap();
    assert_eq!((last - first).num_days(), 27);
    assert!(scheduler.validate_fixtures().is_valid());
}

#[test]
fn bad_start_date_keeps_previous_calendar() {
    let league = league_of(4);
    let mut scheduler = FixtureScheduler::new(&league);
    scheduler.generate_fixtures("2025-08-16").unwrap();
    let before = scheduler.get_all_fixtures().to_vec();

    for raw in ["16/08/2025", "2025-02-30", ""] {
        let err = scheduler.generate_fixtures(raw).unwrap_err();
        assert!(matches!(err, LeagueError::Validation(_)), "{raw}: {err}");
    }
    assert_eq!(scheduler.get_all_fixtures(), before.as_slice());
}

#[test]
fn regenerating_replaces_the_calendar() {
    let league = league_of(4);
    let mut scheduler = FixtureScheduler::new(&league);
    scheduler.generate_fixtures("2025-08-16").unwrap();
    scheduler.generate_fixtures("2026-01-03").unwrap();
    let fixtures = scheduler.get_all_fixtures();
    assert_eq!(fixtures.len(), 6);
    assert!(fixtures.iter().all(|f| f.date.format("%Y").to_string() == "2026"));
    assert_eq!(fixtures.iter().map(|f| f.match_id).max(), Some(6));
}
