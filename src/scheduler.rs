use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LeagueError, Result};
use crate::league::{League, Team, name_key};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRobinMode {
    Single,
    Double,
}

impl RoundRobinMode {
    pub fn legs(self) -> usize {
        match self {
            RoundRobinMode::Single => 1,
            RoundRobinMode::Double => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub mode: RoundRobinMode,
    pub round_interval_days: i64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            mode: RoundRobinMode::Single,
            round_interval_days: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    Scheduled,
    Played,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: u32,
    /// 1-based, counted across both legs.
    pub round: u32,
    pub leg: Leg,
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    pub status: FixtureStatus,
}

impl Fixture {
    pub fn involves(&self, team: &str) -> bool {
        let key = name_key(team);
        name_key(&self.home) == key || name_key(&self.away) == key
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixtureValidation {
    pub errors: Vec<String>,
}

impl FixtureValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Builds the season calendar for one frozen league.
#[derive(Debug, Clone)]
pub struct FixtureScheduler {
    league: League,
    options: ScheduleOptions,
    fixtures: Vec<Fixture>,
}

impl FixtureScheduler {
    pub fn new(league: &League) -> Self {
        Self::with_options(league, ScheduleOptions::default())
    }

    pub fn with_options(league: &League, options: ScheduleOptions) -> Self {
        Self {
            league: league.clone(),
            options,
            fixtures: Vec::new(),
        }
    }

    pub fn options(&self) -> ScheduleOptions {
        self.options
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    /// Replaces any previous calendar. On failure the previous calendar is kept.
    pub fn generate_fixtures(&mut self, start_date: &str) -> Result<String> {
        if !self.league.is_validated() {
            return Err(LeagueError::precondition(format!(
                "league '{}' must be validated before scheduling",
                self.league.name()
            )));
        }
        let teams = self.league.teams();
        if teams.len() < 2 {
            return Err(LeagueError::validation(format!(
                "insufficient teams: need at least 2, have {}",
                teams.len()
            )));
        }
        let start = parse_date(start_date)?;
        if self.options.round_interval_days < 1 {
            return Err(LeagueError::validation(
                "round interval must be at least one day",
            ));
        }

        let first_leg = circle_rounds(teams.len());
        let mut pairings: Vec<(Leg, Vec<(usize, usize)>)> =
            first_leg.iter().map(|r| (Leg::First, r.clone())).collect();
        if self.options.mode == RoundRobinMode::Double {
            pairings.extend(first_leg.iter().map(|round| {
                let mirrored = round.iter().map(|&(home, away)| (away, home)).collect();
                (Leg::Second, mirrored)
            }));
        }

        let mut fixtures = Vec::new();
        let mut next_id = 1u32;
        for (idx, (leg, round)) in pairings.into_iter().enumerate() {
            let date = round_date(start, idx, self.options.round_interval_days)?;
            debug!(round = idx + 1, %date, matches = round.len(), "round scheduled");
            for (home, away) in round {
                fixtures.push(Fixture {
                    match_id: next_id,
                    round: idx as u32 + 1,
                    leg,
                    home: teams[home].name.clone(),
                    away: teams[away].name.clone(),
                    date,
                    status: FixtureStatus::Scheduled,
                });
                next_id += 1;
            }
        }

        self.fixtures = fixtures;
        let rounds = self.round_count();
        info!(
            league = %self.league.name(),
            fixtures = self.fixtures.len(),
            rounds,
            "fixtures generated"
        );
        Ok(format!(
            "Generated {} fixtures over {} rounds starting {}",
            self.fixtures.len(),
            rounds,
            start.format(DATE_FORMAT)
        ))
    }

    pub fn get_all_fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn into_fixtures(self) -> Vec<Fixture> {
        self.fixtures
    }

    pub fn round_count(&self) -> usize {
        self.fixtures
            .iter()
            .map(|f| f.round)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn fixtures_for_round(&self, round: u32) -> Vec<&Fixture> {
        self.fixtures.iter().filter(|f| f.round == round).collect()
    }

    pub fn fixtures_for_team(&self, team: &str) -> Vec<&Fixture> {
        self.fixtures.iter().filter(|f| f.involves(team)).collect()
    }

    pub fn validate_fixtures(&self) -> FixtureValidation {
        check_fixtures(self.league.teams(), &self.fixtures, self.options.mode)
    }
}

/// Circle method over `n` teams. Returns one perfect matching per round as
/// `(home, away)` index pairs; pairings against the bye are dropped.
///
/// With an odd `n` the bye holds the fixed seat so every real team rotates;
/// otherwise team 0 is fixed. The fixed seat alternates venue by round parity and
/// the rotating seats alternate by seat parity, which keeps each team's home/away
/// imbalance at most 1 and venue streaks at most 2.
///
/// Round order therefore differs from the textbook layout that pins team 0:
/// for odd `n`, team `r` rests in round `r` (0-based).
pub fn circle_rounds(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }
    let odd = n % 2 == 1;
    let fixed = if odd { None } else { Some(0) };
    let rotating: Vec<usize> = if odd { (0..n).collect() } else { (1..n).collect() };
    let m = rotating.len();
    let seats = (m + 1) / 2;

    let mut rounds = Vec::with_capacity(m);
    for r in 0..m {
        let mut round = Vec::with_capacity(seats);
        if let Some(anchor) = fixed {
            let other = rotating[r];
            if r % 2 == 0 {
                round.push((anchor, other));
            } else {
                round.push((other, anchor));
            }
        }
        for k in 1..seats {
            let up = rotating[(r + k) % m];
            let down = rotating[(r + m - k) % m];
            if k % 2 == 1 {
                round.push((up, down));
            } else {
                round.push((down, up));
            }
        }
        rounds.push(round);
    }
    rounds
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        LeagueError::validation(format!(
            "invalid start date '{}': expected a calendar date as YYYY-MM-DD",
            raw.trim()
        ))
    })
}

fn round_date(start: NaiveDate, round_idx: usize, interval_days: i64) -> Result<NaiveDate> {
    let offset = Duration::try_days(interval_days * round_idx as i64)
        .ok_or_else(|| LeagueError::validation("round offset out of range"))?;
    start
        .checked_add_signed(offset)
        .ok_or_else(|| LeagueError::validation("season runs past the supported calendar"))
}

/// Structural checks over a calendar: round coverage, per-round and per-date
/// double bookings, fixture totals and pair meeting counts.
pub fn check_fixtures(teams: &[Team], fixtures: &[Fixture], mode: RoundRobinMode) -> FixtureValidation {
    let mut errors = Vec::new();
    let n = teams.len();
    let legs = mode.legs();
    let team_keys: Vec<String> = teams.iter().map(|t| name_key(&t.name)).collect();

    let expected = legs * n * n.saturating_sub(1) / 2;
    if fixtures.len() != expected {
        errors.push(format!(
            "expected {expected} fixtures for {n} teams over {legs} leg(s), found {}",
            fixtures.len()
        ));
    }

    let mut by_round: BTreeMap<u32, Vec<&Fixture>> = BTreeMap::new();
    for f in fixtures {
        by_round.entry(f.round).or_default().push(f);
    }
    let expected_rounds = legs * if n % 2 == 0 { n.saturating_sub(1) } else { n };
    if by_round.len() != expected_rounds {
        errors.push(format!(
            "expected {expected_rounds} rounds, found {}",
            by_round.len()
        ));
    }

    for (round, round_fixtures) in &by_round {
        let mut seen: HashSet<String> = HashSet::new();
        for f in round_fixtures {
            if name_key(&f.home) == name_key(&f.away) {
                errors.push(format!("match {}: {} drawn against itself", f.match_id, f.home));
            }
            for side in [&f.home, &f.away] {
                if !seen.insert(name_key(side)) {
                    errors.push(format!("round {round}: {side} appears more than once"));
                }
            }
        }
        let idle: Vec<&str> = teams
            .iter()
            .zip(&team_keys)
            .filter(|(_, key)| !seen.contains(*key))
            .map(|(t, _)| t.name.as_str())
            .collect();
        let allowed_idle = n % 2;
        if idle.len() > allowed_idle {
            errors.push(format!("round {round}: teams without a match: {}", idle.join(", ")));
        }
    }

    let mut by_date: BTreeMap<NaiveDate, HashMap<String, usize>> = BTreeMap::new();
    for f in fixtures {
        let day = by_date.entry(f.date).or_default();
        *day.entry(name_key(&f.home)).or_default() += 1;
        *day.entry(name_key(&f.away)).or_default() += 1;
    }
    for (date, counts) in &by_date {
        let mut doubled: Vec<&String> = counts.iter().filter(|(_, c)| **c > 1).map(|(k, _)| k).collect();
        doubled.sort();
        for key in doubled {
            errors.push(format!("{}: {key} scheduled more than once", date.format(DATE_FORMAT)));
        }
    }

    let mut meetings: HashMap<(String, String), Vec<&Fixture>> = HashMap::new();
    for f in fixtures {
        let (a, b) = (name_key(&f.home), name_key(&f.away));
        let pair = if a <= b { (a, b) } else { (b, a) };
        meetings.entry(pair).or_default().push(f);
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&team_keys[i], &team_keys[j]);
            let pair = if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            let met = meetings.get(&pair).map(Vec::as_slice).unwrap_or(&[]);
            if met.len() != legs {
                errors.push(format!(
                    "{} vs {} meet {} time(s), expected {legs}",
                    teams[i].name,
                    teams[j].name,
                    met.len()
                ));
            } else if legs == 2 && name_key(&met[0].home) == name_key(&met[1].home) {
                errors.push(format!(
                    "{} vs {}: both meetings hosted by {}",
                    teams[i].name, teams[j].name, met[0].home
                ));
            }
        }
    }

    FixtureValidation { errors }
}
