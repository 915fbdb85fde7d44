use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LeagueError, Result};
use crate::league::{Team, name_key};
use crate::scheduler::{Fixture, FixtureStatus};
use crate::snapshot::AnalysisSnapshot;

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: u32,
    pub home_score: u32,
    pub away_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn points(self) -> u32 {
        match self {
            Outcome::Win => POINTS_WIN,
            Outcome::Draw => POINTS_DRAW,
            Outcome::Loss => 0,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }
}

pub fn classify(goals_for: u32, goals_against: u32) -> Outcome {
    if goals_for > goals_against {
        Outcome::Win
    } else if goals_for < goals_against {
        Outcome::Loss
    } else {
        Outcome::Draw
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl TableRow {
    fn apply(&mut self, goals_for: u32, goals_against: u32) {
        self.played += 1;
        self.goals_for += goals_for;
        self.goals_against += goals_against;
        self.goal_difference = self.goals_for as i64 - self.goals_against as i64;
        let outcome = classify(goals_for, goals_against);
        match outcome {
            Outcome::Win => self.won += 1,
            Outcome::Draw => self.drawn += 1,
            Outcome::Loss => self.lost += 1,
        }
        self.points += outcome.points();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub team_a: String,
    pub team_b: String,
    pub played: u32,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub draws: u32,
    pub team_a_goals: u32,
    pub team_b_goals: u32,
}

/// Holds the season's fixtures and the scores written against them.
#[derive(Debug, Clone)]
pub struct ResultsLedger {
    fixtures: Vec<Fixture>,
    index: HashMap<u32, usize>,
    results: Vec<MatchResult>,
    result_index: HashMap<u32, usize>,
}

impl ResultsLedger {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        let index = fixtures
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.match_id, idx))
            .collect();
        Self {
            fixtures,
            index,
            results: Vec::new(),
            result_index: HashMap::new(),
        }
    }

    /// Writes a score once. A second write for the same match is rejected and the
    /// stored result is left untouched.
    pub fn record_result(&mut self, match_id: u32, home_score: u32, away_score: u32) -> Result<String> {
        let Some(&idx) = self.index.get(&match_id) else {
            return Err(LeagueError::not_found(format!("match {match_id} not found")));
        };
        let fixture = &mut self.fixtures[idx];
        if fixture.status == FixtureStatus::Played || self.result_index.contains_key(&match_id) {
            return Err(LeagueError::precondition(format!(
                "result already recorded for match {match_id}"
            )));
        }
        fixture.status = FixtureStatus::Played;
        self.result_index.insert(match_id, self.results.len());
        self.results.push(MatchResult {
            match_id,
            home_score,
            away_score,
        });
        info!(match_id, home_score, away_score, "result recorded");
        Ok(format!(
            "Result recorded: {} {home_score} - {away_score} {}",
            fixture.home, fixture.away
        ))
    }

    pub fn result(&self, match_id: u32) -> Option<&MatchResult> {
        self.result_index.get(&match_id).map(|&idx| &self.results[idx])
    }

    /// Results in the order they were recorded.
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixture(&self, match_id: u32) -> Option<&Fixture> {
        self.index.get(&match_id).map(|&idx| &self.fixtures[idx])
    }

    /// One row per registered team, best first: points, goal difference, goals
    /// scored, then name.
    pub fn get_league_table(&self, teams: &[Team]) -> Vec<TableRow> {
        build_table(teams, self.played())
    }

    pub fn get_head_to_head(&self, team_a: &str, team_b: &str) -> Option<HeadToHead> {
        let (ka, kb) = (name_key(team_a), name_key(team_b));
        let mut h2h = HeadToHead {
            team_a: team_a.trim().to_string(),
            team_b: team_b.trim().to_string(),
            played: 0,
            team_a_wins: 0,
            team_b_wins: 0,
            draws: 0,
            team_a_goals: 0,
            team_b_goals: 0,
        };
        for (fixture, result) in self.played() {
            let (home, away) = (name_key(&fixture.home), name_key(&fixture.away));
            let (a_goals, b_goals) = if home == ka && away == kb {
                (result.home_score, result.away_score)
            } else if home == kb && away == ka {
                (result.away_score, result.home_score)
            } else {
                continue;
            };
            h2h.played += 1;
            h2h.team_a_goals += a_goals;
            h2h.team_b_goals += b_goals;
            match classify(a_goals, b_goals) {
                Outcome::Win => h2h.team_a_wins += 1,
                Outcome::Loss => h2h.team_b_wins += 1,
                Outcome::Draw => h2h.draws += 1,
            }
        }
        (h2h.played > 0).then_some(h2h)
    }

    pub fn snapshot<'a>(&'a self, teams: &'a [Team]) -> AnalysisSnapshot<'a> {
        AnalysisSnapshot::new(teams, &self.fixtures, &self.results)
    }

    fn played(&self) -> impl Iterator<Item = (&Fixture, &MatchResult)> {
        self.results
            .iter()
            .filter_map(|r| self.fixture(r.match_id).map(|f| (f, r)))
    }
}

/// Standings for `teams` from played fixtures. Fixtures naming unregistered
/// teams are ignored.
pub fn build_table<'a>(
    teams: &[Team],
    played: impl IntoIterator<Item = (&'a Fixture, &'a MatchResult)>,
) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = teams
        .iter()
        .map(|t| TableRow {
            team: t.name.clone(),
            ..TableRow::default()
        })
        .collect();
    let slots: HashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (name_key(&row.team), idx))
        .collect();

    for (fixture, result) in played {
        if let Some(&h) = slots.get(&name_key(&fixture.home)) {
            rows[h].apply(result.home_score, result.away_score);
        }
        if let Some(&a) = slots.get(&name_key(&fixture.away)) {
            rows[a].apply(result.away_score, result.home_score);
        }
    }

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team.cmp(&b.team))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Leg;
    use chrono::NaiveDate;

    fn fixture(id: u32, home: &str, away: &str) -> Fixture {
        Fixture {
            match_id: id,
            round: id,
            leg: Leg::First,
            home: home.to_string(),
            away: away.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            status: FixtureStatus::Scheduled,
        }
    }

    fn teams(names: &[&str]) -> Vec<Team> {
        names
            .iter()
            .map(|n| Team {
                name: n.to_string(),
                stadium: format!("{n} Park"),
            })
            .collect()
    }

    #[test]
    fn second_write_is_rejected_and_first_kept() {
        let mut ledger = ResultsLedger::new(vec![fixture(1, "A", "B")]);
        ledger.record_result(1, 2, 1).unwrap();
        let err = ledger.record_result(1, 0, 5).unwrap_err();
        assert!(matches!(err, LeagueError::Precondition(_)));
        assert_eq!(
            ledger.result(1),
            Some(&MatchResult {
                match_id: 1,
                home_score: 2,
                away_score: 1
            })
        );
        assert_eq!(ledger.fixture(1).unwrap().status, FixtureStatus::Played);
    }

    #[test]
    fn unknown_match_is_not_found() {
        let mut ledger = ResultsLedger::new(vec![fixture(1, "A", "B")]);
        assert!(matches!(ledger.record_result(9, 1, 0), Err(LeagueError::NotFound(_))));
        assert!(ledger.results().is_empty());
    }

    #[test]
    fn table_orders_by_points_then_goal_difference() {
        let mut ledger = ResultsLedger::new(vec![
            fixture(1, "A", "B"),
            fixture(2, "C", "D"),
            fixture(3, "A", "C"),
        ]);
        ledger.record_result(1, 3, 0).unwrap();
        ledger.record_result(2, 1, 0).unwrap();
        ledger.record_result(3, 1, 1).unwrap();

        let table = ledger.get_league_table(&teams(&["A", "B", "C", "D"]));
        let order: Vec<&str> = table.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "D", "B"]);
        assert_eq!(table[0].points, 4);
        assert_eq!(table[0].goal_difference, 3);
        assert_eq!(table[3].lost, 1);
    }

    #[test]
    fn head_to_head_is_from_first_team_view() {
        let mut ledger = ResultsLedger::new(vec![fixture(1, "A", "B"), fixture(2, "B", "A")]);
        ledger.record_result(1, 2, 1).unwrap();
        ledger.record_result(2, 3, 0).unwrap();
        let h2h = ledger.get_head_to_head("B", "A").unwrap();
        assert_eq!(h2h.played, 2);
        assert_eq!(h2h.team_a_wins, 1);
        assert_eq!(h2h.team_b_wins, 1);
        assert_eq!(h2h.team_a_goals, 4);
        assert_eq!(h2h.team_b_goals, 2);
        assert!(ledger.get_head_to_head("A", "Z").is_none());
    }
}
