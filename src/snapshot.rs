use std::collections::HashMap;

use crate::league::{Team, name_key};
use crate::results::MatchResult;
use crate::scheduler::Fixture;

/// Read-only view handed to every analyzer. Analyzers only ever borrow it.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisSnapshot<'a> {
    pub teams: &'a [Team],
    pub fixtures: &'a [Fixture],
    pub results: &'a [MatchResult],
}

impl<'a> AnalysisSnapshot<'a> {
    pub fn new(teams: &'a [Team], fixtures: &'a [Fixture], results: &'a [MatchResult]) -> Self {
        Self {
            teams,
            fixtures,
            results,
        }
    }

    pub fn empty() -> Self {
        Self::new(&[], &[], &[])
    }

    pub fn results_by_match(&self) -> HashMap<u32, &'a MatchResult> {
        self.results.iter().map(|r| (r.match_id, r)).collect()
    }

    /// A team's fixtures ordered by date, then match id.
    pub fn team_fixtures(&self, team: &str) -> Vec<&'a Fixture> {
        let key = name_key(team);
        let mut out: Vec<&'a Fixture> = self
            .fixtures
            .iter()
            .filter(|f| name_key(&f.home) == key || name_key(&f.away) == key)
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date).then(a.match_id.cmp(&b.match_id)));
        out
    }

    /// Fixtures paired with their recorded result, in date order.
    pub fn played(&self) -> Vec<(&'a Fixture, &'a MatchResult)> {
        let by_match = self.results_by_match();
        let mut out: Vec<(&'a Fixture, &'a MatchResult)> = self
            .fixtures
            .iter()
            .filter_map(|f| by_match.get(&f.match_id).map(|r| (f, *r)))
            .collect();
        out.sort_by(|a, b| a.0.date.cmp(&b.0.date).then(a.0.match_id.cmp(&b.0.match_id)));
        out
    }
}
