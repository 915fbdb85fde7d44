use chrono::NaiveDate;
use serde::Serialize;

use crate::results::{MatchResult, build_table};
use crate::scheduler::Fixture;
use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLine {
    pub match_id: u32,
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl MatchLine {
    fn new(fixture: &Fixture, result: &MatchResult) -> Self {
        Self {
            match_id: fixture.match_id,
            date: fixture.date,
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            home_score: result.home_score,
            away_score: result.away_score,
        }
    }

    fn margin(&self) -> u32 {
        self.home_score.abs_diff(self.away_score)
    }

    fn goals(&self) -> u32 {
        self.home_score + self.away_score
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonStatistics {
    pub total_goals: u32,
    pub avg_goals_per_match: f64,
    pub home_wins: usize,
    pub away_wins: usize,
    pub draws: usize,
    pub home_win_pct: f64,
    pub clean_sheets: usize,
    pub biggest_win: Option<MatchLine>,
    pub highest_scoring: Option<MatchLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub teams: usize,
    pub total_fixtures: usize,
    pub matches_played: usize,
    pub matches_remaining: usize,
    pub completion_pct: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Top of the table; `None` until a match has been played.
    pub leader: Option<String>,
    pub statistics: SeasonStatistics,
}

pub fn generate_season_summary(snapshot: &AnalysisSnapshot<'_>) -> SeasonSummary {
    let played = snapshot.played();
    let total = snapshot.fixtures.len();

    let mut stats = SeasonStatistics::default();
    for (fixture, result) in &played {
        let line = MatchLine::new(fixture, result);
        stats.total_goals += line.goals();
        match result.home_score.cmp(&result.away_score) {
            std::cmp::Ordering::Greater => stats.home_wins += 1,
            std::cmp::Ordering::Less => stats.away_wins += 1,
            std::cmp::Ordering::Equal => stats.draws += 1,
        }
        stats.clean_sheets += usize::from(result.home_score == 0) + usize::from(result.away_score == 0);

        // Ties keep the earlier match.
        if line.margin() > 0 && stats.biggest_win.as_ref().is_none_or(|b| line.margin() > b.margin()) {
            stats.biggest_win = Some(line.clone());
        }
        if stats.highest_scoring.as_ref().is_none_or(|h| line.goals() > h.goals()) {
            stats.highest_scoring = Some(line);
        }
    }
    if !played.is_empty() {
        stats.avg_goals_per_match = stats.total_goals as f64 / played.len() as f64;
        stats.home_win_pct = 100.0 * stats.home_wins as f64 / played.len() as f64;
    }

    let leader = if played.is_empty() {
        None
    } else {
        build_table(snapshot.teams, played.iter().copied())
            .into_iter()
            .next()
            .map(|row| row.team)
    };

    SeasonSummary {
        teams: snapshot.teams.len(),
        total_fixtures: total,
        matches_played: played.len(),
        matches_remaining: total.saturating_sub(played.len()),
        completion_pct: if total == 0 {
            0.0
        } else {
            100.0 * played.len() as f64 / total as f64
        },
        first_date: snapshot.fixtures.iter().map(|f| f.date).min(),
        last_date: snapshot.fixtures.iter().map(|f| f.date).max(),
        leader,
        statistics: stats,
    }
}
