use serde::Serialize;

use crate::league::name_key;
use crate::results::{Outcome, classify};
use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTrend {
    pub team: String,
    pub played: usize,
    pub points: u32,
    pub points_per_game: f64,
    /// Last results oldest first, e.g. `"WDL"`.
    pub form: String,
    pub recent_points_per_game: f64,
    pub trend: Trend,
    pub remaining: usize,
    pub projected_points: f64,
}

/// Compares recent form against the season rate. Projection blends both rates
/// over the fixtures still to play.
pub fn predict_outcome_trends(snapshot: &AnalysisSnapshot<'_>, form_window: usize, threshold: f64) -> Vec<TeamTrend> {
    let played = snapshot.played();
    let window = form_window.max(1);

    snapshot
        .teams
        .iter()
        .map(|team| {
            let key = name_key(&team.name);
            let outcomes: Vec<Outcome> = played
                .iter()
                .filter_map(|(f, r)| {
                    if name_key(&f.home) == key {
                        Some(classify(r.home_score, r.away_score))
                    } else if name_key(&f.away) == key {
                        Some(classify(r.away_score, r.home_score))
                    } else {
                        None
                    }
                })
                .collect();

            let points: u32 = outcomes.iter().map(|o| o.points()).sum();
            let recent = &outcomes[outcomes.len().saturating_sub(window)..];
            let recent_points: u32 = recent.iter().map(|o| o.points()).sum();
            let ppg = rate(points, outcomes.len());
            let recent_ppg = rate(recent_points, recent.len());

            let trend = if outcomes.len() < 2 {
                Trend::Stable
            } else if recent_ppg - ppg > threshold {
                Trend::Rising
            } else if ppg - recent_ppg > threshold {
                Trend::Falling
            } else {
                Trend::Stable
            };

            let remaining = snapshot.team_fixtures(&team.name).len().saturating_sub(outcomes.len());
            TeamTrend {
                team: team.name.clone(),
                played: outcomes.len(),
                points,
                points_per_game: ppg,
                form: recent.iter().map(|o| o.letter()).collect(),
                recent_points_per_game: recent_ppg,
                trend,
                remaining,
                projected_points: points as f64 + 0.5 * (ppg + recent_ppg) * remaining as f64,
            }
        })
        .collect()
}

fn rate(points: u32, games: usize) -> f64 {
    if games == 0 { 0.0 } else { points as f64 / games as f64 }
}
