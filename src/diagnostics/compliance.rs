use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::DiagnosticsConfig;
use crate::league::name_key;
use crate::scheduler::{DATE_FORMAT, Leg};
use crate::snapshot::AnalysisSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    MinimumRest,
    VenueStreak,
    HomeAwayImbalance,
    UnevenMeetings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub rule: RuleKind,
    pub team: String,
    pub match_id: Option<u32>,
    pub detail: String,
}

pub fn check_rule_compliance(snapshot: &AnalysisSnapshot<'_>, config: &DiagnosticsConfig) -> Vec<RuleViolation> {
    let mut out = Vec::new();

    for team in snapshot.teams {
        let key = name_key(&team.name);
        let fixtures = snapshot.team_fixtures(&team.name);

        for w in fixtures.windows(2) {
            let rest = (w[1].date - w[0].date).num_days();
            if rest < config.min_rest_days {
                out.push(RuleViolation {
                    rule: RuleKind::MinimumRest,
                    team: team.name.clone(),
                    match_id: Some(w[1].match_id),
                    detail: format!(
                        "{rest} day(s) between {} and {}, minimum is {}",
                        w[0].date.format(DATE_FORMAT),
                        w[1].date.format(DATE_FORMAT),
                        config.min_rest_days
                    ),
                });
            }
        }

        let mut streak = 0usize;
        let mut last_home: Option<bool> = None;
        for f in &fixtures {
            let home = name_key(&f.home) == key;
            streak = if last_home == Some(home) { streak + 1 } else { 1 };
            last_home = Some(home);
            // Reported once, when the run first goes over the limit.
            if streak == config.max_venue_streak + 1 {
                out.push(RuleViolation {
                    rule: RuleKind::VenueStreak,
                    team: team.name.clone(),
                    match_id: Some(f.match_id),
                    detail: format!(
                        "{} consecutive {} matches, maximum is {}",
                        streak,
                        if home { "home" } else { "away" },
                        config.max_venue_streak
                    ),
                });
            }
        }

        for leg in [Leg::First, Leg::Second] {
            let in_leg: Vec<_> = fixtures.iter().filter(|f| f.leg == leg).collect();
            if in_leg.is_empty() {
                continue;
            }
            let home = in_leg.iter().filter(|f| name_key(&f.home) == key).count();
            let away = in_leg.len() - home;
            if home.abs_diff(away) > config.max_home_away_imbalance {
                out.push(RuleViolation {
                    rule: RuleKind::HomeAwayImbalance,
                    team: team.name.clone(),
                    match_id: None,
                    detail: format!(
                        "{leg:?} leg: {home} home vs {away} away, allowed difference is {}",
                        config.max_home_away_imbalance
                    ),
                });
            }
        }
    }

    check_meetings(snapshot, &mut out);
    out
}

/// Every pair should meet once per leg present in the calendar.
fn check_meetings(snapshot: &AnalysisSnapshot<'_>, out: &mut Vec<RuleViolation>) {
    let legs: BTreeSet<Leg> = snapshot.fixtures.iter().map(|f| f.leg).collect();
    if legs.is_empty() {
        return;
    }
    let mut meetings: HashMap<(String, String), usize> = HashMap::new();
    for f in snapshot.fixtures {
        let (a, b) = (name_key(&f.home), name_key(&f.away));
        let pair = if a <= b { (a, b) } else { (b, a) };
        *meetings.entry(pair).or_default() += 1;
    }

    let teams = snapshot.teams;
    for (i, first) in teams.iter().enumerate() {
        for second in &teams[i + 1..] {
            let (a, b) = (name_key(&first.name), name_key(&second.name));
            let pair = if a <= b { (a, b) } else { (b, a) };
            let met = meetings.get(&pair).copied().unwrap_or(0);
            if met != legs.len() {
                out.push(RuleViolation {
                    rule: RuleKind::UnevenMeetings,
                    team: first.name.clone(),
                    match_id: None,
                    detail: format!(
                        "{} and {} meet {met} time(s), expected {}",
                        first.name,
                        second.name,
                        legs.len()
                    ),
                });
            }
        }
    }
}
