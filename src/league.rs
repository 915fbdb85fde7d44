use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LeagueError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub stadium: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueState {
    Draft,
    Validated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    name: String,
    season: String,
    teams: Vec<Team>,
    state: LeagueState,
}

impl League {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    /// Teams in registration order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn state(&self) -> LeagueState {
        self.state
    }

    pub fn is_validated(&self) -> bool {
        self.state == LeagueState::Validated
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        let key = name_key(name);
        self.teams.iter().find(|t| name_key(&t.name) == key)
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }

    fn add_team(&mut self, name: &str, stadium: &str) -> Result<Team> {
        if self.is_validated() {
            return Err(LeagueError::precondition(format!(
                "league '{}' already validated; no further teams can be added",
                self.name
            )));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::validation("team name cannot be empty"));
        }
        if self.team(name).is_some() {
            return Err(LeagueError::validation(format!("duplicate team '{name}'")));
        }
        let team = Team {
            name: name.to_string(),
            stadium: stadium.trim().to_string(),
        };
        self.teams.push(team.clone());
        Ok(team)
    }

    fn remove_team(&mut self, name: &str) -> Result<Team> {
        if self.is_validated() {
            return Err(LeagueError::precondition(format!(
                "league '{}' already validated; team list is frozen",
                self.name
            )));
        }
        let key = name_key(name);
        let Some(idx) = self.teams.iter().position(|t| name_key(&t.name) == key) else {
            return Err(LeagueError::not_found(format!("team '{}' not found", name.trim())));
        };
        Ok(self.teams.remove(idx))
    }

    fn validate(&mut self) -> Result<()> {
        if self.teams.len() < 2 {
            return Err(LeagueError::validation(format!(
                "insufficient teams: need at least 2, have {}",
                self.teams.len()
            )));
        }
        let mut seen = HashSet::new();
        for team in &self.teams {
            if !seen.insert(name_key(&team.name)) {
                return Err(LeagueError::validation(format!("duplicate team '{}'", team.name)));
            }
        }
        self.state = LeagueState::Validated;
        Ok(())
    }
}

/// Owns the league being assembled. One workflow drives it at a time.
#[derive(Debug, Default)]
pub struct LeagueManager {
    league: Option<League>,
}

impl LeagueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn league(&self) -> Option<&League> {
        self.league.as_ref()
    }

    pub fn into_league(self) -> Option<League> {
        self.league
    }

    /// Starts a fresh draft league, replacing any previous one.
    pub fn create_league(&mut self, name: &str, season: &str) -> Result<&League> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::validation("league name cannot be empty"));
        }
        info!(league = name, season, "league created");
        let league = self.league.insert(League {
            name: name.to_string(),
            season: season.trim().to_string(),
            teams: Vec::new(),
            state: LeagueState::Draft,
        });
        Ok(&*league)
    }

    pub fn add_team(&mut self, name: &str, stadium: &str) -> Result<String> {
        let league = self.current_mut()?;
        let team = league.add_team(name, stadium)?;
        debug!(team = %team.name, stadium = %team.stadium, "team registered");
        Ok(format!("Team '{}' added to {}", team.name, league_label(&league.name)))
    }

    pub fn remove_team(&mut self, name: &str) -> Result<Team> {
        let team = self.current_mut()?.remove_team(name)?;
        debug!(team = %team.name, "team removed");
        Ok(team)
    }

    /// Freezes the team list once it is schedulable.
    pub fn validate_for_scheduling(&mut self) -> Result<String> {
        let league = self.current_mut()?;
        if league.is_validated() {
            return Ok(format!("{} already validated", league_label(&league.name)));
        }
        league.validate()?;
        info!(
            league = %league.name,
            teams = league.teams.len(),
            "league validated for scheduling"
        );
        Ok(format!(
            "{} validated with {} teams",
            league_label(&league.name),
            league.teams.len()
        ))
    }

    fn current_mut(&mut self) -> Result<&mut League> {
        self.league
            .as_mut()
            .ok_or_else(|| LeagueError::not_found("no league defined; create a league first"))
    }
}

fn league_label(name: &str) -> String {
    format!("league '{name}'")
}

pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
