//! Persisted categorical encoding for team identifiers
//!
//! The table is produced once when the model is trained and shipped inside the
//! model bundle. Codes are never recomputed from request input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{HoopsError, Result, TeamCode};

/// Team identifier to integer code mapping fixed at training time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamEncoding {
    /// Version tag written by the training job
    #[serde(default)]
    pub version: Option<String>,
    pub teams: BTreeMap<String, i64>,
}

impl TeamEncoding {
    pub fn new(teams: BTreeMap<String, i64>) -> Self {
        TeamEncoding {
            version: None,
            teams,
        }
    }

    /// Codes must be unique, otherwise two teams would be indistinguishable
    pub fn validate(&self) -> Result<()> {
        if self.teams.is_empty() {
            return Err(HoopsError::ModelUnavailable(
                "encoding table has no teams".to_string(),
            ));
        }
        let mut seen: BTreeMap<i64, &str> = BTreeMap::new();
        for (team, &code) in &self.teams {
            if let Some(other) = seen.insert(code, team) {
                return Err(HoopsError::ModelUnavailable(format!(
                    "encoding table maps both {} and {} to code {}",
                    other, team, code
                )));
            }
        }
        Ok(())
    }

    /// Look up a team code (exact match first, then case-insensitive)
    pub fn code_of(&self, team: &str) -> Result<TeamCode> {
        let team = team.trim();
        if let Some(&code) = self.teams.get(team) {
            return Ok(TeamCode(code));
        }
        let lower = team.to_lowercase();
        self.teams
            .iter()
            .find(|(name, _)| name.to_lowercase() == lower)
            .map(|(_, &code)| TeamCode(code))
            .ok_or_else(|| HoopsError::UnknownTeam(team.to_string()))
    }

    /// Reverse lookup
    pub fn team_of(&self, code: TeamCode) -> Option<&str> {
        self.teams
            .iter()
            .find(|(_, &c)| c == code.0)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
