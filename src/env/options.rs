//! Environment options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::EnvError;
use crate::constants::{DEFAULT_MAX_TIME_STEP, MAX_TEAM_SIZE};

/// Options for a soccer environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvOptions {
    /// Map file (None = built-in map)
    pub map_path: Option<PathBuf>,
    /// Agents per team (1 or 2)
    pub team_size: usize,
    /// Episode ends once the time step reaches this value
    pub max_time_step: u32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            map_path: None,
            team_size: 1,
            max_time_step: DEFAULT_MAX_TIME_STEP,
            seed: None,
        }
    }
}

impl EnvOptions {
    /// Options with the given team size, validated
    pub fn new(team_size: usize) -> Result<Self, EnvError> {
        let options = Self {
            team_size,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.map_path = Some(path.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_time_step(mut self, max_time_step: u32) -> Self {
        self.max_time_step = max_time_step;
        self
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if self.team_size < 1 || self.team_size > MAX_TEAM_SIZE {
            return Err(EnvError::InvalidTeamSize {
                found: self.team_size,
                max: MAX_TEAM_SIZE,
            });
        }
        Ok(())
    }

    /// Number of agents on the field (both teams)
    pub fn agent_count(&self) -> usize {
        2 * self.team_size
    }

    /// Load options from a JSON file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        let options: Self =
            serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))?;
        options.validate().map_err(|e| format!("Invalid options in {}: {}", path, e))?;
        Ok(options)
    }
}

impl std::fmt::Display for EnvOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team size: {}", self.team_size)
    }
}
