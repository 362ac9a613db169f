//! TOML scenario file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete scenario definition from a TOML file
#[derive(Debug, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub setup: ScenarioSetup,
    #[serde(default)]
    pub step: Vec<ScenarioStep>,
    #[serde(default)]
    pub expect: Vec<StateExpectation>,
}

/// Environment setup
///
/// Without `agents` the environment is reset with `seed`; otherwise every
/// agent must be listed.
#[derive(Debug, Deserialize)]
pub struct ScenarioSetup {
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    pub seed: Option<u64>,
    /// Map file (None = built-in map)
    pub map: Option<String>,
    pub max_time_step: Option<u32>,
    #[serde(default)]
    pub agents: Vec<AgentDef>,
}

impl Default for ScenarioSetup {
    fn default() -> Self {
        Self {
            team_size: default_team_size(),
            seed: None,
            map: None,
            max_time_step: None,
            agents: Vec::new(),
        }
    }
}

fn default_team_size() -> usize {
    1
}

/// Agent placement
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDef {
    pub team: String,
    #[serde(default)]
    pub index: usize,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub ball: bool,
    /// Computer strategy ("defensive" or "offensive")
    pub mode: Option<String>,
}

/// One time step
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    /// One action per player agent
    pub actions: Vec<String>,
    /// Forced computer actions (None = computer strategy decides)
    pub computer: Option<Vec<String>>,
}

/// Checks to run after a step (0 = before the first step)
#[derive(Debug, Clone, Deserialize)]
pub struct StateExpectation {
    pub after_step: u32,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a scenario file from path
pub fn parse_scenario_file(path: &Path) -> Result<ScenarioDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
