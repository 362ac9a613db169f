//! Environment errors

use thiserror::Error;

use super::types::Team;
use crate::map::MapError;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("team size must be between 1 and {max}, got {found}")]
    InvalidTeamSize { found: usize, max: usize },
    #[error("expected {expected} actions (one per player agent), got {found}")]
    ActionCount { expected: usize, found: usize },
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("agent index {index} out of range ({count} agents)")]
    AgentIndex { index: usize, count: usize },
    #[error("spawn area of team {team} has {available} tiles, {needed} agents need one each")]
    SpawnTooSmall {
        team: Team,
        needed: usize,
        available: usize,
    },
    #[error("state {field} is {found}, the environment expects {expected}")]
    StateMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Map(#[from] MapError),
}
