//! Teams, actions and computer modes

use serde::{Deserialize, Serialize};

use super::error::EnvError;
use crate::map::TilePos;

/// Team an agent plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    /// Controlled by the caller of `take_action`
    Player,
    /// Controlled by the scripted opponent
    Computer,
}

impl Team {
    /// Teams in agent index order
    pub const ALL: [Team; 2] = [Team::Player, Team::Computer];

    pub fn index(&self) -> usize {
        match self {
            Team::Player => 0,
            Team::Computer => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Player => "PLAYER",
            Team::Computer => "COMPUTER",
        }
    }

    /// Parse team from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "player" | "p" => Some(Team::Player),
            "computer" | "c" | "ai" => Some(Team::Computer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-tile move on the 4-direction grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    MoveRight,
    MoveUp,
    MoveLeft,
    MoveDown,
    #[default]
    Stand,
}

impl Action {
    /// Every action, in the order the opponent considers them before shuffling
    pub const ALL: [Action; 5] = [
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveLeft,
        Action::MoveDown,
        Action::Stand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveRight => "MOVE_RIGHT",
            Action::MoveUp => "MOVE_UP",
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveDown => "MOVE_DOWN",
            Action::Stand => "STAND",
        }
    }

    /// Parse action from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "move_right" | "right" | "r" => Some(Action::MoveRight),
            "move_up" | "up" | "u" => Some(Action::MoveUp),
            "move_left" | "left" | "l" => Some(Action::MoveLeft),
            "move_down" | "down" | "d" => Some(Action::MoveDown),
            "stand" | "stay" | "s" => Some(Action::Stand),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnvError> {
        Self::from_str(s).ok_or_else(|| EnvError::UnknownAction(s.to_string()))
    }

    /// Grid offset applied by this action
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::MoveRight => (1, 0),
            Action::MoveUp => (0, -1),
            Action::MoveLeft => (-1, 0),
            Action::MoveDown => (0, 1),
            Action::Stand => (0, 0),
        }
    }

    /// Position after taking this action from `pos` (walkability not checked)
    pub fn apply(&self, pos: TilePos) -> TilePos {
        let (dx, dy) = self.delta();
        TilePos::new(pos.x + dx, pos.y + dy)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Behaviour of a computer agent, fixed for an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputerMode {
    Defensive,
    Offensive,
}

impl ComputerMode {
    pub const ALL: [ComputerMode; 2] = [ComputerMode::Defensive, ComputerMode::Offensive];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputerMode::Defensive => "DEFENSIVE",
            ComputerMode::Offensive => "OFFENSIVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "defensive" | "defense" => Some(ComputerMode::Defensive),
            "offensive" | "offense" => Some(ComputerMode::Offensive),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComputerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a computer agent scores candidate moves against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategicMode {
    /// Get closer to the target
    Approach,
    /// Get farther from the target
    Avoid,
    /// Get closer, but never onto the target tile
    Intercept,
}
