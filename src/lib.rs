//! Soccer - a grid soccer environment for reinforcement learning
//!
//! The caller controls the PLAYER team one step at a time while a scripted
//! COMPUTER team plays against it. Includes a software frame renderer, a
//! Bevy viewer, a headless random-agent runner and scenario tests.

pub mod constants;
pub mod env;
pub mod logging;
pub mod map;
pub mod render;
pub mod session;
pub mod testing;
pub mod viewer;

// Re-export commonly used types for convenience
pub use env::{
    Action, ComputerMode, EnvError, EnvOptions, Observation, SoccerEnvironment, SoccerState, Team,
};
pub use map::{MapError, SoccerMap, Tile, TilePos};
pub use render::{FrameRenderer, RendererOptions};
pub use session::{RandomAgent, RunConfig, SessionSummary, run_session};
