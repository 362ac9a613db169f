//! Headless sessions: random-agent episodes, summaries and result storage

pub mod agent;
pub mod config;
pub mod db;
pub mod parallel;
pub mod runner;
pub mod summary;

pub use agent::RandomAgent;
pub use config::{RUN_SETTINGS_FILE, RUN_SETTINGS_TEMPLATE, RunConfig};
pub use db::{SessionDatabase, WinCounts};
pub use parallel::{init_parallel, run_episodes_parallel};
pub use runner::{EpisodeResult, load_map, run_episode, run_episodes, run_session};
pub use summary::{SessionSummary, print_session_summary, write_session_summary};
