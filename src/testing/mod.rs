//! Scenario testing system for deterministic environment testing
//!
//! Scenarios are TOML files that place agents on the map, script a few
//! steps and check the resulting state. Files are grouped into categories
//! by directory, e.g. `tests/scenarios/collision/head_on_switches_ball.toml`.

pub mod assertions;
pub mod parser;
pub mod runner;
pub mod summary;

pub use assertions::{AssertionError, check_state};
pub use parser::{AgentDef, ScenarioDefinition, ScenarioSetup, ScenarioStep, StateExpectation};
pub use runner::{TestResult, run_scenario};
pub use summary::{ScenarioCounts, ScenarioOutcome, ScenarioSummary, discover_scenarios};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
