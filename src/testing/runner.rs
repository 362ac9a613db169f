//! Scenario execution engine

use std::sync::Arc;

use crate::constants::REWARD_NONE;
use crate::env::{Action, ComputerMode, EnvOptions, SoccerEnvironment, SoccerState, Team};
use crate::map::{SoccerMap, TilePos};

use super::assertions::{AssertionError, check_state};
use super::parser::{ScenarioDefinition, ScenarioSetup};

/// Result of running a scenario
#[derive(Debug)]
pub enum TestResult {
    Pass { steps: u32 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Run a scenario to completion
pub fn run_scenario(def: &ScenarioDefinition) -> TestResult {
    let mut env = match build_environment(&def.setup) {
        Ok(env) => env,
        Err(message) => return TestResult::Error { message },
    };

    let mut steps = 0;
    let mut reward = REWARD_NONE;
    if let Err(error) = check_step(def, &env, steps, reward) {
        return TestResult::Fail { error };
    }

    for step in &def.step {
        let players = match parse_actions(&step.actions) {
            Ok(actions) => actions,
            Err(message) => return TestResult::Error { message },
        };
        let result = match &step.computer {
            Some(computer) => match parse_actions(computer) {
                Ok(computer) => env.take_joint_action(&players, &computer),
                Err(message) => return TestResult::Error { message },
            },
            None => env.take_action(&players),
        };
        let observation = match result {
            Ok(observation) => observation,
            Err(e) => {
                return TestResult::Error {
                    message: format!("Step {}: {}", steps + 1, e),
                };
            }
        };

        steps += 1;
        reward = observation.reward;
        if let Err(error) = check_step(def, &env, steps, reward) {
            return TestResult::Fail { error };
        }
    }

    if let Some(unreached) = def.expect.iter().find(|e| e.after_step > steps) {
        return TestResult::Error {
            message: format!(
                "Expectation after step {} is never reached ({} steps scripted)",
                unreached.after_step, steps
            ),
        };
    }

    TestResult::Pass { steps }
}

fn check_step(
    def: &ScenarioDefinition,
    env: &SoccerEnvironment,
    step: u32,
    reward: f32,
) -> Result<(), AssertionError> {
    for expectation in def.expect.iter().filter(|e| e.after_step == step) {
        check_state(expectation, env, reward).map_err(|mut error| {
            error.message = format!("After step {}: {}", step, error.message);
            error
        })?;
    }
    Ok(())
}

fn parse_actions(names: &[String]) -> Result<Vec<Action>, String> {
    names
        .iter()
        .map(|name| Action::parse(name).map_err(|e| e.to_string()))
        .collect()
}

/// Environment for a scenario: seeded reset, or the listed agents
fn build_environment(setup: &ScenarioSetup) -> Result<SoccerEnvironment, String> {
    let map = match &setup.map {
        Some(path) => SoccerMap::load(path).map_err(|e| e.to_string())?,
        None => SoccerMap::builtin(),
    };

    let mut options = EnvOptions::new(setup.team_size)
        .map_err(|e| e.to_string())?
        .with_seed(setup.seed.unwrap_or(0));
    if let Some(max) = setup.max_time_step {
        options = options.with_max_time_step(max);
    }

    if setup.agents.is_empty() {
        return SoccerEnvironment::with_map(options, Arc::new(map)).map_err(|e| e.to_string());
    }

    let state = build_state(setup, &map)?;
    SoccerEnvironment::from_state(options, Arc::new(map), state).map_err(|e| e.to_string())
}

fn build_state(setup: &ScenarioSetup, map: &SoccerMap) -> Result<SoccerState, String> {
    let team_size = setup.team_size;
    let mut slots: Vec<Option<TilePos>> = vec![None; 2 * team_size];
    let mut state = SoccerState::new(team_size, &vec![TilePos::default(); 2 * team_size]);

    for def in &setup.agents {
        let team = Team::from_str(&def.team).ok_or_else(|| format!("Unknown team '{}'", def.team))?;
        if def.index >= team_size {
            return Err(format!(
                "Agent index {} out of range for team size {}",
                def.index, team_size
            ));
        }
        let agent_index = state.agent_index(team, def.index);
        if slots[agent_index].is_some() {
            return Err(format!("{} agent {} defined twice", team, def.index));
        }

        let pos = TilePos::new(def.x, def.y);
        if !map.is_walkable(pos) {
            return Err(format!("{} agent {} placed on unwalkable tile {}", team, def.index, pos));
        }
        if slots.contains(&Some(pos)) {
            return Err(format!("Two agents placed on {}", pos));
        }
        slots[agent_index] = Some(pos);

        let agent = state.agent_mut(agent_index);
        agent.pos = pos;
        agent.has_ball = def.ball;
        agent.mode = match (&def.mode, team) {
            (Some(mode), _) => {
                Some(ComputerMode::from_str(mode).ok_or_else(|| format!("Unknown mode '{}'", mode))?)
            }
            (None, Team::Computer) => Some(ComputerMode::Defensive),
            (None, Team::Player) => None,
        };
    }

    if let Some(missing) = slots.iter().position(|s| s.is_none()) {
        return Err(format!(
            "{} agent {} is not placed",
            state.team_of(missing),
            missing % team_size
        ));
    }
    let holders = state.agents.iter().filter(|a| a.has_ball).count();
    if holders != 1 {
        return Err(format!("Exactly one agent must hold the ball, found {}", holders));
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> ScenarioDefinition {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_walk_right_passes() {
        let def = parse(
            r#"
name = "walk"
[[setup.agents]]
team = "player"
x = 3
y = 4
ball = true
[[setup.agents]]
team = "computer"
x = 10
y = 4

[[step]]
actions = ["MOVE_RIGHT"]
computer = ["STAND"]

[[expect]]
after_step = 0
checks = ["agent 0 pos 3 4"]
[[expect]]
after_step = 1
checks = ["agent 0 pos 4 4", "agent 0 action MOVE_RIGHT", "time 1", "reward 0"]
"#,
        );
        assert!(matches!(run_scenario(&def), TestResult::Pass { steps: 1 }));
    }

    #[test]
    fn test_failed_check() {
        let def = parse(
            r#"
name = "wrong"
[[setup.agents]]
team = "player"
x = 3
y = 4
ball = true
[[setup.agents]]
team = "computer"
x = 10
y = 4

[[step]]
actions = ["STAND"]
computer = ["STAND"]

[[expect]]
after_step = 1
checks = ["agent 0 pos 9 9"]
"#,
        );
        match run_scenario(&def) {
            TestResult::Fail { error } => assert!(error.message.starts_with("After step 1")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_setup_errors() {
        let missing_agent = parse(
            r#"
name = "missing"
[[setup.agents]]
team = "player"
x = 3
y = 4
ball = true
"#,
        );
        assert!(matches!(run_scenario(&missing_agent), TestResult::Error { .. }));

        let on_wall = parse(
            r#"
name = "wall"
[[setup.agents]]
team = "player"
x = 0
y = 0
ball = true
[[setup.agents]]
team = "computer"
x = 10
y = 4
"#,
        );
        assert!(matches!(run_scenario(&on_wall), TestResult::Error { .. }));

        let two_balls = parse(
            r#"
name = "balls"
[[setup.agents]]
team = "player"
x = 3
y = 4
ball = true
[[setup.agents]]
team = "computer"
x = 10
y = 4
ball = true
"#,
        );
        assert!(matches!(run_scenario(&two_balls), TestResult::Error { .. }));
    }

    #[test]
    fn test_seeded_reset_without_agents() {
        let def = parse(
            r#"
name = "random"
[setup]
team_size = 2
seed = 5

[[step]]
actions = ["STAND", "STAND"]

[[expect]]
after_step = 1
checks = ["time 1"]
"#,
        );
        assert!(matches!(run_scenario(&def), TestResult::Pass { steps: 1 }));
    }

    #[test]
    fn test_unreached_expectation() {
        let def = parse(
            r#"
name = "short"
[setup]
seed = 1
[[expect]]
after_step = 3
checks = ["time 3"]
"#,
        );
        assert!(matches!(run_scenario(&def), TestResult::Error { .. }));
    }
}
