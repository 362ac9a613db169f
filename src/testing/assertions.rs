//! Assertion checking for scenario expectations
//!
//! Checks are short whitespace-separated sentences:
//!
//! ```text
//! agent 0 pos 4 4        agent 1 ball        agent 1 no_ball
//! agent 1 action STAND   ball player 0       ball none
//! terminal               not_terminal        reward -1
//! time 3                 winner computer     winner none
//! ```

use super::parser::StateExpectation;
use crate::env::{Action, SoccerEnvironment, Team};
use crate::map::TilePos;

/// Error when an assertion fails
#[derive(Debug)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

fn invalid(check: &str, expected: &str) -> AssertionError {
    AssertionError {
        message: format!("Invalid check syntax: {}", check),
        expected: expected.to_string(),
        actual: check.to_string(),
    }
}

fn failed(check: &str, expected: impl ToString, actual: impl ToString) -> AssertionError {
    AssertionError {
        message: format!("Check failed: {}", check),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn parse_num<T: std::str::FromStr>(check: &str, value: Option<&&str>) -> Result<T, AssertionError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| invalid(check, "a number"))
}

/// Check all expectations of one step against the environment
///
/// `last_reward` is the reward of the step that was just taken.
pub fn check_state(
    expectation: &StateExpectation,
    env: &SoccerEnvironment,
    last_reward: f32,
) -> Result<(), AssertionError> {
    for check in &expectation.checks {
        check_one(check, env, last_reward)?;
    }
    Ok(())
}

fn check_one(check: &str, env: &SoccerEnvironment, last_reward: f32) -> Result<(), AssertionError> {
    let parts: Vec<&str> = check.split_whitespace().collect();
    let state = env.state();

    match parts.first().copied() {
        Some("agent") => {
            let index: usize = parse_num(check, parts.get(1))?;
            if index >= state.agent_count() {
                return Err(AssertionError {
                    message: format!("Agent {} not found", index),
                    expected: format!("index < {}", state.agent_count()),
                    actual: index.to_string(),
                });
            }
            let agent = state.agent(index);

            match parts.get(2).copied() {
                Some("pos") => {
                    let x = parse_num(check, parts.get(3))?;
                    let y = parse_num(check, parts.get(4))?;
                    let expected = TilePos::new(x, y);
                    if agent.pos != expected {
                        return Err(failed(check, expected, agent.pos));
                    }
                }
                Some("ball") if !agent.has_ball => return Err(failed(check, "has ball", "no ball")),
                Some("no_ball") if agent.has_ball => return Err(failed(check, "no ball", "has ball")),
                Some("ball") | Some("no_ball") => {}
                Some("action") => {
                    let expected = parts
                        .get(3)
                        .and_then(|a| Action::from_str(a))
                        .ok_or_else(|| invalid(check, "an action name"))?;
                    if agent.action != expected {
                        return Err(failed(check, expected, agent.action));
                    }
                }
                _ => return Err(invalid(check, "agent <i> pos|ball|no_ball|action ...")),
            }
        }
        Some("ball") => {
            let actual = match state.ball_possession() {
                Some(p) => format!("{} {}", p.team, p.team_agent_index),
                None => "none".to_string(),
            };
            let expected = match parts.get(1).copied() {
                Some("none") => "none".to_string(),
                Some(team) => {
                    let team = Team::from_str(team).ok_or_else(|| invalid(check, "player|computer|none"))?;
                    let index: usize = parse_num(check, parts.get(2))?;
                    format!("{} {}", team, index)
                }
                None => return Err(invalid(check, "ball <team> <i> or ball none")),
            };
            if actual != expected {
                return Err(failed(check, expected, actual));
            }
        }
        Some("terminal") if !env.is_terminal() => return Err(failed(check, "terminal", "running")),
        Some("not_terminal") if env.is_terminal() => {
            return Err(failed(check, "running", "terminal"));
        }
        Some("terminal") | Some("not_terminal") => {}
        Some("reward") => {
            let expected: f32 = parse_num(check, parts.get(1))?;
            if (last_reward - expected).abs() > f32::EPSILON {
                return Err(failed(check, expected, last_reward));
            }
        }
        Some("time") => {
            let expected: u32 = parse_num(check, parts.get(1))?;
            if state.time_step != expected {
                return Err(failed(check, expected, state.time_step));
            }
        }
        Some("winner") => {
            let expected = match parts.get(1).copied() {
                Some("none") => None,
                Some(team) => Some(Team::from_str(team).ok_or_else(|| invalid(check, "player|computer|none"))?),
                None => return Err(invalid(check, "winner <team> or winner none")),
            };
            let actual = env.winner();
            if actual != expected {
                let show = |t: Option<Team>| t.map(|t| t.to_string()).unwrap_or_else(|| "none".to_string());
                return Err(failed(check, show(expected), show(actual)));
            }
        }
        _ => return Err(invalid(check, "agent|ball|terminal|not_terminal|reward|time|winner")),
    }

    Ok(())
}
