//! Keyboard commands of the interactive viewer

use bevy::prelude::KeyCode;

use crate::env::{Action, EnvError, SoccerEnvironment, Team, pos_distance};

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Step the environment with this action for player 1
    Step(Action),
    /// Key `1`: player 1 takes the ball
    GiveBall,
    /// Key `2`: player 1 loses the ball
    RemoveBall,
    Reset,
    ToggleAuto,
    Quit,
}

impl ViewerCommand {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let command = match key {
            KeyCode::ArrowRight => Self::Step(Action::MoveRight),
            KeyCode::ArrowUp => Self::Step(Action::MoveUp),
            KeyCode::ArrowLeft => Self::Step(Action::MoveLeft),
            KeyCode::ArrowDown => Self::Step(Action::MoveDown),
            KeyCode::Period => Self::Step(Action::Stand),
            KeyCode::Digit1 | KeyCode::Numpad1 => Self::GiveBall,
            KeyCode::Digit2 | KeyCode::Numpad2 => Self::RemoveBall,
            KeyCode::KeyR => Self::Reset,
            KeyCode::Space => Self::ToggleAuto,
            KeyCode::Escape => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Remembers who had the ball before key `1`, so key `2` can hand it back
#[derive(Debug, Default, Clone)]
pub struct BallMemory {
    previous_holder: Option<usize>,
}

impl BallMemory {
    /// Give the ball to `agent_index`, remembering the previous holder
    pub fn give(&mut self, env: &mut SoccerEnvironment, agent_index: usize) -> Result<(), EnvError> {
        self.previous_holder = env.give_ball(agent_index)?;
        Ok(())
    }

    /// Take the ball away from `agent_index` if it holds it
    ///
    /// The ball goes back to the holder remembered by [`BallMemory::give`].
    /// Without a remembered holder it goes to the nearest computer agent.
    /// When `agent_index` itself was the remembered holder it keeps the ball.
    /// Returns whether possession changed.
    pub fn remove(&mut self, env: &mut SoccerEnvironment, agent_index: usize) -> Result<bool, EnvError> {
        if !env.state().agent_has_ball(agent_index) {
            return Ok(false);
        }
        let target = match self.previous_holder.take() {
            Some(previous) if previous == agent_index => return Ok(false),
            Some(previous) => previous,
            None => nearest_computer(env, agent_index),
        };
        env.return_ball(target)?;
        Ok(true)
    }

    pub fn forget(&mut self) {
        self.previous_holder = None;
    }
}

/// Computer agent closest to an agent (first one on ties)
fn nearest_computer(env: &SoccerEnvironment, agent_index: usize) -> usize {
    let state = env.state();
    let from = state.agent_pos(agent_index);
    let mut nearest = state.agent_index(Team::Computer, 0);
    let mut nearest_dist = f64::INFINITY;
    for computer in state.team_agents(Team::Computer) {
        let dist = pos_distance(from, state.agent_pos(computer));
        if dist < nearest_dist {
            nearest = computer;
            nearest_dist = dist;
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvOptions, SoccerState};
    use crate::map::{SoccerMap, TilePos};
    use std::sync::Arc;

    fn env_with_holder(holder: usize) -> SoccerEnvironment {
        let positions = [
            TilePos::new(3, 4),
            TilePos::new(3, 6),
            TilePos::new(10, 2),
            TilePos::new(5, 6),
        ];
        let mut state = SoccerState::new(2, &positions);
        state.set_ball_holder(holder);
        SoccerEnvironment::from_state(
            EnvOptions::new(2).unwrap().with_seed(1),
            Arc::new(SoccerMap::builtin()),
            state,
        )
        .unwrap()
    }

    fn holder(env: &SoccerEnvironment) -> Option<usize> {
        env.state().ball_possession().map(|p| p.agent_index)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            ViewerCommand::from_key(KeyCode::ArrowUp),
            Some(ViewerCommand::Step(Action::MoveUp))
        );
        assert_eq!(ViewerCommand::from_key(KeyCode::Digit1), Some(ViewerCommand::GiveBall));
        assert_eq!(ViewerCommand::from_key(KeyCode::Digit2), Some(ViewerCommand::RemoveBall));
        assert_eq!(ViewerCommand::from_key(KeyCode::Escape), Some(ViewerCommand::Quit));
        assert_eq!(ViewerCommand::from_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_give_then_remove_restores_every_holder() {
        for first_holder in 0..4 {
            let mut env = env_with_holder(first_holder);
            let before = env.state().clone();
            let mut memory = BallMemory::default();

            memory.give(&mut env, 0).unwrap();
            assert_eq!(holder(&env), Some(0));
            memory.remove(&mut env, 0).unwrap();

            assert_eq!(env.state(), &before, "holder {} not restored", first_holder);
        }
    }

    #[test]
    fn test_remove_without_memory_goes_to_nearest_computer() {
        let mut env = env_with_holder(0);
        let mut memory = BallMemory::default();
        assert!(memory.remove(&mut env, 0).unwrap());
        // Computer 1 at (5, 6) is closer to (3, 4) than computer 0 at (10, 2)
        assert_eq!(holder(&env), Some(3));
    }

    #[test]
    fn test_remove_without_ball_does_nothing() {
        let mut env = env_with_holder(2);
        let mut memory = BallMemory::default();
        assert!(!memory.remove(&mut env, 0).unwrap());
        assert_eq!(holder(&env), Some(2));
    }

    #[test]
    fn test_memory_is_used_once() {
        let mut env = env_with_holder(1);
        let mut memory = BallMemory::default();
        memory.give(&mut env, 0).unwrap();
        memory.remove(&mut env, 0).unwrap();
        assert_eq!(holder(&env), Some(1));

        memory.give(&mut env, 0).unwrap();
        memory.forget();
        memory.remove(&mut env, 0).unwrap();
        assert_eq!(holder(&env), Some(3));
    }
}
