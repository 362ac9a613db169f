//! Soccer environment - the reinforcement learning interface
//!
//! The caller controls the PLAYER team; the COMPUTER team follows the
//! scripted opponent in `computer`. One call to `take_action` advances the
//! game by one time step for every agent.

mod computer;
mod error;
mod options;
mod state;
mod types;

pub use computer::{
    computer_action, defensive_agent_index, nearest_player_index, pos_distance, strategic_action,
};
pub use error::EnvError;
pub use options::EnvOptions;
pub use state::{AgentState, BallPossession, SoccerState};
pub use types::{Action, ComputerMode, StrategicMode, Team};

use bevy::log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::{REWARD_COMPUTER_WIN, REWARD_NONE, REWARD_PLAYER_WIN};
use crate::map::{SoccerMap, TilePos};

/// Response of the environment to `reset` or `take_action`
#[derive(Debug, Clone)]
pub struct Observation {
    /// State after a reset (None after a step)
    pub state: Option<SoccerState>,
    /// Player actions that produced this observation
    pub action: Option<Vec<Action>>,
    pub reward: f32,
    /// State after a step (None after a reset)
    pub next_state: Option<SoccerState>,
    /// The resulting state is terminal
    pub done: bool,
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) => writeln!(f, "State:\n{}", state)?,
            None => writeln!(f, "State:\nNone")?,
        }
        match &self.action {
            Some(actions) => {
                let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
                writeln!(f, "Action: [{}]", names.join(", "))?;
            }
            None => writeln!(f, "Action: None")?,
        }
        writeln!(f, "Reward: {}", self.reward)?;
        match &self.next_state {
            Some(state) => write!(f, "Next state:\n{}", state),
            None => write!(f, "Next state:\nNone"),
        }
    }
}

/// Grid soccer environment
pub struct SoccerEnvironment {
    options: EnvOptions,
    map: Arc<SoccerMap>,
    state: SoccerState,
    rng: StdRng,
}

impl SoccerEnvironment {
    /// Create an environment, loading the map named in the options
    pub fn new(options: EnvOptions) -> Result<Self, EnvError> {
        options.validate()?;
        let map = match &options.map_path {
            Some(path) => SoccerMap::load(path)?,
            None => SoccerMap::builtin(),
        };
        Self::with_map(options, Arc::new(map))
    }

    /// Create an environment on an already loaded map (shared between environments)
    pub fn with_map(options: EnvOptions, map: Arc<SoccerMap>) -> Result<Self, EnvError> {
        options.validate()?;
        for team in Team::ALL {
            let available = map.spawn_area(team).len();
            if available < options.team_size {
                return Err(EnvError::SpawnTooSmall {
                    team,
                    needed: options.team_size,
                    available,
                });
            }
        }

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Soccer environment on map '{}' ({}x{}), {}",
            map.name, map.width, map.height, options
        );

        let mut env = Self {
            state: SoccerState::new(options.team_size, &[]),
            options,
            map,
            rng,
        };
        env.reset();
        Ok(env)
    }

    /// Create an environment starting from a prepared state
    pub fn from_state(
        options: EnvOptions,
        map: Arc<SoccerMap>,
        state: SoccerState,
    ) -> Result<Self, EnvError> {
        let mut env = Self::with_map(options, map)?;
        if state.team_size != env.options.team_size {
            return Err(EnvError::StateMismatch {
                field: "team size",
                expected: env.options.team_size,
                found: state.team_size,
            });
        }
        if state.agent_count() != env.options.agent_count() {
            return Err(EnvError::StateMismatch {
                field: "agent count",
                expected: env.options.agent_count(),
                found: state.agent_count(),
            });
        }
        env.state = state;
        Ok(env)
    }

    pub fn options(&self) -> &EnvOptions {
        &self.options
    }

    pub fn map(&self) -> &SoccerMap {
        &self.map
    }

    /// Shared handle to the map
    pub fn map_handle(&self) -> Arc<SoccerMap> {
        Arc::clone(&self.map)
    }

    pub fn state(&self) -> &SoccerState {
        &self.state
    }

    pub fn agent_index(&self, team: Team, team_agent_index: usize) -> usize {
        self.state.agent_index(team, team_agent_index)
    }

    /// Start a new episode
    pub fn reset(&mut self) -> Observation {
        self.randomize();
        debug!("Episode reset:\n{}", self.state);
        Observation {
            state: Some(self.state.clone()),
            action: None,
            reward: REWARD_NONE,
            next_state: None,
            done: self.is_terminal(),
        }
    }

    /// Random spawn positions, ball holder and computer modes
    fn randomize(&mut self) {
        let team_size = self.options.team_size;
        let team_has_ball = Team::ALL[self.rng.gen_range(0..Team::ALL.len())];
        let team_agent_has_ball = self.rng.gen_range(0..team_size);

        let mut agents: Vec<AgentState> = Vec::with_capacity(self.options.agent_count());
        for team in Team::ALL {
            let spawn = self.map.spawn_area(team);
            for team_agent_index in 0..team_size {
                // Spawn areas are checked to hold every team member
                let pos = loop {
                    let candidate = spawn[self.rng.gen_range(0..spawn.len())];
                    if !agents.iter().any(|a| a.pos == candidate) {
                        break candidate;
                    }
                };

                let mut agent = AgentState::new(pos);
                agent.has_ball = team == team_has_ball && team_agent_index == team_agent_has_ball;
                if team == Team::Computer {
                    agent.mode = ComputerMode::ALL.choose(&mut self.rng).copied();
                }
                agents.push(agent);
            }
        }

        self.state = SoccerState {
            team_size,
            agents,
            time_step: 0,
        };
    }

    /// Advance one time step with one action per player agent
    pub fn take_action(&mut self, actions: &[Action]) -> Result<Observation, EnvError> {
        self.step(actions, None)
    }

    /// Advance one time step in a single-agent environment
    pub fn take_single_action(&mut self, action: Action) -> Result<Observation, EnvError> {
        self.take_action(&[action])
    }

    /// Advance one time step, overriding the scripted computer actions
    pub fn take_joint_action(
        &mut self,
        player_actions: &[Action],
        computer_actions: &[Action],
    ) -> Result<Observation, EnvError> {
        self.step(player_actions, Some(computer_actions))
    }

    fn step(
        &mut self,
        player_actions: &[Action],
        computer_actions: Option<&[Action]>,
    ) -> Result<Observation, EnvError> {
        let team_size = self.options.team_size;
        for actions in std::iter::once(player_actions).chain(computer_actions) {
            if actions.len() != team_size {
                return Err(EnvError::ActionCount {
                    expected: team_size,
                    found: actions.len(),
                });
            }
        }

        let intended = self.intended_positions(player_actions, computer_actions);
        self.resolve_positions(intended);
        self.state.time_step += 1;

        Ok(Observation {
            state: None,
            action: Some(player_actions.to_vec()),
            reward: self.reward(),
            next_state: Some(self.state.clone()),
            done: self.is_terminal(),
        })
    }

    /// Record each agent's action and return where it tries to move
    fn intended_positions(
        &mut self,
        player_actions: &[Action],
        computer_actions: Option<&[Action]>,
    ) -> Vec<TilePos> {
        let mut intended = Vec::with_capacity(self.state.agent_count());
        for team in Team::ALL {
            for team_agent_index in 0..self.options.team_size {
                let agent_index = self.state.agent_index(team, team_agent_index);
                let action = match (team, computer_actions) {
                    (Team::Player, _) => player_actions[team_agent_index],
                    (Team::Computer, Some(forced)) => forced[team_agent_index],
                    (Team::Computer, None) => {
                        computer_action(&self.state, &self.map, team_agent_index, &mut self.rng)
                    }
                };
                self.state.agent_mut(agent_index).action = action;

                let pos = self.state.agent_pos(agent_index);
                let moved = Self::moved_pos(pos, action);
                intended.push(if self.map.is_walkable(moved) { moved } else { pos });
            }
        }
        intended
    }

    /// Send colliding agents back until no two share a tile, then commit
    ///
    /// The first collision involving the ball holder passes the ball to a
    /// random other agent of that collision; the ball changes hands at most
    /// once per step.
    fn resolve_positions(&mut self, mut intended: Vec<TilePos>) {
        let mut has_switched = false;
        loop {
            let mut by_pos: BTreeMap<TilePos, Vec<usize>> = BTreeMap::new();
            for (agent_index, &pos) in intended.iter().enumerate() {
                by_pos.entry(pos).or_default().push(agent_index);
            }

            let mut overlapping = false;
            for group in by_pos.values().filter(|group| group.len() > 1) {
                if !has_switched {
                    has_switched = self.switch_ball_in_group(group);
                }
                for &agent_index in group {
                    intended[agent_index] = self.state.agent_pos(agent_index);
                }
                overlapping = true;
            }

            if !overlapping {
                break;
            }
        }

        for (agent, pos) in self.state.agents.iter_mut().zip(intended) {
            agent.pos = pos;
        }
    }

    /// Pass the ball from its holder to a random other member of the group
    fn switch_ball_in_group(&mut self, group: &[usize]) -> bool {
        let Some(&holder) = group.iter().find(|&&i| self.state.agent_has_ball(i)) else {
            return false;
        };
        let others: Vec<usize> = group.iter().copied().filter(|&i| i != holder).collect();
        let Some(&receiver) = others.choose(&mut self.rng) else {
            return false;
        };
        debug!("Ball switched from agent {} to agent {}", holder, receiver);
        self.state.switch_ball(holder, receiver);
        true
    }

    /// +1 when the PLAYER team wins, -1 when the COMPUTER team wins, else 0
    pub fn reward(&self) -> f32 {
        if self.state.is_team_win(&self.map, Team::Player) {
            REWARD_PLAYER_WIN
        } else if self.state.is_team_win(&self.map, Team::Computer) {
            REWARD_COMPUTER_WIN
        } else {
            REWARD_NONE
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal(&self.map, self.options.max_time_step)
    }

    pub fn winner(&self) -> Option<Team> {
        self.state.winner(&self.map)
    }

    /// Hand the ball to an agent, returning who held it before
    pub fn give_ball(&mut self, agent_index: usize) -> Result<Option<usize>, EnvError> {
        self.check_agent_index(agent_index)?;
        let previous = self.state.ball_possession().map(|p| p.agent_index);
        self.state.set_ball_holder(agent_index);
        Ok(previous)
    }

    /// Hand the ball back to a previous holder
    pub fn return_ball(&mut self, previous_holder: usize) -> Result<(), EnvError> {
        self.check_agent_index(previous_holder)?;
        self.state.set_ball_holder(previous_holder);
        Ok(())
    }

    fn check_agent_index(&self, agent_index: usize) -> Result<(), EnvError> {
        let count = self.state.agent_count();
        if agent_index >= count {
            return Err(EnvError::AgentIndex {
                index: agent_index,
                count,
            });
        }
        Ok(())
    }

    /// Position after an action on the 4-direction grid
    pub fn moved_pos(pos: TilePos, action: Action) -> TilePos {
        action.apply(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(team_size: usize, seed: u64) -> SoccerEnvironment {
        let options = EnvOptions::new(team_size).unwrap().with_seed(seed);
        SoccerEnvironment::new(options).unwrap()
    }

    /// Environment with hand-placed agents
    fn placed(positions: &[TilePos], holder: usize, modes: &[ComputerMode]) -> SoccerEnvironment {
        placed_with_seed(positions, holder, modes, 11)
    }

    fn placed_with_seed(
        positions: &[TilePos],
        holder: usize,
        modes: &[ComputerMode],
        seed: u64,
    ) -> SoccerEnvironment {
        let team_size = positions.len() / 2;
        let mut state = SoccerState::new(team_size, positions);
        state.set_ball_holder(holder);
        for (i, &mode) in modes.iter().enumerate() {
            state.agents[team_size + i].mode = Some(mode);
        }
        let options = EnvOptions::new(team_size).unwrap().with_seed(seed);
        SoccerEnvironment::from_state(options, Arc::new(SoccerMap::builtin()), state).unwrap()
    }

    #[test]
    fn test_reset_places_agents_in_spawn_areas() {
        for seed in 0..20 {
            let mut env = env_with(2, seed);
            let obs = env.reset();
            let state = obs.state.as_ref().unwrap();
            assert_eq!(state.time_step, 0);
            assert_eq!(state.agent_count(), 4);
            assert!(obs.action.is_none());
            assert!(obs.next_state.is_none());
            assert_eq!(obs.reward, 0.0);

            for team in Team::ALL {
                for i in state.team_agents(team) {
                    assert!(env.map().spawn_area(team).contains(&state.agent_pos(i)));
                    assert_eq!(state.agent(i).action, Action::Stand);
                    assert_eq!(state.agent(i).mode.is_some(), team == Team::Computer);
                }
            }

            // Distinct positions, exactly one ball holder
            let mut positions: Vec<TilePos> = state.agents.iter().map(|a| a.pos).collect();
            positions.sort();
            positions.dedup();
            assert_eq!(positions.len(), 4);
            assert_eq!(state.agents.iter().filter(|a| a.has_ball).count(), 1);
        }
    }

    #[test]
    fn test_same_seed_same_episode() {
        let mut a = env_with(1, 42);
        let mut b = env_with(1, 42);
        assert_eq!(a.state(), b.state());
        for action in [Action::MoveRight, Action::MoveUp, Action::MoveRight, Action::Stand] {
            let oa = a.take_single_action(action).unwrap();
            let ob = b.take_single_action(action).unwrap();
            assert_eq!(oa.next_state, ob.next_state);
        }
    }

    #[test]
    fn test_action_count_is_checked() {
        let mut env = env_with(2, 1);
        let err = env.take_action(&[Action::Stand]).unwrap_err();
        assert!(matches!(err, EnvError::ActionCount { expected: 2, found: 1 }));
        assert!(env.take_single_action(Action::Stand).is_err());
        assert!(env.take_action(&[Action::Stand, Action::Stand]).is_ok());
    }

    #[test]
    fn test_step_moves_player_and_counts_time() {
        let mut env = placed(&[TilePos::new(3, 3), TilePos::new(10, 7)], 1, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::MoveRight], &[Action::Stand])
            .unwrap();
        let next = obs.next_state.unwrap();
        assert_eq!(next.agent_pos(0), TilePos::new(4, 3));
        assert_eq!(next.agent(0).action, Action::MoveRight);
        assert_eq!(next.time_step, 1);
        assert_eq!(obs.action, Some(vec![Action::MoveRight]));
        assert!(obs.state.is_none());
    }

    #[test]
    fn test_walls_block_movement() {
        let mut env = placed(&[TilePos::new(1, 1), TilePos::new(10, 7)], 1, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::MoveUp], &[Action::Stand])
            .unwrap();
        let next = obs.next_state.unwrap();
        assert_eq!(next.agent_pos(0), TilePos::new(1, 1));
        // The attempted action is still recorded
        assert_eq!(next.agent(0).action, Action::MoveUp);
    }

    #[test]
    fn test_collision_keeps_positions_and_switches_ball() {
        let mut env = placed(&[TilePos::new(5, 4), TilePos::new(7, 4)], 0, &[ComputerMode::Defensive]);
        let obs = env
            .take_joint_action(&[Action::MoveRight], &[Action::MoveLeft])
            .unwrap();
        let next = obs.next_state.unwrap();
        assert_eq!(next.agent_pos(0), TilePos::new(5, 4));
        assert_eq!(next.agent_pos(1), TilePos::new(7, 4));
        // Only one other agent in the collision, so the ball must go to it
        assert!(!next.agent_has_ball(0));
        assert!(next.agent_has_ball(1));
    }

    #[test]
    fn test_moving_into_standing_agent_bounces() {
        let mut env = placed(&[TilePos::new(5, 4), TilePos::new(6, 4)], 1, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::MoveRight], &[Action::Stand])
            .unwrap();
        let next = obs.next_state.unwrap();
        assert_eq!(next.agent_pos(0), TilePos::new(5, 4));
        assert_eq!(next.agent_pos(1), TilePos::new(6, 4));
        assert!(next.agent_has_ball(0));
    }

    #[test]
    fn test_chain_collision_is_resolved() {
        // Player 2 moves into player 1's tile while player 1 bounces off a computer
        let mut env = placed(
            &[
                TilePos::new(5, 4),
                TilePos::new(4, 4),
                TilePos::new(7, 4),
                TilePos::new(10, 8),
            ],
            3,
            &[ComputerMode::Defensive, ComputerMode::Defensive],
        );
        let obs = env
            .take_joint_action(
                &[Action::MoveRight, Action::MoveRight],
                &[Action::MoveLeft, Action::Stand],
            )
            .unwrap();
        let next = obs.next_state.unwrap();
        assert_eq!(next.agent_pos(0), TilePos::new(5, 4));
        assert_eq!(next.agent_pos(1), TilePos::new(4, 4));
        assert_eq!(next.agent_pos(2), TilePos::new(7, 4));
        assert!(next.agent_has_ball(3));
    }

    #[test]
    fn test_ball_switches_once_per_step() {
        // Player 1 and computer 1 collide head-on, then computer 1 bounces
        // back into player 2 who is walking onto its old tile
        let positions = [
            TilePos::new(5, 4),
            TilePos::new(8, 4),
            TilePos::new(7, 4),
            TilePos::new(10, 8),
        ];
        let modes = [ComputerMode::Defensive, ComputerMode::Defensive];
        for seed in 0..16 {
            let mut env = placed_with_seed(&positions, 0, &modes, seed);
            let obs = env
                .take_joint_action(
                    &[Action::MoveRight, Action::MoveLeft],
                    &[Action::MoveLeft, Action::Stand],
                )
                .unwrap();
            let next = obs.next_state.unwrap();
            for (agent_index, &pos) in positions.iter().enumerate() {
                assert_eq!(next.agent_pos(agent_index), pos);
            }
            assert_eq!(next.ball_possession().map(|p| p.agent_index), Some(2));
        }
    }

    #[test]
    fn test_ball_goes_to_any_agent_of_the_collision() {
        // Three agents step onto (6, 5); the holder never keeps the ball
        let positions = [
            TilePos::new(5, 5),
            TilePos::new(6, 4),
            TilePos::new(7, 5),
            TilePos::new(10, 8),
        ];
        let modes = [ComputerMode::Defensive, ComputerMode::Defensive];
        let mut receivers = [0; 4];
        for seed in 0..64 {
            let mut env = placed_with_seed(&positions, 0, &modes, seed);
            let obs = env
                .take_joint_action(
                    &[Action::MoveRight, Action::MoveDown],
                    &[Action::MoveLeft, Action::Stand],
                )
                .unwrap();
            let next = obs.next_state.unwrap();
            for (agent_index, &pos) in positions.iter().enumerate() {
                assert_eq!(next.agent_pos(agent_index), pos);
            }
            let holder = next.ball_possession().unwrap().agent_index;
            receivers[holder] += 1;
        }
        assert_eq!(receivers[0], 0);
        assert_eq!(receivers[3], 0);
        assert!(receivers[1] > 0, "player 2 never received the ball");
        assert!(receivers[2] > 0, "computer 1 never received the ball");
    }

    #[test]
    fn test_state_mismatch_is_rejected() {
        let state = SoccerState::new(1, &[TilePos::new(3, 3), TilePos::new(10, 7)]);
        let options = EnvOptions::new(2).unwrap().with_seed(1);
        let err = SoccerEnvironment::from_state(options, Arc::new(SoccerMap::builtin()), state)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            EnvError::StateMismatch {
                field: "team size",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_player_scores() {
        let mut env = placed(&[TilePos::new(12, 4), TilePos::new(3, 8)], 0, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::MoveRight], &[Action::Stand])
            .unwrap();
        assert_eq!(obs.reward, 1.0);
        assert!(obs.done);
        assert_eq!(env.winner(), Some(Team::Player));
    }

    #[test]
    fn test_computer_scores() {
        let mut env = placed(&[TilePos::new(12, 8), TilePos::new(1, 5)], 1, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::Stand], &[Action::MoveLeft])
            .unwrap();
        assert_eq!(obs.reward, -1.0);
        assert!(obs.done);
        assert_eq!(env.winner(), Some(Team::Computer));
    }

    #[test]
    fn test_episode_ends_at_time_limit() {
        let options = EnvOptions::new(1).unwrap().with_seed(5).with_max_time_step(3);
        let mut env = SoccerEnvironment::new(options).unwrap();
        let mut steps = 0;
        while !env.is_terminal() {
            env.take_single_action(Action::Stand).unwrap();
            steps += 1;
        }
        assert!(steps <= 3);
        assert!(env.state().time_step == 3 || env.winner().is_some());
    }

    #[test]
    fn test_give_and_return_ball() {
        let mut env = placed(&[TilePos::new(3, 3), TilePos::new(10, 7)], 1, &[ComputerMode::Offensive]);
        let previous = env.give_ball(0).unwrap();
        assert_eq!(previous, Some(1));
        assert!(env.state().agent_has_ball(0));
        env.return_ball(1).unwrap();
        assert!(env.state().agent_has_ball(1));
        assert!(!env.state().agent_has_ball(0));
        assert!(env.give_ball(5).is_err());
    }

    #[test]
    fn test_observation_display() {
        let mut env = placed(&[TilePos::new(3, 3), TilePos::new(10, 7)], 1, &[ComputerMode::Offensive]);
        let obs = env
            .take_joint_action(&[Action::MoveDown], &[Action::Stand])
            .unwrap();
        let text = obs.to_string();
        assert!(text.starts_with("State:\nNone\nAction: [MOVE_DOWN]\nReward: 0\nNext state:\n"));
        assert!(text.ends_with("Time step: 1"));
    }
}
