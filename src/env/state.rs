//! Soccer state - agent positions, ball possession and time

use serde::{Deserialize, Serialize};

use super::types::{Action, ComputerMode, Team};
use crate::map::{SoccerMap, TilePos};

/// Status of a single agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentState {
    pub pos: TilePos,
    pub has_ball: bool,
    /// Strategy of a computer agent (None for player agents)
    pub mode: Option<ComputerMode>,
    /// Last action taken
    pub action: Action,
}

impl AgentState {
    pub fn new(pos: TilePos) -> Self {
        Self {
            pos,
            has_ball: false,
            mode: None,
            action: Action::Stand,
        }
    }
}

/// Who holds the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallPossession {
    pub team: Team,
    pub team_agent_index: usize,
    pub agent_index: usize,
}

/// Full environment state
///
/// Agents are stored team by team: indices `0..team_size` are players,
/// `team_size..2 * team_size` are computers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoccerState {
    pub team_size: usize,
    pub agents: Vec<AgentState>,
    pub time_step: u32,
}

impl SoccerState {
    /// State with agents at the given positions, nobody holding the ball
    pub fn new(team_size: usize, positions: &[TilePos]) -> Self {
        Self {
            team_size,
            agents: positions.iter().map(|&pos| AgentState::new(pos)).collect(),
            time_step: 0,
        }
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Global index of a team member
    pub fn agent_index(&self, team: Team, team_agent_index: usize) -> usize {
        self.team_size * team.index() + team_agent_index
    }

    pub fn team_of(&self, agent_index: usize) -> Team {
        if agent_index < self.team_size {
            Team::Player
        } else {
            Team::Computer
        }
    }

    /// Global indices of every member of a team
    pub fn team_agents(&self, team: Team) -> std::ops::Range<usize> {
        let start = self.team_size * team.index();
        start..start + self.team_size
    }

    pub fn agent(&self, agent_index: usize) -> &AgentState {
        &self.agents[agent_index]
    }

    pub fn agent_mut(&mut self, agent_index: usize) -> &mut AgentState {
        &mut self.agents[agent_index]
    }

    pub fn agent_pos(&self, agent_index: usize) -> TilePos {
        self.agents[agent_index].pos
    }

    pub fn agent_has_ball(&self, agent_index: usize) -> bool {
        self.agents[agent_index].has_ball
    }

    /// Swap ball possession between two agents
    pub fn switch_ball(&mut self, agent_index: usize, other_agent_index: usize) {
        let agent_ball = self.agents[agent_index].has_ball;
        self.agents[agent_index].has_ball = !agent_ball;
        self.agents[other_agent_index].has_ball = agent_ball;
    }

    /// Give the ball to exactly one agent
    pub fn set_ball_holder(&mut self, agent_index: usize) {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            agent.has_ball = index == agent_index;
        }
    }

    pub fn ball_possession(&self) -> Option<BallPossession> {
        let agent_index = self.agents.iter().position(|a| a.has_ball)?;
        let team = self.team_of(agent_index);
        Some(BallPossession {
            team,
            team_agent_index: agent_index - self.team_size * team.index(),
            agent_index,
        })
    }

    /// Agent holds the ball inside its own team's goal area
    pub fn is_agent_win(&self, map: &SoccerMap, agent_index: usize) -> bool {
        let agent = &self.agents[agent_index];
        agent.has_ball && map.is_goal(self.team_of(agent_index), agent.pos)
    }

    pub fn is_team_win(&self, map: &SoccerMap, team: Team) -> bool {
        self.team_agents(team).any(|i| self.is_agent_win(map, i))
    }

    pub fn is_terminal(&self, map: &SoccerMap, max_time_step: u32) -> bool {
        if self.time_step >= max_time_step {
            return true;
        }
        (0..self.agent_count()).any(|i| self.is_agent_win(map, i))
    }

    /// Winning team, if any agent reached its goal with the ball
    pub fn winner(&self, map: &SoccerMap) -> Option<Team> {
        Team::ALL.into_iter().find(|&team| self.is_team_win(map, team))
    }
}

impl std::fmt::Display for SoccerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for team in Team::ALL {
            if team.index() > 0 {
                writeln!(f)?;
            }
            write!(f, "Team {}:", team)?;
            for team_agent_index in 0..self.team_size {
                let agent = self.agent(self.agent_index(team, team_agent_index));
                write!(f, "\nAgent {}: Position: {}", team_agent_index + 1, agent.pos)?;
                if let Some(mode) = agent.mode {
                    write!(f, ", Mode: {}", mode)?;
                }
                write!(f, ", Action: {}", agent.action)?;
            }
        }
        match self.ball_possession() {
            Some(possession) => write!(
                f,
                "\nBall possession: In team {} with agent {}",
                possession.team,
                possession.team_agent_index + 1
            )?,
            None => write!(f, "\nBall possession: None")?,
        }
        write!(f, "\nTime step: {}", self.time_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn two_vs_two() -> SoccerState {
        SoccerState::new(
            2,
            &[
                TilePos::new(2, 2),
                TilePos::new(2, 3),
                TilePos::new(11, 2),
                TilePos::new(11, 3),
            ],
        )
    }

    #[test]
    fn test_agent_indexing() {
        let state = two_vs_two();
        assert_eq!(state.agent_index(Team::Player, 1), 1);
        assert_eq!(state.agent_index(Team::Computer, 0), 2);
        assert_eq!(state.team_of(1), Team::Player);
        assert_eq!(state.team_of(3), Team::Computer);
        assert_eq!(state.team_agents(Team::Computer).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_switch_ball() {
        let mut state = two_vs_two();
        state.set_ball_holder(3);
        state.switch_ball(3, 0);
        assert!(state.agent_has_ball(0));
        assert!(!state.agent_has_ball(3));
        let possession = state.ball_possession().unwrap();
        assert_eq!(possession.team, Team::Player);
        assert_eq!(possession.agent_index, 0);

        state.set_ball_holder(3);
        let possession = state.ball_possession().unwrap();
        assert_eq!(possession.team, Team::Computer);
        assert_eq!(possession.team_agent_index, 1);
    }

    #[test]
    fn test_win_requires_ball_in_own_goal() {
        let map = SoccerMap::builtin();
        let mut state = SoccerState::new(1, &[TilePos::new(13, 4), TilePos::new(0, 4)]);
        assert!(!state.is_terminal(&map, 100));

        state.set_ball_holder(0);
        assert!(state.is_agent_win(&map, 0));
        assert_eq!(state.winner(&map), Some(Team::Player));
        assert!(state.is_terminal(&map, 100));

        state.set_ball_holder(1);
        assert!(state.is_team_win(&map, Team::Computer));
        assert!(!state.is_team_win(&map, Team::Player));
    }

    #[test]
    fn test_terminal_on_time_limit() {
        let map = SoccerMap::builtin();
        let mut state = two_vs_two();
        state.time_step = 99;
        assert!(!state.is_terminal(&map, 100));
        state.time_step = 100;
        assert!(state.is_terminal(&map, 100));
    }

    #[test]
    fn test_display() {
        let mut state = SoccerState::new(1, &[TilePos::new(2, 4), TilePos::new(11, 4)]);
        state.set_ball_holder(1);
        state.agents[1].mode = Some(ComputerMode::Offensive);
        state.agents[0].action = Action::MoveRight;
        state.time_step = 3;
        assert_eq!(
            state.to_string(),
            "Team PLAYER:\nAgent 1: Position: [2, 4], Action: MOVE_RIGHT\n\
             Team COMPUTER:\nAgent 1: Position: [11, 4], Mode: OFFENSIVE, Action: STAND\n\
             Ball possession: In team COMPUTER with agent 1\nTime step: 3"
        );
    }

    #[test]
    fn test_equality_and_hash() {
        let a = two_vs_two();
        let mut b = two_vs_two();
        assert_eq!(a, b);
        b.time_step = 1;
        assert_ne!(a, b);

        let set: HashSet<SoccerState> = [a.clone(), a, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
