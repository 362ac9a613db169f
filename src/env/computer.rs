//! Scripted computer opponent
//!
//! Each computer agent picks a target tile from its mode and ball possession,
//! then takes the single move that best serves that target.

use rand::Rng;
use rand::seq::SliceRandom;

use super::state::SoccerState;
use super::types::{Action, ComputerMode, StrategicMode, Team};
use crate::map::{SoccerMap, TilePos};

/// Euclidean distance between two tiles
pub fn pos_distance(a: TilePos, b: TilePos) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Action for a computer agent (index within the computer team)
pub fn computer_action<R: Rng>(
    state: &SoccerState,
    map: &SoccerMap,
    computer_agent_index: usize,
    rng: &mut R,
) -> Action {
    let agent_index = state.agent_index(Team::Computer, computer_agent_index);
    let agent = state.agent(agent_index);
    let mode = agent.mode.unwrap_or(ComputerMode::Defensive);

    let nearest_player_pos = state.agent_pos(nearest_player_index(state, computer_agent_index));
    let defensive_target_pos = state.agent_pos(defensive_agent_index(state, computer_agent_index));

    let (target_pos, strategic_mode) = match (mode, agent.has_ball) {
        (ComputerMode::Defensive, true) => (nearest_player_pos, StrategicMode::Avoid),
        (ComputerMode::Defensive, false) => {
            // Guard the player goal tile closest to the threat
            let goal = closest_goal(map.goal_area(Team::Player), defensive_target_pos)
                .unwrap_or(defensive_target_pos);
            (goal, StrategicMode::Approach)
        }
        (ComputerMode::Offensive, true) => {
            // Run for the own goal tile farthest from the nearest player
            let goal = farthest_goal(map.goal_area(Team::Computer), nearest_player_pos)
                .unwrap_or(agent.pos);
            (goal, StrategicMode::Approach)
        }
        (ComputerMode::Offensive, false) => (defensive_target_pos, StrategicMode::Intercept),
    };

    strategic_action(map, agent.pos, target_pos, strategic_mode, rng)
}

/// Player agent closest to a computer agent (first one on ties)
pub fn nearest_player_index(state: &SoccerState, computer_agent_index: usize) -> usize {
    let computer_pos = state.agent_pos(state.agent_index(Team::Computer, computer_agent_index));

    let mut nearest_agent_index = state.agent_index(Team::Player, 0);
    let mut nearest_dist: Option<f64> = None;
    for agent_index in state.team_agents(Team::Player) {
        let dist = pos_distance(computer_pos, state.agent_pos(agent_index));
        if nearest_dist.is_none_or(|nearest| dist < nearest) {
            nearest_agent_index = agent_index;
            nearest_dist = Some(dist);
        }
    }
    nearest_agent_index
}

/// Player a computer agent should mark: the ball holder, else the nearest player
pub fn defensive_agent_index(state: &SoccerState, computer_agent_index: usize) -> usize {
    match state.ball_possession() {
        Some(possession) if possession.team == Team::Player => possession.agent_index,
        _ => nearest_player_index(state, computer_agent_index),
    }
}

fn closest_goal(goals: &[TilePos], from: TilePos) -> Option<TilePos> {
    let mut best: Option<(TilePos, f64)> = None;
    for &goal in goals {
        let dist = pos_distance(goal, from);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((goal, dist));
        }
    }
    best.map(|(goal, _)| goal)
}

fn farthest_goal(goals: &[TilePos], from: TilePos) -> Option<TilePos> {
    let mut best: Option<(TilePos, f64)> = None;
    for &goal in goals {
        let dist = pos_distance(goal, from);
        if best.is_none_or(|(_, best_dist)| dist > best_dist) {
            best = Some((goal, dist));
        }
    }
    best.map(|(goal, _)| goal)
}

/// Pick the move from `source` that best serves `mode` with respect to `target`
///
/// Starts from a random action at the current distance, then scans the
/// actions in random order and keeps strict improvements only. Moves onto
/// non-walkable tiles are never chosen as improvements.
pub fn strategic_action<R: Rng>(
    map: &SoccerMap,
    source: TilePos,
    target: TilePos,
    mode: StrategicMode,
    rng: &mut R,
) -> Action {
    let orig_dist = pos_distance(source, target);

    let mut best_action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
    let mut best_dist = orig_dist;

    let mut shuffled = Action::ALL;
    shuffled.shuffle(rng);

    for action in shuffled {
        let moved = action.apply(source);
        if !map.is_walkable(moved) {
            continue;
        }
        let moved_dist = pos_distance(moved, target);
        let better = match mode {
            StrategicMode::Approach => moved_dist < best_dist,
            StrategicMode::Avoid => moved_dist > best_dist,
            StrategicMode::Intercept => moved_dist < best_dist && moved_dist >= 1.0,
        };
        if better {
            best_action = action;
            best_dist = moved_dist;
        }
    }
    best_action
}
