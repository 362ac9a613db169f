//! Headless episode runner

use bevy::log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::env::{EnvOptions, SoccerEnvironment, Team};
use crate::map::SoccerMap;
use crate::render::{FrameRenderer, save_png};

use super::agent::RandomAgent;
use super::config::RunConfig;
use super::db::SessionDatabase;
use super::parallel::{init_parallel, run_episodes_parallel};
use super::summary::{SessionSummary, print_session_summary, write_session_summary};

/// Offset between the environment seed and the agent seed of an episode
const AGENT_SEED_OFFSET: u64 = 0x5eed;

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Episode number (1-based)
    pub episode: u32,
    pub seed: u64,
    pub steps: u32,
    pub total_reward: f32,
    /// None when the time limit ended the episode
    pub winner: Option<Team>,
    /// Number of steps where the ball changed hands
    pub possession_changes: u32,
    /// Steps the PLAYER team held the ball at the end of the step
    pub player_possession_steps: u32,
}

/// Load the map named in the config, or the built-in map
pub fn load_map(config: &RunConfig) -> Arc<SoccerMap> {
    let map = match &config.map_path {
        Some(path) => SoccerMap::load_or_default(path),
        None => SoccerMap::builtin(),
    };
    Arc::new(map)
}

/// Play one episode with a random player team
pub fn run_episode(
    config: &RunConfig,
    map: Arc<SoccerMap>,
    episode: u32,
    seed: u64,
) -> Result<EpisodeResult, String> {
    let options = EnvOptions {
        map_path: None,
        team_size: config.team_size,
        max_time_step: config.max_time_step,
        seed: Some(seed),
    };
    let mut env = SoccerEnvironment::with_map(options, map).map_err(|e| e.to_string())?;
    let mut agent = RandomAgent::new(Some(seed.wrapping_add(AGENT_SEED_OFFSET)));

    let frames = config.screenshot_dir.as_ref().map(|dir| {
        (
            FrameRenderer::new(env.map_handle()),
            PathBuf::from(dir).join(format!("episode_{:04}", episode)),
        )
    });

    let observation = env.reset();
    if config.print_observations {
        println!("{}\n", observation);
    }
    if let Some((renderer, dir)) = &frames {
        save_frames(config, renderer, &env, dir)?;
    }

    let mut result = EpisodeResult {
        episode,
        seed,
        steps: 0,
        total_reward: 0.0,
        winner: None,
        possession_changes: 0,
        player_possession_steps: 0,
    };
    let mut holder = env.state().ball_possession().map(|p| p.agent_index);

    while !env.is_terminal() {
        let actions = agent.act(config.team_size);
        let observation = env.take_action(&actions).map_err(|e| e.to_string())?;
        if config.print_observations {
            println!("{}\n", observation);
        }

        result.steps += 1;
        result.total_reward += observation.reward;

        let possession = env.state().ball_possession();
        let new_holder = possession.map(|p| p.agent_index);
        if new_holder != holder {
            result.possession_changes += 1;
            holder = new_holder;
        }
        if possession.is_some_and(|p| p.team == Team::Player) {
            result.player_possession_steps += 1;
        }

        if let Some((renderer, dir)) = &frames {
            save_frames(config, renderer, &env, dir)?;
        }
    }

    result.winner = env.winner();
    Ok(result)
}

fn save_frames(
    config: &RunConfig,
    renderer: &FrameRenderer,
    env: &SoccerEnvironment,
    dir: &std::path::Path,
) -> Result<(), String> {
    let state = env.state();
    let step = state.time_step;
    save_png(&renderer.screenshot(state), &dir.join(format!("step_{:03}.png", step)))?;
    if let Some(radius) = config.po_radius {
        let po = renderer.po_screenshot(state, 0, radius);
        save_png(&po, &dir.join(format!("step_{:03}_po.png", step)))?;
    }
    Ok(())
}

/// Run every episode of a session, sequentially or in parallel
pub fn run_episodes(
    config: &RunConfig,
    map: Arc<SoccerMap>,
    base_seed: u64,
) -> Vec<Result<EpisodeResult, String>> {
    if config.parallel > 0 {
        return run_episodes_parallel(config, map, base_seed);
    }

    (1..=config.episodes)
        .map(|episode| {
            let seed = base_seed.wrapping_add(episode as u64);
            let result = run_episode(config, Arc::clone(&map), episode, seed);
            if !config.quiet {
                if let Ok(r) = &result {
                    print_episode_line(r);
                }
            }
            result
        })
        .collect()
}

pub fn print_episode_line(result: &EpisodeResult) {
    let outcome = match result.winner {
        Some(team) => format!("{} wins", team),
        None => "time limit".to_string(),
    };
    println!(
        "Episode {:>4}: {:>3} steps, reward {:>4.1}, {}",
        result.episode, result.steps, result.total_reward, outcome
    );
}

/// Run a full session: episodes, summary file and optional database
pub fn run_session(config: &RunConfig) -> Result<SessionSummary, String> {
    let map = load_map(config);
    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());

    if config.parallel > 0 {
        init_parallel(config.parallel);
    }

    info!(
        "Running {} episode(s) on '{}' with team size {} (seed {})",
        config.episodes, map.name, config.team_size, base_seed
    );

    let results = run_episodes(config, Arc::clone(&map), base_seed)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let summary = SessionSummary::from_results(config, &map.name, base_seed, results);

    match write_session_summary(&summary, &config.output_dir) {
        Ok(path) => info!("Session summary written to {}", path.display()),
        Err(e) => warn!("Failed to write session summary: {}", e),
    }

    if let Some(db_path) = &config.db_path {
        let db = SessionDatabase::open(std::path::Path::new(db_path))
            .map_err(|e| format!("Failed to open {}: {}", db_path, e))?;
        db.store_session(&summary)
            .map_err(|e| format!("Failed to store session in {}: {}", db_path, e))?;
        info!("Session stored in {}", db_path);
    }

    if !config.quiet {
        print_session_summary(&summary);
    }

    Ok(summary)
}
