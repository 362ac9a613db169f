//! Parallel episode execution
//!
//! Uses Rayon to play episodes concurrently. Each episode owns its
//! environment; only the map is shared.

use rayon::prelude::*;
use std::sync::Arc;

use crate::map::SoccerMap;

use super::config::RunConfig;
use super::runner::{EpisodeResult, print_episode_line, run_episode};

/// Initialize parallel execution with the given thread count.
/// Call this once at startup before running parallel episodes.
pub fn init_parallel(threads: usize) {
    if threads > 0 {
        // The global pool can only be built once per process
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            bevy::log::debug!("Rayon thread pool already initialized: {}", e);
        }
    }
}

/// Run every episode of a session in parallel
///
/// Episode N gets seed `base_seed + N`, so results match a sequential run.
/// Results are returned in episode order.
pub fn run_episodes_parallel(
    config: &RunConfig,
    map: Arc<SoccerMap>,
    base_seed: u64,
) -> Vec<Result<EpisodeResult, String>> {
    let episodes: Vec<u32> = (1..=config.episodes).collect();
    episodes
        .par_iter()
        .map(|&episode| {
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
