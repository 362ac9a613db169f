//! Session summary generation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::env::Team;

use super::config::RunConfig;
use super::runner::EpisodeResult;

/// Session summary for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: String,
    pub map_name: String,
    pub team_size: usize,
    pub base_seed: u64,
    pub episodes_played: u32,
    pub player_wins: u32,
    pub computer_wins: u32,
    pub draws: u32,
    pub mean_reward: f32,
    pub mean_steps: f32,
    pub episodes: Vec<EpisodeResult>,
}

impl SessionSummary {
    /// Create summary from episode results
    pub fn from_results(
        config: &RunConfig,
        map_name: &str,
        base_seed: u64,
        episodes: Vec<EpisodeResult>,
    ) -> Self {
        let count = |team: Option<Team>| episodes.iter().filter(|e| e.winner == team).count() as u32;
        let player_wins = count(Some(Team::Player));
        let computer_wins = count(Some(Team::Computer));
        let draws = count(None);

        let n = episodes.len().max(1) as f32;
        let mean_reward = episodes.iter().map(|e| e.total_reward).sum::<f32>() / n;
        let mean_steps = episodes.iter().map(|e| e.steps as f32).sum::<f32>() / n;

        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            map_name: map_name.to_string(),
            team_size: config.team_size,
            base_seed,
            episodes_played: episodes.len() as u32,
            player_wins,
            computer_wins,
            draws,
            mean_reward,
            mean_steps,
            episodes,
        }
    }
}

/// Write the summary as pretty JSON, returning the file path
pub fn write_session_summary(summary: &SessionSummary, dir: &str) -> std::io::Result<PathBuf> {
    let dir = Path::new(dir);
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let short_id = summary.session_id.get(..8).unwrap_or(&summary.session_id);
    let path = dir.join(format!("session_{}_{}.json", timestamp, short_id));

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Print session summary to console
pub fn print_session_summary(summary: &SessionSummary) {
    println!();
    println!("=== Session Summary ===");
    println!("Session:        {}", summary.session_id);
    println!("Map:            {}", summary.map_name);
    println!("Team size:      {}", summary.team_size);
    println!("Base seed:      {}", summary.base_seed);
    println!("Episodes:       {}", summary.episodes_played);
    println!(
        "Results:        PLAYER {} / COMPUTER {} / time limit {}",
        summary.player_wins, summary.computer_wins, summary.draws
    );
    println!("Mean reward:    {:.3}", summary.mean_reward);
    println!("Mean steps:     {:.1}", summary.mean_steps);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(n: u32, winner: Option<Team>, steps: u32) -> EpisodeResult {
        let total_reward = match winner {
            Some(Team::Player) => 1.0,
            Some(Team::Computer) => -1.0,
            None => 0.0,
        };
        EpisodeResult {
            episode: n,
            seed: n as u64,
            steps,
            total_reward,
            winner,
            possession_changes: 0,
            player_possession_steps: 0,
        }
    }

    #[test]
    fn test_summary_counts() {
        let episodes = vec![
            episode(1, Some(Team::Player), 10),
            episode(2, Some(Team::Computer), 20),
            episode(3, Some(Team::Player), 30),
            episode(4, None, 100),
        ];
        let summary = SessionSummary::from_results(&RunConfig::default(), "Soccer", 5, episodes);
        assert_eq!(summary.episodes_played, 4);
        assert_eq!(summary.player_wins, 2);
        assert_eq!(summary.computer_wins, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.mean_reward, 0.25);
        assert_eq!(summary.mean_steps, 40.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = SessionSummary::from_results(&RunConfig::default(), "Soccer", 0, Vec::new());
        assert_eq!(summary.episodes_played, 0);
        assert_eq!(summary.mean_reward, 0.0);
    }

    #[test]
    fn test_write_summary_json() {
        let dir = std::env::temp_dir().join(format!("soccer_summary_{}", uuid::Uuid::new_v4()));
        let summary = SessionSummary::from_results(
            &RunConfig::default(),
            "Soccer",
            1,
            vec![episode(1, Some(Team::Player), 12)],
        );
        let path = write_session_summary(&summary, dir.to_str().unwrap()).unwrap();
        let loaded: SessionSummary = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.session_id, summary.session_id);
        assert_eq!(loaded.episodes[0].winner, Some(Team::Player));
        fs::remove_dir_all(dir).unwrap();
    }
}
