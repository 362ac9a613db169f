//! Session run configuration

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_TIME_STEP;

/// Configuration for a random-agent session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of episodes to play
    pub episodes: u32,
    /// Agents per team (1 or 2)
    pub team_size: usize,
    /// Episode length limit
    pub max_time_step: u32,
    /// Base RNG seed, episode N uses seed + N (None = random)
    pub seed: Option<u64>,
    /// Map file (None = built-in map)
    pub map_path: Option<String>,
    /// Number of parallel threads (0 = sequential, N = N threads)
    pub parallel: usize,
    /// Directory for the JSON session summary
    pub output_dir: String,
    /// Path to SQLite database for storing results
    pub db_path: Option<String>,
    /// Directory for per-step PNG frames (None = no frames)
    pub screenshot_dir: Option<String>,
    /// Also save partially observable frames around player 1 with this radius
    pub po_radius: Option<u32>,
    /// Print every observation
    pub print_observations: bool,
    /// Suppress progress output
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: 1,
            team_size: 1,
            max_time_step: DEFAULT_MAX_TIME_STEP,
            seed: None,
            map_path: None,
            parallel: 0, // Sequential by default
            output_dir: "sessions".to_string(),
            db_path: None,
            screenshot_dir: None,
            po_radius: None,
            print_observations: false,
            quiet: false,
        }
    }
}

/// Template run settings (checked into git)
pub const RUN_SETTINGS_TEMPLATE: &str = "config/run_settings.template.json";
/// Local run settings (gitignored, user's custom settings)
pub const RUN_SETTINGS_FILE: &str = "config/run_settings.json";

impl RunConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Load configuration from default config files
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(RUN_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(RUN_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_arg_list(&args[1..])
    }

    /// Apply command line arguments (without the program name) over the config files
    pub fn from_arg_list(args: &[String]) -> Self {
        let mut config = Self::from_config_files();

        // Explicit settings file replaces the config files
        if let Some(i) = args.iter().position(|a| a == "--settings") {
            if let Some(path) = args.get(i + 1) {
                match Self::from_file(path) {
                    Ok(loaded) => config = loaded,
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
        }

        config.apply_args(args);
        config
    }

    /// Apply `--flag value` overrides
    pub fn apply_args(&mut self, args: &[String]) {
        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--settings" => {
                    // Already handled
                    i += 1;
                }
                "--episodes" | "-n" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        self.episodes = n;
                    }
                    i += 1;
                }
                "--team-size" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        self.team_size = n;
                    }
                    i += 1;
                }
                "--max-steps" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        self.max_time_step = n;
                    }
                    i += 1;
                }
                "--seed" => {
                    self.seed = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--map" => {
                    self.map_path = value.cloned();
                    i += 1;
                }
                "--parallel" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        self.parallel = n;
                    }
                    i += 1;
                }
                "--output" => {
                    if let Some(dir) = value {
                        self.output_dir = dir.clone();
                    }
                    i += 1;
                }
                "--db" => {
                    self.db_path = value.cloned();
                    i += 1;
                }
                "--screenshots" => {
                    self.screenshot_dir = value.cloned();
                    i += 1;
                }
                "--po-radius" => {
                    self.po_radius = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--print" | "-v" => self.print_observations = true,
                "--quiet" | "-q" => self.quiet = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => eprintln!("Warning: unknown argument '{}'", other),
            }
            i += 1;
        }
    }
}

fn print_help() {
    println!("Random agent - play soccer episodes with a randomly acting player team");
    println!();
    println!("Usage: random-agent [options]");
    println!();
    println!("  --settings <file>     Load settings from a JSON file");
    println!("  --episodes, -n <n>    Episodes to play (default 1)");
    println!("  --team-size <n>       Agents per team, 1 or 2 (default 1)");
    println!("  --max-steps <n>       Episode length limit (default {})", DEFAULT_MAX_TIME_STEP);
    println!("  --seed <n>            Base RNG seed");
    println!("  --map <file>          Map file (default: built-in map)");
    println!("  --parallel <n>        Worker threads (0 = sequential)");
    println!("  --output <dir>        Session summary directory (default sessions)");
    println!("  --db <file>           Store results in a SQLite database");
    println!("  --screenshots <dir>   Save a PNG frame per step");
    println!("  --po-radius <n>       Also save partial frames around player 1");
    println!("  --print, -v           Print every observation");
    println!("  --quiet, -q           Suppress progress output");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_args() {
        let mut config = RunConfig::default();
        config.apply_args(&args(&[
            "--episodes", "5", "--team-size", "2", "--seed", "17", "--parallel", "4", "-q",
            "--screenshots", "frames", "--po-radius", "2",
        ]));
        assert_eq!(config.episodes, 5);
        assert_eq!(config.team_size, 2);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.parallel, 4);
        assert!(config.quiet);
        assert_eq!(config.screenshot_dir.as_deref(), Some("frames"));
        assert_eq!(config.po_radius, Some(2));
        assert!(!config.print_observations);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let mut config = RunConfig::default();
        config.apply_args(&args(&["--episodes", "many", "--max-steps", "-3"]));
        assert_eq!(config.episodes, 1);
        assert_eq!(config.max_time_step, DEFAULT_MAX_TIME_STEP);
    }

    #[test]
    fn test_partial_json() {
        let config: RunConfig = serde_json::from_str(r#"{"episodes": 20, "db_path": "runs.db"}"#).unwrap();
        assert_eq!(config.episodes, 20);
        assert_eq!(config.db_path.as_deref(), Some("runs.db"));
        assert_eq!(config.team_size, 1);
        assert_eq!(config.output_dir, "sessions");
    }
}
