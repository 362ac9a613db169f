//! Random agent - play soccer episodes with a randomly acting player team
//!
//! Usage:
//!   cargo run --bin random-agent -- --help
//!   cargo run --bin random-agent -- --episodes 100 --team-size 2 --parallel 4
//!   cargo run --bin random-agent -- --seed 1 --print --screenshots frames

use soccer::logging::init_logging;
use soccer::session::{RunConfig, run_session};

fn main() {
    init_logging();
    let config = RunConfig::from_args();
    if let Err(e) = run_session(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
