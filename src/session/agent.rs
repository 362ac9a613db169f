//! Random agent - baseline policy for exercising the environment

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::env::Action;

/// Picks a uniformly random action for every player agent
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// One action per player agent
    pub fn act(&mut self, team_size: usize) -> Vec<Action> {
        (0..team_size)
            .map(|_| *Action::ALL.choose(&mut self.rng).unwrap_or(&Action::Stand))
            .collect()
    }
}
