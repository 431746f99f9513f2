use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::FLICKER_SEED_RANGE;
use crate::sim_rng::SimRng;

/// Supplies one flicker seed per lamp, each in `[0, FLICKER_SEED_RANGE)`.
pub trait FlickerSeedSource {
    fn next_seed(&mut self) -> f32;
}

impl FlickerSeedSource for ChaCha8Rng {
    fn next_seed(&mut self) -> f32 {
        self.gen_range(0.0..FLICKER_SEED_RANGE)
    }
}

impl FlickerSeedSource for SimRng {
    fn next_seed(&mut self) -> f32 {
        self.0.next_seed()
    }
}

/// Hands out a fixed list of seeds in order, wrapping around when exhausted.
/// An empty list yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FixedSeeds {
    seeds: Vec<f32>,
    cursor: usize,
}

impl FixedSeeds {
    pub fn new(seeds: impl Into<Vec<f32>>) -> Self {
        Self {
            seeds: seeds.into(),
            cursor: 0,
        }
    }
}

impl FlickerSeedSource for FixedSeeds {
    fn next_seed(&mut self) -> f32 {
        if self.seeds.is_empty() {
            return 0.0;
        }
        let seed = self.seeds[self.cursor % self.seeds.len()];
        self.cursor += 1;
        seed
    }
}
