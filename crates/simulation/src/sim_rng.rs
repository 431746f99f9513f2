//! Deterministic RNG resource.
//!
//! Wraps `ChaCha8Rng` so that identical seeds produce identical flicker
//! seeds (and therefore identical flicker) across runs and platforms.
//! Systems take `ResMut<SimRng>` instead of reaching for `thread_rng()`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Environment variable that overrides [`DEFAULT_SEED`] in the app.
pub const SEED_ENV_VAR: &str = "DUSKFALL_SEED";

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Parse a seed from a string such as an environment variable value.
    /// Unparseable input logs a warning and falls back to the default seed.
    pub fn from_seed_str(value: &str) -> Self {
        match value.trim().parse::<u64>() {
            Ok(seed) => Self::from_seed_u64(seed),
            Err(e) => {
                warn!(
                    "SimRng: invalid seed '{}' ({}), using default {}",
                    value, e, DEFAULT_SEED
                );
                Self::default()
            }
        }
    }
}
