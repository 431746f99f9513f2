use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::config::{FLICKER_NOISE_FREQUENCY, FLICKER_NOISE_SEED};

/// Smooth 2D noise in `[0, 1]` used to drive lamp flicker.
///
/// Every lamp samples the same field; per-lamp seeds offset the sample point
/// so neighbouring lamps don't flicker in lockstep.
pub struct FlickerNoise {
    noise: FastNoiseLite,
}

impl Default for FlickerNoise {
    fn default() -> Self {
        Self::with_seed(FLICKER_NOISE_SEED)
    }
}

impl FlickerNoise {
    pub fn with_seed(seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(FLICKER_NOISE_FREQUENCY));
        Self { noise }
    }

    /// Noise at `(x, y)`, normalized to `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let raw = self.noise.get_noise_2d(x, y);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Noise value for one lamp at a point in time.
    pub fn sample_lamp(&self, seed: f32, elapsed: f32, speed: f32) -> f32 {
        self.sample(seed + elapsed * speed, seed)
    }
}

/// Maps a noise value onto the flicker range. The result always lies in
/// `[min, max]`, even where float rounding in the lerp overshoots `max`.
pub fn flicker_intensity(min: f32, max: f32, noise: f32) -> f32 {
    lerp(min, max, noise.clamp(0.0, 1.0)).max(min).min(max)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
