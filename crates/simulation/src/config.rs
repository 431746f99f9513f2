/// Sun forward-vector Y above which street lights switch on.
pub const DEFAULT_ACTIVATION_THRESHOLD: f32 = 0.0;
/// Steady intensity of a fully faded-in street lamp.
pub const DEFAULT_TARGET_INTENSITY: f32 = 10.0;
/// Seconds to fade a lamp from 0 to the target intensity. 0 means instant.
pub const DEFAULT_FADE_DURATION: f32 = 2.0;
pub const DEFAULT_FLICKER_MIN: f32 = 8.0;
pub const DEFAULT_FLICKER_MAX: f32 = 12.0;
/// Noise-space units advanced per second while flickering.
pub const DEFAULT_FLICKER_SPEED: f32 = 15.0;

/// Flicker seeds are drawn uniformly from `[0, FLICKER_SEED_RANGE)`.
pub const FLICKER_SEED_RANGE: f32 = 100.0;
/// Seed of the shared noise field sampled by every lamp.
pub const FLICKER_NOISE_SEED: i32 = 1337;
/// One noise cell per unit of sample space.
pub const FLICKER_NOISE_FREQUENCY: f32 = 1.0;

pub const DEFAULT_SUN_DEGREES_PER_SECOND: f32 = 10.0;
pub const DEFAULT_TURNTABLE_DEGREES_PER_SECOND: f32 = 50.0;

/// World-space height the deformer sphere hovers at.
pub const DEFAULT_DEFORMER_HEIGHT: f32 = 1.5;
/// Rays closer to horizontal than this never reach the drag plane.
pub const PLANE_PARALLEL_EPSILON: f32 = 0.001;
