//! The street-light state machine.
//!
//! State is just `lights_on` plus the time spent fading in. The visible
//! phases are derived from it:
//!
//! ```text
//! Off      <=> !lights_on
//! Fading   <=> lights_on && fade_elapsed < fade_duration
//! Steady   <=> otherwise (steady hold or flicker)
//! ```
//!
//! Every transition is driven by comparing the sun's forward Y with the
//! activation threshold once per frame.

use std::fmt;

use bevy::prelude::*;

use super::flicker::{flicker_intensity, lerp, FlickerNoise};
use super::seeds::FlickerSeedSource;
use super::settings::StreetLightSettings;
use super::{LightHandle, OrientationSource};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub lights_on: bool,
    /// Seconds spent fading in since the last on/off transition.
    pub fade_elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPhase {
    Off,
    Fading,
    /// Fade complete: steady target intensity, or flicker when enabled.
    Steady,
}

impl LightPhase {
    pub fn label(self) -> &'static str {
        match self {
            LightPhase::Off => "Off",
            LightPhase::Fading => "Fading in",
            LightPhase::Steady => "On",
        }
    }
}

/// Host clock values for one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame. Must not be negative.
    pub delta: f32,
    /// Monotonic seconds since startup; drives flicker.
    pub elapsed: f32,
}

impl FrameTime {
    pub fn new(delta: f32, elapsed: f32) -> Self {
        Self { delta, elapsed }
    }
}

/// Misconfigurations that leave a controller permanently inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerSetupError {
    MissingOrientationSource,
    NoLightHandles,
}

impl fmt::Display for ControllerSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerSetupError::MissingOrientationSource => {
                write!(f, "no sun orientation source assigned")
            }
            ControllerSetupError::NoLightHandles => write!(f, "no street lamps found"),
        }
    }
}

impl std::error::Error for ControllerSetupError {}

// =============================================================================
// Controller
// =============================================================================

/// Switches, fades and flickers a fixed set of lamps based on the sun.
///
/// Lamps are passed in on every call as `&mut [Option<L>]`, index-aligned
/// with the slice given to [`StreetLightController::init`]. `None` slots are
/// lamps that have gone missing; they keep their seed and are skipped.
pub struct StreetLightController {
    state: ControllerState,
    flicker_seeds: Vec<f32>,
    noise: FlickerNoise,
    setup_error: Option<ControllerSetupError>,
}

impl StreetLightController {
    /// Seed every lamp, switch them all off, then make one forced activation
    /// check so the lamps match the sun before the first tick.
    ///
    /// A missing sun or an empty lamp list is logged and yields an inert
    /// controller whose [`tick`](Self::tick) does nothing.
    pub fn init<L: LightHandle>(
        settings: &StreetLightSettings,
        sun: Option<&dyn OrientationSource>,
        lamps: &mut [Option<L>],
        seeds: &mut dyn FlickerSeedSource,
    ) -> Self {
        Self::init_with_noise(settings, sun, lamps, seeds, FlickerNoise::default())
    }

    pub fn init_with_noise<L: LightHandle>(
        settings: &StreetLightSettings,
        sun: Option<&dyn OrientationSource>,
        lamps: &mut [Option<L>],
        seeds: &mut dyn FlickerSeedSource,
        noise: FlickerNoise,
    ) -> Self {
        let flicker_seeds: Vec<f32> = lamps.iter().map(|_| seeds.next_seed()).collect();
        for lamp in lamps.iter_mut().flatten() {
            lamp.set_enabled(false);
            lamp.set_intensity(0.0);
        }

        let mut controller = Self {
            state: ControllerState::default(),
            flicker_seeds,
            noise,
            setup_error: None,
        };

        let sun = match sun {
            None => Err(ControllerSetupError::MissingOrientationSource),
            Some(_) if lamps.is_empty() => Err(ControllerSetupError::NoLightHandles),
            Some(sun) => Ok(sun),
        };
        match sun {
            Ok(sun) => controller.update_activation(settings, sun.forward().y, lamps, true),
            Err(e) => {
                error!("StreetLightController: {}, controller disabled", e);
                controller.setup_error = Some(e);
            }
        }
        controller
    }

    /// Advance one frame: re-evaluate on/off, then fade or flicker.
    ///
    /// Call exactly once per frame; extra calls advance the fade twice.
    /// A `None` sun skips the frame.
    pub fn tick<L: LightHandle>(
        &mut self,
        settings: &StreetLightSettings,
        sun: Option<&dyn OrientationSource>,
        lamps: &mut [Option<L>],
        time: FrameTime,
    ) {
        if self.setup_error.is_some() {
            return;
        }
        let Some(sun) = sun else {
            return;
        };
        debug_assert_eq!(
            lamps.len(),
            self.flicker_seeds.len(),
            "lamp slice must match the slice given to init"
        );

        self.update_activation(settings, sun.forward().y, lamps, false);
        if self.state.lights_on {
            self.apply_effects(settings, lamps, time);
        }
    }

    fn update_activation<L: LightHandle>(
        &mut self,
        settings: &StreetLightSettings,
        forward_y: f32,
        lamps: &mut [Option<L>],
        force: bool,
    ) {
        let should_be_on = settings.should_be_on(forward_y, self.state.lights_on);

        if should_be_on && (!self.state.lights_on || force) {
            if !self.state.lights_on {
                self.state.fade_elapsed = 0.0;
            }
            self.state.lights_on = true;
            for lamp in lamps.iter_mut().flatten() {
                lamp.set_enabled(true);
            }
        } else if !should_be_on && (self.state.lights_on || force) {
            self.state.lights_on = false;
            self.state.fade_elapsed = 0.0;
            for lamp in lamps.iter_mut().flatten() {
                lamp.set_intensity(0.0);
                lamp.set_enabled(false);
            }
        }
    }

    fn apply_effects<L: LightHandle>(
        &mut self,
        settings: &StreetLightSettings,
        lamps: &mut [Option<L>],
        time: FrameTime,
    ) {
        if settings.has_fade() && self.state.fade_elapsed < settings.fade_duration {
            self.state.fade_elapsed += time.delta;
            let ratio = (self.state.fade_elapsed / settings.fade_duration).clamp(0.0, 1.0);
            let intensity = lerp(0.0, settings.target_intensity, ratio);
            for lamp in lamps.iter_mut().flatten() {
                lamp.set_intensity(intensity);
            }
        } else if settings.enable_flicker {
            for (lamp, &seed) in lamps.iter_mut().zip(&self.flicker_seeds) {
                let Some(lamp) = lamp else {
                    continue;
                };
                let noise = self
                    .noise
                    .sample_lamp(seed, time.elapsed, settings.flicker_speed);
                lamp.set_intensity(flicker_intensity(
                    settings.flicker_min,
                    settings.flicker_max,
                    noise,
                ));
            }
        } else {
            for lamp in lamps.iter_mut().flatten() {
                if lamp.intensity() != settings.target_intensity {
                    lamp.set_intensity(settings.target_intensity);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn phase(&self, settings: &StreetLightSettings) -> LightPhase {
        if !self.state.lights_on {
            LightPhase::Off
        } else if self.state.fade_elapsed < settings.fade_duration {
            LightPhase::Fading
        } else {
            LightPhase::Steady
        }
    }

    pub fn flicker_seeds(&self) -> &[f32] {
        &self.flicker_seeds
    }

    pub fn lamp_count(&self) -> usize {
        self.flicker_seeds.len()
    }

    pub fn setup_error(&self) -> Option<ControllerSetupError> {
        self.setup_error
    }

    /// False once setup has failed; an inert controller never recovers.
    pub fn is_active(&self) -> bool {
        self.setup_error.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
