//! Street lights driven by the sun's orientation.
//!
//! A street-light rig watches a sun entity and a group of lamps. Once the sun
//! points upward past the activation threshold (i.e. it has set below the
//! horizon) the lamps switch on, fade in, then either hold a steady
//! intensity or flicker on smooth noise. When the sun comes back up they
//! switch off on the same frame.
//!
//! The decision logic lives in [`StreetLightController`], which only knows
//! about the capability traits below and takes time explicitly. The Bevy
//! systems in [`systems`] feed it from the ECS.

use bevy::prelude::*;

pub mod controller;
pub mod flicker;
pub mod seeds;
pub mod settings;
pub mod systems;

pub use controller::{
    ControllerSetupError, ControllerState, FrameTime, LightPhase, StreetLightController,
};
pub use flicker::FlickerNoise;
pub use seeds::{FixedSeeds, FlickerSeedSource};
pub use settings::{ForwardSpace, SettingsError, StreetLightSettings, SETTINGS_ENV_VAR};
pub use systems::{RigController, StreetLightRig, StreetLightsPlugin};

// =============================================================================
// Capabilities
// =============================================================================

/// A controllable light sink: something that can be switched on and off and
/// has a non-negative intensity.
pub trait LightHandle {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn intensity(&self) -> f32;
    fn set_intensity(&mut self, intensity: f32);
}

/// Anything that can report a current forward direction (a simulated sun).
pub trait OrientationSource {
    /// Unit forward vector. `y > 0` means the source points upward.
    fn forward(&self) -> Vec3;
}

// =============================================================================
// Components
// =============================================================================

/// Logical state of a single street lamp.
///
/// The rendering layer mirrors this onto the actual light and its visibility.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct StreetLamp {
    pub enabled: bool,
    pub intensity: f32,
}

impl LightHandle for StreetLamp {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn intensity(&self) -> f32 {
        self.intensity
    }

    fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }
}

/// Marker for the entity whose rotation stands in for the sun.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Sun;

/// Reads a sun transform as an [`OrientationSource`].
///
/// `World` uses the sun's world-space forward, so a sun parented under a
/// rotated pivot is seen the way it is rendered. `LocalPosition` uses the
/// direction of the sun's local translation.
#[derive(Debug, Clone, Copy)]
pub struct SunOrientation {
    world: Transform,
    local_translation: Vec3,
    space: ForwardSpace,
}

impl SunOrientation {
    /// A top-level sun, whose local transform is its world transform.
    pub fn new(transform: &Transform, space: ForwardSpace) -> Self {
        Self::with_world(transform, *transform, space)
    }

    /// A sun with ancestors. `world` is its transform composed with theirs.
    pub fn with_world(local: &Transform, world: Transform, space: ForwardSpace) -> Self {
        Self {
            world,
            local_translation: local.translation,
            space,
        }
    }
}

impl OrientationSource for SunOrientation {
    fn forward(&self) -> Vec3 {
        match self.space {
            ForwardSpace::World => *self.world.forward(),
            ForwardSpace::LocalPosition => self.local_translation.normalize_or_zero(),
        }
    }
}

/// Fixed direction, handy as a stand-in sun.
impl OrientationSource for Vec3 {
    fn forward(&self) -> Vec3 {
        *self
    }
}
