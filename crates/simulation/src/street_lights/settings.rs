//! Tunables for a street-light rig, plus JSON loading and validation.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_ACTIVATION_THRESHOLD, DEFAULT_FADE_DURATION, DEFAULT_FLICKER_MAX,
    DEFAULT_FLICKER_MIN, DEFAULT_FLICKER_SPEED, DEFAULT_TARGET_INTENSITY,
};

/// Environment variable naming a JSON settings file for the app.
pub const SETTINGS_ENV_VAR: &str = "DUSKFALL_SETTINGS";

// =============================================================================
// Types
// =============================================================================

/// Which vector of the sun entity is treated as its forward direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardSpace {
    /// The transform's forward (-Z) axis.
    #[default]
    World,
    /// The normalized translation of the sun relative to its parent.
    LocalPosition,
}

/// Street-light tunables.
///
/// Also used as a resource: the template new rigs are spawned with.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetLightSettings {
    /// Lights are on while the sun's forward Y is above this value.
    pub activation_threshold: f32,
    pub forward_space: ForwardSpace,
    /// Dead band around the threshold. 0 disables it.
    pub hysteresis: f32,
    pub target_intensity: f32,
    /// Seconds; 0 switches straight to the post-fade behaviour.
    pub fade_duration: f32,
    pub enable_flicker: bool,
    pub flicker_min: f32,
    pub flicker_max: f32,
    pub flicker_speed: f32,
}

impl Default for StreetLightSettings {
    fn default() -> Self {
        Self {
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            forward_space: ForwardSpace::World,
            hysteresis: 0.0,
            target_intensity: DEFAULT_TARGET_INTENSITY,
            fade_duration: DEFAULT_FADE_DURATION,
            enable_flicker: true,
            flicker_min: DEFAULT_FLICKER_MIN,
            flicker_max: DEFAULT_FLICKER_MAX,
            flicker_speed: DEFAULT_FLICKER_SPEED,
        }
    }
}

impl StreetLightSettings {
    /// Activation decision for a sun forward Y.
    ///
    /// With a hysteresis band, lights that are already on stay on until the
    /// sun drops below `threshold - band`, and lights that are off need the
    /// sun above `threshold + band`.
    pub fn should_be_on(&self, forward_y: f32, lights_on: bool) -> bool {
        if lights_on {
            forward_y > self.activation_threshold - self.hysteresis
        } else {
            forward_y > self.activation_threshold + self.hysteresis
        }
    }

    /// Whether the fade-in phase applies at all.
    pub fn has_fade(&self) -> bool {
        self.fade_duration > 0.0
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.activation_threshold.is_finite() {
            return Err(SettingsError::Invalid(
                "activation_threshold must be finite".into(),
            ));
        }
        let non_negative = [
            ("target_intensity", self.target_intensity),
            ("fade_duration", self.fade_duration),
            ("flicker_min", self.flicker_min),
            ("flicker_max", self.flicker_max),
            ("flicker_speed", self.flicker_speed),
            ("hysteresis", self.hysteresis),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.flicker_min > self.flicker_max {
            return Err(SettingsError::Invalid(format!(
                "flicker_min ({}) exceeds flicker_max ({})",
                self.flicker_min, self.flicker_max
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load from `path`, logging and falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!("Loaded street light settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!(
                    "Street light settings {}: {}, falling back to defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from loading or validating [`StreetLightSettings`].
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    Io(std::io::Error),
    /// The file is not valid settings JSON.
    Parse(serde_json::Error),
    /// The values parsed but are out of range.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "I/O error: {e}"),
            SettingsError::Parse(e) => write!(f, "Parse error: {e}"),
            SettingsError::Invalid(msg) => write!(f, "Invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}
