//! Mirrors the logical `StreetLamp` state onto Bevy spot lights.
//!
//! The controller works in abstract intensity units (default target 10);
//! the spot light gets that value scaled to lumens. A disabled lamp is
//! hidden, which keeps it out of light extraction entirely.

use bevy::prelude::*;

use simulation::street_lights::StreetLamp;

/// Lumens emitted per unit of lamp intensity.
pub const LUMENS_PER_INTENSITY: f32 = 80_000.0;

pub fn spot_intensity(lamp: &StreetLamp) -> f32 {
    if lamp.enabled {
        lamp.intensity.max(0.0) * LUMENS_PER_INTENSITY
    } else {
        0.0
    }
}

pub fn sync_street_lamp_lights(
    mut lamps: Query<(&StreetLamp, &mut SpotLight, &mut Visibility), Changed<StreetLamp>>,
) {
    for (lamp, mut light, mut visibility) in &mut lamps {
        light.intensity = spot_intensity(lamp);
        let wanted = if lamp.enabled {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}
