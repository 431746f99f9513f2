use std::path::Path;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use simulation::sim_rng::{SimRng, SEED_ENV_VAR};
use simulation::street_lights::{StreetLightSettings, SETTINGS_ENV_VAR};

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Duskfall".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    });

    // Logging is up once DefaultPlugins is added; the simulation plugin
    // keeps resources inserted here instead of its defaults.
    if let Ok(path) = std::env::var(SETTINGS_ENV_VAR) {
        app.insert_resource(StreetLightSettings::load_or_default(Path::new(&path)));
    }
    if let Ok(seed) = std::env::var(SEED_ENV_VAR) {
        app.insert_resource(SimRng::from_seed_str(&seed));
    }

    app.add_plugins((
        simulation::SimulationPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
    ));

    app.run();
}
