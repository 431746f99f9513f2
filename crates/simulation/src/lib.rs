use bevy::prelude::*;

pub mod config;
pub mod deformer;
pub mod rotation;
pub mod sim_rng;
pub mod simulation_sets;
pub mod street_lights;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationUpdateSet;

/// Headless scene logic: sun motion, turntables, street-light rigs.
///
/// Rendering and input live in other crates; everything here runs under
/// `MinimalPlugins`.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        simulation_sets::configure_sets(app);

        app.init_resource::<sim_rng::SimRng>();

        app.add_plugins((
            rotation::RotationPlugin,
            street_lights::StreetLightsPlugin,
        ));
    }
}
