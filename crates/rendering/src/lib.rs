use bevy::prelude::*;

use simulation::street_lights::Sun;
use simulation::SimulationUpdateSet;

pub mod camera;
pub mod deformer_input;
pub mod grass;
pub mod scene;
pub mod street_lamp_render;
pub mod sun_gizmos;

use grass::{GrassMaterial, RebindGrassTerrain};
use sun_gizmos::SunAxisGizmos;

/// Full-daylight illuminance of the sun, in lux.
pub const SUN_ILLUMINANCE: f32 = 10_000.0;
const DAY_AMBIENT: f32 = 300.0;
const NIGHT_AMBIENT: f32 = 15.0;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<GrassMaterial>::default())
            .add_event::<RebindGrassTerrain>()
            .init_resource::<SunAxisGizmos>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    setup_lighting,
                    scene::setup_street_scene,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    camera::street_camera_input,
                    camera::frame_lamp_row,
                    camera::follow_street_camera,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                deformer_input::drag_deformers.in_set(SimulationUpdateSet::Input),
            )
            .add_systems(
                Update,
                (
                    street_lamp_render::sync_street_lamp_lights,
                    update_sun_light,
                    grass::bind_grass_terrain,
                    sun_gizmos::draw_sun_axis_gizmos,
                )
                    .in_set(SimulationUpdateSet::Presentation),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: DAY_AMBIENT,
    });
}

/// 1.0 with the sun straight overhead, 0.0 at or below the horizon.
pub fn daylight_factor(sun_forward: Vec3) -> f32 {
    (-sun_forward.y).clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Dims the sun and ambient light as the sun sinks.
pub fn update_sun_light(
    mut suns: Query<(&Transform, &mut DirectionalLight), With<Sun>>,
    ambient: Option<ResMut<AmbientLight>>,
) {
    let mut brightest = 0.0_f32;
    for (transform, mut light) in &mut suns {
        let daylight = daylight_factor(*transform.forward());
        light.illuminance = SUN_ILLUMINANCE * daylight;
        brightest = brightest.max(daylight);
    }
    if let Some(mut ambient) = ambient {
        ambient.brightness = lerp(NIGHT_AMBIENT, DAY_AMBIENT, brightest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daylight_factor() {
        assert_eq!(daylight_factor(Vec3::NEG_Y), 1.0);
        assert_eq!(daylight_factor(Vec3::Y), 0.0);
        assert_eq!(daylight_factor(Vec3::NEG_Z), 0.0);
        assert!((daylight_factor(Vec3::new(0.0, -0.5, -0.866)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sun_dims_at_night() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(AmbientLight::default())
            .add_systems(Update, update_sun_light);
        let sun = app
            .world_mut()
            .spawn((
                Sun,
                DirectionalLight::default(),
                Transform::default().looking_to(Vec3::new(0.0, 0.5, -0.866), Vec3::Y),
            ))
            .id();

        app.update();

        let world = app.world();
        assert_eq!(world.get::<DirectionalLight>(sun).unwrap().illuminance, 0.0);
        assert_eq!(world.resource::<AmbientLight>().brightness, NIGHT_AMBIENT);
    }
}
