//! The demo street: a row of lamp posts on a painted terrain, a sun that
//! sweeps through day and night, a turntable showcase and a draggable
//! deformer sphere.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use simulation::deformer::DeformerDrag;
use simulation::rotation::{SunRotator, Turntable};
use simulation::street_lights::{StreetLamp, StreetLightRig, StreetLightSettings, Sun};

use crate::grass::{GrassMaterial, GrassTerrainBinder, TerrainLayer, TerrainPatch};
use crate::SUN_ILLUMINANCE;

pub const LAMP_COUNT: usize = 6;
const LAMP_SPACING: f32 = 6.0;
const POST_HEIGHT: f32 = 4.5;
const LAMP_RANGE: f32 = 14.0;

pub const TERRAIN_SIZE: f32 = 40.0;
const SPLAT_RESOLUTION: u32 = 64;
/// Half-width of the dirt verge along the street.
const VERGE_HALF_WIDTH: f32 = 3.0;
const TUFT_SPACING: f32 = 1.25;

/// Afternoon: pointing down and away, lights off.
const SUN_START_FORWARD: Vec3 = Vec3::new(0.2, -0.6, -0.8);

/// Parent of the lamp posts; the rig gathers lamps below it.
#[derive(Component)]
pub struct LampRow;

#[derive(Component)]
pub struct GrassTuft;

pub fn setup_street_scene(
    mut commands: Commands,
    settings: Res<StreetLightSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut grass_materials: ResMut<Assets<GrassMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    let sun = commands
        .spawn((
            Sun,
            SunRotator {
                axis: Vec3::X,
                ..default()
            },
            DirectionalLight {
                illuminance: SUN_ILLUMINANCE,
                shadows_enabled: true,
                ..default()
            },
            Transform::default().looking_to(SUN_START_FORWARD, Vec3::Y),
        ))
        .id();

    let lamp_root = spawn_lamp_row(&mut commands, &mut meshes, &mut materials);

    commands.spawn((
        Name::new("Street light rig"),
        StreetLightRig {
            settings: settings.clone(),
            sun: Some(sun),
            lamp_root: Some(lamp_root),
        },
    ));

    // Road surface down the middle of the terrain.
    let road_width = 2.0 * VERGE_HALF_WIDTH - 1.0;
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(TERRAIN_SIZE, road_width))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.12, 0.12, 0.13),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, 0.01, 0.0),
    ));

    let terrain = spawn_terrain(&mut commands, &mut meshes, &mut materials, &mut images);

    let grass = grass_materials.add(GrassMaterial::default());
    commands.spawn(GrassTerrainBinder {
        terrain: Some(terrain),
        material: Some(grass.clone()),
    });
    spawn_grass_tufts(&mut commands, &mut meshes, grass);

    // Showcase turntable.
    commands
        .spawn((
            Mesh3d(meshes.add(Cylinder::new(1.4, 0.3))),
            MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.35))),
            Transform::from_xyz(9.0, 0.15, -8.0),
        ))
        .with_children(|pedestal| {
            pedestal.spawn((
                Turntable::default(),
                Mesh3d(meshes.add(Cuboid::new(1.2, 1.2, 1.2))),
                MeshMaterial3d(materials.add(Color::srgb(0.8, 0.35, 0.2))),
                Transform::from_xyz(0.0, 1.0, 0.0)
                    .with_rotation(Quat::from_rotation_x(0.4)),
            ));
        });

    // Deformer sphere following the cursor.
    let deformer = DeformerDrag::default();
    commands.spawn((
        deformer,
        Mesh3d(meshes.add(Sphere::new(0.6))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.9, 1.0),
            metallic: 0.2,
            perceptual_roughness: 0.3,
            ..default()
        })),
        Transform::from_xyz(0.0, deformer.plane_height, 5.0),
    ));
}

fn spawn_lamp_row(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    let post_mesh = meshes.add(Cylinder::new(0.08, POST_HEIGHT));
    let post_material = materials.add(Color::srgb(0.2, 0.22, 0.25));
    let bulb_mesh = meshes.add(Sphere::new(0.18));
    let bulb_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.9, 0.7),
        emissive: LinearRgba::rgb(12.0, 9.0, 4.0),
        ..default()
    });

    let first_x = -LAMP_SPACING * (LAMP_COUNT as f32 - 1.0) / 2.0;
    commands
        .spawn((
            LampRow,
            Name::new("Lamp row"),
            Transform::from_xyz(0.0, 0.0, -VERGE_HALF_WIDTH),
            Visibility::default(),
        ))
        .with_children(|row| {
            for i in 0..LAMP_COUNT {
                let x = first_x + i as f32 * LAMP_SPACING;
                row.spawn((
                    Mesh3d(post_mesh.clone()),
                    MeshMaterial3d(post_material.clone()),
                    Transform::from_xyz(x, POST_HEIGHT / 2.0, 0.0),
                ));
                // The bulb is a child of the lamp so it hides with it.
                row.spawn((
                    StreetLamp::default(),
                    SpotLight {
                        color: Color::srgb(1.0, 0.85, 0.6),
                        intensity: 0.0,
                        range: LAMP_RANGE,
                        outer_angle: 0.9,
                        inner_angle: 0.5,
                        shadows_enabled: true,
                        ..default()
                    },
                    Transform::from_xyz(x, POST_HEIGHT, 0.0)
                        .looking_to(Vec3::new(0.0, -1.0, 0.35), Vec3::Z),
                    Visibility::Hidden,
                ))
                .with_children(|lamp| {
                    lamp.spawn((
                        Mesh3d(bulb_mesh.clone()),
                        MeshMaterial3d(bulb_material.clone()),
                        Transform::default(),
                    ));
                });
            }
        })
        .id()
}

fn spawn_terrain(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
) -> Entity {
    let grass_albedo = images.add(solid_image([70, 120, 45, 255]));
    let dirt_albedo = images.add(solid_image([110, 85, 55, 255]));
    let splat = images.add(verge_splat_map());

    let corner = Vec3::new(-TERRAIN_SIZE / 2.0, 0.0, -TERRAIN_SIZE / 2.0);
    commands
        .spawn((
            Name::new("Terrain"),
            TerrainPatch {
                size: Vec3::new(TERRAIN_SIZE, 1.0, TERRAIN_SIZE),
                splat_map: Some(splat),
                layers: vec![
                    Some(TerrainLayer {
                        albedo: Some(grass_albedo),
                        tile_size: Vec2::splat(4.0),
                    }),
                    Some(TerrainLayer {
                        albedo: Some(dirt_albedo),
                        tile_size: Vec2::splat(2.0),
                    }),
                ],
            },
            Transform::from_translation(corner),
            Visibility::default(),
        ))
        .with_children(|terrain| {
            terrain.spawn((
                Mesh3d(meshes.add(Plane3d::default().mesh().size(TERRAIN_SIZE, TERRAIN_SIZE))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(0.25, 0.35, 0.18),
                    perceptual_roughness: 1.0,
                    ..default()
                })),
                Transform::from_xyz(TERRAIN_SIZE / 2.0, 0.0, TERRAIN_SIZE / 2.0),
            ));
        })
        .id()
}

fn solid_image(rgba: [u8; 4]) -> Image {
    Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// Grass weight in R, dirt weight in G: dirt along the verges, grass beyond.
fn verge_splat_map() -> Image {
    let mut data = Vec::with_capacity((SPLAT_RESOLUTION * SPLAT_RESOLUTION * 4) as usize);
    for row in 0..SPLAT_RESOLUTION {
        let z = (row as f32 + 0.5) / SPLAT_RESOLUTION as f32 * TERRAIN_SIZE - TERRAIN_SIZE / 2.0;
        let dirt = verge_weight(z);
        let dirt_byte = (dirt * 255.0).round() as u8;
        for _ in 0..SPLAT_RESOLUTION {
            data.extend_from_slice(&[255 - dirt_byte, dirt_byte, 0, 0]);
        }
    }
    Image::new(
        Extent3d {
            width: SPLAT_RESOLUTION,
            height: SPLAT_RESOLUTION,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// Dirt weight at distance `z` from the street centre line.
fn verge_weight(z: f32) -> f32 {
    let edge = VERGE_HALF_WIDTH + 2.0;
    (1.0 - (z.abs() - VERGE_HALF_WIDTH) / (edge - VERGE_HALF_WIDTH)).clamp(0.0, 1.0)
}

fn spawn_grass_tufts(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<GrassMaterial>,
) {
    let blade = meshes.add(Rectangle::new(0.5, 0.6));
    let steps = (TERRAIN_SIZE / TUFT_SPACING) as i32;
    for ix in 0..steps {
        for iz in 0..steps {
            let jitter = ((ix * 7 + iz * 13) % 5) as f32 * 0.15;
            let x = -TERRAIN_SIZE / 2.0 + ix as f32 * TUFT_SPACING + jitter;
            let z = -TERRAIN_SIZE / 2.0 + iz as f32 * TUFT_SPACING + 0.6 - jitter;
            if z.abs() < VERGE_HALF_WIDTH - 0.5 {
                continue;
            }
            let yaw = (ix * 31 + iz * 17) as f32 * 0.37;
            commands.spawn((
                GrassTuft,
                Mesh3d(blade.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_xyz(x, 0.3, z).with_rotation(Quat::from_rotation_y(yaw)),
            ));
        }
    }
}
