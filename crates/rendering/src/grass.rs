//! Grass that picks up the colour of the terrain it grows on.
//!
//! A [`GrassTerrainBinder`] copies a [`TerrainPatch`]'s placement, splat map
//! and first [`GRASS_LAYER_COUNT`] layers into a [`GrassMaterial`]. The
//! fragment shader blends the layer albedos by the splat weights sampled at
//! each fragment's world position.

use std::fmt;

use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError,
};

/// Splat maps carry one weight per RGBA channel.
pub const GRASS_LAYER_COUNT: usize = 4;

const GRASS_SHADER_PATH: &str = "shaders/grass.wgsl";

// =============================================================================
// Terrain description
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainLayer {
    pub albedo: Option<Handle<Image>>,
    /// World units covered by one repeat of the albedo.
    pub tile_size: Vec2,
}

/// A rectangular terrain starting at the entity's translation and extending
/// `size` along +X/+Y/+Z.
#[derive(Component, Debug, Clone, Default)]
pub struct TerrainPatch {
    pub size: Vec3,
    pub splat_map: Option<Handle<Image>>,
    pub layers: Vec<Option<TerrainLayer>>,
}

// =============================================================================
// Material
// =============================================================================

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct GrassMaterial {
    #[uniform(0)]
    pub base_color: LinearRgba,
    #[uniform(1)]
    pub terrain_position: Vec4,
    #[uniform(2)]
    pub terrain_size: Vec4,
    /// Per layer: x/y tile size, z/w unused.
    #[uniform(3)]
    pub layer_tiling: [Vec4; GRASS_LAYER_COUNT],
    /// 1.0 where the layer has an albedo bound, 0.0 where it renders black.
    #[uniform(4)]
    pub layer_present: Vec4,
    #[texture(5)]
    #[sampler(6)]
    pub splat_map: Option<Handle<Image>>,
    #[texture(7)]
    #[sampler(8)]
    pub layer_albedo_0: Option<Handle<Image>>,
    #[texture(9)]
    #[sampler(10)]
    pub layer_albedo_1: Option<Handle<Image>>,
    #[texture(11)]
    #[sampler(12)]
    pub layer_albedo_2: Option<Handle<Image>>,
    #[texture(13)]
    #[sampler(14)]
    pub layer_albedo_3: Option<Handle<Image>>,
}

impl Default for GrassMaterial {
    fn default() -> Self {
        Self {
            base_color: LinearRgba::WHITE,
            terrain_position: Vec4::ZERO,
            terrain_size: Vec4::ZERO,
            layer_tiling: [Vec4::ZERO; GRASS_LAYER_COUNT],
            layer_present: Vec4::ZERO,
            splat_map: None,
            layer_albedo_0: None,
            layer_albedo_1: None,
            layer_albedo_2: None,
            layer_albedo_3: None,
        }
    }
}

impl GrassMaterial {
    pub fn layer_albedo(&self, index: usize) -> Option<&Handle<Image>> {
        match index {
            0 => self.layer_albedo_0.as_ref(),
            1 => self.layer_albedo_1.as_ref(),
            2 => self.layer_albedo_2.as_ref(),
            3 => self.layer_albedo_3.as_ref(),
            _ => None,
        }
    }

    fn layer_albedo_slot(&mut self, index: usize) -> Option<&mut Option<Handle<Image>>> {
        match index {
            0 => Some(&mut self.layer_albedo_0),
            1 => Some(&mut self.layer_albedo_1),
            2 => Some(&mut self.layer_albedo_2),
            3 => Some(&mut self.layer_albedo_3),
            _ => None,
        }
    }
}

impl Material for GrassMaterial {
    fn fragment_shader() -> ShaderRef {
        GRASS_SHADER_PATH.into()
    }

    // Blades are single quads seen from both sides.
    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Terrain data as the grass shader consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct GrassTerrainUniforms {
    pub position: Vec4,
    pub size: Vec4,
    pub splat_map: Option<Handle<Image>>,
    pub layer_albedo: [Option<Handle<Image>>; GRASS_LAYER_COUNT],
    pub layer_tiling: [Vec4; GRASS_LAYER_COUNT],
}

impl GrassTerrainUniforms {
    /// Layers past the first four are ignored. A missing layer, or one
    /// without an albedo, gets no texture and zero tiling.
    pub fn from_terrain(translation: Vec3, patch: &TerrainPatch) -> Self {
        let mut layer_albedo: [Option<Handle<Image>>; GRASS_LAYER_COUNT] = Default::default();
        let mut layer_tiling = [Vec4::ZERO; GRASS_LAYER_COUNT];

        for (i, layer) in patch.layers.iter().take(GRASS_LAYER_COUNT).enumerate() {
            let Some(TerrainLayer {
                albedo: Some(albedo),
                tile_size,
            }) = layer
            else {
                continue;
            };
            layer_albedo[i] = Some(albedo.clone());
            layer_tiling[i] = Vec4::new(tile_size.x, tile_size.y, 0.0, 0.0);
        }

        Self {
            position: translation.extend(0.0),
            size: patch.size.extend(0.0),
            splat_map: patch.splat_map.clone(),
            layer_albedo,
            layer_tiling,
        }
    }

    /// A terrain without a splat map leaves the material's current one alone.
    pub fn apply_to(self, material: &mut GrassMaterial) {
        material.terrain_position = self.position;
        material.terrain_size = self.size;
        if let Some(splat) = self.splat_map {
            material.splat_map = Some(splat);
        }
        let mut present = [0.0; GRASS_LAYER_COUNT];
        for (i, albedo) in self.layer_albedo.into_iter().enumerate() {
            present[i] = if albedo.is_some() { 1.0 } else { 0.0 };
            if let Some(slot) = material.layer_albedo_slot(i) {
                *slot = albedo;
            }
        }
        material.layer_present = Vec4::from_array(present);
        material.layer_tiling = self.layer_tiling;
    }
}

/// Points a grass material at the terrain it should blend with.
#[derive(Component, Debug, Clone, Default)]
pub struct GrassTerrainBinder {
    pub terrain: Option<Entity>,
    pub material: Option<Handle<GrassMaterial>>,
}

/// Ask every binder to copy its terrain's data again, e.g. after the
/// terrain's layers were repainted.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RebindGrassTerrain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrassBindError {
    /// No terrain entity assigned, or it has no `TerrainPatch`.
    MissingTerrain,
    /// No material assigned, or the handle doesn't resolve.
    MissingMaterial,
}

impl fmt::Display for GrassBindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrassBindError::MissingTerrain => write!(f, "target terrain is not assigned"),
            GrassBindError::MissingMaterial => write!(f, "no grass material assigned"),
        }
    }
}

impl std::error::Error for GrassBindError {}

pub fn bind_grass(
    binder: &GrassTerrainBinder,
    terrains: &Query<(&Transform, &TerrainPatch)>,
    materials: &mut Assets<GrassMaterial>,
) -> Result<(), GrassBindError> {
    let (transform, patch) = binder
        .terrain
        .and_then(|e| terrains.get(e).ok())
        .ok_or(GrassBindError::MissingTerrain)?;
    let material = binder
        .material
        .as_ref()
        .and_then(|handle| materials.get_mut(handle))
        .ok_or(GrassBindError::MissingMaterial)?;
    GrassTerrainUniforms::from_terrain(transform.translation, patch).apply_to(material);
    Ok(())
}

/// Binds new or edited binders, and all of them on `RebindGrassTerrain`.
pub fn bind_grass_terrain(
    mut requests: EventReader<RebindGrassTerrain>,
    binders: Query<(Entity, Ref<GrassTerrainBinder>)>,
    terrains: Query<(&Transform, &TerrainPatch)>,
    mut materials: ResMut<Assets<GrassMaterial>>,
) {
    let rebind_all = requests.read().count() > 0;
    for (entity, binder) in &binders {
        if !rebind_all && !binder.is_changed() {
            continue;
        }
        match bind_grass(&binder, &terrains, &mut materials) {
            Ok(()) => info!("GrassTerrainBinder {:?}: terrain data bound", entity),
            Err(err) => error!("GrassTerrainBinder {:?}: {}", entity, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: u128) -> Handle<Image> {
        Handle::weak_from_u128(id)
    }

    fn layer(id: u128, tile: Vec2) -> Option<TerrainLayer> {
        Some(TerrainLayer {
            albedo: Some(image(id)),
            tile_size: tile,
        })
    }

    #[test]
    fn test_uniforms_from_full_terrain() {
        let patch = TerrainPatch {
            size: Vec3::new(40.0, 5.0, 30.0),
            splat_map: Some(image(1)),
            layers: vec![
                layer(10, Vec2::new(2.0, 3.0)),
                layer(11, Vec2::splat(4.0)),
            ],
        };
        let uniforms = GrassTerrainUniforms::from_terrain(Vec3::new(-20.0, 0.0, -15.0), &patch);

        assert_eq!(uniforms.position, Vec4::new(-20.0, 0.0, -15.0, 0.0));
        assert_eq!(uniforms.size, Vec4::new(40.0, 5.0, 30.0, 0.0));
        assert_eq!(uniforms.splat_map, Some(image(1)));
        assert_eq!(uniforms.layer_albedo[0], Some(image(10)));
        assert_eq!(uniforms.layer_tiling[0], Vec4::new(2.0, 3.0, 0.0, 0.0));
        assert_eq!(uniforms.layer_tiling[1], Vec4::new(4.0, 4.0, 0.0, 0.0));
        assert_eq!(uniforms.layer_albedo[2], None);
        assert_eq!(uniforms.layer_tiling[3], Vec4::ZERO);
    }

    #[test]
    fn test_missing_layers_and_albedos_zero_out() {
        let patch = TerrainPatch {
            size: Vec3::ONE,
            splat_map: None,
            layers: vec![
                None,
                Some(TerrainLayer {
                    albedo: None,
                    tile_size: Vec2::splat(9.0),
                }),
                layer(12, Vec2::ONE),
            ],
        };
        let uniforms = GrassTerrainUniforms::from_terrain(Vec3::ZERO, &patch);

        assert_eq!(uniforms.layer_albedo[0], None);
        assert_eq!(uniforms.layer_tiling[0], Vec4::ZERO);
        assert_eq!(uniforms.layer_albedo[1], None);
        assert_eq!(uniforms.layer_tiling[1], Vec4::ZERO);
        assert_eq!(uniforms.layer_albedo[2], Some(image(12)));
    }

    #[test]
    fn test_layers_past_four_are_ignored() {
        let patch = TerrainPatch {
            size: Vec3::ONE,
            splat_map: None,
            layers: (0..6).map(|i| layer(20 + i, Vec2::splat(i as f32 + 1.0))).collect(),
        };
        let uniforms = GrassTerrainUniforms::from_terrain(Vec3::ZERO, &patch);
        assert_eq!(uniforms.layer_albedo[3], Some(image(23)));
        assert_eq!(uniforms.layer_tiling[3], Vec4::new(4.0, 4.0, 0.0, 0.0));
    }

    #[test]
    fn test_apply_keeps_existing_splat_when_terrain_has_none() {
        let mut material = GrassMaterial {
            splat_map: Some(image(5)),
            layer_albedo_1: Some(image(6)),
            ..Default::default()
        };
        let patch = TerrainPatch {
            size: Vec3::splat(2.0),
            splat_map: None,
            layers: vec![layer(7, Vec2::ONE)],
        };
        GrassTerrainUniforms::from_terrain(Vec3::X, &patch).apply_to(&mut material);

        assert_eq!(material.splat_map, Some(image(5)));
        assert_eq!(material.layer_albedo(0), Some(&image(7)));
        // Stale layer textures are cleared.
        assert_eq!(material.layer_albedo(1), None);
        assert_eq!(material.layer_present, Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(material.terrain_position, Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<GrassMaterial>()
            .add_event::<RebindGrassTerrain>()
            .add_systems(Update, bind_grass_terrain);
        app
    }

    fn terrain(app: &mut App, at: Vec3) -> Entity {
        app.world_mut()
            .spawn((
                Transform::from_translation(at),
                TerrainPatch {
                    size: Vec3::new(10.0, 1.0, 10.0),
                    splat_map: Some(image(1)),
                    layers: vec![layer(2, Vec2::splat(3.0))],
                },
            ))
            .id()
    }

    fn material(app: &mut App) -> Handle<GrassMaterial> {
        app.world_mut()
            .resource_mut::<Assets<GrassMaterial>>()
            .add(GrassMaterial::default())
    }

    fn bound(app: &App, handle: &Handle<GrassMaterial>) -> GrassMaterial {
        app.world()
            .resource::<Assets<GrassMaterial>>()
            .get(handle)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_binds_on_spawn() {
        let mut app = app();
        let terrain = terrain(&mut app, Vec3::new(-5.0, 0.0, -5.0));
        let handle = material(&mut app);
        app.world_mut().spawn(GrassTerrainBinder {
            terrain: Some(terrain),
            material: Some(handle.clone()),
        });

        app.update();

        let material = bound(&app, &handle);
        assert_eq!(material.terrain_position, Vec4::new(-5.0, 0.0, -5.0, 0.0));
        assert_eq!(material.splat_map, Some(image(1)));
        assert_eq!(material.layer_tiling[0], Vec4::new(3.0, 3.0, 0.0, 0.0));
    }

    #[test]
    fn test_rebind_event_picks_up_moved_terrain() {
        let mut app = app();
        let terrain = terrain(&mut app, Vec3::ZERO);
        let handle = material(&mut app);
        app.world_mut().spawn(GrassTerrainBinder {
            terrain: Some(terrain),
            material: Some(handle.clone()),
        });
        app.update();

        app.world_mut()
            .entity_mut(terrain)
            .insert(Transform::from_xyz(7.0, 1.0, 2.0));
        app.update();
        // Moving the terrain alone doesn't rebind.
        assert_eq!(bound(&app, &handle).terrain_position, Vec4::ZERO);

        app.world_mut().send_event(RebindGrassTerrain);
        app.update();
        assert_eq!(
            bound(&app, &handle).terrain_position,
            Vec4::new(7.0, 1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn test_missing_terrain_writes_nothing() {
        let mut app = app();
        let handle = material(&mut app);
        let binder = GrassTerrainBinder {
            terrain: None,
            material: Some(handle.clone()),
        };

        let mut state = bevy::ecs::system::SystemState::<Query<(&Transform, &TerrainPatch)>>::new(
            app.world_mut(),
        );
        let world = app.world_mut();
        let terrains = state.get(world);
        let mut materials = Assets::<GrassMaterial>::default();
        assert_eq!(
            bind_grass(&binder, &terrains, &mut materials),
            Err(GrassBindError::MissingTerrain)
        );

        app.world_mut().spawn(binder);
        app.update();
        assert_eq!(bound(&app, &handle).terrain_size, Vec4::ZERO);
    }

    #[test]
    fn test_missing_material_is_reported() {
        let mut app = app();
        let terrain = terrain(&mut app, Vec3::ZERO);
        let binder = GrassTerrainBinder {
            terrain: Some(terrain),
            material: None,
        };
        let mut state = bevy::ecs::system::SystemState::<Query<(&Transform, &TerrainPatch)>>::new(
            app.world_mut(),
        );
        let terrains = state.get(app.world_mut());
        let mut materials = Assets::<GrassMaterial>::default();
        assert_eq!(
            bind_grass(&binder, &terrains, &mut materials),
            Err(GrassBindError::MissingMaterial)
        );
    }
}
