//! ECS glue for street-light rigs.
//!
//! A rig entity names a sun entity and a lamp root. On the first frame the
//! rig is seen, every `StreetLamp` at or below the lamp root is collected
//! once and a [`StreetLightController`] is attached as [`RigController`].
//! From then on the controller ticks once per frame.

use bevy::prelude::*;

use crate::sim_rng::SimRng;
use crate::simulation_sets::SimulationUpdateSet;

use super::controller::{FrameTime, LightPhase, StreetLightController};
use super::settings::StreetLightSettings;
use super::{OrientationSource, StreetLamp, SunOrientation};

// =============================================================================
// Components
// =============================================================================

/// Configuration of one group of street lamps.
#[derive(Component, Debug, Clone, Default)]
pub struct StreetLightRig {
    /// Live-tunable; read every frame.
    pub settings: StreetLightSettings,
    pub sun: Option<Entity>,
    /// Lamps are this entity and its descendants carrying `StreetLamp`.
    pub lamp_root: Option<Entity>,
}

/// Runtime half of a rig, attached once the lamps have been gathered.
#[derive(Component)]
pub struct RigController {
    pub controller: StreetLightController,
    /// Index-aligned with the controller's flicker seeds.
    pub lamps: Vec<Entity>,
}

impl RigController {
    pub fn phase(&self, settings: &StreetLightSettings) -> LightPhase {
        self.controller.phase(settings)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn collect_lamps(
    root: Entity,
    children: &Query<&Children>,
    lamps: &Query<&mut StreetLamp>,
) -> Vec<Entity> {
    std::iter::once(root)
        .chain(children.iter_descendants(root))
        .filter(|e| lamps.contains(*e))
        .collect()
}

/// `local` composed with the transforms of every ancestor of `entity`.
///
/// Built from `Transform`s directly, so it is current on the frame the sun
/// spawns and on frames where the sun moved before propagation ran.
fn world_transform(
    entity: Entity,
    local: Transform,
    transforms: &Query<&Transform>,
    parents: &Query<&Parent>,
) -> Transform {
    let mut world = local;
    let mut current = entity;
    while let Ok(parent) = parents.get(current) {
        current = parent.get();
        let Ok(parent_transform) = transforms.get(current) else {
            break;
        };
        world = parent_transform.mul_transform(world);
    }
    world
}

fn sun_orientation(
    rig: &StreetLightRig,
    transforms: &Query<&Transform>,
    parents: &Query<&Parent>,
) -> Option<SunOrientation> {
    let sun = rig.sun?;
    let local = transforms.get(sun).ok()?;
    let world = world_transform(sun, *local, transforms, parents);
    Some(SunOrientation::with_world(
        local,
        world,
        rig.settings.forward_space,
    ))
}

fn snapshot(entities: &[Entity], lamps: &Query<&mut StreetLamp>) -> Vec<Option<StreetLamp>> {
    entities
        .iter()
        .map(|e| lamps.get(*e).ok().copied())
        .collect()
}

fn write_back(
    entities: &[Entity],
    snapshot: &[Option<StreetLamp>],
    lamps: &mut Query<&mut StreetLamp>,
) {
    for (entity, lamp) in entities.iter().zip(snapshot) {
        let Some(lamp) = lamp else {
            continue;
        };
        if let Ok(mut current) = lamps.get_mut(*entity) {
            current.set_if_neq(*lamp);
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Gathers lamps and builds the controller for rigs that don't have one yet.
pub fn init_street_light_rigs(
    mut commands: Commands,
    rigs: Query<(Entity, &StreetLightRig), Without<RigController>>,
    children: Query<&Children>,
    mut lamps: Query<&mut StreetLamp>,
    transforms: Query<&Transform>,
    parents: Query<&Parent>,
    mut rng: ResMut<SimRng>,
) {
    for (rig_entity, rig) in &rigs {
        let lamp_entities = match rig.lamp_root {
            Some(root) => collect_lamps(root, &children, &lamps),
            None => {
                warn!("StreetLightRig {:?}: no lamp root assigned", rig_entity);
                Vec::new()
            }
        };

        let orientation = sun_orientation(rig, &transforms, &parents);
        let sun = orientation.as_ref().map(|o| o as &dyn OrientationSource);

        let mut state = snapshot(&lamp_entities, &lamps);
        let controller = StreetLightController::init(&rig.settings, sun, &mut state, &mut *rng);
        write_back(&lamp_entities, &state, &mut lamps);

        commands.entity(rig_entity).insert(RigController {
            controller,
            lamps: lamp_entities,
        });
    }
}

/// Per-frame update of every initialized rig.
pub fn tick_street_lights(
    time: Res<Time>,
    mut rigs: Query<(&StreetLightRig, &mut RigController)>,
    transforms: Query<&Transform>,
    parents: Query<&Parent>,
    mut lamps: Query<&mut StreetLamp>,
) {
    let frame = FrameTime::new(time.delta_secs(), time.elapsed_secs());

    for (rig, mut rig_controller) in &mut rigs {
        if !rig_controller.controller.is_active() {
            continue;
        }
        let orientation = sun_orientation(rig, &transforms, &parents);
        let sun = orientation.as_ref().map(|o| o as &dyn OrientationSource);

        let RigController {
            controller,
            lamps: lamp_entities,
        } = &mut *rig_controller;
        let mut state = snapshot(lamp_entities, &lamps);
        controller.tick(&rig.settings, sun, &mut state, frame);
        write_back(lamp_entities, &state, &mut lamps);
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct StreetLightsPlugin;

impl Plugin for StreetLightsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StreetLightSettings>().add_systems(
            Update,
            (init_street_light_rigs, tick_street_lights)
                .chain()
                .in_set(SimulationUpdateSet::Lighting),
        );
    }
}
