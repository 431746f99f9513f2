//! # TestScene: headless integration test harness
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` with a fixed frame duration so
//! tests can build a scene (sun, lamps, rigs, turntables), advance frames and
//! inspect the resulting ECS state without a window or renderer.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::rotation::{SunRotator, Turntable};
use crate::sim_rng::SimRng;
use crate::street_lights::{
    ControllerState, LightPhase, RigController, StreetLamp, StreetLightRig, StreetLightSettings,
    Sun,
};
use crate::SimulationPlugin;

/// Duration of one `tick()`.
pub const FRAME: Duration = Duration::from_millis(100);

/// A headless Bevy App running `SimulationPlugin` at a fixed 100ms per frame.
pub struct TestScene {
    app: App,
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScene {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create an empty scene and run one update so `Startup` has executed.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        app.update();
        Self { app }
    }

    /// Replace the RNG so flicker seeds are reproducible per test.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.insert_resource(SimRng::from_seed_u64(seed));
        self
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Spawn a sun whose forward vector points along `forward`.
    pub fn spawn_sun(&mut self, forward: Vec3) -> Entity {
        self.app
            .world_mut()
            .spawn((Sun, sun_transform(forward)))
            .id()
    }

    /// Spawn a rotating sun starting at `forward`.
    pub fn spawn_rotating_sun(&mut self, forward: Vec3, rotator: SunRotator) -> Entity {
        self.app
            .world_mut()
            .spawn((Sun, rotator, sun_transform(forward)))
            .id()
    }

    /// Spawn a sun as the child of a pivot entity. `forward` is the sun's
    /// local forward. Returns `(pivot, sun)`.
    pub fn spawn_sun_under_pivot(&mut self, pivot: Transform, forward: Vec3) -> (Entity, Entity) {
        let mut sun = Entity::PLACEHOLDER;
        let pivot = self
            .app
            .world_mut()
            .spawn(pivot)
            .with_children(|parent| {
                sun = parent.spawn((Sun, sun_transform(forward))).id();
            })
            .id();
        (pivot, sun)
    }

    /// Spawn a parent entity with `count` lamp children. Returns `(root, lamps)`.
    pub fn spawn_lamp_group(&mut self, count: usize) -> (Entity, Vec<Entity>) {
        let mut lamps = Vec::with_capacity(count);
        let root = self
            .app
            .world_mut()
            .spawn(Transform::default())
            .with_children(|parent| {
                for i in 0..count {
                    let lamp = parent
                        .spawn((StreetLamp::default(), Transform::from_xyz(i as f32, 0.0, 0.0)))
                        .id();
                    lamps.push(lamp);
                }
            })
            .id();
        (root, lamps)
    }

    pub fn spawn_rig(
        &mut self,
        settings: StreetLightSettings,
        sun: Option<Entity>,
        lamp_root: Option<Entity>,
    ) -> Entity {
        self.app
            .world_mut()
            .spawn(StreetLightRig {
                settings,
                sun,
                lamp_root,
            })
            .id()
    }

    pub fn spawn_turntable(&mut self, turntable: Turntable) -> Entity {
        self.app
            .world_mut()
            .spawn((turntable, Transform::default()))
            .id()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn set_sun_forward(&mut self, sun: Entity, forward: Vec3) {
        if let Some(mut transform) = self.app.world_mut().get_mut::<Transform>(sun) {
            *transform = sun_transform(forward);
        }
    }

    pub fn despawn(&mut self, entity: Entity) {
        let _ = self.app.world_mut().despawn(entity);
    }

    pub fn rig_settings_mut(&mut self, rig: Entity) -> Option<Mut<'_, StreetLightRig>> {
        self.app.world_mut().get_mut::<StreetLightRig>(rig)
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Run `n` frames of [`FRAME`] each.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Run frames until `seconds` of simulated time have passed.
    pub fn tick_seconds(&mut self, seconds: f32) {
        let frames = (seconds / FRAME.as_secs_f32()).ceil() as u32;
        self.tick(frames);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn lamp(&self, lamp: Entity) -> StreetLamp {
        self.app
            .world()
            .get::<StreetLamp>(lamp)
            .copied()
            .unwrap_or_default()
    }

    pub fn transform(&self, entity: Entity) -> Transform {
        self.app
            .world()
            .get::<Transform>(entity)
            .copied()
            .unwrap_or_default()
    }

    pub fn controller(&self, rig: Entity) -> Option<&RigController> {
        self.app.world().get::<RigController>(rig)
    }

    pub fn controller_state(&self, rig: Entity) -> Option<ControllerState> {
        self.controller(rig).map(|c| c.controller.state())
    }

    pub fn phase(&self, rig: Entity) -> Option<LightPhase> {
        let world = self.app.world();
        let settings = &world.get::<StreetLightRig>(rig)?.settings;
        Some(world.get::<RigController>(rig)?.phase(settings))
    }
}

/// Transform whose forward (-Z) axis points along `forward`.
pub fn sun_transform(forward: Vec3) -> Transform {
    let dir = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    Transform::from_rotation(Quat::from_rotation_arc(Vec3::NEG_Z, dir))
}
