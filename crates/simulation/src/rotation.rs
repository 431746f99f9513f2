//! Constant-speed rotation about an axis: the sun's sweep across the sky and
//! showcase turntables.

use bevy::prelude::*;

use crate::config::{DEFAULT_SUN_DEGREES_PER_SECOND, DEFAULT_TURNTABLE_DEGREES_PER_SECOND};
use crate::simulation_sets::SimulationUpdateSet;

// =============================================================================
// Types
// =============================================================================

/// Frame of reference a rotation axis is expressed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RotationSpace {
    World,
    #[default]
    Local,
}

/// Spins the sun about a world-space axis.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SunRotator {
    pub axis: Vec3,
    pub degrees_per_second: f32,
}

impl Default for SunRotator {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            degrees_per_second: DEFAULT_SUN_DEGREES_PER_SECOND,
        }
    }
}

/// Spins a showcase object.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Turntable {
    pub axis: Vec3,
    pub degrees_per_second: f32,
    pub space: RotationSpace,
}

impl Default for Turntable {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            degrees_per_second: DEFAULT_TURNTABLE_DEGREES_PER_SECOND,
            space: RotationSpace::Local,
        }
    }
}

// =============================================================================
// Math
// =============================================================================

/// Rotation for one frame, or `None` when the axis has no direction.
/// The axis need not be normalized.
pub fn frame_rotation(axis: Vec3, degrees_per_second: f32, delta: f32) -> Option<Quat> {
    let axis = axis.try_normalize()?;
    Some(Quat::from_axis_angle(
        axis,
        (degrees_per_second * delta).to_radians(),
    ))
}

pub fn apply_rotation(transform: &mut Transform, rotation: Quat, space: RotationSpace) {
    match space {
        RotationSpace::World => transform.rotate(rotation),
        RotationSpace::Local => transform.rotate_local(rotation),
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn rotate_suns(time: Res<Time>, mut suns: Query<(&SunRotator, &mut Transform)>) {
    let delta = time.delta_secs();
    for (rotator, mut transform) in &mut suns {
        if let Some(rotation) = frame_rotation(rotator.axis, rotator.degrees_per_second, delta) {
            apply_rotation(&mut transform, rotation, RotationSpace::World);
        }
    }
}

pub fn spin_turntables(time: Res<Time>, mut tables: Query<(&Turntable, &mut Transform)>) {
    let delta = time.delta_secs();
    for (table, mut transform) in &mut tables {
        if let Some(rotation) = frame_rotation(table.axis, table.degrees_per_second, delta) {
            apply_rotation(&mut transform, rotation, table.space);
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct RotationPlugin;

impl Plugin for RotationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (rotate_suns, spin_turntables).in_set(SimulationUpdateSet::Motion),
        );
    }
}
