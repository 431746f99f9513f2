//! Street camera.
//!
//! The camera circles a focus point on the road. Right-drag orbits, the
//! wheel dollies in and out, A/D slide the focus along the street and F
//! frames the lamp row again. The camera eases toward its target pose
//! instead of snapping.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::scene::{LampRow, TERRAIN_SIZE};

const ORBIT_SENSITIVITY: f32 = 0.004;
const MIN_ELEVATION: f32 = 0.1;
const MAX_ELEVATION: f32 = 1.45;
/// Fraction of the range covered per wheel line.
const DOLLY_STEP: f32 = 0.1;
const PIXELS_PER_LINE: f32 = 100.0;
const MIN_RANGE: f32 = 4.0;
const MAX_RANGE: f32 = 70.0;
/// Focus speed along the street, in units per second.
const SLIDE_SPEED: f32 = 10.0;
/// Share of the remaining gap closed per second when easing.
const FOLLOW_RATE: f32 = 12.0;

/// Pose of the street camera around its focus point.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct StreetCamera {
    pub focus: Vec3,
    /// Radians around +Y; 0 looks down -Z from the +Z side.
    pub heading: f32,
    /// Radians above the ground plane.
    pub elevation: f32,
    pub range: f32,
}

impl Default for StreetCamera {
    fn default() -> Self {
        Self::framing(Vec3::ZERO)
    }
}

impl StreetCamera {
    /// Three-quarter view of `focus`, far enough back to take in the row.
    pub fn framing(focus: Vec3) -> Self {
        Self {
            focus,
            heading: 0.5,
            elevation: 0.45,
            range: 28.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let turn = Quat::from_euler(EulerRot::YXZ, self.heading, -self.elevation, 0.0);
        self.focus + turn * Vec3::new(0.0, 0.0, self.range)
    }

    pub fn pose(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }

    /// Drag right turns the view left; drag down raises the camera.
    pub fn orbit(&mut self, drag: Vec2) {
        self.heading -= drag.x * ORBIT_SENSITIVITY;
        self.elevation =
            (self.elevation + drag.y * ORBIT_SENSITIVITY).clamp(MIN_ELEVATION, MAX_ELEVATION);
    }

    /// Positive `lines` move closer.
    pub fn dolly(&mut self, lines: f32) {
        self.range = (self.range * (1.0 - lines * DOLLY_STEP)).clamp(MIN_RANGE, MAX_RANGE);
    }

    /// Moves the focus along the street (world X), staying over the terrain.
    pub fn slide(&mut self, distance: f32) {
        let half = TERRAIN_SIZE / 2.0;
        self.focus.x = (self.focus.x + distance).clamp(-half, half);
    }
}

fn scroll_lines(event: &MouseWheel) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => event.y,
        MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
    }
}

/// Moves `current` toward `target`, closing `FOLLOW_RATE * dt` of the gap.
fn ease_toward(current: &Transform, target: &Transform, dt: f32) -> Transform {
    let t = (FOLLOW_RATE * dt).min(1.0);
    Transform {
        translation: current.translation.lerp(target.translation, t),
        rotation: current.rotation.slerp(target.rotation, t),
        scale: current.scale,
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn setup_camera(mut commands: Commands) {
    let camera = StreetCamera::default();
    commands.spawn((Name::new("Street camera"), Camera3d::default(), camera.pose(), camera));
}

pub fn street_camera_input(
    time: Res<Time>,
    buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut cameras: Query<&mut StreetCamera>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let lines: f32 = wheel.read().map(scroll_lines).sum();
    let mut slide = 0.0;
    if keyboard.pressed(KeyCode::KeyA) {
        slide -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        slide += 1.0;
    }

    let Ok(mut camera) = cameras.get_single_mut() else {
        return;
    };
    if buttons.pressed(MouseButton::Right) && drag != Vec2::ZERO {
        camera.orbit(drag);
    }
    if lines != 0.0 {
        camera.dolly(lines);
    }
    if slide != 0.0 {
        camera.slide(slide * SLIDE_SPEED * time.delta_secs());
    }
}

/// F re-centres the camera on the lamp row.
pub fn frame_lamp_row(
    keyboard: Res<ButtonInput<KeyCode>>,
    rows: Query<&Transform, With<LampRow>>,
    mut cameras: Query<&mut StreetCamera>,
) {
    if !keyboard.just_pressed(KeyCode::KeyF) {
        return;
    }
    let Ok(row) = rows.get_single() else {
        return;
    };
    for mut camera in &mut cameras {
        *camera = StreetCamera::framing(row.translation);
    }
}

pub fn follow_street_camera(time: Res<Time>, mut cameras: Query<(&StreetCamera, &mut Transform)>) {
    let dt = time.delta_secs();
    for (camera, mut transform) in &mut cameras {
        let eased = ease_toward(&transform, &camera.pose(), dt);
        transform.set_if_neq(eased);
    }
}
