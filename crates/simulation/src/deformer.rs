//! Deformer sphere that follows the cursor across a horizontal plane.
//!
//! The rendering crate casts the camera ray; this module only owns the
//! component and the ray/plane projection.

use bevy::prelude::*;

use crate::config::{DEFAULT_DEFORMER_HEIGHT, PLANE_PARALLEL_EPSILON};

/// Marks the entity dragged with the mouse. It hovers at `plane_height`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DeformerDrag {
    pub plane_height: f32,
}

impl Default for DeformerDrag {
    fn default() -> Self {
        Self {
            plane_height: DEFAULT_DEFORMER_HEIGHT,
        }
    }
}

/// Intersect a ray with the plane `y = plane_height`.
///
/// Returns `None` for rays (nearly) parallel to the plane or pointing away
/// from it. The returned point has `y` exactly `plane_height`.
pub fn project_onto_plane(origin: Vec3, direction: Vec3, plane_height: f32) -> Option<Vec3> {
    if direction.y.abs() <= PLANE_PARALLEL_EPSILON {
        return None;
    }
    let t = (plane_height - origin.y) / direction.y;
    if t <= 0.0 {
        return None;
    }
    let hit = origin + direction * t;
    Some(Vec3::new(hit.x, plane_height, hit.z))
}

/// Move `transform` to where the ray meets the deformer's plane.
/// Returns whether it moved.
pub fn drag_to_ray(
    transform: &mut Transform,
    drag: &DeformerDrag,
    origin: Vec3,
    direction: Vec3,
) -> bool {
    match project_onto_plane(origin, direction, drag.plane_height) {
        Some(target) => {
            transform.translation = target;
            true
        }
        None => false,
    }
}
