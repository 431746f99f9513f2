use bevy::prelude::*;

use simulation::deformer::{drag_to_ray, DeformerDrag};

/// Casts the cursor ray from the 3D camera and drags every deformer along
/// its plane. Reports a missing camera once, then stays quiet.
pub fn drag_deformers(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut deformers: Query<(&DeformerDrag, &mut Transform)>,
    mut camera_reported: Local<bool>,
) {
    if deformers.is_empty() {
        return;
    }
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        if !*camera_reported {
            warn!("DeformerDrag: no single 3D camera to cast the cursor ray from");
            *camera_reported = true;
        }
        return;
    };
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(screen_pos) = window.cursor_position() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_transform, screen_pos) else {
        return;
    };

    for (drag, mut transform) in &mut deformers {
        drag_to_ray(&mut transform, drag, ray.origin, *ray.direction);
    }
}
