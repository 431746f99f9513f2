use bevy::prelude::*;

use simulation::rotation::SunRotator;

/// Length of the drawn rotation axis, in world units.
const AXIS_LENGTH: f32 = 5.0;
const TIP_RADIUS: f32 = 0.2;

/// Whether sun rotation axes are drawn.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunAxisGizmos(pub bool);

impl Default for SunAxisGizmos {
    fn default() -> Self {
        Self(true)
    }
}

/// Start and end of the axis line drawn from `origin`. `None` for a zero axis,
/// which never rotates anything.
pub fn sun_axis_segment(origin: Vec3, axis: Vec3) -> Option<(Vec3, Vec3)> {
    let axis = axis.try_normalize()?;
    Some((origin, origin + axis * AXIS_LENGTH))
}

/// Draws each rotating sun's axis as a line with a small sphere at its tip.
pub fn draw_sun_axis_gizmos(
    visible: Res<SunAxisGizmos>,
    suns: Query<(&GlobalTransform, &SunRotator)>,
    mut gizmos: Gizmos,
) {
    if !visible.0 {
        return;
    }

    let color = Color::srgb(1.0, 0.92, 0.016);
    for (transform, rotator) in &suns {
        let Some((start, tip)) = sun_axis_segment(transform.translation(), rotator.axis) else {
            continue;
        };
        gizmos.line(start, tip, color);
        gizmos.sphere(Isometry3d::from_translation(tip), TIP_RADIUS, color);
    }
}
