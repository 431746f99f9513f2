//! Integration tests for street-light rigs driven through the ECS.
//!
//! Covers:
//! - Lamp gathering from the lamp root and its descendants
//! - Initial state matching the sun before the first regular frame
//! - Fade-in, steady hold, flicker range
//! - Immediate switch-off when the sun rises
//! - Inert rigs (missing sun, missing lamps)
//! - Despawned lamps being skipped
//! - Live tuning of rig settings

use bevy::prelude::*;

use crate::rotation::SunRotator;
use crate::street_lights::{ControllerSetupError, LightPhase, StreetLamp, StreetLightSettings};
use crate::test_harness::TestScene;

const NIGHT: Vec3 = Vec3::new(0.0, 0.5, -0.866);
const DAY: Vec3 = Vec3::new(0.0, -0.5, -0.866);

fn steady() -> StreetLightSettings {
    StreetLightSettings {
        enable_flicker: false,
        ..Default::default()
    }
}

fn assert_all_off(scene: &TestScene, lamps: &[Entity]) {
    for &lamp in lamps {
        let state = scene.lamp(lamp);
        assert!(!state.enabled, "lamp {:?} should be disabled", lamp);
        assert_eq!(state.intensity, 0.0, "lamp {:?} should be dark", lamp);
    }
}

// ====================================================================
// Initialization
// ====================================================================

#[test]
fn test_rig_gathers_root_descendants_only() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(4);
    let (_, outside) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    scene.tick(1);

    let controller = scene.controller(rig).expect("rig should be initialized");
    assert_eq!(controller.lamps, lamps);
    assert_eq!(controller.controller.flicker_seeds().len(), 4);
    for lamp in lamps {
        assert!(scene.lamp(lamp).enabled);
    }
    assert_all_off(&scene, &outside);
}

#[test]
fn test_lamp_on_root_entity_is_included() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let root = scene.world_mut().spawn(StreetLamp::default()).id();
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    scene.tick(1);

    assert_eq!(scene.controller(rig).unwrap().lamps, vec![root]);
    assert!(scene.lamp(root).enabled);
}

#[test]
fn test_daytime_rig_starts_off() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(DAY);
    let (root, lamps) = scene.spawn_lamp_group(3);
    // Lamps left on by something else get switched off at init.
    for &lamp in &lamps {
        scene.world_mut().entity_mut(lamp).insert(StreetLamp {
            enabled: true,
            intensity: 7.0,
        });
    }
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    scene.tick(1);

    assert_eq!(scene.phase(rig), Some(LightPhase::Off));
    assert_all_off(&scene, &lamps);
}

#[test]
fn test_parented_sun_is_read_in_world_space() {
    let mut scene = TestScene::new();
    // Pointing down locally, but the pivot is upside down.
    let flipped = Transform::from_rotation(Quat::from_rotation_x(std::f32::consts::PI));
    let (pivot, sun) = scene.spawn_sun_under_pivot(flipped, DAY);
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    scene.tick(1);
    assert_eq!(scene.phase(rig), Some(LightPhase::Fading));
    assert!(scene.lamp(lamps[0]).enabled);

    // Righting the pivot brings the sun back above the horizon.
    scene.world_mut().entity_mut(pivot).insert(Transform::IDENTITY);
    scene.tick(1);
    assert_eq!(scene.phase(rig), Some(LightPhase::Off));
    assert_all_off(&scene, &lamps);
}

#[test]
fn test_seeds_are_reproducible_for_same_rng_seed() {
    let build = || {
        let mut scene = TestScene::new().with_seed(7);
        let sun = scene.spawn_sun(NIGHT);
        let (root, _) = scene.spawn_lamp_group(3);
        let rig = scene.spawn_rig(StreetLightSettings::default(), Some(sun), Some(root));
        scene.tick(1);
        scene
            .controller(rig)
            .unwrap()
            .controller
            .flicker_seeds()
            .to_vec()
    };
    let a = build();
    let b = build();
    assert_eq!(a, b);
    assert!(a.iter().all(|s| (0.0..100.0).contains(s)));
}

// ====================================================================
// Fade and steady hold
// ====================================================================

#[test]
fn test_night_fades_in_to_target() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    scene.tick(1);
    assert_eq!(scene.phase(rig), Some(LightPhase::Fading));
    let first = scene.lamp(lamps[0]).intensity;
    assert!(first > 0.0 && first < 10.0, "first fade step was {}", first);

    let mut previous = first;
    for _ in 0..10 {
        scene.tick(1);
        let now = scene.lamp(lamps[0]).intensity;
        assert!(now >= previous, "fade regressed from {} to {}", previous, now);
        previous = now;
    }

    scene.tick_seconds(2.0);
    assert_eq!(scene.phase(rig), Some(LightPhase::Steady));
    for &lamp in &lamps {
        assert_eq!(scene.lamp(lamp).intensity, 10.0);
        assert!(scene.lamp(lamp).enabled);
    }

    // Holding steady: no drift.
    scene.tick(20);
    for &lamp in &lamps {
        assert_eq!(scene.lamp(lamp).intensity, 10.0);
    }
}

#[test]
fn test_sunrise_switches_off_on_same_frame() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(3);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));
    scene.tick(5);
    assert!(scene.lamp(lamps[0]).intensity > 0.0);

    scene.set_sun_forward(sun, DAY);
    scene.tick(1);

    assert_eq!(scene.phase(rig), Some(LightPhase::Off));
    assert_eq!(scene.controller_state(rig).unwrap().fade_elapsed, 0.0);
    assert_all_off(&scene, &lamps);
}

#[test]
fn test_sunset_after_day_restarts_fade_from_zero() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(1);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));
    scene.tick(10);
    let before = scene.lamp(lamps[0]).intensity;

    scene.set_sun_forward(sun, DAY);
    scene.tick(3);
    scene.set_sun_forward(sun, NIGHT);
    scene.tick(1);

    let state = scene.controller_state(rig).unwrap();
    assert!(state.lights_on);
    assert!(
        (state.fade_elapsed - 0.1).abs() < 1e-4,
        "fade should restart, got {}",
        state.fade_elapsed
    );
    assert!(scene.lamp(lamps[0]).intensity < before);
}

// ====================================================================
// Flicker
// ====================================================================

#[test]
fn test_flicker_within_range_after_fade() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(5);
    let rig = scene.spawn_rig(StreetLightSettings::default(), Some(sun), Some(root));
    scene.tick_seconds(2.5);
    assert_eq!(scene.phase(rig), Some(LightPhase::Steady));

    for _ in 0..50 {
        scene.tick(1);
        for &lamp in &lamps {
            let state = scene.lamp(lamp);
            assert!(state.enabled);
            assert!(
                (8.0..=12.0).contains(&state.intensity),
                "flicker {} outside [8, 12]",
                state.intensity
            );
        }
    }
}

// ====================================================================
// Misconfiguration
// ====================================================================

#[test]
fn test_missing_sun_leaves_rig_inert() {
    let mut scene = TestScene::new();
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), None, Some(root));
    scene.tick(5);

    let controller = scene.controller(rig).unwrap();
    assert_eq!(
        controller.controller.setup_error(),
        Some(ControllerSetupError::MissingOrientationSource)
    );
    assert_all_off(&scene, &lamps);
}

#[test]
fn test_sun_entity_without_transform_leaves_rig_inert() {
    let mut scene = TestScene::new();
    let bogus_sun = scene.world_mut().spawn_empty().id();
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(bogus_sun), Some(root));
    scene.tick(3);

    assert!(!scene.controller(rig).unwrap().controller.is_active());
    assert_all_off(&scene, &lamps);
}

#[test]
fn test_missing_lamp_root_leaves_rig_inert() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let rig = scene.spawn_rig(steady(), Some(sun), None);
    scene.tick(3);

    assert_eq!(
        scene.controller(rig).unwrap().controller.setup_error(),
        Some(ControllerSetupError::NoLightHandles)
    );
    assert_eq!(scene.phase(rig), Some(LightPhase::Off));
}

#[test]
fn test_despawned_lamp_is_skipped() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(3);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));
    scene.tick(1);

    scene.despawn(lamps[1]);
    scene.tick_seconds(3.0);

    assert_eq!(scene.controller(rig).unwrap().lamps.len(), 3);
    assert_eq!(scene.lamp(lamps[0]).intensity, 10.0);
    assert_eq!(scene.lamp(lamps[2]).intensity, 10.0);
}

#[test]
fn test_despawned_sun_pauses_rig() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(1);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));
    scene.tick(3);
    let elapsed = scene.controller_state(rig).unwrap().fade_elapsed;
    let intensity = scene.lamp(lamps[0]).intensity;

    scene.despawn(sun);
    scene.tick(5);

    assert_eq!(scene.controller_state(rig).unwrap().fade_elapsed, elapsed);
    assert_eq!(scene.lamp(lamps[0]).intensity, intensity);
}

// ====================================================================
// Live tuning and motion
// ====================================================================

#[test]
fn test_live_settings_change_applies_next_frame() {
    let mut scene = TestScene::new();
    let sun = scene.spawn_sun(NIGHT);
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));
    scene.tick_seconds(2.5);
    assert_eq!(scene.lamp(lamps[0]).intensity, 10.0);

    if let Some(mut rig) = scene.rig_settings_mut(rig) {
        rig.settings.target_intensity = 4.0;
    }
    scene.tick(1);

    for &lamp in &lamps {
        assert_eq!(scene.lamp(lamp).intensity, 4.0);
    }
}

#[test]
fn test_rotating_sun_turns_lights_on() {
    let mut scene = TestScene::new();
    // Starts pointing straight down (midday), sweeps about world X.
    let sun = scene.spawn_rotating_sun(
        Vec3::NEG_Y,
        SunRotator {
            axis: Vec3::X,
            degrees_per_second: 90.0,
        },
    );
    let (root, lamps) = scene.spawn_lamp_group(2);
    let rig = scene.spawn_rig(steady(), Some(sun), Some(root));

    // 0.5s -> 45 degrees: still daylight.
    scene.tick(5);
    assert_eq!(scene.phase(rig), Some(LightPhase::Off));
    assert_all_off(&scene, &lamps);

    // 1.5s -> 135 degrees: the sun now points upward.
    scene.tick(10);
    assert_ne!(scene.phase(rig), Some(LightPhase::Off));
    assert!(scene.lamp(lamps[0]).enabled);
}
