//! Street-light tuning panel.
//!
//! Provides an egui window with:
//! - The current phase of every street-light rig
//! - Sliders for each rig's live-tunable settings
//! - Sun rotation speed and axis gizmo toggle
//! - A button to rebind grass to its terrain
//! - Keybind (L) to toggle the panel

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use rendering::grass::RebindGrassTerrain;
use rendering::sun_gizmos::SunAxisGizmos;
use simulation::rotation::SunRotator;
use simulation::street_lights::{
    ForwardSpace, RigController, StreetLightRig, StreetLightSettings, Sun,
};

// =============================================================================
// Resources
// =============================================================================

/// Whether the street-light panel is visible.
#[derive(Resource, Default)]
pub struct StreetLightPanelVisible(pub bool);

// =============================================================================
// Systems
// =============================================================================

pub fn street_light_panel_keybind(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut visible: ResMut<StreetLightPanelVisible>,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    if keyboard.just_pressed(KeyCode::KeyL) {
        visible.0 = !visible.0;
    }
}

/// Renders the street-light window.
pub fn street_light_panel_ui(
    mut contexts: EguiContexts,
    mut visible: ResMut<StreetLightPanelVisible>,
    mut rigs: Query<(
        Entity,
        Option<&Name>,
        &mut StreetLightRig,
        Option<&RigController>,
    )>,
    mut suns: Query<&mut SunRotator, With<Sun>>,
    mut sun_axis: ResMut<SunAxisGizmos>,
    mut rebind: EventWriter<RebindGrassTerrain>,
) {
    if !visible.0 {
        return;
    }

    let mut open = true;
    egui::Window::new("Street Lights")
        .open(&mut open)
        .resizable(false)
        .default_width(280.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;

            for mut rotator in &mut suns {
                let mut speed = rotator.degrees_per_second;
                ui.add(egui::Slider::new(&mut speed, 0.0..=90.0).text("sun deg/s"));
                if speed != rotator.degrees_per_second {
                    rotator.degrees_per_second = speed;
                }
            }
            let mut show_axis = sun_axis.0;
            ui.checkbox(&mut show_axis, "Show sun axis");
            sun_axis.set_if_neq(SunAxisGizmos(show_axis));

            for (entity, name, mut rig, controller) in &mut rigs {
                ui.separator();
                let title = name.map_or_else(|| format!("{:?}", entity), |n| n.to_string());
                ui.heading(title);
                ui.label(rig_status(controller, &rig.settings));

                let mut settings = rig.settings.clone();
                settings_editor(ui, &mut settings);
                if settings != rig.settings {
                    rig.settings = settings;
                }
            }

            ui.separator();
            if ui.button("Rebind grass to terrain").clicked() {
                rebind.send(RebindGrassTerrain);
            }
        });

    if !open {
        visible.0 = false;
    }
}

fn settings_editor(ui: &mut egui::Ui, settings: &mut StreetLightSettings) {
    ui.add(
        egui::Slider::new(&mut settings.activation_threshold, -1.0..=1.0).text("threshold"),
    );
    ui.add(egui::Slider::new(&mut settings.hysteresis, 0.0..=0.5).text("hysteresis"));

    ui.horizontal(|ui| {
        ui.label("Sun forward:");
        if ui
            .selectable_label(settings.forward_space == ForwardSpace::World, "Rotation")
            .clicked()
        {
            settings.forward_space = ForwardSpace::World;
        }
        if ui
            .selectable_label(
                settings.forward_space == ForwardSpace::LocalPosition,
                "Position",
            )
            .clicked()
        {
            settings.forward_space = ForwardSpace::LocalPosition;
        }
    });

    ui.add(egui::Slider::new(&mut settings.target_intensity, 0.0..=30.0).text("intensity"));
    ui.add(egui::Slider::new(&mut settings.fade_duration, 0.0..=10.0).text("fade (s)"));

    ui.checkbox(&mut settings.enable_flicker, "Flicker");
    ui.add_enabled_ui(settings.enable_flicker, |ui| {
        let max = settings.flicker_max;
        ui.add(egui::Slider::new(&mut settings.flicker_min, 0.0..=max).text("flicker min"));
        let min = settings.flicker_min;
        ui.add(egui::Slider::new(&mut settings.flicker_max, min..=30.0).text("flicker max"));
        ui.add(egui::Slider::new(&mut settings.flicker_speed, 0.0..=50.0).text("flicker speed"));
    });

    if let Err(err) = settings.validate() {
        ui.colored_label(egui::Color32::LIGHT_RED, err.to_string());
    }
}

/// One-line summary of a rig for the panel.
fn rig_status(controller: Option<&RigController>, settings: &StreetLightSettings) -> String {
    let Some(rig) = controller else {
        return "Waiting for first frame".to_string();
    };
    if let Some(err) = rig.controller.setup_error() {
        return format!("Inactive: {}", err);
    }
    format!(
        "{} ({} lamps)",
        rig.phase(settings).label(),
        rig.controller.lamp_count()
    )
}
