use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod street_light_panel;

use street_light_panel::StreetLightPanelVisible;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<StreetLightPanelVisible>()
            .add_systems(
                Update,
                (
                    street_light_panel::street_light_panel_keybind,
                    street_light_panel::street_light_panel_ui,
                )
                    .chain(),
            );
    }
}
