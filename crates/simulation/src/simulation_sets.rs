//! Frame ordering via `SystemSet` phases.
//!
//! Plugins place their `Update` systems into one of these sets so that
//! cross-plugin ordering is explicit rather than left to the scheduler:
//!
//! ```text
//! Input  →  Motion  →  Lighting  →  Presentation
//! ```
//!
//! * **Input** – Cursor and keyboard handling (deformer drag, panel toggles).
//! * **Motion** – Transform animation: sun sweep, turntables.
//! * **Lighting** – Street-light rigs read the sun transform written in
//!   `Motion` and update their lamps.
//! * **Presentation** – Mirrors simulation state onto render components
//!   (light intensity, visibility, material bindings).

use bevy::prelude::*;

/// Ordered phases for systems running in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationUpdateSet {
    Input,
    Motion,
    Lighting,
    Presentation,
}

/// Registers the `Update` phases as a chain.
pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimulationUpdateSet::Input,
            SimulationUpdateSet::Motion,
            SimulationUpdateSet::Lighting,
            SimulationUpdateSet::Presentation,
        )
            .chain(),
    );
}
