pub mod components;
pub mod draw;
pub mod resources;
pub mod systems;

pub use components::*;
pub use resources::*;
use systems::*;

use bevy::prelude::*;
use resources::PointerState;

/// Shows a [`SunburstRes`] in the primary window and feeds it mouse input
/// and frame time.
#[derive(Default)]
pub struct SunburstPlugin;

impl Plugin for SunburstPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (sync_surface_size, handle_pointer, tick_transitions, redraw_sunburst).chain(),
            );
    }
}
