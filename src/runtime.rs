use bevy::prelude::*;

use crate::core::HierarchyNode;
use crate::render::{SunburstPlugin, SunburstRes};
use crate::sunburst::Sunburst;

#[cfg(not(target_arch = "wasm32"))]
pub fn run_sunburst(chart: Sunburst, data: Vec<HierarchyNode>) {
    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(SunburstRes::new(chart, data))
        .add_plugins((DefaultPlugins.set(ImagePlugin::default_nearest()), SunburstPlugin))
        .run();
}

#[cfg(target_arch = "wasm32")]
pub fn run_sunburst(chart: Sunburst, data: Vec<HierarchyNode>, canvas_id: &str) {
    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(SunburstRes::new(chart, data))
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        canvas: Some(format!("#{}", canvas_id)),
                        fit_canvas_to_parent: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
            SunburstPlugin,
        ))
        .run();
}
