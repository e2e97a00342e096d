use super::draw::draw_sunburst;
use super::*;
use bevy::prelude::*;
use super::resources::PointerState;
use crate::core::Point;
use bevy::window::PrimaryWindow;
use tracing::error;

pub fn setup_scene(mut commands: Commands, mut res: ResMut<SunburstRes>) {
    commands.spawn(Camera2d);
    if let Err(report) = res.render() {
        error!("initial sunburst render failed: {report:?}");
    }
}

/// Keep the surface size in step with the window and re-render on resize.
pub fn sync_surface_size(windows: Query<&Window, With<PrimaryWindow>>, mut res: ResMut<SunburstRes>) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (w, h) = (window.width() as f64, window.height() as f64);
    let root = res.scene.root();
    if res.scene.dimension(root, "width") == Some(w) && res.scene.dimension(root, "height") == Some(h) {
        return;
    }
    res.scene.set_style(root, "width", format!("{w}px"));
    res.scene.set_style(root, "height", format!("{h}px"));
    if let Err(report) = res.render() {
        error!("sunburst re-render after resize failed: {report:?}");
    }
}

/// Route mouse input the way a browser would: click, click, dblclick.
pub fn handle_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut pointer: ResMut<PointerState>,
    mut res: ResMut<SunburstRes>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let res = &mut *res;

    let Some(cursor) = window.cursor_position() else {
        if pointer.last_position.take().is_some() && res.chart.hovered().is_some() {
            res.chart.pointer_leave(&mut res.scene);
            res.dirty = true;
        }
        return;
    };
    let at = Point::new(cursor.x as f64, cursor.y as f64);

    if pointer.last_position != Some(cursor) {
        pointer.last_position = Some(cursor);
        let before = res.chart.hovered();
        // only a change of hovered wedge alters what is drawn
        if res.chart.pointer_move(&mut res.scene, at) != before {
            res.dirty = true;
        }
    }

    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    if let Err(report) = res.chart.pointer_click(&mut res.scene, at) {
        error!("click failed: {report:?}");
    }
    if pointer.register_click(time.elapsed(), cursor) {
        if let Err(report) = res.chart.pointer_double_click(&mut res.scene, at) {
            error!("double-click failed: {report:?}");
        }
    }
    res.dirty = true;
}

pub fn tick_transitions(time: Res<Time>, mut res: ResMut<SunburstRes>) {
    let res = &mut *res;
    let was_animating = res.chart.is_animating();
    if res.chart.tick(&mut res.scene, time.elapsed()) || was_animating {
        res.dirty = true;
    }
}

/// Respawn the chart's meshes and labels when the scene changed.
pub fn redraw_sunburst(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    roots: Query<Entity, With<SunburstRoot>>,
    mut res: ResMut<SunburstRes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !res.dirty {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    res.dirty = false;

    for root in roots.iter() {
        commands.entity(root).try_despawn();
    }
    let root = commands
        .spawn((SunburstRoot, Transform::default(), Visibility::default()))
        .id();

    let size = Vec2::new(window.width(), window.height());
    draw_sunburst(&mut commands, root, &res.chart, &res.scene, size, &mut meshes, &mut materials);
}
