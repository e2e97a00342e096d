use crate::core::HierarchyNode;
use crate::scene::{Scene, Selection};
use crate::sunburst::Sunburst;
use bevy::prelude::*;
use std::time::Duration;

/// Clicks closer together than this, in time and distance, form a double-click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);
pub const DOUBLE_CLICK_SLOP: f32 = 4.0;

/// The live chart, the surface it draws into and the data it shows.
#[derive(Resource)]
pub struct SunburstRes {
    pub chart: Sunburst,
    pub scene: Scene,
    pub data: Vec<HierarchyNode>,
    /// Set whenever the scene changed since the last redraw.
    pub dirty: bool,
}

impl SunburstRes {
    pub fn new(chart: Sunburst, data: Vec<HierarchyNode>) -> Self {
        Self {
            chart,
            scene: Scene::new(),
            data,
            dirty: true,
        }
    }

    /// Render the chart into the root of the scene.
    pub fn render(&mut self) -> crate::Result<()> {
        let root = self.scene.root();
        let selection = Selection::single(root, self.data.clone());
        self.chart.render(&mut self.scene, &selection)?;
        self.dirty = true;
        Ok(())
    }
}

#[derive(Resource, Default)]
pub struct PointerState {
    /// Host time and position of the last click.
    pub last_click: Option<(Duration, Vec2)>,
    pub last_position: Option<Vec2>,
}

impl PointerState {
    /// Record a click; true when it completes a double-click.
    pub fn register_click(&mut self, now: Duration, at: Vec2) -> bool {
        let double = self.last_click.is_some_and(|(t, p)| {
            now.saturating_sub(t) <= DOUBLE_CLICK_WINDOW && p.distance(at) <= DOUBLE_CLICK_SLOP
        });
        // a third click starts a new pair
        self.last_click = if double { None } else { Some((now, at)) };
        double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_clicks_pair_up() {
        let mut p = PointerState::default();
        let at = Vec2::new(10.0, 10.0);
        assert!(!p.register_click(Duration::from_millis(0), at));
        assert!(p.register_click(Duration::from_millis(200), at + Vec2::X));
        assert!(!p.register_click(Duration::from_millis(300), at));
    }

    #[test]
    fn slow_or_distant_clicks_do_not() {
        let mut p = PointerState::default();
        let at = Vec2::new(10.0, 10.0);
        p.register_click(Duration::ZERO, at);
        assert!(!p.register_click(Duration::from_millis(400), at));
        assert!(!p.register_click(Duration::from_millis(450), at + Vec2::new(20.0, 0.0)));
    }
}
