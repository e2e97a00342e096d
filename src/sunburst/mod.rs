//! Sunburst: a radial partition chart with click-to-zoom.
//!
//! Every node of the hierarchy becomes an annular wedge; its angle is its
//! share of the parent's weight and its ring is its depth. Clicking a wedge
//! animates the scales so that wedge fills the disc. Double-clicking the
//! parent of the previously zoomed node animates back out to the root.
//!
//! The chart never reads a clock. Hosts feed time through [`Sunburst::tick`]
//! and pointer input through the `pointer_*` methods (or the per-node
//! `click` / `double_click` / `mouse*` methods when they do their own hit
//! testing).

mod label;
mod zoom;

pub use label::{LabelPlacement, band_width, line_dy, wrap_words};
pub use zoom::{ScaleState, ZoomPhase, ZoomState, ZoomTween};

use crate::canvas::Canvas;
use crate::color::{CategoricalScale, ColorScale};
use crate::core::{ChartId, Color, HierarchyNode, IdSource, Margin, Point};
use crate::dispatch::{Dispatch, DispatchEvent};
use crate::options::SunburstOptions;
use crate::partition::{NodeId, Partition, PositionedNode};
use crate::scene::{ElementId, Scene, Selection};
use crate::transition::Transition;
use crate::Result;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// How long labels take to fade in once a zoom settles.
pub const LABEL_FADE: Duration = Duration::from_millis(750);
const HOVER_OPACITY: f64 = 0.8;
const WEDGE_STROKE: Color = Color::WHITE;

#[derive(Clone, Debug, PartialEq)]
pub enum SunburstEvent {
    /// Any click on the chart surface, `node` set when it hit a wedge.
    ChartClick {
        node: Option<NodeId>,
        index: usize,
        pointer: Point,
        id: ChartId,
    },
    ElementClick { node: PositionedNode },
    ElementDblClick { node: PositionedNode },
    /// `color` is the wedge's resolved fill.
    ElementMouseover { node: PositionedNode, color: Color },
    ElementMouseout { node: PositionedNode },
    ElementMousemove { node: PositionedNode, pointer: Point },
    RenderEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SunburstEventKind {
    ChartClick,
    ElementClick,
    ElementDblClick,
    ElementMouseover,
    ElementMouseout,
    ElementMousemove,
    RenderEnd,
}

impl DispatchEvent for SunburstEvent {
    type Kind = SunburstEventKind;

    fn kind(&self) -> SunburstEventKind {
        match self {
            SunburstEvent::ChartClick { .. } => SunburstEventKind::ChartClick,
            SunburstEvent::ElementClick { .. } => SunburstEventKind::ElementClick,
            SunburstEvent::ElementDblClick { .. } => SunburstEventKind::ElementDblClick,
            SunburstEvent::ElementMouseover { .. } => SunburstEventKind::ElementMouseover,
            SunburstEvent::ElementMouseout { .. } => SunburstEventKind::ElementMouseout,
            SunburstEvent::ElementMousemove { .. } => SunburstEventKind::ElementMousemove,
            SunburstEvent::RenderEnd => SunburstEventKind::RenderEnd,
        }
    }
}

/// Scene elements drawn for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeElements {
    pub group: ElementId,
    pub path: ElementId,
    pub label: ElementId,
    pub fill: Color,
}

#[derive(Clone, Debug)]
struct LabelFade {
    transition: Transition,
    nodes: Vec<NodeId>,
}

pub struct Sunburst {
    options: SunburstOptions,
    id: ChartId,
    canvas: Canvas,
    dispatch: Dispatch<SunburstEvent>,
    color: Box<dyn ColorScale>,
    data: Vec<HierarchyNode>,
    container: Option<(ElementId, usize)>,
    partition: Option<Partition>,
    elements: Vec<NodeElements>,
    zoom: ZoomState,
    /// Node the scales show, or are heading to. Differs from
    /// `zoom.current` after a zoom out.
    focus: NodeId,
    scales: ScaleState,
    radius: f64,
    tween: Option<ZoomTween>,
    fade: Option<LabelFade>,
    hovered: Option<NodeId>,
    now: Duration,
}

impl Sunburst {
    pub fn new(options: SunburstOptions) -> Self {
        let id = options.id.unwrap_or_else(ChartId::next);
        Self::with_id(options, id)
    }

    /// Takes the id from `ids` unless the options already name one.
    pub fn with_id_source(options: SunburstOptions, ids: &mut dyn IdSource) -> Self {
        let id = options.id.unwrap_or_else(|| ids.next_id());
        Self::with_id(options, id)
    }

    fn with_id(options: SunburstOptions, id: ChartId) -> Self {
        let color = options
            .color
            .clone()
            .map(CategoricalScale::with_palette)
            .unwrap_or_default();
        Self {
            canvas: Canvas::new(options.canvas.clone(), Margin::default()),
            id,
            dispatch: Dispatch::new(),
            color: Box::new(color),
            data: Vec::new(),
            container: None,
            partition: None,
            elements: Vec::new(),
            zoom: ZoomState::new(NodeId(0)),
            focus: NodeId(0),
            scales: ScaleState::new(0.0),
            radius: 0.0,
            tween: None,
            fade: None,
            hovered: None,
            now: Duration::ZERO,
            options,
        }
    }

    pub fn with_color_scale(mut self, color: Box<dyn ColorScale>) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn options(&self) -> &SunburstOptions {
        &self.options
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn dispatch(&mut self) -> &mut Dispatch<SunburstEvent> {
        &mut self.dispatch
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.partition.as_ref().and_then(|p| p.get(id))
    }

    pub fn zoom_state(&self) -> &ZoomState {
        &self.zoom
    }

    /// Node currently filling the disc.
    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn phase(&self) -> ZoomPhase {
        self.zoom.phase
    }

    pub fn scales(&self) -> &ScaleState {
        &self.scales
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn elements(&self, id: NodeId) -> Option<&NodeElements> {
        self.elements.get(id.0)
    }

    /// Wedge under the pointer since the last `pointer_move`.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some() || self.fade.is_some()
    }

    pub fn width(&self) -> f64 {
        self.canvas.width()
    }

    pub fn height(&self) -> f64 {
        self.canvas.height()
    }

    pub fn set_width(&mut self, width: f64) -> &mut Self {
        self.canvas.set_width(width);
        self
    }

    pub fn set_height(&mut self, height: f64) -> &mut Self {
        self.canvas.set_height(height);
        self
    }

    /// Centre of the disc in surface coordinates.
    pub fn center(&self) -> Point {
        let layout = self.canvas.layout();
        Point::new(
            layout.margin.left + layout.available.width / 2.0,
            layout.margin.top + layout.available.height / 2.0,
        )
    }

    pub fn render(&mut self, scene: &mut Scene, selection: &Selection<Vec<HierarchyNode>>) -> Result<()> {
        self.canvas.render_watch().reset();
        for (index, (target, data)) in selection.iter().enumerate() {
            self.canvas.set_root(scene, target)?;
            self.container = Some((target, index));
            self.data = data.clone();
            if self.canvas.no_data(scene, data) {
                self.clear(scene);
                continue;
            }
            self.draw(scene)?;
        }
        // a pass that lands mid-zoom ends when the zoom settles
        if self.tween.is_some() {
            self.canvas.render_watch().watch();
        }
        if self.canvas.render_watch().render_end("sunburst immediate") {
            self.dispatch.emit(&SunburstEvent::RenderEnd);
        }
        Ok(())
    }

    /// Render again into the last container with the last data.
    pub fn update(&mut self, scene: &mut Scene) -> Result<()> {
        let Some((target, _)) = self.container else {
            debug!("sunburst update before first render ignored");
            return Ok(());
        };
        let selection = Selection::single(target, self.data.clone());
        self.render(scene, &selection)
    }

    fn clear(&mut self, scene: &mut Scene) {
        if let Some(wrap) = self.canvas.wrap() {
            scene.remove(wrap.wrap);
        }
        self.partition = None;
        self.elements.clear();
        self.tween = None;
        self.fade = None;
        self.hovered = None;
    }

    fn draw(&mut self, scene: &mut Scene) -> Result<()> {
        let Some(partition) = Partition::from_data(&self.data, self.options.mode) else {
            return Ok(());
        };
        let available = self.canvas.layout().available;
        self.radius = available.width.min(available.height) / 2.0;
        self.zoom.rebase(&partition);
        if partition.get(self.focus).is_none() {
            self.focus = partition.root();
        }

        let focus = partition.get(self.focus).cloned().unwrap_or_default();
        match self.tween.as_mut() {
            Some(tween) => {
                let target = partition.get(tween.target).cloned().unwrap_or_default();
                tween.to = ScaleState::focused(&target, self.options.inner_radius, self.radius);
            }
            None => {
                self.scales = ScaleState::focused(&focus, self.options.inner_radius, self.radius);
            }
        }

        let wrap = self.canvas.wrap_chart(scene, &[])?;
        scene.classed(wrap.wrap, &format!("nv-chart-{}", self.id), true);
        let center = self.center();
        scene.set_attr(wrap.wrap, "transform", format!("translate({},{})", center.x, center.y));

        let wrap_class = format!("g.nv-{}", self.options.canvas.wrap_class);
        let group = scene.select(wrap.g, &wrap_class).unwrap_or(wrap.g);
        scene.clear_children(group);

        let scales = self.scales;
        let arc = scales.arc();
        let labels_hidden = self.tween.is_some();
        let mut elements = Vec::with_capacity(partition.len());
        for node in partition.nodes() {
            let fill = self.fill(&partition, node);
            let g = scene.append(group, "g");
            scene.set_class(g, "nv-sunburst-node");

            let path = scene.append(g, "path");
            scene.set_attr(path, "d", arc.wedge(node).path());
            scene.set_style(path, "fill", fill);
            scene.set_style(path, "stroke", WEDGE_STROKE);

            let label = scene.append(g, "text");
            scene.set_attr(label, "transform", LabelPlacement::of(node, &scales).transform());
            let visible = !labels_hidden && within(&focus, node);
            scene.set_attr(label, "opacity", if visible { 1 } else { 0 });
            let lines = wrap_words(&node.name, band_width(node, &scales), |s| scene.text_width(s));
            for (i, line) in lines.into_iter().enumerate() {
                let tspan = scene.append(label, "tspan");
                scene.set_attr(tspan, "x", 0);
                scene.set_attr(tspan, "dy", line_dy(i));
                scene.set_text(tspan, Some(line));
            }

            elements.push(NodeElements {
                group: g,
                path,
                label,
                fill,
            });
        }

        debug!(
            id = %self.id,
            nodes = partition.len(),
            radius = self.radius,
            focus = %self.focus,
            "sunburst drawn"
        );
        self.elements = elements;
        self.hovered = None;
        self.partition = Some(partition);
        Ok(())
    }

    fn fill(&mut self, partition: &Partition, node: &PositionedNode) -> Color {
        if let Some(color) = node.color {
            return color;
        }
        if self.options.group_color_by_parent {
            let family = match node.parent {
                Some(parent) if !node.has_children() => partition.get(parent).unwrap_or(node),
                _ => node,
            };
            self.color.color(&family.name)
        } else {
            self.color.color(&node.name)
        }
    }

    /// Deepest wedge under `point` (surface coordinates) at the current scales.
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        let partition = self.partition.as_ref()?;
        let offset = point - self.center();
        let arc = self.scales.arc();
        partition
            .nodes()
            .iter()
            .rev()
            .find(|n| arc.wedge(n).contains(offset.x, offset.y))
            .map(|n| n.id)
    }

    /// Click on a wedge: zoom in on it.
    pub fn click(&mut self, scene: &mut Scene, id: NodeId) -> Result<()> {
        let Some(node) = self.node(id).cloned() else {
            warn!(node = %id, "click on unknown sunburst node ignored");
            return Ok(());
        };
        self.zoom.select(id);
        self.dispatch.emit(&SunburstEvent::ElementClick { node });
        self.zoom_to(scene, id, ZoomPhase::ZoomingIn);
        Ok(())
    }

    /// Double-click on a wedge: back out to the root when it is the parent
    /// of the previously zoomed node.
    pub fn double_click(&mut self, scene: &mut Scene, id: NodeId) -> Result<()> {
        let Some(partition) = self.partition.as_ref() else {
            return Ok(());
        };
        let Some(node) = partition.get(id).cloned() else {
            warn!(node = %id, "double-click on unknown sunburst node ignored");
            return Ok(());
        };
        self.dispatch.emit(&SunburstEvent::ElementDblClick { node });
        if self.zoom.unwind(partition, id) {
            let root = self.zoom.root;
            self.zoom_to(scene, root, ZoomPhase::ZoomingOut);
        } else {
            debug!(node = %id, previous = ?self.zoom.previous, "double-click does not unwind");
        }
        Ok(())
    }

    pub fn mouseover(&mut self, scene: &mut Scene, id: NodeId) {
        let (Some(node), Some(el)) = (self.node(id).cloned(), self.elements.get(id.0).copied()) else {
            return;
        };
        scene.classed(el.path, "hover", true);
        scene.set_style(el.path, "opacity", HOVER_OPACITY);
        self.hovered = Some(id);
        self.dispatch.emit(&SunburstEvent::ElementMouseover { node, color: el.fill });
    }

    pub fn mouseout(&mut self, scene: &mut Scene, id: NodeId) {
        let (Some(node), Some(el)) = (self.node(id).cloned(), self.elements.get(id.0).copied()) else {
            return;
        };
        scene.classed(el.path, "hover", false);
        scene.set_style(el.path, "opacity", 1);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.dispatch.emit(&SunburstEvent::ElementMouseout { node });
    }

    pub fn mousemove(&mut self, id: NodeId, pointer: Point) {
        if let Some(node) = self.node(id).cloned() {
            self.dispatch.emit(&SunburstEvent::ElementMousemove { node, pointer });
        }
    }

    /// A click anywhere on the surface. Wedge handling runs before the
    /// chart-level `ChartClick`.
    pub fn pointer_click(&mut self, scene: &mut Scene, pointer: Point) -> Result<Option<NodeId>> {
        let hit = self.hit_test(pointer);
        if let Some(id) = hit {
            self.click(scene, id)?;
        }
        let index = self.container.map_or(0, |(_, index)| index);
        self.dispatch.emit(&SunburstEvent::ChartClick {
            node: hit,
            index,
            pointer,
            id: self.id,
        });
        Ok(hit)
    }

    pub fn pointer_double_click(&mut self, scene: &mut Scene, pointer: Point) -> Result<Option<NodeId>> {
        let hit = self.hit_test(pointer);
        if let Some(id) = hit {
            self.double_click(scene, id)?;
        }
        Ok(hit)
    }

    /// Pointer moved: hover enter/leave plus a move event over a wedge.
    pub fn pointer_move(&mut self, scene: &mut Scene, pointer: Point) -> Option<NodeId> {
        let hit = self.hit_test(pointer);
        if hit != self.hovered {
            if let Some(old) = self.hovered {
                self.mouseout(scene, old);
            }
            if let Some(new) = hit {
                self.mouseover(scene, new);
            }
        }
        if let Some(id) = hit {
            self.mousemove(id, pointer);
        }
        hit
    }

    /// The pointer left the surface.
    pub fn pointer_leave(&mut self, scene: &mut Scene) {
        if let Some(old) = self.hovered {
            self.mouseout(scene, old);
        }
    }

    fn zoom_to(&mut self, scene: &mut Scene, target: NodeId, phase: ZoomPhase) {
        let Some(node) = self.node(target) else { return };
        let to = ScaleState::focused(node, self.options.inner_radius, self.radius);
        debug!(target = %target, ?phase, from = ?self.scales.x.domain, to = ?to.x.domain, "zoom start");

        for el in &self.elements {
            scene.set_attr(el.label, "opacity", 0);
        }
        self.fade = None;
        self.focus = target;
        self.zoom.phase = phase;
        self.tween = Some(ZoomTween {
            from: self.scales,
            to,
            target,
            transition: Transition::new(self.now, self.options.duration()),
        });
        if self.options.duration().is_zero() {
            self.advance_zoom(scene, self.now);
        }
    }

    /// Advance running transitions to host time `now`. Returns whether
    /// anything is still animating.
    pub fn tick(&mut self, scene: &mut Scene, now: Duration) -> bool {
        self.now = now;
        self.advance_zoom(scene, now);
        self.advance_fade(scene, now);
        self.is_animating()
    }

    fn advance_zoom(&mut self, scene: &mut Scene, now: Duration) {
        let Some(tween) = self.tween else { return };
        self.scales = tween.sample(now);
        self.redraw_paths(scene);
        trace!(t = tween.transition.progress(now), "zoom frame");
        if tween.is_complete(now) {
            self.scales = tween.to;
            self.tween = None;
            self.zoom.phase = ZoomPhase::Idle;
            debug!(target = %tween.target, "zoom settled");
            self.start_label_fade(scene, tween.target, now);
            if self.canvas.render_watch().settle() {
                self.dispatch.emit(&SunburstEvent::RenderEnd);
            }
        }
    }

    fn redraw_paths(&self, scene: &mut Scene) {
        let Some(partition) = self.partition.as_ref() else { return };
        let arc = self.scales.arc();
        for (node, el) in partition.nodes().iter().zip(&self.elements) {
            scene.set_attr(el.path, "d", arc.wedge(node).path());
        }
    }

    fn start_label_fade(&mut self, scene: &mut Scene, target: NodeId, now: Duration) {
        let Some(partition) = self.partition.as_ref() else { return };
        let Some(focus) = partition.get(target) else { return };
        let nodes: Vec<NodeId> = partition
            .nodes()
            .iter()
            .filter(|n| within(focus, n))
            .map(|n| n.id)
            .collect();
        for id in &nodes {
            if let (Some(node), Some(el)) = (partition.get(*id), self.elements.get(id.0)) {
                scene.set_attr(el.label, "transform", LabelPlacement::of(node, &self.scales).transform());
            }
        }
        self.fade = Some(LabelFade {
            transition: Transition::new(now, LABEL_FADE),
            nodes,
        });
        self.advance_fade(scene, now);
    }

    fn advance_fade(&mut self, scene: &mut Scene, now: Duration) {
        let Some(fade) = self.fade.as_ref() else { return };
        let opacity = fade.transition.value(now);
        for id in &fade.nodes {
            if let Some(el) = self.elements.get(id.0) {
                scene.set_attr(el.label, "opacity", crate::arc::num(opacity));
            }
        }
        if fade.transition.is_complete(now) {
            self.fade = None;
        }
    }
}

/// Whether `node`'s wedge lies inside `focus`'s angular interval, at or
/// below its ring.
fn within(focus: &PositionedNode, node: &PositionedNode) -> bool {
    const EPS: f64 = 1e-9;
    node.depth_start >= focus.depth_start - EPS
        && node.angle_start >= focus.angle_start - EPS
        && node.angle_end() <= focus.angle_end() + EPS
}
