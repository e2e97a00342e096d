//! The canvas: one chart instance bound to an element of a [`Scene`].
//!
//! A canvas resolves its size (explicit option, then the element's current
//! width/height, then 960x500), keeps margins, draws the "no data" label and
//! owns the group scaffold concrete charts attach their drawing to.

use crate::core::{CanvasLayout, HasValues, Margin, Point, Size};
use crate::dispatch::{Dispatch, DispatchEvent, RenderWatch};
use crate::options::{CanvasOptions, FALLBACK_SIZE};
use crate::scene::{ElementId, Scene, Selection};
use crate::Result;
use tracing::debug;

/// What a tooltip should show and where.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipRequest {
    pub position: Point,
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChartEvent {
    /// Series visibility changed through the legend.
    StateChange { disabled: Vec<bool> },
    /// Visibility override requested by the host.
    ChangeState { disabled: Option<Vec<bool>> },
    RenderEnd,
    TooltipShow(TooltipRequest),
    TooltipHide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartEventKind {
    StateChange,
    ChangeState,
    RenderEnd,
    TooltipShow,
    TooltipHide,
}

impl DispatchEvent for ChartEvent {
    type Kind = ChartEventKind;

    fn kind(&self) -> ChartEventKind {
        match self {
            ChartEvent::StateChange { .. } => ChartEventKind::StateChange,
            ChartEvent::ChangeState { .. } => ChartEventKind::ChangeState,
            ChartEvent::RenderEnd => ChartEventKind::RenderEnd,
            ChartEvent::TooltipShow(_) => ChartEventKind::TooltipShow,
            ChartEvent::TooltipHide => ChartEventKind::TooltipHide,
        }
    }
}

/// Group elements created by [`Canvas::wrap_chart`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wrap {
    /// Outer `g.nv-wrap`, translated by the margins.
    pub wrap: ElementId,
    pub defs: ElementId,
    /// Inner group holding one `g` per wrap class.
    pub g: ElementId,
}

/// The chart-specific step of a render pass.
pub trait WrapChart<D> {
    fn wrap_chart(&mut self, canvas: &mut Canvas, scene: &mut Scene, data: &D) -> Result<()>;
}

impl<D, F> WrapChart<D> for F
where
    F: FnMut(&mut Canvas, &mut Scene, &D) -> Result<()>,
{
    fn wrap_chart(&mut self, canvas: &mut Canvas, scene: &mut Scene, data: &D) -> Result<()> {
        self(canvas, scene, data)
    }
}

#[derive(Debug)]
pub struct Canvas {
    options: CanvasOptions,
    margin: Margin,
    size: Size,
    svg: Option<ElementId>,
    wrap: Option<Wrap>,
    dispatch: Dispatch<ChartEvent>,
    render_watch: RenderWatch,
}

impl Canvas {
    /// `default_margin` fills the sides the options leave unset.
    pub fn new(options: CanvasOptions, default_margin: Margin) -> Self {
        let margin = options.margin.resolve(default_margin);
        Self {
            options,
            margin,
            size: FALLBACK_SIZE,
            svg: None,
            wrap: None,
            dispatch: Dispatch::new(),
            render_watch: RenderWatch::default(),
        }
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    pub fn dispatch(&mut self) -> &mut Dispatch<ChartEvent> {
        &mut self.dispatch
    }

    pub fn render_watch(&mut self) -> &mut RenderWatch {
        &mut self.render_watch
    }

    /// One render pass: bind each element of the selection, run the
    /// chart-specific step, then signal `RenderEnd` once.
    pub fn render<D, W>(&mut self, scene: &mut Scene, selection: &Selection<D>, chart: &mut W) -> Result<()>
    where
        W: WrapChart<D> + ?Sized,
    {
        self.render_watch.reset();
        for (target, data) in selection.iter() {
            self.set_root(scene, target)?;
            chart.wrap_chart(self, scene, data)?;
        }
        let label = format!("{} immediate", self.options.chart_class);
        if self.render_watch.render_end(&label) {
            self.dispatch.emit(&ChartEvent::RenderEnd);
        }
        Ok(())
    }

    /// Make `root` the drawing surface and resolve the size against it.
    pub fn set_root(&mut self, scene: &mut Scene, root: ElementId) -> Result<()> {
        scene.check(root)?;
        let width = self
            .options
            .size
            .width
            .or_else(|| scene.dimension(root, "width"))
            .unwrap_or(FALLBACK_SIZE.width);
        let height = self
            .options
            .size
            .height
            .or_else(|| scene.dimension(root, "height"))
            .unwrap_or(FALLBACK_SIZE.height);

        scene.set_attr(root, "width", width);
        scene.set_attr(root, "height", height);
        if self.svg != Some(root) {
            self.wrap = None;
        }
        self.svg = Some(root);
        self.size = Size::new(width, height);
        debug!(width, height, "canvas root bound");
        Ok(())
    }

    pub fn root(&self) -> Option<ElementId> {
        self.svg
    }

    pub fn layout(&self) -> CanvasLayout {
        CanvasLayout::new(self.size, self.margin)
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn set_margin_top(&mut self, top: f64) {
        self.margin.top = top;
    }

    /// Non-empty, with at least one entry lacking `values` or having some.
    pub fn has_data<T: HasValues>(data: &[T]) -> bool {
        data.iter().any(|d| d.values_len().is_none_or(|n| n > 0))
    }

    /// Show the fallback label when there is no data, remove it otherwise.
    /// Returns whether the label is showing.
    pub fn no_data<T: HasValues>(&mut self, scene: &mut Scene, data: &[T]) -> bool {
        let Some(svg) = self.svg else { return false };
        if Self::has_data(data) {
            for label in scene.select_all(svg, ".nv-noData") {
                scene.remove(label);
            }
            return false;
        }

        let label = match scene.select(svg, ".nv-noData") {
            Some(label) => label,
            None => {
                let label = scene.append(svg, "text");
                scene.set_class(label, "nvd3 nv-noData");
                scene.set_attr(label, "dy", "-.7em");
                scene.set_style(label, "text-anchor", "middle");
                label
            }
        };
        scene.set_attr(label, "x", self.size.width / 2.0);
        scene.set_attr(label, "y", self.size.height / 2.0);
        scene.set_text(label, Some(self.options.no_data.clone()));
        true
    }

    /// Find or build `g.nv-wrap.nv-{chart_class}` with one group per class
    /// in `[wrap_class] + groups`, translated by the margins.
    pub fn wrap_chart(&mut self, scene: &mut Scene, groups: &[&str]) -> Result<Wrap> {
        let svg = self.svg.unwrap_or_else(|| scene.root());
        scene.check(svg)?;
        let chart_class = format!("nv-{}", self.options.chart_class);

        let wrap = match scene.select(svg, &format!("g.nv-wrap.{chart_class}")) {
            Some(wrap) => Wrap {
                wrap,
                defs: scene.select(wrap, "defs").unwrap_or(wrap),
                g: scene.select(wrap, "g").unwrap_or(wrap),
            },
            None => {
                let wrap = scene.append(svg, "g");
                scene.set_class(wrap, &format!("nvd3 nv-wrap {chart_class}"));
                let defs = scene.append(wrap, "defs");
                let g = scene.append(wrap, "g");
                let wrap_class = format!("nv-{}", self.options.wrap_class);
                for class in std::iter::once(wrap_class.as_str()).chain(groups.iter().copied()) {
                    let group = scene.append(g, "g");
                    scene.set_class(group, class);
                }
                Wrap { wrap, defs, g }
            }
        };

        self.translate_wrap(scene, &wrap);
        self.wrap = Some(wrap);
        Ok(wrap)
    }

    pub fn translate_wrap(&self, scene: &mut Scene, wrap: &Wrap) {
        scene.set_attr(
            wrap.wrap,
            "transform",
            format!("translate({},{})", self.margin.left, self.margin.top),
        );
    }

    pub fn wrap(&self) -> Option<Wrap> {
        self.wrap
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Size override used from the next render on.
    pub fn set_width(&mut self, width: f64) -> &mut Self {
        self.options.size.width = Some(width);
        self
    }

    pub fn set_height(&mut self, height: f64) -> &mut Self {
        self.options.size.height = Some(height);
        self
    }
}
