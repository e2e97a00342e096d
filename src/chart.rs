//! Composite charts: a canvas plus a legend, tooltips and series state.

use crate::canvas::{Canvas, ChartEvent, TooltipRequest, Wrap, WrapChart};
use crate::color::{CategoricalScale, ColorScale};
use crate::core::Series;
use crate::dispatch::Dispatch;
use crate::options::{ChartOptions, DEFAULT_MARGIN};
use crate::scene::{ElementId, Scene, Selection};
use crate::Result;
use tracing::debug;

/// Groups every chart adds to the canvas scaffold.
pub const CHART_GROUPS: [&str; 3] = ["nv-x nv-axis", "nv-y nv-axis", "nv-legendWrap"];

/// Visibility of each input series.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartState {
    pub disabled: Vec<bool>,
}

/// Interactive series toggles drawn above the plot.
pub trait Legend: Send + Sync {
    fn set_width(&mut self, width: f64);

    fn render(&mut self, scene: &mut Scene, target: ElementId, data: &[Series]) -> Result<()>;

    /// Height of the last render.
    fn height(&self) -> f64;

    /// Toggle the entry at `index`; returns the new disabled flags.
    fn toggle(&mut self, data: &[Series], index: usize) -> Option<Vec<bool>>;
}

pub trait Tooltip: Send + Sync {
    fn show(&mut self, scene: &mut Scene, root: ElementId, request: &TooltipRequest, content: &str);

    fn hide(&mut self, scene: &mut Scene, root: ElementId);
}

const LEGEND_ROW: f64 = 20.0;
const LEGEND_PAD: f64 = 5.0;
const SYMBOL_SPACE: f64 = 28.0;

/// One row-wrapped entry per series: a symbol circle and the series key.
pub struct SeriesLegend {
    width: f64,
    height: f64,
    color: Box<dyn ColorScale>,
}

impl Default for SeriesLegend {
    fn default() -> Self {
        Self::with_color(Box::new(CategoricalScale::default()))
    }
}

impl SeriesLegend {
    pub fn with_color(color: Box<dyn ColorScale>) -> Self {
        Self {
            width: 400.0,
            height: 0.0,
            color,
        }
    }
}

impl Legend for SeriesLegend {
    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn render(&mut self, scene: &mut Scene, target: ElementId, data: &[Series]) -> Result<()> {
        scene.check(target)?;
        scene.clear_children(target);
        let group = scene.append(target, "g");
        scene.set_class(group, "nvd3 nv-legend");

        let (mut x, mut row) = (0.0, 0usize);
        for series in data {
            let advance = scene.text_width(&series.key) + SYMBOL_SPACE;
            if x > 0.0 && x + advance > self.width {
                x = 0.0;
                row += 1;
            }

            let entry = scene.append(group, "g");
            scene.set_class(entry, "nv-series");
            scene.classed(entry, "nv-disabled", series.disabled);
            let y = LEGEND_PAD + row as f64 * LEGEND_ROW;
            scene.set_attr(entry, "transform", format!("translate({x},{y})"));

            let fill = series.color.unwrap_or_else(|| self.color.color(&series.key));
            let symbol = scene.append(entry, "circle");
            scene.set_class(symbol, "nv-legend-symbol");
            scene.set_attr(symbol, "r", 5);
            scene.set_style(symbol, "fill", fill);
            scene.set_style(symbol, "stroke", fill);
            scene.set_style(symbol, "fill-opacity", if series.disabled { 0 } else { 1 });

            let label = scene.append(entry, "text");
            scene.set_class(label, "nv-legend-text");
            scene.set_attr(label, "dx", 8);
            scene.set_attr(label, "dy", ".32em");
            scene.set_style(label, "text-anchor", "start");
            scene.set_text(label, Some(series.key.clone()));

            x += advance;
        }

        let rows = if data.is_empty() { 0 } else { row + 1 };
        self.height = 2.0 * LEGEND_PAD + rows as f64 * LEGEND_ROW;
        Ok(())
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn toggle(&mut self, data: &[Series], index: usize) -> Option<Vec<bool>> {
        if index >= data.len() {
            return None;
        }
        let mut disabled: Vec<bool> = data.iter().map(|s| s.disabled).collect();
        disabled[index] = !disabled[index];
        // never leave every series hidden
        if disabled.iter().all(|d| *d) {
            disabled.iter_mut().for_each(|d| *d = false);
        }
        Some(disabled)
    }
}

/// Draws tooltip content into a `g.nvtooltip` on the chart surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneTooltip;

impl Tooltip for SceneTooltip {
    fn show(&mut self, scene: &mut Scene, root: ElementId, request: &TooltipRequest, content: &str) {
        let tip = match scene.select(root, "g.nvtooltip") {
            Some(tip) => tip,
            None => {
                let tip = scene.append(root, "g");
                scene.set_class(tip, "nvtooltip xy-tooltip");
                scene.append(tip, "text");
                tip
            }
        };
        scene.set_attr(
            tip,
            "transform",
            format!("translate({},{})", request.position.x, request.position.y),
        );
        if let Some(text) = scene.select(tip, "text") {
            scene.set_text(text, Some(content.to_owned()));
        }
    }

    fn hide(&mut self, scene: &mut Scene, root: ElementId) {
        for tip in scene.select_all(root, "g.nvtooltip") {
            scene.remove(tip);
        }
    }
}

/// A series chart: canvas lifecycle, legend layout and visibility state.
pub struct Chart {
    canvas: Canvas,
    options: ChartOptions,
    legend: Box<dyn Legend>,
    tooltip: Box<dyn Tooltip>,
    state: ChartState,
    default_state: Option<ChartState>,
    data: Vec<Series>,
}

impl Chart {
    pub fn new(options: ChartOptions) -> Self {
        Self {
            canvas: Canvas::new(options.canvas.clone(), DEFAULT_MARGIN),
            options,
            legend: Box::new(SeriesLegend::default()),
            tooltip: Box::new(SceneTooltip),
            state: ChartState::default(),
            default_state: None,
            data: Vec::new(),
        }
    }

    pub fn with_legend(mut self, legend: Box<dyn Legend>) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_tooltip(mut self, tooltip: Box<dyn Tooltip>) -> Self {
        self.tooltip = tooltip;
        self
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn dispatch(&mut self) -> &mut Dispatch<ChartEvent> {
        self.canvas.dispatch()
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    /// Visibility as first rendered; never changes afterwards.
    pub fn default_state(&self) -> Option<&ChartState> {
        self.default_state.as_ref()
    }

    pub fn data(&self) -> &[Series] {
        &self.data
    }

    pub fn show_legend(&self) -> bool {
        self.options.show_legend
    }

    pub fn set_show_legend(&mut self, on: bool) -> &mut Self {
        self.options.show_legend = on;
        self
    }

    pub fn render(&mut self, scene: &mut Scene, selection: &Selection<Vec<Series>>) -> Result<()> {
        let mut body = ChartBody {
            legend: self.legend.as_mut(),
            state: &mut self.state,
            default_state: &mut self.default_state,
            show_legend: self.options.show_legend,
        };
        self.canvas.render(scene, selection, &mut body)?;
        if let Some((_, data)) = selection.iter().last() {
            self.data = data.clone();
        }
        Ok(())
    }

    /// Render again into the last bound surface with the stored series.
    pub fn update(&mut self, scene: &mut Scene) -> Result<()> {
        let Some(root) = self.canvas.root() else {
            debug!("update before first render ignored");
            return Ok(());
        };
        let selection = Selection::single(root, self.data.clone());
        self.render(scene, &selection)
    }

    /// Host-driven visibility override.
    pub fn change_state(&mut self, scene: &mut Scene, disabled: Option<Vec<bool>>) -> Result<()> {
        self.canvas.dispatch().emit(&ChartEvent::ChangeState {
            disabled: disabled.clone(),
        });
        if let Some(disabled) = disabled {
            self.apply_disabled(&disabled);
        }
        self.update(scene)
    }

    /// A click on legend entry `index`.
    pub fn legend_click(&mut self, scene: &mut Scene, index: usize) -> Result<()> {
        let Some(disabled) = self.legend.toggle(&self.data, index) else {
            return Ok(());
        };
        debug!(index, ?disabled, "legend state change");
        self.apply_disabled(&disabled);
        self.canvas.dispatch().emit(&ChartEvent::StateChange { disabled });
        self.update(scene)
    }

    pub fn restore_default_state(&mut self, scene: &mut Scene) -> Result<()> {
        let disabled = self.default_state.as_ref().map(|s| s.disabled.clone());
        self.change_state(scene, disabled)
    }

    fn apply_disabled(&mut self, disabled: &[bool]) {
        for (series, off) in self.data.iter_mut().zip(disabled) {
            series.disabled = *off;
        }
        self.state.disabled = disabled.to_vec();
    }

    pub fn tooltip_show(&mut self, scene: &mut Scene, request: TooltipRequest) {
        self.canvas.dispatch().emit(&ChartEvent::TooltipShow(request.clone()));
        if !self.options.tooltips {
            return;
        }
        let Some(root) = self.canvas.root() else { return };
        let content = (self.options.tooltip)(&request.key, &request.value);
        self.tooltip.show(scene, root, &request, &content);
    }

    pub fn tooltip_hide(&mut self, scene: &mut Scene) {
        self.canvas.dispatch().emit(&ChartEvent::TooltipHide);
        if !self.options.tooltips {
            return;
        }
        if let Some(root) = self.canvas.root() {
            self.tooltip.hide(scene, root);
        }
    }
}

/// The chart-specific render step, borrowing the parts of [`Chart`] it needs.
struct ChartBody<'a> {
    legend: &'a mut dyn Legend,
    state: &'a mut ChartState,
    default_state: &'a mut Option<ChartState>,
    show_legend: bool,
}

impl ChartBody<'_> {
    fn prepare_legend(&mut self, data: &[Series]) {
        self.state.disabled = data.iter().map(|s| s.disabled).collect();
        if self.default_state.is_none() {
            *self.default_state = Some(self.state.clone());
        }
    }

    fn build_legend(&mut self, canvas: &mut Canvas, scene: &mut Scene, wrap: &Wrap, data: &[Series]) -> Result<()> {
        self.prepare_legend(data);
        if !self.show_legend {
            return Ok(());
        }
        let Some(target) = scene.select(wrap.g, ".nv-legendWrap") else {
            return Ok(());
        };
        self.legend.set_width(canvas.width());
        self.legend.render(scene, target, data)?;
        canvas.set_margin_top(self.legend.height());
        scene.set_attr(target, "transform", format!("translate(0,{})", -canvas.margin().top));
        Ok(())
    }
}

impl WrapChart<Vec<Series>> for ChartBody<'_> {
    fn wrap_chart(&mut self, canvas: &mut Canvas, scene: &mut Scene, data: &Vec<Series>) -> Result<()> {
        if canvas.no_data(scene, data) {
            return Ok(());
        }
        let wrap = canvas.wrap_chart(scene, &CHART_GROUPS)?;
        self.build_legend(canvas, scene, &wrap, data)?;
        // the legend may have moved the top margin
        canvas.translate_wrap(scene, &wrap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ChartEventKind;
    use crate::core::{Point, Value};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn series(keys: &[&str]) -> Vec<Series> {
        keys.iter()
            .map(|k| Series::new(*k, vec![Value { x: 0.0, y: 1.0 }]))
            .collect()
    }

    fn rendered(options: ChartOptions, data: Vec<Series>) -> (Chart, Scene) {
        let mut scene = Scene::new();
        let mut chart = Chart::new(options);
        let root = scene.root();
        chart.render(&mut scene, &Selection::single(root, data)).unwrap();
        (chart, scene)
    }

    #[test]
    fn legend_height_becomes_top_margin() {
        let options = ChartOptions::builder().width(960.0).height(500.0).build().unwrap();
        let (chart, scene) = rendered(options, series(&["a", "b"]));
        assert_eq!(chart.canvas().margin().top, 30.0);
        assert_eq!(chart.canvas().layout().available.height, 440.0);

        let legend = scene.select(scene.root(), ".nv-legendWrap").unwrap();
        assert_eq!(scene.attr(legend, "transform"), Some("translate(0,-30)"));
        let wrap = scene.select(scene.root(), "g.nv-wrap.nv-chart").unwrap();
        assert_eq!(scene.attr(wrap, "transform"), Some("translate(40,30)"));
        assert_eq!(scene.select_all(legend, "g.nv-series").len(), 2);
    }

    #[test]
    fn hidden_legend_keeps_margin() {
        let options = ChartOptions::builder().show_legend(false).build().unwrap();
        let (chart, scene) = rendered(options, series(&["a"]));
        assert_eq!(chart.canvas().margin().top, 20.0);
        let legend = scene.select(scene.root(), ".nv-legendWrap").unwrap();
        assert!(scene.children(legend).is_empty());
    }

    #[test]
    fn narrow_legend_wraps_rows() {
        let mut legend = SeriesLegend::default();
        let mut scene = Scene::new();
        let target = scene.append(scene.root(), "g");
        legend.set_width(60.0);
        legend.render(&mut scene, target, &series(&["alpha", "beta", "gamma"])).unwrap();
        assert_eq!(legend.height(), 70.0);
    }

    #[test]
    fn default_state_is_a_snapshot() {
        let mut data = series(&["a", "b"]);
        data[1].disabled = true;
        let (mut chart, mut scene) = rendered(ChartOptions::default(), data);
        assert_eq!(chart.state().disabled, vec![false, true]);

        // hiding the last visible series shows everything again
        chart.legend_click(&mut scene, 0).unwrap();
        assert_eq!(chart.state().disabled, vec![false, false]);
        assert_eq!(chart.default_state().unwrap().disabled, vec![false, true]);

        chart.restore_default_state(&mut scene).unwrap();
        assert_eq!(chart.state().disabled, vec![false, true]);
        assert!(chart.data()[1].disabled);
    }

    #[test]
    fn legend_click_emits_state_change_and_rerenders() {
        let (mut chart, mut scene) = rendered(ChartOptions::default(), series(&["a", "b"]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ends = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        chart.dispatch().on(ChartEventKind::StateChange, move |e| {
            if let ChartEvent::StateChange { disabled } = e {
                sink.lock().push(disabled.clone());
            }
        });
        let end_sink = ends.clone();
        chart.dispatch().on(ChartEventKind::RenderEnd, move |_| *end_sink.lock() += 1);

        chart.legend_click(&mut scene, 1).unwrap();
        assert_eq!(*seen.lock(), vec![vec![false, true]]);
        assert_eq!(*ends.lock(), 1);
        let legend = scene.select(scene.root(), ".nv-legendWrap").unwrap();
        let entries = scene.select_all(legend, "g.nv-series");
        assert!(scene.has_class(entries[1], "nv-disabled"));
    }

    #[test]
    fn change_state_without_flags_only_rerenders() {
        let (mut chart, mut scene) = rendered(ChartOptions::default(), series(&["a", "b"]));
        chart.change_state(&mut scene, None).unwrap();
        assert_eq!(chart.state().disabled, vec![false, false]);
        chart.change_state(&mut scene, Some(vec![true, false])).unwrap();
        assert_eq!(chart.state().disabled, vec![true, false]);
        assert!(chart.data()[0].disabled);
    }

    #[test]
    fn tooltips_follow_the_option() {
        let request = TooltipRequest {
            position: Point::new(10.0, 20.0),
            key: "a".into(),
            value: "3".into(),
        };
        let (mut chart, mut scene) = rendered(ChartOptions::default(), series(&["a"]));
        chart.tooltip_show(&mut scene, request.clone());
        let tip = scene.select(scene.root(), "g.nvtooltip").unwrap();
        let text = scene.select(tip, "text").unwrap();
        assert_eq!(scene.text(text), Some("<h3>a</h3><p>3</p>"));
        chart.tooltip_hide(&mut scene);
        assert!(scene.select(scene.root(), "g.nvtooltip").is_none());

        let options = ChartOptions::builder().tooltips(false).build().unwrap();
        let (mut quiet, mut scene) = rendered(options, series(&["a"]));
        let shown = Arc::new(Mutex::new(0));
        let sink = shown.clone();
        quiet.dispatch().on(ChartEventKind::TooltipShow, move |_| *sink.lock() += 1);
        quiet.tooltip_show(&mut scene, request);
        assert_eq!(*shown.lock(), 1);
        assert!(scene.select(scene.root(), "g.nvtooltip").is_none());
    }

    #[test]
    fn empty_series_shows_no_data() {
        let (chart, scene) = rendered(ChartOptions::default(), vec![]);
        assert!(scene.select(scene.root(), ".nv-noData").is_some());
        assert!(scene.select(scene.root(), "g.nv-wrap").is_none());
        assert!(chart.state().disabled.is_empty());
    }
}
