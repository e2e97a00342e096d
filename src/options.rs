//! Chart configuration: plain serde structs plus validating builders.

use crate::core::{ChartId, Color, Margin, Size, finite_non_negative};
use crate::partition::WeightMode;
use crate::{ChartError, Result};
use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MARGIN: Margin = Margin::new(20.0, 20.0, 30.0, 40.0);
pub const FALLBACK_SIZE: Size = Size::new(960.0, 500.0);
pub const DEFAULT_NO_DATA: &str = "No Data Available.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Margin overrides; unset sides take the chart type's defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOptions {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl MarginOptions {
    pub fn all(m: Margin) -> Self {
        Self {
            top: Some(m.top),
            right: Some(m.right),
            bottom: Some(m.bottom),
            left: Some(m.left),
        }
    }

    pub fn resolve(&self, defaults: Margin) -> Margin {
        Margin {
            top: self.top.unwrap_or(defaults.top),
            right: self.right.unwrap_or(defaults.right),
            bottom: self.bottom.unwrap_or(defaults.bottom),
            left: self.left.unwrap_or(defaults.left),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasOptions {
    pub size: SizeOptions,
    pub margin: MarginOptions,
    /// Message shown when there is nothing to draw.
    pub no_data: String,
    pub chart_class: String,
    pub wrap_class: String,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            size: SizeOptions::default(),
            margin: MarginOptions::default(),
            no_data: DEFAULT_NO_DATA.into(),
            chart_class: "chart".into(),
            wrap_class: "chartWrap".into(),
        }
    }
}

impl CanvasOptions {
    pub fn validate(&self) -> Result<()> {
        let dims = [("size.width", self.size.width), ("size.height", self.size.height)];
        let sides = [
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
        ];
        for (what, v) in dims.into_iter().chain(sides) {
            if let Some(v) = v {
                finite_non_negative(what, v)?;
            }
        }
        Ok(())
    }
}

/// Renders tooltip markup from a series key and a formatted value.
pub type TooltipFormatter = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

pub fn default_tooltip_formatter() -> TooltipFormatter {
    Arc::new(|key, y| format!("<h3>{key}</h3><p>{y}</p>"))
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    #[serde(flatten)]
    pub canvas: CanvasOptions,
    #[serde(default = "default_true")]
    pub tooltips: bool,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(skip, default = "default_tooltip_formatter")]
    pub tooltip: TooltipFormatter,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            canvas: CanvasOptions::default(),
            tooltips: true,
            show_legend: true,
            tooltip: default_tooltip_formatter(),
        }
    }
}

impl fmt::Debug for ChartOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartOptions")
            .field("canvas", &self.canvas)
            .field("tooltips", &self.tooltips)
            .field("show_legend", &self.show_legend)
            .finish_non_exhaustive()
    }
}

impl ChartOptions {
    pub fn builder() -> ChartBuilder {
        ChartBuilder {
            options: ChartOptions::default(),
        }
    }
}

pub struct ChartBuilder {
    options: ChartOptions,
}

impl ChartBuilder {
    pub fn width(mut self, w: f64) -> Self {
        self.options.canvas.size.width = Some(w);
        self
    }

    pub fn height(mut self, h: f64) -> Self {
        self.options.canvas.size.height = Some(h);
        self
    }

    pub fn margin(mut self, m: Margin) -> Self {
        self.options.canvas.margin = MarginOptions::all(m);
        self
    }

    pub fn margin_top(mut self, top: f64) -> Self {
        self.options.canvas.margin.top = Some(top);
        self
    }

    pub fn no_data(mut self, message: impl Into<String>) -> Self {
        self.options.canvas.no_data = message.into();
        self
    }

    pub fn chart_class(mut self, class: impl Into<String>) -> Self {
        self.options.canvas.chart_class = class.into();
        self
    }

    pub fn wrap_class(mut self, class: impl Into<String>) -> Self {
        self.options.canvas.wrap_class = class.into();
        self
    }

    pub fn tooltips(mut self, on: bool) -> Self {
        self.options.tooltips = on;
        self
    }

    pub fn show_legend(mut self, on: bool) -> Self {
        self.options.show_legend = on;
        self
    }

    pub fn tooltip<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.options.tooltip = Arc::new(formatter);
        self
    }

    pub fn build(self) -> Result<ChartOptions> {
        self.options.canvas.validate()?;
        Ok(self.options)
    }
}

pub const DEFAULT_DURATION_MS: u64 = 500;
pub const DEFAULT_INNER_RADIUS: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SunburstOptions {
    #[serde(flatten)]
    pub canvas: CanvasOptions,
    pub mode: WeightMode,
    /// Chart instance id; a fresh sequential id when unset.
    pub id: Option<ChartId>,
    /// Zoom animation length in milliseconds; 0 applies zooms instantly.
    pub duration: u64,
    pub group_color_by_parent: bool,
    /// Radius of the hole left in the centre while zoomed below the root.
    pub inner_radius: f64,
    /// Replaces the categorical palette.
    pub color: Option<Vec<Color>>,
}

impl Default for SunburstOptions {
    fn default() -> Self {
        Self {
            canvas: CanvasOptions {
                chart_class: "sunburst".into(),
                wrap_class: "sunburstWrap".into(),
                ..CanvasOptions::default()
            },
            mode: WeightMode::Count,
            id: None,
            duration: DEFAULT_DURATION_MS,
            group_color_by_parent: true,
            inner_radius: DEFAULT_INNER_RADIUS,
            color: None,
        }
    }
}

impl SunburstOptions {
    pub fn builder() -> SunburstBuilder {
        SunburstBuilder {
            options: SunburstOptions::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: SunburstOptions = serde_json::from_str(json)
            .change_context(ChartError::Config)
            .attach("sunburst options JSON is malformed")?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        finite_non_negative("inner_radius", self.inner_radius)?;
        if self.color.as_ref().is_some_and(Vec::is_empty) {
            return Err(error_stack::Report::new(ChartError::Config).attach("color palette is empty"));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }
}

pub struct SunburstBuilder {
    options: SunburstOptions,
}

impl SunburstBuilder {
    pub fn width(mut self, w: f64) -> Self {
        self.options.canvas.size.width = Some(w);
        self
    }

    pub fn height(mut self, h: f64) -> Self {
        self.options.canvas.size.height = Some(h);
        self
    }

    pub fn margin(mut self, m: Margin) -> Self {
        self.options.canvas.margin = MarginOptions::all(m);
        self
    }

    pub fn no_data(mut self, message: impl Into<String>) -> Self {
        self.options.canvas.no_data = message.into();
        self
    }

    pub fn mode(mut self, mode: WeightMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn id(mut self, id: ChartId) -> Self {
        self.options.id = Some(id);
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.options.duration = ms;
        self
    }

    pub fn group_color_by_parent(mut self, on: bool) -> Self {
        self.options.group_color_by_parent = on;
        self
    }

    pub fn inner_radius(mut self, r: f64) -> Self {
        self.options.inner_radius = r;
        self
    }

    pub fn color(mut self, palette: Vec<Color>) -> Self {
        self.options.color = Some(palette);
        self
    }

    pub fn build(self) -> Result<SunburstOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_overrides_fall_back_per_side() {
        let m = MarginOptions {
            top: Some(5.0),
            ..Default::default()
        };
        assert_eq!(m.resolve(DEFAULT_MARGIN), Margin::new(5.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn chart_defaults() {
        let o = ChartOptions::builder().build().unwrap();
        assert!(o.tooltips);
        assert!(o.show_legend);
        assert_eq!(o.canvas.no_data, "No Data Available.");
        assert_eq!((o.tooltip)("k", "3"), "<h3>k</h3><p>3</p>");
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let err = ChartOptions::builder().width(-1.0).build().unwrap_err();
        assert_eq!(*err.current_context(), ChartError::Config);
        assert!(SunburstOptions::builder().inner_radius(f64::NAN).build().is_err());
    }

    #[test]
    fn sunburst_options_from_json() {
        let o = SunburstOptions::from_json(
            r##"{"mode":"size","duration":0,"size":{"width":400},"color":["#ff0000"]}"##,
        )
        .unwrap();
        assert_eq!(o.mode, WeightMode::Size);
        assert_eq!(o.duration(), Duration::ZERO);
        assert_eq!(o.canvas.size.width, Some(400.0));
        assert!(o.group_color_by_parent);
        assert_eq!(o.canvas.margin, MarginOptions::default());
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let err = SunburstOptions::from_json(r#"{"mode":"area"}"#).unwrap_err();
        assert_eq!(*err.current_context(), ChartError::Config);
    }
}
