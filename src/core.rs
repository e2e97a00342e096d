use crate::{ChartError, Result};
use bevy_math::DVec2;
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Position on the drawing surface, in surface pixels (y grows downwards).
pub type Point = DVec2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn with_a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            6 => Some(Self::from_rgb8(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Some(Self::from_rgb8(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("not a hex color: {value}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl From<Color> for bevy::prelude::Color {
    #[inline]
    fn from(c: Color) -> Self {
        bevy::prelude::Color::srgba(c.r, c.g, c.b, c.a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn left_right(&self) -> f64 {
        self.left + self.right
    }

    pub fn top_bottom(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Resolved size, margins and the drawable area left between them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasLayout {
    pub size: Size,
    pub margin: Margin,
    pub available: Size,
}

impl CanvasLayout {
    pub fn new(size: Size, margin: Margin) -> Self {
        Self {
            size,
            margin,
            available: Size {
                width: (size.width - margin.left_right()).max(0.0),
                height: (size.height - margin.top_bottom()).max(0.0),
            },
        }
    }
}

/// One input tree node of a hierarchical chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl HierarchyNode {
    pub fn leaf(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn children(&self) -> &[HierarchyNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Parse either a single root object or a one-element array wrapping it.
    pub fn from_json(json: &str) -> Result<Vec<HierarchyNode>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Many(Vec<HierarchyNode>),
            One(HierarchyNode),
        }

        let parsed: Input = serde_json::from_str(json)
            .change_context(ChartError::Data)
            .attach("hierarchy JSON must be a node object or an array of nodes")?;
        Ok(match parsed {
            Input::Many(nodes) => nodes,
            Input::One(node) => vec![node],
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub x: f64,
    pub y: f64,
}

/// One input series of a series-based chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Series {
    pub fn new(key: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            values: Some(values),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Vec<Series>> {
        serde_json::from_str(json)
            .change_context(ChartError::Data)
            .attach("series JSON must be an array of {key, values}")
    }
}

/// Anything a canvas can be asked to render.
pub trait HasValues {
    /// Length of the datum's `values` sequence, `None` when it has none.
    fn values_len(&self) -> Option<usize>;
}

impl HasValues for Series {
    fn values_len(&self) -> Option<usize> {
        self.values.as_ref().map(Vec::len)
    }
}

impl HasValues for HierarchyNode {
    fn values_len(&self) -> Option<usize> {
        None
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChartId(pub u64);

impl ChartId {
    /// Next id from the process-wide counter.
    pub fn next() -> Self {
        static CTR: AtomicU64 = AtomicU64::new(1);
        Self(CTR.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of chart ids for callers that do not pick their own.
pub trait IdSource {
    fn next_id(&mut self) -> ChartId;
}

/// Hands out consecutive ids from a fixed start, for reproducible output.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> ChartId {
        let id = ChartId(self.next);
        self.next += 1;
        id
    }
}

pub(crate) fn finite_non_negative(what: &str, v: f64) -> Result<f64> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(Report::new(ChartError::Config).attach(format!("{what} must be finite and >= 0, got {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_area_subtracts_margins() {
        let layout = CanvasLayout::new(Size::new(960.0, 500.0), Margin::new(20.0, 20.0, 30.0, 40.0));
        assert_eq!(layout.available, Size::new(900.0, 450.0));
    }

    #[test]
    fn available_area_never_negative() {
        let layout = CanvasLayout::new(Size::new(30.0, 10.0), Margin::new(20.0, 20.0, 30.0, 40.0));
        assert_eq!(layout.available, Size::new(0.0, 0.0));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("#1f77b4").map(Color::to_hex).as_deref(), Some("#1f77b4"));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("1f77b4"), None);
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn hierarchy_json_accepts_object_or_array() {
        let one = HierarchyNode::from_json(r#"{"name":"root","children":[{"name":"a","size":3}]}"#)
            .unwrap();
        let many = HierarchyNode::from_json(r#"[{"name":"root","children":[{"name":"a","size":3}]}]"#)
            .unwrap();
        assert_eq!(one, many);
        assert_eq!(one[0].children()[0].size, Some(3.0));
    }

    #[test]
    fn hierarchy_json_reads_colors() {
        let nodes = HierarchyNode::from_json(r##"{"name":"root","color":"#ff0000"}"##).unwrap();
        assert_eq!(nodes[0].color, Some(Color::rgb(1.0, 0.0, 0.0)));
        assert!(HierarchyNode::from_json(r#"{"name":"root","color":"red"}"#).is_err());
    }

    #[test]
    fn sequential_ids_are_reproducible() {
        let mut ids = SequentialIds::starting_at(7);
        assert_eq!(ids.next_id(), ChartId(7));
        assert_eq!(ids.next_id(), ChartId(8));
    }
}
