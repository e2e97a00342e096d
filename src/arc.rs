//! Annular wedge geometry: SVG paths, hit tests and tessellation.

use crate::partition::PositionedNode;
use crate::scale::{LinearScale, SqrtScale};
use crate::{ChartError, Result};
use error_stack::Report;
use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const EPSILON: f64 = 1e-6;

/// A wedge in surface coordinates around the chart centre.
///
/// Angles run clockwise from twelve o'clock, like a clock face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wedge {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Turns partitioned nodes into wedges through the chart's current scales.
#[derive(Clone, Copy, Debug)]
pub struct ArcGenerator<'a> {
    pub x: &'a LinearScale,
    pub y: &'a SqrtScale,
}

impl<'a> ArcGenerator<'a> {
    pub fn new(x: &'a LinearScale, y: &'a SqrtScale) -> Self {
        Self { x, y }
    }

    pub fn wedge(&self, node: &PositionedNode) -> Wedge {
        let angle = |p: f64| self.x.apply(p).clamp(0.0, TAU);
        Wedge {
            start_angle: angle(node.angle_start),
            end_angle: angle(node.angle_start + node.angle_span),
            inner_radius: self.y.apply(node.depth_start).max(0.0),
            outer_radius: self.y.apply(node.depth_start + node.depth_span).max(0.0),
        }
    }
}

pub(crate) fn num(v: f64) -> String {
    let v = (v * 1e6).round() / 1e6 + 0.0;
    format!("{v}")
}

impl Wedge {
    pub fn span(&self) -> f64 {
        (self.end_angle - self.start_angle).abs()
    }

    pub fn is_empty(&self) -> bool {
        self.span() < EPSILON || (self.outer_radius - self.inner_radius).abs() < EPSILON
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// SVG path data for the wedge.
    pub fn path(&self) -> String {
        let (r0, r1) = if self.inner_radius <= self.outer_radius {
            (self.inner_radius, self.outer_radius)
        } else {
            (self.outer_radius, self.inner_radius)
        };
        let a0 = self.start_angle - FRAC_PI_2;
        let a1 = self.end_angle - FRAC_PI_2;
        let da = (a1 - a0).abs();
        let large = if da < PI { 0 } else { 1 };
        let (c0, s0, c1, s1) = (a0.cos(), a0.sin(), a1.cos(), a1.sin());

        if da >= TAU - EPSILON {
            let outer = format!(
                "M0,{r}A{r},{r} 0 1,1 0,{nr}A{r},{r} 0 1,1 0,{r}",
                r = num(r1),
                nr = num(-r1)
            );
            if r0 > 0.0 {
                format!(
                    "{outer}M0,{r}A{r},{r} 0 1,0 0,{nr}A{r},{r} 0 1,0 0,{r}Z",
                    r = num(r0),
                    nr = num(-r0)
                )
            } else {
                format!("{outer}Z")
            }
        } else if r0 > 0.0 {
            format!(
                "M{},{}A{r1},{r1} 0 {large},1 {},{}L{},{}A{r0},{r0} 0 {large},0 {},{}Z",
                num(r1 * c0),
                num(r1 * s0),
                num(r1 * c1),
                num(r1 * s1),
                num(r0 * c1),
                num(r0 * s1),
                num(r0 * c0),
                num(r0 * s0),
                r1 = num(r1),
                r0 = num(r0),
            )
        } else {
            format!(
                "M{},{}A{r1},{r1} 0 {large},1 {},{}L0,0Z",
                num(r1 * c0),
                num(r1 * s0),
                num(r1 * c1),
                num(r1 * s1),
                r1 = num(r1),
            )
        }
    }

    /// Whether a point, relative to the chart centre, falls inside the wedge.
    pub fn contains(&self, dx: f64, dy: f64) -> bool {
        let r = dx.hypot(dy);
        if r < self.inner_radius || r >= self.outer_radius {
            return false;
        }
        let mut a = dx.atan2(-dy);
        if a < 0.0 {
            a += TAU;
        }
        a >= self.start_angle && a < self.end_angle
    }

    /// Point on the wedge outline at `radius` and `angle`, in surface coordinates.
    pub fn polar(radius: f64, angle: f64) -> (f64, f64) {
        (radius * angle.sin(), -radius * angle.cos())
    }

    /// Fill triangles for the wedge, surface coordinates.
    pub fn tessellate(&self) -> Result<VertexBuffers<[f32; 2], u32>> {
        let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        if self.is_empty() {
            return Ok(geometry);
        }

        let steps = ((self.span() / (PI / 64.0)).ceil() as usize).max(2);
        let at = |radius: f64, i: usize| {
            let angle = self.start_angle + self.span() * i as f64 / steps as f64;
            let (x, y) = Self::polar(radius, angle);
            point(x as f32, y as f32)
        };

        let mut builder = Path::builder();
        builder.begin(at(self.outer_radius, 0));
        for i in 1..=steps {
            builder.line_to(at(self.outer_radius, i));
        }
        if self.inner_radius > 0.0 {
            for i in (0..=steps).rev() {
                builder.line_to(at(self.inner_radius, i));
            }
        } else {
            builder.line_to(point(0.0, 0.0));
        }
        builder.end(true);
        let path = builder.build();

        FillTessellator::new()
            .tessellate_path(
                &path,
                &FillOptions::default(),
                &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                    vertex.position().to_array()
                }),
            )
            .map_err(|e| Report::new(ChartError::Surface).attach(format!("tessellation failed: {e:?}")))?;
        Ok(geometry)
    }
}
