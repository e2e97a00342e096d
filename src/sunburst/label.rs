//! Label orientation and word wrapping for sunburst wedges.

use super::zoom::ScaleState;
use crate::arc::num;
use crate::partition::PositionedNode;
use std::f64::consts::PI;

const LINE_HEIGHT_TENTHS: usize = 11;
const RADIAL_PAD: f64 = 5.0;

/// Label rotation about the centre, radial offset and upright flip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    pub rotate: f64,
    pub offset: f64,
    pub flip: f64,
}

impl LabelPlacement {
    pub fn of(node: &PositionedNode, scales: &ScaleState) -> Self {
        let mid = scales.x.apply(node.angle_start + node.angle_span / 2.0);
        let orientation = 180.0 * mid / PI - 90.0;
        let multi_word = node.name.split(' ').count() > 1;
        Self {
            rotate: orientation + if multi_word { -0.5 } else { 0.0 },
            offset: scales.y.apply(node.depth_start) + RADIAL_PAD,
            flip: if orientation > 90.0 { -180.0 } else { 0.0 },
        }
    }

    pub fn transform(&self) -> String {
        format!(
            "rotate({})translate({})rotate({})",
            num(self.rotate),
            num(self.offset),
            num(self.flip)
        )
    }
}

/// Radial thickness of the node's ring under `scales`.
pub fn band_width(node: &PositionedNode, scales: &ScaleState) -> f64 {
    scales.y.apply(node.depth_end()) - scales.y.apply(node.depth_start)
}

/// Greedy word wrap: a line grows until it would exceed `max_width`.
/// A single word wider than the band still gets its own line.
pub fn wrap_words(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        line.push(word);
        if line.len() > 1 && measure(&line.join(" ")) > max_width {
            line.pop();
            lines.push(line.join(" "));
            line = vec![word];
        }
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }
    lines
}

/// `dy` of the n-th wrapped line.
pub fn line_dy(line: usize) -> String {
    format!("{}em", num((line * LINE_HEIGHT_TENTHS) as f64 / 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, angle_start: f64, angle_span: f64) -> PositionedNode {
        PositionedNode {
            name: name.into(),
            angle_start,
            angle_span,
            depth_start: 0.5,
            depth_span: 0.5,
            ..PositionedNode::default()
        }
    }

    #[test]
    fn right_half_labels_are_not_flipped() {
        let scales = ScaleState::new(100.0);
        let p = LabelPlacement::of(&node("a", 0.0, 0.25), &scales);
        assert!((p.rotate + 45.0).abs() < 1e-9);
        assert_eq!(p.flip, 0.0);
        assert_eq!(p.transform(), format!("rotate(-45)translate({})rotate(0)", num(p.offset)));
    }

    #[test]
    fn left_half_labels_flip_upright() {
        let scales = ScaleState::new(100.0);
        let p = LabelPlacement::of(&node("left side", 0.5, 0.25), &scales);
        // mid angle 1.25 pi -> 135 degrees, minus the multi-word nudge
        assert!((p.rotate - 134.5).abs() < 1e-9);
        assert_eq!(p.flip, -180.0);
    }

    #[test]
    fn offset_sits_just_outside_inner_edge() {
        let scales = ScaleState::new(100.0);
        let p = LabelPlacement::of(&node("a", 0.0, 1.0), &scales);
        assert!((p.offset - (scales.y.apply(0.5) + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn wrap_breaks_before_overflow() {
        let width = |s: &str| s.len() as f64;
        assert_eq!(wrap_words("aa bb cc", 5.0, width), vec!["aa bb", "cc"]);
        assert_eq!(wrap_words("aa bb cc", 100.0, width), vec!["aa bb cc"]);
        assert_eq!(wrap_words("enormous word", 3.0, width), vec!["enormous", "word"]);
        assert!(wrap_words("   ", 3.0, width).is_empty());
    }

    #[test]
    fn line_offsets_step_by_line_height() {
        assert_eq!(line_dy(0), "0em");
        assert_eq!(line_dy(1), "1.1em");
        assert_eq!(line_dy(2), "2.2em");
    }
}
