//! Partition (icicle) layout over a [`HierarchyNode`] tree.
//!
//! Positions are normalized: breadth runs over `[0, 1)` and depth over
//! `[0, 1)`, split into one equal band per tree level.

use crate::core::{Color, HierarchyNode};
use crate::{ChartError, Result};
use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How leaves are weighted. Inner nodes always weigh the sum of their children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    /// Every leaf weighs 1.
    #[default]
    Count,
    /// Leaves weigh their declared `size`; a missing size weighs 0.
    Size,
}

impl WeightMode {
    pub fn leaf_weight(self, node: &HierarchyNode) -> f64 {
        match self {
            WeightMode::Count => 1.0,
            WeightMode::Size => node.size.filter(|s| s.is_finite()).unwrap_or(0.0).max(0.0),
        }
    }
}

impl FromStr for WeightMode {
    type Err = Report<ChartError>;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" => Ok(WeightMode::Count),
            "size" => Ok(WeightMode::Size),
            other => Err(Report::new(ChartError::Config)
                .attach(format!("unknown mode {other:?}, expected \"count\" or \"size\""))),
        }
    }
}

/// A laid out node. Owned by its [`Partition`]; links are ids into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionedNode {
    pub id: NodeId,
    pub name: String,
    pub color: Option<Color>,
    pub depth: usize,
    pub value: f64,
    pub angle_start: f64,
    pub angle_span: f64,
    pub depth_start: f64,
    pub depth_span: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl PositionedNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn angle_end(&self) -> f64 {
        self.angle_start + self.angle_span
    }

    pub fn depth_end(&self) -> f64 {
        self.depth_start + self.depth_span
    }
}

/// Flat pre-order list of positioned nodes; index 0 is the root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    nodes: Vec<PositionedNode>,
}

impl Partition {
    pub fn layout(root: &HierarchyNode, mode: WeightMode) -> Self {
        let mut nodes = Vec::new();
        let mut max_depth = 0;
        flatten(root, None, 0, mode, &mut nodes, &mut max_depth);

        let band = 1.0 / (max_depth + 1) as f64;
        if let Some(root) = nodes.first_mut() {
            root.angle_start = 0.0;
            root.angle_span = 1.0;
        }
        // pre-order: a parent is always positioned before its children
        for i in 0..nodes.len() {
            let depth = nodes[i].depth as f64;
            nodes[i].depth_start = depth * band;
            nodes[i].depth_span = band;

            let (start, span, value) = (nodes[i].angle_start, nodes[i].angle_span, nodes[i].value);
            let children = nodes[i].children.clone();
            let mut cursor = start;
            for child in children {
                let child = &mut nodes[child.0];
                let child_span = if value > 0.0 { child.value / value * span } else { 0.0 };
                child.angle_start = cursor;
                child.angle_span = child_span;
                cursor += child_span;
            }
        }
        Self { nodes }
    }

    /// Layout of the first element of `data`, if any.
    pub fn from_data(data: &[HierarchyNode], mode: WeightMode) -> Option<Self> {
        data.first().map(|root| Self::layout(root, mode))
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// First node, in pre-order, carrying `name`.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Follow `names` from the root, one child per step.
    pub fn find_path<S: AsRef<str>>(&self, names: &[S]) -> Option<NodeId> {
        let mut at = self.root();
        for name in names {
            let node = self.get(at)?;
            at = *node
                .children
                .iter()
                .find(|c| self.nodes[c.0].name == name.as_ref())?;
        }
        Some(at)
    }
}

fn flatten(
    node: &HierarchyNode,
    parent: Option<NodeId>,
    depth: usize,
    mode: WeightMode,
    out: &mut Vec<PositionedNode>,
    max_depth: &mut usize,
) -> f64 {
    let id = NodeId(out.len());
    *max_depth = (*max_depth).max(depth);
    out.push(PositionedNode {
        id,
        name: node.name.clone(),
        color: node.color,
        depth,
        parent,
        ..PositionedNode::default()
    });

    let value = if node.children().is_empty() {
        mode.leaf_weight(node)
    } else {
        let mut sum = 0.0;
        for child in node.children() {
            let child_id = NodeId(out.len());
            out[id.0].children.push(child_id);
            sum += flatten(child, Some(id), depth + 1, mode, out, max_depth);
        }
        sum
    };
    out[id.0].value = value;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HierarchyNode {
        HierarchyNode::branch(
            "root",
            vec![
                HierarchyNode::leaf("a", 10.0),
                HierarchyNode::leaf("b", 30.0),
            ],
        )
    }

    #[test]
    fn size_mode_spans_follow_sizes() {
        let p = Partition::layout(&sample(), WeightMode::Size);
        let a = p.get(p.find("a").unwrap()).unwrap();
        let b = p.get(p.find("b").unwrap()).unwrap();
        assert!((a.angle_span / b.angle_span - 10.0 / 30.0).abs() < 1e-12);
        assert_eq!(a.angle_start, 0.0);
        assert!((b.angle_start - 0.25).abs() < 1e-12);
    }

    #[test]
    fn count_mode_weighs_leaves_equally() {
        let p = Partition::layout(&sample(), WeightMode::Count);
        let a = p.get(NodeId(1)).unwrap();
        let b = p.get(NodeId(2)).unwrap();
        assert_eq!(a.angle_span, 0.5);
        assert_eq!(b.angle_span, 0.5);
        assert_eq!(p.get(p.root()).unwrap().value, 2.0);
    }

    #[test]
    fn pre_order_and_links() {
        let tree = HierarchyNode::branch(
            "root",
            vec![
                HierarchyNode::branch("x", vec![HierarchyNode::leaf("x1", 1.0)]),
                HierarchyNode::leaf("y", 1.0),
            ],
        );
        let p = Partition::layout(&tree, WeightMode::Count);
        let names: Vec<_> = p.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["root", "x", "x1", "y"]);
        assert_eq!(p.parent(NodeId(2)), Some(NodeId(1)));
        assert_eq!(p.get(p.root()).unwrap().children, vec![NodeId(1), NodeId(3)]);
        assert_eq!(p.find_path(&["x", "x1"]), Some(NodeId(2)));
        assert_eq!(p.find_path(&["y", "x1"]), None);
    }

    #[test]
    fn depth_bands_are_uniform() {
        let tree = HierarchyNode::branch(
            "root",
            vec![HierarchyNode::branch("x", vec![HierarchyNode::leaf("x1", 1.0)])],
        );
        let p = Partition::layout(&tree, WeightMode::Count);
        let spans: Vec<_> = p.nodes().iter().map(|n| (n.depth_start, n.depth_span)).collect();
        let third = 1.0 / 3.0;
        assert_eq!(spans[0], (0.0, third));
        assert_eq!(spans[1], (third, third));
        assert_eq!(spans[2], (2.0 * third, third));
    }

    #[test]
    fn missing_size_weighs_zero_not_nan() {
        let tree = HierarchyNode::branch(
            "root",
            vec![
                HierarchyNode {
                    name: "unsized".into(),
                    ..Default::default()
                },
                HierarchyNode::leaf("sized", 4.0),
            ],
        );
        let p = Partition::layout(&tree, WeightMode::Size);
        assert_eq!(p.get(NodeId(1)).unwrap().angle_span, 0.0);
        assert_eq!(p.get(NodeId(2)).unwrap().angle_span, 1.0);
    }

    #[test]
    fn all_zero_weights_collapse_children() {
        let tree = HierarchyNode::branch("root", vec![HierarchyNode::leaf("z", 0.0)]);
        let p = Partition::layout(&tree, WeightMode::Size);
        let z = p.get(NodeId(1)).unwrap();
        assert_eq!(z.angle_span, 0.0);
        assert!(!z.angle_start.is_nan());
    }

    #[test]
    fn mode_parsing_is_strict() {
        assert_eq!("size".parse::<WeightMode>().unwrap(), WeightMode::Size);
        assert_eq!("count".parse::<WeightMode>().unwrap(), WeightMode::Count);
        let err = "area".parse::<WeightMode>().unwrap_err();
        assert_eq!(*err.current_context(), ChartError::Config);
    }
}
