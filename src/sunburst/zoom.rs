use crate::arc::ArcGenerator;
use crate::partition::{NodeId, Partition, PositionedNode};
use crate::scale::{LinearScale, SqrtScale, lerp_pair};
use crate::transition::Transition;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomPhase {
    #[default]
    Idle,
    ZoomingIn,
    ZoomingOut,
}

/// Which node the chart is zoomed on, and the one it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomState {
    pub current: NodeId,
    pub previous: Option<NodeId>,
    pub root: NodeId,
    pub phase: ZoomPhase,
}

impl ZoomState {
    pub fn new(root: NodeId) -> Self {
        Self {
            current: root,
            previous: None,
            root,
            phase: ZoomPhase::Idle,
        }
    }

    /// Click on `node`: it becomes current, remembering the old current
    /// only when the click moved somewhere else.
    pub fn select(&mut self, node: NodeId) {
        if node != self.current {
            self.previous = Some(self.current);
        }
        self.current = node;
    }

    /// Double-click on `target`: unwinds only when `target` is the parent of
    /// the remembered previous node.
    pub fn unwind(&mut self, partition: &Partition, target: NodeId) -> bool {
        let allowed = self
            .previous
            .and_then(|p| partition.parent(p))
            .is_some_and(|parent| parent == target);
        if allowed {
            self.current = target;
        }
        allowed
    }

    /// Re-anchor on a freshly laid out partition; stale ids fall back to the root.
    pub fn rebase(&mut self, partition: &Partition) {
        self.root = partition.root();
        if partition.get(self.current).is_none() {
            self.current = self.root;
        }
        if self.previous.is_some_and(|p| partition.get(p).is_none()) {
            self.previous = None;
        }
    }
}

/// Angular and radial scales the wedges are drawn through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleState {
    pub x: LinearScale,
    pub y: SqrtScale,
}

impl ScaleState {
    pub fn new(radius: f64) -> Self {
        Self {
            x: LinearScale::angular(),
            y: SqrtScale::radial(radius),
        }
    }

    /// Scales that make `node` fill the disc, leaving a hole of
    /// `inner_radius` unless it is the root.
    pub fn focused(node: &PositionedNode, inner_radius: f64, radius: f64) -> Self {
        let hole = if node.depth_start > 0.0 { inner_radius } else { 0.0 };
        Self {
            x: LinearScale::new([node.angle_start, node.angle_end()], LinearScale::angular().range),
            y: SqrtScale::new([node.depth_start, 1.0], [hole, radius]),
        }
    }

    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            x: LinearScale::new(lerp_pair(self.x.domain, to.x.domain, t), to.x.range),
            y: SqrtScale::new(
                lerp_pair(self.y.domain, to.y.domain, t),
                lerp_pair(self.y.range, to.y.range, t),
            ),
        }
    }

    pub fn arc(&self) -> ArcGenerator<'_> {
        ArcGenerator::new(&self.x, &self.y)
    }
}

/// An in-flight zoom from one scale state to another.
#[derive(Clone, Copy, Debug)]
pub struct ZoomTween {
    pub from: ScaleState,
    pub to: ScaleState,
    pub target: NodeId,
    pub transition: Transition,
}

impl ZoomTween {
    pub fn sample(&self, now: Duration) -> ScaleState {
        self.from.interpolate(&self.to, self.transition.value(now))
    }

    pub fn is_complete(&self, now: Duration) -> bool {
        self.transition.is_complete(now)
    }
}
