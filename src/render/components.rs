use crate::partition::NodeId;
use bevy::prelude::*;

/// Parent of everything drawn for the current frame of the chart.
#[derive(Component)]
pub struct SunburstRoot;

#[derive(Component, Clone, Copy, Debug)]
pub struct WedgeMesh {
    pub node: NodeId,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct WedgeLabel {
    pub node: NodeId,
}
