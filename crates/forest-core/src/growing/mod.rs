use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

pub mod generation;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub size: f32,
    pub position: Vec3,
    pub rotation: Quat,
    /// Position along the first-level split this node descends from, 0 on the main axis.
    pub split_height: f32,
    pub growth: f32,
    pub split_depth: usize,
}

impl Node {
    pub fn root(size: f32, growth: f32) -> Self {
        Self {
            size,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            split_height: 0.,
            growth,
            split_depth: 0,
        }
    }

    /// Length of the segment grown from this node.
    pub fn height(&self) -> f32 {
        self.size * self.growth
    }

    /// Direction of the local growth axis.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.size.is_finite()
            && self.growth.is_finite()
            && self.split_height.is_finite()
            && self.position.is_finite()
            && self.rotation.is_finite()
    }
}

/// Nodes in generation order, with the main-axis continuation of each node.
///
/// Tangential children are not linked back to the node they grew from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub nodes: Vec<Node>,
    pub node_to_primary_child_index: Vec<Option<usize>>,
}

impl Skeleton {
    pub fn root(&self) -> usize {
        0
    }
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn node(&self, node_id: usize) -> &Node {
        &self.nodes[node_id]
    }
    pub fn primary_child(&self, node_id: usize) -> Option<usize> {
        self.node_to_primary_child_index[node_id]
    }
    pub fn position(&self, node_id: usize) -> Vec3 {
        self.nodes[node_id].position
    }
    pub fn rotation(&self, node_id: usize) -> Quat {
        self.nodes[node_id].rotation
    }
    pub fn split_depth(&self, node_id: usize) -> usize {
        self.nodes[node_id].split_depth
    }
    pub fn max_split_depth(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.split_depth)
            .max()
            .unwrap_or_default()
    }

    /// Checks that every node has a primary-child slot pointing inside the skeleton.
    ///
    /// Holds for anything `generate_structure` returns, but not necessarily for
    /// a skeleton assembled or deserialized by hand.
    pub fn check_links(&self) -> Result<()> {
        let node_count = self.nodes.len();
        if self.node_to_primary_child_index.len() != node_count {
            return Err(ForestError::MalformedSkeleton(format!(
                "{} nodes but {} primary child entries",
                node_count,
                self.node_to_primary_child_index.len()
            )));
        }
        let dangling = self
            .node_to_primary_child_index
            .iter()
            .enumerate()
            .find_map(|(node, child)| child.filter(|&c| c >= node_count).map(|c| (node, c)));
        match dangling {
            Some((node, child)) => Err(ForestError::MalformedSkeleton(format!(
                "node {node} links to missing node {child}"
            ))),
            None => Ok(()),
        }
    }

    /// Follows primary children from `node_id`, the node itself included.
    pub fn main_axis(&self, node_id: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(node_id), |&i| self.primary_child(i))
    }
}
