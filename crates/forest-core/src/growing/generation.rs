use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Node, Skeleton};
use crate::curve::SmoothCurve;
use crate::error::{ForestError, Result};
use crate::meshing::bark::BARK_VERTICES_PER_NODE;
use crate::utils::{ensure_finite, ensure_non_negative, ensure_positive, flatten_angle};
use crate::{Seed, TreePipelinePhase};

/// Angular step between consecutive tangential branches, as a fraction of a turn.
const GOLDEN_STEP: f32 = 0.618;

/// Growth rules applied to the nodes spawned at one split depth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthDefinition {
    pub split_amount: f32,
    pub flatness: f32,
    pub size: f32,
    pub height_spread: f32,
    pub branch_pitch: f32,
    pub branch_roll: f32,
    pub height_to_growth: SmoothCurve,
}

impl DepthDefinition {
    fn validate(&self, name: &str) -> Result<()> {
        let field = |f: &str| format!("depth_definitions.{name}.{f}");
        ensure_non_negative(&field("split_amount"), self.split_amount)?;
        ensure_finite(&field("flatness"), self.flatness)?;
        ensure_positive(&field("size"), self.size)?;
        ensure_finite(&field("height_spread"), self.height_spread)?;
        ensure_finite(&field("branch_pitch"), self.branch_pitch)?;
        ensure_finite(&field("branch_roll"), self.branch_roll)?;
        self.height_to_growth.validate(&field("height_to_growth"))
    }

    fn growth_at(&self, height: f32) -> f32 {
        self.height_to_growth.sample(height).clamp(0., 1.)
    }
}

fn default_max_nodes() -> u64 {
    1_000_000
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub start_size: f32,
    pub start_growth: f32,
    /// Generation is refused when it could emit more nodes than this.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u64,
    /// One entry per split depth, in order.
    pub depth_definitions: IndexMap<String, DepthDefinition>,
}

impl Settings {
    pub fn new(start_size: f32, start_growth: f32) -> Self {
        Self {
            start_size,
            start_growth,
            max_nodes: default_max_nodes(),
            depth_definitions: IndexMap::new(),
        }
    }

    pub fn with_depth(mut self, name: impl Into<String>, definition: DepthDefinition) -> Self {
        self.depth_definitions.insert(name.into(), definition);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let node_limit = u32::MAX as u64 / BARK_VERTICES_PER_NODE as u64;
        if self.max_nodes > node_limit {
            return Err(ForestError::invalid(
                "max_nodes",
                format!("must be at most {node_limit} for the bark mesh to be indexable with 32 bits"),
            ));
        }
        ensure_positive("start_size", self.start_size)?;
        ensure_finite("start_growth", self.start_growth)?;
        for (name, definition) in &self.depth_definitions {
            definition.validate(name)?;
        }
        Ok(())
    }

    /// Upper bound on the number of nodes `generate_structure` can emit.
    ///
    /// Every node spawns one main-axis child plus `ceil(split_amount * growth)`
    /// tangential ones; growth below the root is clamped to 1.
    pub fn estimate_node_count(&self) -> u64 {
        let mut level = 1f64;
        let mut total = 1f64;
        let mut growth = self.start_growth.max(0.) as f64;
        for definition in self.depth_definitions.values() {
            let per_node = 1. + (definition.split_amount as f64 * growth).ceil().max(0.);
            level *= per_node;
            total += level;
            growth = 1.;
        }
        if total >= u64::MAX as f64 {
            u64::MAX
        } else {
            total as u64
        }
    }
}

struct GenQueueItem {
    node: Node,
    parent_index: Option<usize>,
}

type Children = SmallVec<[GenQueueItem; 16]>;

/// Children of `parent` in push order: the main-axis extension first,
/// then the tangential branches by increasing split index.
fn spawn_children(parent: &Node, parent_index: usize, definition: &DepthDefinition) -> Children {
    let split_amount = definition.split_amount * parent.growth;
    let split_depth = parent.split_depth + 1;
    let first_split = split_depth == 1;
    let size = parent.size * definition.size;

    let mut children = Children::new();

    children.push(GenQueueItem {
        parent_index: Some(parent_index),
        node: Node {
            size,
            position: parent.position + parent.rotation * Vec3::new(0., 0., parent.height()),
            rotation: parent.rotation * Quat::from_rotation_z(definition.branch_roll),
            split_height: if first_split { 0. } else { parent.split_height },
            growth: definition.growth_at(0.),
            split_depth,
        },
    });

    let mut split_index = 0;
    while (split_index as f32) < split_amount {
        let split_height = split_index as f32 / split_amount;
        let offset = parent.height() * (1. - split_height * definition.height_spread);
        let roll = definition.branch_roll
            + flatten_angle(split_index as f32 * TAU * GOLDEN_STEP, definition.flatness);
        children.push(GenQueueItem {
            parent_index: None,
            node: Node {
                size,
                position: parent.position + parent.rotation * Vec3::new(0., 0., offset),
                rotation: parent.rotation
                    * (Quat::from_rotation_z(roll) * Quat::from_rotation_y(definition.branch_pitch)),
                split_height: if first_split { split_height } else { parent.split_height },
                growth: definition.growth_at(split_height * parent.growth),
                split_depth,
            },
        });
        split_index += 1;
    }

    children
}

/// Expands the root node into the full skeleton.
///
/// Pending nodes live in a double-ended list: children go in at the front and
/// the next node comes out of the back, which emits the tree level by level.
/// Only the main-axis child records itself as its parent's primary child.
pub fn generate_structure(settings: &Settings) -> Result<Skeleton> {
    settings.validate()?;
    let estimated = settings.estimate_node_count();
    if estimated > settings.max_nodes {
        return Err(ForestError::TooManyNodes {
            estimated,
            limit: settings.max_nodes,
        });
    }

    let depth_definitions: Vec<&DepthDefinition> = settings.depth_definitions.values().collect();
    let capacity = estimated.min(1 << 16) as usize;
    let mut skeleton = Skeleton {
        nodes: Vec::with_capacity(capacity),
        node_to_primary_child_index: Vec::with_capacity(capacity),
    };

    let mut generation_queue = VecDeque::new();
    generation_queue.push_front(GenQueueItem {
        node: Node::root(settings.start_size, settings.start_growth),
        parent_index: None,
    });

    while let Some(GenQueueItem { node, parent_index }) = generation_queue.pop_back() {
        let node_index = skeleton.nodes.len();
        if !node.is_finite() {
            return Err(ForestError::NonFiniteGeometry { node: node_index });
        }
        skeleton.nodes.push(node);
        skeleton.node_to_primary_child_index.push(None);
        if let Some(parent_index) = parent_index {
            skeleton.node_to_primary_child_index[parent_index] = Some(node_index);
        }

        if let Some(definition) = depth_definitions.get(node.split_depth) {
            for child in spawn_children(&node, node_index, definition) {
                generation_queue.push_front(child);
            }
        }
    }

    log::debug!(
        "generated skeleton: {} nodes over {} depths (estimate {})",
        skeleton.node_count(),
        depth_definitions.len(),
        estimated
    );
    Ok(skeleton)
}

impl TreePipelinePhase for Skeleton {
    type Previous = Seed;
    type Config = Settings;
    fn generate_from(_: Self::Previous, config: &Self::Config) -> Result<Self> {
        generate_structure(config)
    }
}
