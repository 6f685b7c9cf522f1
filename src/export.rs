use forest_core::{Instance, Mesh, TreeMeshes};
use serde::{Deserialize, Serialize};

/// The buffers a renderer needs to draw a forest: both meshes, shared by every
/// instance, plus one position and one growth value per instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferExport {
    pub node_count: usize,
    pub bark: Mesh,
    pub leaves: Mesh,
    pub model_position: Vec<f32>,
    pub model_growth: Vec<f32>,
}

impl BufferExport {
    pub fn new(tree: &TreeMeshes, instances: &[Instance]) -> Self {
        Self {
            node_count: tree.skeleton.node_count(),
            bark: tree.bark.clone(),
            leaves: tree.leaves.clone(),
            model_position: instances
                .iter()
                .flat_map(|i| i.position.to_array())
                .collect(),
            model_growth: instances.iter().map(|i| i.growth).collect(),
        }
    }

    /// Replaces both meshes by the part visible at `growth`, for consumers
    /// that cannot clip vertices themselves.
    pub fn gated(mut self, growth: f32) -> Self {
        self.bark = self.bark.gated_by_growth(growth);
        self.leaves = self.leaves.gated_by_growth(growth);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
