pub mod bark;
pub mod leaves;
pub mod mesh_builder;

pub use bark::generate_tapered_wood;
pub use leaves::generate_leaves;
pub use mesh_builder::Mesh;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::growing::Skeleton;
use crate::utils::{ensure_non_negative, ensure_positive};
use crate::TreePipelinePhase;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafSettings {
    /// Nodes at exactly this split depth become leaves, every other node is bark.
    pub split_depth: usize,
    pub length: f32,
    pub breadth: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    pub thickness: f32,
    pub leaves: LeafSettings,
}

impl MeshSettings {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("thickness", self.thickness)?;
        ensure_non_negative("leaves.length", self.leaves.length)?;
        ensure_non_negative("leaves.breadth", self.leaves.breadth)
    }
}

/// A skeleton together with the two meshes derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeMeshes {
    pub skeleton: Skeleton,
    pub bark: Mesh,
    pub leaves: Mesh,
}

impl TreePipelinePhase for TreeMeshes {
    type Previous = Skeleton;
    type Config = MeshSettings;
    fn generate_from(prev: Self::Previous, config: &Self::Config) -> Result<Self> {
        let bark = generate_tapered_wood(&prev, config)?;
        let leaves = generate_leaves(&prev, config)?;
        Ok(Self {
            skeleton: prev,
            bark,
            leaves,
        })
    }
}
