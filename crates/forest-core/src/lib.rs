pub mod config;
pub mod curve;
pub mod error;
pub mod growing;
pub mod meshing;
pub mod utils;

pub use config::{Instance, TreeConfig};
pub use curve::SmoothCurve;
pub use error::{ForestError, Result};
pub use growing::generation::{generate_structure, DepthDefinition, Settings};
pub use growing::{Node, Skeleton};
pub use meshing::{generate_leaves, generate_tapered_wood, LeafSettings, Mesh, MeshSettings, TreeMeshes};

/// One stage of the generation pipeline, built from the output of the stage before.
pub trait TreePipelinePhase: Sized {
    type Previous;
    type Config;
    fn generate_from(prev: Self::Previous, config: &Self::Config) -> Result<Self>;
}

pub trait Grow: Sized {
    fn grow<Next>(self, config: &Next::Config) -> Result<Next>
    where
        Next: TreePipelinePhase<Previous = Self>;
}

impl<T> Grow for T {
    fn grow<Next>(self, config: &<Next as TreePipelinePhase>::Config) -> Result<Next>
    where
        Next: TreePipelinePhase<Previous = T>,
    {
        Next::generate_from(self, config)
    }
}

/// Start of the pipeline: nothing has been generated yet.
pub struct Seed;
