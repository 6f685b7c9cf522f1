#[cfg(feature = "bevy")]
pub mod bevy_mesh;
pub mod export;

pub use forest_core::{
    generate_leaves, generate_structure, generate_tapered_wood, DepthDefinition, ForestError,
    Grow, Instance, LeafSettings, Mesh, MeshSettings, Node, Seed, Settings, Skeleton,
    SmoothCurve, TreeConfig, TreeMeshes, TreePipelinePhase,
};

#[cfg(feature = "bevy")]
pub use bevy_mesh::BevyMeshes;
pub use export::BufferExport;
