use bevy::asset::RenderAssetUsages;
use bevy::prelude::Mesh;
use bevy_render::mesh::{Indices, MeshVertexAttribute, PrimitiveTopology};
use bevy_render::render_resource::VertexFormat;
use forest_core::{Result, TreeMeshes, TreePipelinePhase};

/// Per-vertex split height, compared against the instance growth by the vertex shader.
pub const ATTRIBUTE_SPLIT_HEIGHT: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_SplitHeight", 988_540_917, VertexFormat::Float32);

pub struct BevyMeshes {
    pub bark: Mesh,
    pub leaves: Mesh,
}

pub fn to_bevy_mesh(mesh: &forest_core::Mesh) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, mesh.positions().collect::<Vec<_>>())
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, mesh.normal_vectors().collect::<Vec<_>>())
    .with_inserted_attribute(ATTRIBUTE_SPLIT_HEIGHT, mesh.split_height.clone())
    .with_inserted_indices(Indices::U32(mesh.triangles.clone()))
}

impl TreePipelinePhase for BevyMeshes {
    type Previous = TreeMeshes;
    type Config = ();
    fn generate_from(prev: Self::Previous, _: &Self::Config) -> Result<Self> {
        Ok(BevyMeshes {
            bark: to_bevy_mesh(&prev.bark),
            leaves: to_bevy_mesh(&prev.leaves),
        })
    }
}
