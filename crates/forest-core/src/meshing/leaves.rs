use glam::Vec3;

use super::mesh_builder::Mesh;
use super::MeshSettings;
use crate::error::Result;
use crate::growing::Skeleton;

pub const LEAF_VERTICES_PER_NODE: usize = 4;

pub const LEAF_TRIANGLES: [u32; 6] = [0, 1, 2, 2, 3, 0];

// slight V fold along the leaf axis
const LEAF_NORMALS: [Vec3; LEAF_VERTICES_PER_NODE] = [
    Vec3::new(0., 1., 0.),
    Vec3::new(-0.2, 0.8, 0.),
    Vec3::new(0., 1., 0.),
    Vec3::new(0.2, 0.8, 0.),
];

/// One dart shaped quad per node sitting exactly at the leaf depth.
pub fn generate_leaves(skeleton: &Skeleton, settings: &MeshSettings) -> Result<Mesh> {
    settings.validate()?;
    skeleton.check_links()?;
    let leaf_depth = settings.leaves.split_depth;
    if leaf_depth > skeleton.max_split_depth() {
        log::warn!(
            "leaf depth {} is never reached, deepest node is at {}",
            leaf_depth,
            skeleton.max_split_depth()
        );
    }

    let node_count = skeleton
        .nodes
        .iter()
        .filter(|n| n.split_depth == leaf_depth)
        .count();
    let mut mesh = Mesh::with_capacity(
        node_count * LEAF_VERTICES_PER_NODE,
        node_count * LEAF_TRIANGLES.len(),
    );

    for (node_index, node) in skeleton
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.split_depth == leaf_depth)
    {
        let length = node.size * settings.leaves.length;
        let breadth = node.size * settings.leaves.breadth;
        let points = [
            Vec3::ZERO,
            Vec3::new(breadth * 0.4, breadth * 0.1, length * 0.5),
            Vec3::new(0., 0., length),
            Vec3::new(breadth * -0.4, breadth * 0.1, length * 0.5),
        ];
        mesh.register_block(
            node_index,
            node.rotation,
            node.position,
            &points,
            &LEAF_NORMALS,
            node.split_height,
            &LEAF_TRIANGLES,
        )?;
    }

    log::debug!(
        "leaf mesh: {} leaves, {} vertices, {} triangles",
        node_count,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::growing::generation::{generate_structure, DepthDefinition, Settings};
    use crate::meshing::LeafSettings;
    use crate::{ForestError, SmoothCurve};

    fn mesh_settings(leaf_depth: usize) -> MeshSettings {
        MeshSettings {
            thickness: 0.05,
            leaves: LeafSettings {
                split_depth: leaf_depth,
                length: 1.,
                breadth: 0.5,
            },
        }
    }

    fn single_depth() -> Settings {
        Settings::new(1., 1.).with_depth(
            "leaf",
            DepthDefinition {
                split_amount: 4.,
                flatness: 0.,
                size: 0.5,
                height_spread: 0.,
                branch_pitch: 0.,
                branch_roll: 0.,
                height_to_growth: SmoothCurve::constant(1.),
            },
        )
    }

    #[test]
    fn one_quad_per_leaf_node() {
        let skeleton = generate_structure(&single_depth()).unwrap();
        let mesh = generate_leaves(&skeleton, &mesh_settings(1)).unwrap();
        assert_eq!(mesh.vertex_count(), 5 * 4);
        assert_eq!(mesh.triangle_count(), 5 * 2);
        assert_eq!(&mesh.triangles[6..12], &[4, 5, 6, 6, 7, 4]);

        let split_heights: Vec<f32> = mesh.split_height.chunks(4).map(|c| c[0]).collect();
        assert_eq!(split_heights, vec![0., 0., 0.25, 0.5, 0.75]);
    }

    #[test]
    fn dart_shape_in_local_frame() {
        let skeleton = generate_structure(&Settings::new(2., 1.)).unwrap();
        let mesh = generate_leaves(&skeleton, &mesh_settings(0)).unwrap();
        let expected = [0., 0., 0., 0.4, 0.1, 1., 0., 0., 2., -0.4, 0.1, 1.];
        assert_eq!(mesh.vertices.len(), expected.len());
        for (v, e) in mesh.vertices.iter().zip(expected) {
            assert!((v - e).abs() < 1e-6);
        }
        assert!((Vec3::from_slice(&mesh.normals[0..3]) - Vec3::Y).length() < 1e-6);
        for n in mesh.normal_vectors() {
            assert!((Vec3::from_array(n).length() - 1.).abs() < 1e-5);
        }
    }

    #[test]
    fn unreachable_leaf_depth_is_empty() {
        let skeleton = generate_structure(&single_depth()).unwrap();
        let mesh = generate_leaves(&skeleton, &mesh_settings(7)).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh, Mesh::default());
    }

    #[test]
    fn rejects_negative_leaf_size() {
        let skeleton = generate_structure(&single_depth()).unwrap();
        let mut settings = mesh_settings(1);
        settings.leaves.breadth = -1.;
        assert!(generate_leaves(&skeleton, &settings).is_err());
    }

    #[test]
    fn overflowing_leaf_size_is_rejected() {
        let mut tree = single_depth();
        tree.depth_definitions["leaf"].size = 2.;
        let skeleton = generate_structure(&tree).unwrap();
        let mut settings = mesh_settings(1);
        settings.leaves.length = f32::MAX;
        settings.leaves.breadth = f32::MAX;
        // node 0 is the trunk, the first leaf is node 1
        assert!(matches!(
            generate_leaves(&skeleton, &settings),
            Err(ForestError::NonFiniteGeometry { node: 1 })
        ));
    }

    #[test]
    fn mismatched_link_table_is_an_error() {
        let mut skeleton = generate_structure(&single_depth()).unwrap();
        skeleton.node_to_primary_child_index.push(None);
        assert!(matches!(
            generate_leaves(&skeleton, &mesh_settings(1)),
            Err(ForestError::MalformedSkeleton(_))
        ));
    }
}
