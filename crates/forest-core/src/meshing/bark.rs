use glam::Vec3;

use super::mesh_builder::Mesh;
use super::MeshSettings;
use crate::error::Result;
use crate::growing::Skeleton;
use crate::utils::lerp;

pub const BARK_VERTICES_PER_NODE: usize = 8;

const BARK_NORMALS: [Vec3; BARK_VERTICES_PER_NODE] = [
    Vec3::new(0.5, 0.5, 0.),
    Vec3::new(-0.5, 0.5, 0.),
    Vec3::new(-0.5, -0.5, 0.),
    Vec3::new(0.5, -0.5, 0.),
    Vec3::new(0.5, 0.5, 0.),
    Vec3::new(-0.5, 0.5, 0.),
    Vec3::new(-0.5, -0.5, 0.),
    Vec3::new(0.5, -0.5, 0.),
];

#[rustfmt::skip]
pub const BARK_TRIANGLES: [u32; 36] = [
    0, 1, 2, 2, 3, 0, // bottom
    6, 5, 4, 4, 7, 6, // top
    2, 1, 5, 5, 6, 2, // left
    0, 3, 4, 4, 3, 7, // right
    3, 2, 6, 6, 7, 3, // back
    1, 0, 4, 4, 5, 1, // forward
];

/// Square ring of half-width `0.5 * radius` at height `z`.
fn ring(radius: f32, z: f32) -> [Vec3; 4] {
    let r = 0.5 * radius;
    [
        Vec3::new(r, r, z),
        Vec3::new(-r, r, z),
        Vec3::new(-r, -r, z),
        Vec3::new(r, -r, z),
    ]
}

/// One tapered square prism per node that is not at the leaf depth.
///
/// The far end of a segment is sized from its primary child and grandchild,
/// exactly as the near end of the child's own segment, so consecutive
/// segments meet without a step once fully grown.
pub fn generate_tapered_wood(skeleton: &Skeleton, settings: &MeshSettings) -> Result<Mesh> {
    settings.validate()?;
    skeleton.check_links()?;
    let leaf_depth = settings.leaves.split_depth;
    let node_count = skeleton
        .nodes
        .iter()
        .filter(|n| n.split_depth != leaf_depth)
        .count();
    let mut mesh = Mesh::with_capacity(
        node_count * BARK_VERTICES_PER_NODE,
        node_count * BARK_TRIANGLES.len(),
    );

    for (node_index, parent) in skeleton.nodes.iter().enumerate() {
        if parent.split_depth == leaf_depth {
            continue;
        }
        let child_index = skeleton.primary_child(node_index);
        let child = child_index.map_or(parent, |i| skeleton.node(i));
        let grandchild = child_index
            .and_then(|i| skeleton.primary_child(i))
            .map_or(child, |i| skeleton.node(i));

        let height = parent.height();
        let parent_radius = lerp(child.size, parent.size, parent.growth) * settings.thickness;
        let child_radius = lerp(grandchild.size, child.size, child.growth) * settings.thickness;

        let [a, b, c, d] = ring(parent_radius, 0.);
        let [e, f, g, h] = ring(child_radius, height);
        mesh.register_block(
            node_index,
            parent.rotation,
            parent.position,
            &[a, b, c, d, e, f, g, h],
            &BARK_NORMALS,
            parent.split_height,
            &BARK_TRIANGLES,
        )?;
    }

    log::debug!(
        "bark mesh: {} segments, {} vertices, {} triangles",
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
            thickness: 0.1,
            leaves: LeafSettings {
                split_depth: leaf_depth,
                length: 1.,
                breadth: 0.3,
            },
        }
    }

    fn chain_link(size: f32) -> DepthDefinition {
        DepthDefinition {
            split_amount: 0.,
            flatness: 0.,
            size,
            height_spread: 0.,
            branch_pitch: 0.,
            branch_roll: 0.,
            height_to_growth: SmoothCurve::constant(1.),
        }
    }

    fn vertex(mesh: &Mesh, i: usize) -> Vec3 {
        Vec3::from_slice(&mesh.vertices[3 * i..3 * i + 3])
    }

    #[test]
    fn lonely_root_is_its_own_child() {
        let skeleton = generate_structure(&Settings::new(2., 0.5)).unwrap();
        let mesh = generate_tapered_wood(&skeleton, &mesh_settings(1)).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.triangles, BARK_TRIANGLES.to_vec());
        // radius 2 * 0.1 at both ends, height 2 * 0.5
        assert!((vertex(&mesh, 0) - Vec3::new(0.1, 0.1, 0.)).length() < 1e-6);
        assert!((vertex(&mesh, 6) - Vec3::new(-0.1, -0.1, 1.)).length() < 1e-6);
    }

    #[test]
    fn leaf_depth_nodes_are_skipped() {
        let skeleton = generate_structure(&Settings::new(1., 1.)).unwrap();
        let mesh = generate_tapered_wood(&skeleton, &mesh_settings(0)).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn taper_is_continuous_along_main_axis() {
        let settings = Settings::new(1., 1.)
            .with_depth("a", chain_link(0.6))
            .with_depth("b", chain_link(0.5));
        let skeleton = generate_structure(&settings).unwrap();
        assert_eq!(skeleton.node_count(), 3);

        let mesh = generate_tapered_wood(&skeleton, &mesh_settings(99)).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(&mesh.triangles[36..42], &[8, 9, 10, 10, 11, 8]);

        for segment in 0..2 {
            for corner in 0..4 {
                let far_end = vertex(&mesh, 8 * segment + 4 + corner);
                let next_near_end = vertex(&mesh, 8 * (segment + 1) + corner);
                assert!((far_end - next_near_end).length() < 1e-6);
            }
        }
        // the near end of the first segment keeps the root's own size
        assert!((vertex(&mesh, 0).x - 0.05).abs() < 1e-6);
        assert!((vertex(&mesh, 4).x - 0.03).abs() < 1e-6);
    }

    #[test]
    fn growing_segment_is_pulled_toward_child() {
        let settings = Settings::new(1., 0.).with_depth("a", chain_link(0.5));
        let skeleton = generate_structure(&settings).unwrap();
        let mesh = generate_tapered_wood(&skeleton, &mesh_settings(99)).unwrap();
        // growth 0: zero length, base radius taken from the child
        assert!((vertex(&mesh, 0) - Vec3::new(0.025, 0.025, 0.)).length() < 1e-6);
        assert!(vertex(&mesh, 4).z.abs() < 1e-6);
    }

    #[test]
    fn normals_follow_rotation() {
        let mut definition = chain_link(0.5);
        definition.split_amount = 1.;
        definition.branch_pitch = std::f32::consts::FRAC_PI_2;
        let settings = Settings::new(1., 1.).with_depth("a", definition);
        let skeleton = generate_structure(&settings).unwrap();
        let mesh = generate_tapered_wood(&skeleton, &mesh_settings(99)).unwrap();
        assert_eq!(mesh.vertex_count(), 24);

        for n in mesh.normal_vectors() {
            assert!((Vec3::from_array(n).length() - 1.).abs() < 1e-5);
        }
        // third block is the pitched branch: its side normals lie in the YZ plane
        for n in mesh.normal_vectors().skip(16) {
            assert!(n[0].abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_bad_thickness() {
        let skeleton = generate_structure(&Settings::new(1., 1.)).unwrap();
        let mut settings = mesh_settings(1);
        settings.thickness = -1.;
        assert!(generate_tapered_wood(&skeleton, &settings).is_err());
    }

    #[test]
    fn overflowing_thickness_is_rejected() {
        let skeleton = generate_structure(&Settings::new(2., 1.)).unwrap();
        let mut settings = mesh_settings(1);
        settings.thickness = f32::MAX;
        assert!(matches!(
            generate_tapered_wood(&skeleton, &settings),
            Err(ForestError::NonFiniteGeometry { node: 0 })
        ));

        // the root is leaf depth here, so the first emitted segment is node 1
        let skeleton = generate_structure(&Settings::new(1., 1.).with_depth("a", chain_link(2.))).unwrap();
        settings.leaves.split_depth = 0;
        assert!(matches!(
            generate_tapered_wood(&skeleton, &settings),
            Err(ForestError::NonFiniteGeometry { node: 1 })
        ));
    }

    #[test]
    fn mismatched_link_table_is_an_error() {
        let mut skeleton = generate_structure(&Settings::new(1., 1.).with_depth("a", chain_link(0.5))).unwrap();
        skeleton.node_to_primary_child_index.truncate(1);
        assert!(matches!(
            generate_tapered_wood(&skeleton, &mesh_settings(99)),
            Err(ForestError::MalformedSkeleton(_))
        ));
    }
}
