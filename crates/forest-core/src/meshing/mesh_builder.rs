use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ForestError, Result};

/// Flat vertex buffers ready to be uploaded by a renderer.
///
/// `vertices` and `normals` hold 3 floats per vertex, `split_height` one,
/// `triangles` indexes into them three at a time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub split_height: Vec<f32>,
    pub triangles: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(3 * vertex_count),
            normals: Vec::with_capacity(3 * vertex_count),
            split_height: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(index_count),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.split_height.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = [f32; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn normal_vectors(&self) -> impl ExactSizeIterator<Item = [f32; 3]> + '_ {
        self.normals.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Appends one block of local-space geometry placed by `rotation` and `position`.
    /// `triangles` index into `points`.
    ///
    /// Nothing is appended when a placed vertex or normal is not finite; `node`
    /// names the skeleton node the block belongs to in the returned error.
    pub(crate) fn register_block(
        &mut self,
        node: usize,
        rotation: Quat,
        position: Vec3,
        points: &[Vec3],
        normals: &[Vec3],
        split_height: f32,
        triangles: &[u32],
    ) -> Result<()> {
        debug_assert_eq!(points.len(), normals.len());
        let base = self.vertex_count();
        let vertices = base + points.len();
        if u32::try_from(vertices).is_err() {
            return Err(ForestError::IndexOverflow { vertices });
        }
        let base = base as u32;
        let transform = Mat4::from_rotation_translation(rotation, position);

        let placed: SmallVec<[Vec3; 8]> = points.iter().map(|p| transform.transform_point3(*p)).collect();
        let turned: SmallVec<[Vec3; 8]> = normals.iter().map(|n| (rotation * *n).normalize()).collect();
        if !split_height.is_finite() || !placed.iter().chain(&turned).all(|v| v.is_finite()) {
            return Err(ForestError::NonFiniteGeometry { node });
        }

        for p in placed {
            self.vertices.extend_from_slice(&p.to_array());
        }
        for n in turned {
            self.normals.extend_from_slice(&n.to_array());
        }
        self.split_height
            .extend(std::iter::repeat(split_height).take(points.len()));
        self.triangles.extend(triangles.iter().map(|i| i + base));
        Ok(())
    }

    /// The index buffer as 16 bit integers, if every vertex is addressable that way.
    pub fn triangles_u16(&self) -> Option<Vec<u16>> {
        if self.vertex_count() > u16::MAX as usize + 1 {
            return None;
        }
        self.triangles
            .iter()
            .map(|&i| u16::try_from(i).ok())
            .collect()
    }

    /// Keeps the triangles a renderer would draw for an instance at `growth`:
    /// any triangle touching a vertex with a split height above `growth` is dropped.
    pub fn gated_by_growth(&self, growth: f32) -> Mesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertex_count()];
        let mut result = Mesh::new();

        for triangle in self.triangles.chunks_exact(3) {
            if triangle
                .iter()
                .any(|&i| self.split_height[i as usize] > growth)
            {
                continue;
            }
            for &i in triangle {
                let i = i as usize;
                let new_index = *remap[i].get_or_insert_with(|| {
                    let new_index = result.vertex_count() as u32;
                    result.vertices.extend_from_slice(&self.vertices[3 * i..3 * i + 3]);
                    result.normals.extend_from_slice(&self.normals[3 * i..3 * i + 3]);
                    result.split_height.push(self.split_height[i]);
                    new_index
                });
                result.triangles.push(new_index);
            }
        }
        result
    }

    /// Axis aligned bounds of the vertex buffer, `None` when there are no vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.positions().map(Vec3::from_array).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((min, max)) => Some((min.min(p), max.max(p))),
        })
    }
}
