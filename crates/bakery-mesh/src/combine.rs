//! Merging placed submesh geometry into a single mesh.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::geometry::SubmeshGeometry;

/// Matrices with a smaller determinant are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// One placement of a submesh in a merged mesh.
#[derive(Clone, Copy, Debug)]
pub struct CombineInstance<'a> {
    pub geometry: &'a SubmeshGeometry,
    /// Placement relative to the bake root.
    pub transform: Mat4,
}

/// A merged single-submesh mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// Interleaved vertex of a [`CombinedMesh`], ready for upload or export.
///
/// Layout (48 bytes total):
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..40]` tangent `[f32; 4]`, `w` = bitangent sign
///   - `[40..48]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BakedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(BakedVertex, [u8; 48]);

impl CombinedMesh {
    /// Concatenates `instances` into one mesh named `name`.
    ///
    /// Positions are transformed by the full matrix, normals by the
    /// inverse-transpose of its upper 3×3 and tangent `xyz` by the upper 3×3;
    /// both are renormalised and tangent `w` is kept. Indices are offset by
    /// the vertices already emitted. Absent normals and tangents become zero.
    pub fn from_instances(name: impl Into<String>, instances: &[CombineInstance<'_>]) -> Self {
        let vertex_total: usize = instances.iter().map(|i| i.geometry.vertex_count()).sum();
        let index_total: usize = instances.iter().map(|i| i.geometry.indices.len()).sum();

        let mut mesh = Self {
            name: name.into(),
            positions: Vec::with_capacity(vertex_total),
            normals: Vec::with_capacity(vertex_total),
            tangents: Vec::with_capacity(vertex_total),
            uvs: Vec::with_capacity(vertex_total),
            indices: Vec::with_capacity(index_total),
        };

        for instance in instances {
            let geometry = instance.geometry;
            let base = mesh.positions.len() as u32;
            let linear = Mat3::from_mat4(instance.transform);
            let normal_matrix = if linear.determinant().abs() > SINGULAR_EPSILON {
                linear.inverse().transpose()
            } else {
                log::warn!(
                    "{}: singular placement transform, normals not inverse-transposed",
                    mesh.name
                );
                linear
            };

            for (i, &position) in geometry.positions.iter().enumerate() {
                mesh.positions
                    .push(instance.transform.transform_point3(position));

                let normal = geometry.normals.get(i).copied().unwrap_or(Vec3::ZERO);
                mesh.normals.push((normal_matrix * normal).normalize_or_zero());

                let tangent = geometry.tangents.get(i).copied().unwrap_or(Vec4::ZERO);
                let xyz = (linear * tangent.truncate()).normalize_or_zero();
                mesh.tangents.push(xyz.extend(tangent.w));

                mesh.uvs
                    .push(geometry.uvs.get(i).copied().unwrap_or(Vec2::ZERO));
            }

            mesh.indices
                .extend(geometry.indices.iter().map(|&index| index + base));
        }
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the vertex streams.
    pub fn to_vertices(&self) -> Vec<BakedVertex> {
        (0..self.positions.len())
            .map(|i| BakedVertex {
                position: self.positions[i].to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
                tangent: self.tangents.get(i).copied().unwrap_or(Vec4::ZERO).to_array(),
                uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            })
            .collect()
    }

    /// The interleaved vertices as raw bytes.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_vertices()).to_vec()
    }

    /// The `u32` index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
