//! Flattened per-submesh vertex streams and their UV rewrite.

use bakery_atlas::UvRect;
use bakery_scene::{MeshData, SceneError};
use glam::{Vec2, Vec3, Vec4};
use thiserror::Error;

/// Errors raised while collecting or remapping geometry.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The renderer's material list does not line up with the mesh's submeshes.
    #[error("renderer '{renderer}' has {materials} material(s) for {submeshes} submesh(es)")]
    SubmeshMismatch {
        renderer: String,
        submeshes: usize,
        materials: usize,
    },

    #[error("mesh '{mesh}' has no submesh {index}")]
    MissingSubmesh { mesh: String, index: usize },

    #[error("mesh '{mesh}' references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("submesh {index} of mesh '{mesh}' was already remapped")]
    AlreadyRemapped { mesh: String, index: usize },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// One submesh's triangles together with the full shared vertex buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmeshGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    /// Triangle list into the vertex buffer.
    pub indices: Vec<u32>,
}

impl SubmeshGeometry {
    /// Copies `mesh`'s vertex buffer and the triangle list of `submesh`.
    ///
    /// Missing UVs are filled with zero so every vertex has one.
    pub fn extract(mesh: &MeshData, submesh: usize) -> Result<Self, MeshError> {
        let indices = mesh
            .submeshes
            .get(submesh)
            .ok_or_else(|| MeshError::MissingSubmesh {
                mesh: mesh.name.clone(),
                index: submesh,
            })?;

        let vertex_count = mesh.vertex_count();
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                mesh: mesh.name.clone(),
                index: bad,
                vertex_count,
            });
        }

        let mut uvs = mesh.uvs.clone();
        uvs.resize(vertex_count, Vec2::ZERO);

        Ok(Self {
            positions: mesh.positions.clone(),
            normals: mesh.normals.clone(),
            tangents: mesh.tangents.clone(),
            uvs,
            indices: indices.clone(),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Remaps the UV of every vertex the triangle list references into `rect`.
    ///
    /// Each referenced vertex is rewritten exactly once from its original
    /// value; vertices no triangle uses keep their UVs. Returns the number of
    /// vertices rewritten.
    pub fn remap_uvs(&mut self, rect: &UvRect) -> usize {
        let mut referenced = vec![false; self.uvs.len()];
        for &index in &self.indices {
            if let Some(slot) = referenced.get_mut(index as usize) {
                *slot = true;
            }
        }

        let mut rewritten = 0;
        for (uv, _) in self
            .uvs
            .iter_mut()
            .zip(&referenced)
            .filter(|(_, referenced)| **referenced)
        {
            *uv = rect.remap(*uv);
            rewritten += 1;
        }
        rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_submesh_quad() -> MeshData {
        MeshData {
            name: "quad".into(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE, Vec3::Z],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.5, 0.5),
            ],
            submeshes: vec![vec![0, 1, 2, 2, 1, 0], vec![1, 3, 2]],
            ..MeshData::default()
        }
    }

    #[test]
    fn test_extract_keeps_full_vertex_buffer() {
        let geometry = SubmeshGeometry::extract(&two_submesh_quad(), 1).unwrap();
        assert_eq!(geometry.vertex_count(), 5);
        assert_eq!(geometry.indices, vec![1, 3, 2]);
        assert!(matches!(
            SubmeshGeometry::extract(&two_submesh_quad(), 2),
            Err(MeshError::MissingSubmesh { index: 2, .. })
        ));
    }

    #[test]
    fn test_extract_rejects_bad_indices() {
        let mut mesh = two_submesh_quad();
        mesh.submeshes[0].push(9);
        assert!(matches!(
            SubmeshGeometry::extract(&mesh, 0),
            Err(MeshError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_remap_touches_referenced_vertices_once() {
        let mut geometry = SubmeshGeometry::extract(&two_submesh_quad(), 0).unwrap();
        let rect = UvRect {
            start: Vec2::new(0.5, 0.0),
            end: Vec2::new(0.75, 0.25),
        };
        // Vertices 0..=2 are each referenced twice; 3 and 4 are unused.
        assert_eq!(geometry.remap_uvs(&rect), 3);
        assert_eq!(geometry.uvs[0], Vec2::new(0.5, 0.0));
        assert_eq!(geometry.uvs[1], Vec2::new(0.75, 0.0));
        assert_eq!(geometry.uvs[2], Vec2::new(0.5, 0.25));
        assert_eq!(geometry.uvs[3], Vec2::new(1.0, 1.0));
        assert_eq!(geometry.uvs[4], Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_missing_uvs_padded() {
        let mut mesh = two_submesh_quad();
        mesh.uvs.truncate(2);
        let geometry = SubmeshGeometry::extract(&mesh, 0).unwrap();
        assert_eq!(geometry.uvs.len(), 5);
        assert_eq!(geometry.uvs[4], Vec2::ZERO);
    }
}
