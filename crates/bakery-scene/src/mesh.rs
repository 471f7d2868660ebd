//! Source mesh data as exposed by the host.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A source mesh: one shared vertex buffer and one triangle list per submesh.
///
/// `normals` and `tangents` are optional attributes; when present they hold
/// one entry per vertex.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshData {
    /// Asset name, used in progress text and logs.
    pub name: String,
    /// Vertex positions in mesh-local space.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, or empty.
    pub normals: Vec<Vec3>,
    /// Per-vertex tangents (`w` = bitangent sign), or empty.
    pub tangents: Vec<Vec4>,
    /// First UV channel, one entry per vertex.
    pub uvs: Vec<Vec2>,
    /// Triangle indices per submesh, into the shared vertex buffer.
    pub submeshes: Vec<Vec<u32>>,
}

impl MeshData {
    /// Number of vertices in the shared buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of submeshes (material slots the mesh expects).
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }
}
