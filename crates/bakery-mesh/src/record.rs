//! Lifecycle of one shared submesh geometry from registration to merge.

use bakery_atlas::UvRect;
use bakery_scene::Transform;

use crate::geometry::{MeshError, SubmeshGeometry};

/// Lifecycle of a submesh record.
///
/// `Combined` is reached from either earlier state; whether the geometry went
/// through `UvRemapped` first is kept by [`SubmeshRecord::is_uv_remapped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmeshState {
    Registered,
    UvRemapped,
    Combined,
}

/// Geometry of one (mesh, submesh, LOD) triple and every placement of it.
#[derive(Debug)]
pub struct SubmeshRecord {
    mesh_name: String,
    submesh: usize,
    geometry: SubmeshGeometry,
    placements: Vec<Transform>,
    state: SubmeshState,
    uv_remapped: bool,
}

impl SubmeshRecord {
    pub(crate) fn new(mesh_name: String, submesh: usize, geometry: SubmeshGeometry) -> Self {
        Self {
            mesh_name,
            submesh,
            geometry,
            placements: Vec::new(),
            state: SubmeshState::Registered,
            uv_remapped: false,
        }
    }

    pub fn mesh_name(&self) -> &str {
        &self.mesh_name
    }

    pub fn submesh(&self) -> usize {
        self.submesh
    }

    pub fn geometry(&self) -> &SubmeshGeometry {
        &self.geometry
    }

    /// World transforms of every renderer placing this submesh.
    pub fn placements(&self) -> &[Transform] {
        &self.placements
    }

    pub fn state(&self) -> SubmeshState {
        self.state
    }

    /// Whether the geometry was remapped into an atlas rectangle.
    pub fn is_uv_remapped(&self) -> bool {
        self.uv_remapped
    }

    pub(crate) fn add_placement(&mut self, transform: Transform) {
        self.placements.push(transform);
    }

    /// Remaps the shared geometry into `rect`. Allowed once, before combining.
    pub fn remap(&mut self, rect: &UvRect) -> Result<usize, MeshError> {
        if self.state != SubmeshState::Registered {
            return Err(MeshError::AlreadyRemapped {
                mesh: self.mesh_name.clone(),
                index: self.submesh,
            });
        }
        let rewritten = self.geometry.remap_uvs(rect);
        self.state = SubmeshState::UvRemapped;
        self.uv_remapped = true;
        Ok(rewritten)
    }

    pub(crate) fn mark_combined(&mut self) {
        if !self.uv_remapped {
            log::debug!(
                "{} submesh {}: combined with its source UVs",
                self.mesh_name,
                self.submesh
            );
        }
        self.state = SubmeshState::Combined;
    }
}
