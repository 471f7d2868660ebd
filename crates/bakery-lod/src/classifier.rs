//! Mesh → LOD level lookup built from the LOD groups under the bake root.

use bakery_scene::{LodGroup, MeshHandle};
use rustc_hash::FxHashMap;

/// Maps each mesh referenced by a LOD group to the level it first appears at.
///
/// Groups are visited in order and levels finest first; the first reference
/// to a mesh wins. Meshes that no group references resolve to `None`
/// (the "no LOD" slot).
#[derive(Debug, Default)]
pub struct LodClassifier {
    level_of_mesh: FxHashMap<MeshHandle, u32>,
    meshes_per_level: Vec<Vec<MeshHandle>>,
}

impl LodClassifier {
    /// Builds the lookup from the given LOD groups.
    pub fn new(groups: &[LodGroup]) -> Self {
        let mut classifier = Self::default();

        for group in groups {
            for (level, lod) in group.levels.iter().enumerate() {
                if classifier.meshes_per_level.len() <= level {
                    classifier.meshes_per_level.resize_with(level + 1, Vec::new);
                }

                for &mesh in &lod.meshes {
                    classifier.meshes_per_level[level].push(mesh);
                    classifier
                        .level_of_mesh
                        .entry(mesh)
                        .or_insert(level as u32);
                }
            }
        }

        classifier
    }

    /// LOD level of `mesh`, or `None` if no LOD group references it.
    pub fn lod_of(&self, mesh: MeshHandle) -> Option<u32> {
        self.level_of_mesh.get(&mesh).copied()
    }

    /// Every mesh listed at `level` across all groups, in visit order.
    pub fn meshes_for_level(&self, level: u32) -> &[MeshHandle] {
        self.meshes_per_level
            .get(level as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of levels of the deepest group.
    pub fn level_count(&self) -> usize {
        self.meshes_per_level.len()
    }

    /// Returns `true` if no LOD group contributed any level.
    pub fn is_empty(&self) -> bool {
        self.meshes_per_level.is_empty()
    }
}
