//! Renderers, LOD groups and materials under one bake root.

use std::collections::BTreeMap;

use glam::Vec4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handle::{MaterialHandle, MeshHandle, TextureHandle};
use crate::mesh::MeshData;
use crate::transform::Transform;

// ---------------------------------------------------------------------------
// SceneError
// ---------------------------------------------------------------------------

/// Lookup failures against a [`Scene`].
#[derive(Debug, Error)]
pub enum SceneError {
    /// A renderer references a mesh the snapshot does not contain.
    #[error("mesh {0:?} is not part of the scene")]
    MissingMesh(MeshHandle),

    /// A renderer references a material the snapshot does not contain.
    #[error("material {0:?} is not part of the scene")]
    MissingMaterial(MaterialHandle),
}

// ---------------------------------------------------------------------------
// Scene types
// ---------------------------------------------------------------------------

/// A mesh renderer: one mesh drawn with one material per submesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Renderer {
    /// Object name, used in warnings.
    pub name: String,
    /// Source mesh.
    pub mesh: MeshHandle,
    /// Material per submesh slot.
    pub materials: Vec<MaterialHandle>,
    /// World transform of the renderer's object.
    #[serde(default)]
    pub transform: Transform,
}

/// One authored level of a LOD group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Screen-relative height below which the next level takes over.
    pub screen_relative_height: f32,
    /// Meshes of the renderers assigned to this level.
    pub meshes: Vec<MeshHandle>,
}

/// A discrete LOD switch with ordered levels, finest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LodGroup {
    /// Group name.
    #[serde(default)]
    pub name: String,
    /// Ordered levels, LOD 0 first.
    pub levels: Vec<LodLevel>,
}

/// Material properties the bake reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialInfo {
    /// Display name.
    pub name: String,
    /// `_Color` tint applied to albedo.
    pub color: Vec4,
    /// `_GlossMapScale`, multiplied into the transferred occlusion alpha.
    pub metallic_strength: f32,
    /// Texture per shader property name (e.g. `_MainTex`).
    pub textures: BTreeMap<String, TextureHandle>,
}

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Vec4::ONE,
            metallic_strength: 1.0,
            textures: BTreeMap::new(),
        }
    }
}

impl MaterialInfo {
    /// Returns the texture bound to `property`, if any.
    pub fn texture(&self, property: &str) -> Option<TextureHandle> {
        self.textures.get(property).copied()
    }
}

/// Everything under the bake root, in host enumeration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Transform of the root object; combined meshes are expressed relative to it.
    pub root: Transform,
    /// Renderers in enumeration order. Material discovery follows this order.
    pub renderers: Vec<Renderer>,
    /// LOD groups found under the root.
    pub lod_groups: Vec<LodGroup>,
    /// Source meshes by handle.
    pub meshes: BTreeMap<MeshHandle, MeshData>,
    /// Source materials by handle.
    pub materials: BTreeMap<MaterialHandle, MaterialInfo>,
}

impl Scene {
    /// Looks up a mesh.
    pub fn mesh(&self, handle: MeshHandle) -> Result<&MeshData, SceneError> {
        self.meshes
            .get(&handle)
            .ok_or(SceneError::MissingMesh(handle))
    }

    /// Looks up a material.
    pub fn material(&self, handle: MaterialHandle) -> Result<&MaterialInfo, SceneError> {
        self.materials
            .get(&handle)
            .ok_or(SceneError::MissingMaterial(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults_are_neutral() {
        let info = MaterialInfo::default();
        assert_eq!(info.color, Vec4::ONE);
        assert_eq!(info.metallic_strength, 1.0);
        assert!(info.texture("_MainTex").is_none());
    }

    #[test]
    fn test_missing_lookups_report_handle() {
        let scene = Scene::default();
        assert!(matches!(
            scene.mesh(MeshHandle(4)),
            Err(SceneError::MissingMesh(MeshHandle(4)))
        ));
        assert!(scene.material(MaterialHandle(1)).is_err());
    }

    #[test]
    fn test_scene_ron_roundtrip() {
        let mut scene = Scene::default();
        scene.meshes.insert(
            MeshHandle(1),
            MeshData {
                name: "crate".into(),
                submeshes: vec![vec![0, 1, 2]],
                ..Default::default()
            },
        );
        scene.renderers.push(Renderer {
            name: "crate_a".into(),
            mesh: MeshHandle(1),
            materials: vec![MaterialHandle(7)],
            transform: Transform::default(),
        });
        let text = ron::to_string(&scene).unwrap();
        let back: Scene = ron::from_str(&text).unwrap();
        assert_eq!(scene, back);
    }
}
