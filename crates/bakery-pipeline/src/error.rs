//! Top-level bake error.

use bakery_atlas::AtlasError;
use bakery_materials::{CompositeError, ImportError, MaterialError};
use bakery_mesh::MeshError;
use bakery_scene::SceneError;
use thiserror::Error;

use crate::sink::SinkError;

/// Everything that can stop a bake.
#[derive(Debug, Error)]
pub enum BakeError {
    /// No renderer under the root contributed a material.
    #[error("nothing to bake: the selection has no usable renderers")]
    EmptySelection,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
