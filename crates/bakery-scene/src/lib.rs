//! Scene snapshot consumed by the bake: opaque host handles, world transforms,
//! source meshes, renderers, LOD groups and material properties.
//!
//! The host engine walks its own scene graph and hands the bake a [`Scene`];
//! nothing in this crate talks to the host.

mod handle;
mod mesh;
mod scene;
mod transform;

pub use handle::{MaterialHandle, MeshHandle, TextureHandle};
pub use mesh::MeshData;
pub use scene::{LodGroup, LodLevel, MaterialInfo, Renderer, Scene, SceneError};
pub use transform::Transform;
