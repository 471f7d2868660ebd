//! Source material handling: scoped texture import against the host, the
//! per-material texture store, and compositing into the atlas.

pub mod compositor;
pub mod import;
mod material;
mod store;

pub use compositor::{CompositeError, composite};
pub use import::{
    ImportError, ImportScope, ImportSettings, MemoryTextureImporter, TextureImporter, TextureKind,
};
pub use material::{CellPlacement, ChannelTexture, MaterialError, MaterialRecord};
pub use store::MaterialTextureStore;
