//! Texture atlas layout: grid planning, channel definitions, per-cell UV
//! rectangles and the destination pixel buffers.

mod channel;
mod planner;
mod texture_set;
mod uv;

pub use channel::{DEFAULT_CHANNELS, PostProcess, TextureChannel};
pub use planner::{AtlasError, AtlasPlan, GridCell, next_pow2};
pub use texture_set::{AtlasLayer, AtlasTextureSet, OPAQUE_BLACK};
pub use uv::UvRect;
