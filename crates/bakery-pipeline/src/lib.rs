//! The bake: discovery, atlas packing, texture compositing, UV remapping and
//! per-LOD merging, with host import state restored on every exit path.

mod bake;
mod error;
mod progress;
mod sink;

pub use bake::{Bakery, count_steps};
pub use error::BakeError;
pub use progress::{LogProgress, NullProgress, Progress, ProgressSink};
pub use sink::{AssetSink, BakeOutput, CombinedMaterial, LodOutput, SinkError, texture_file_name};
