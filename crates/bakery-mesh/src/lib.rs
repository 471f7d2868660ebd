//! Per-material geometry collection, UV remapping and LOD-aware merging.

mod collector;
mod combine;
mod geometry;
mod record;

pub use collector::{GeometryCollector, MaterialGeometry, MeshLodBucket};
pub use combine::{BakedVertex, CombineInstance, CombinedMesh};
pub use geometry::{MeshError, SubmeshGeometry};
pub use record::{SubmeshRecord, SubmeshState};
