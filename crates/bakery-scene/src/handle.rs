//! Opaque identifiers for host-owned assets.

use serde::{Deserialize, Serialize};

/// Identity of a source material. Two renderers sharing a handle share one atlas cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub u64);

/// Identity of a source mesh asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshHandle(pub u64);

/// Identity of a texture asset whose import settings live on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub u64);
