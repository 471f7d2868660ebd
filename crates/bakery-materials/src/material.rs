//! Per-material texture bindings, atlas cell placement and their errors.

use std::collections::BTreeMap;

use bakery_atlas::{AtlasError, GridCell, TextureChannel, UvRect};
use bakery_scene::{MaterialHandle, TextureHandle};
use glam::Vec4;
use image::Rgba32FImage;
use thiserror::Error;

use crate::import::ImportError;

/// Errors raised by the material texture store.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("material {0:?} was never registered")]
    UnknownMaterial(MaterialHandle),

    #[error("material {0:?} already has a cell")]
    AlreadyPlaced(MaterialHandle),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// One imported source texture of a material.
pub struct ChannelTexture {
    pub texture: TextureHandle,
    pub pixels: Rgba32FImage,
}

/// Where a material landed in the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPlacement {
    pub cell: GridCell,
    pub uv: UvRect,
    /// Copied pixel extent, `min(cell, texture)` per axis.
    pub extent: (u32, u32),
}

/// Everything the bake knows about one source material.
pub struct MaterialRecord {
    pub(crate) handle: MaterialHandle,
    pub(crate) name: String,
    pub(crate) index: u32,
    pub(crate) textures: BTreeMap<TextureChannel, ChannelTexture>,
    pub(crate) color_tint: Vec4,
    pub(crate) metallic_strength: f32,
    pub(crate) valid_textures: bool,
    pub(crate) texture_size: Option<(u32, u32)>,
    pub(crate) placement: Option<CellPlacement>,
    pub(crate) imported: bool,
    pub(crate) restored: bool,
}

impl MaterialRecord {
    pub(crate) fn new(handle: MaterialHandle, name: String, index: u32) -> Self {
        Self {
            handle,
            name,
            index,
            textures: BTreeMap::new(),
            color_tint: Vec4::ONE,
            metallic_strength: 1.0,
            valid_textures: true,
            texture_size: None,
            placement: None,
            imported: false,
            restored: false,
        }
    }

    pub fn handle(&self) -> MaterialHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discovery index; doubles as the atlas cell index.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn texture(&self, channel: TextureChannel) -> Option<&Rgba32FImage> {
        self.textures.get(&channel).map(|t| &t.pixels)
    }

    pub fn has_texture(&self, channel: TextureChannel) -> bool {
        self.textures.contains_key(&channel)
    }

    /// Channels the material has a texture for.
    pub fn channels(&self) -> impl Iterator<Item = TextureChannel> + '_ {
        self.textures.keys().copied()
    }

    pub fn color_tint(&self) -> Vec4 {
        self.color_tint
    }

    pub fn metallic_strength(&self) -> f32 {
        self.metallic_strength
    }

    /// `true` when every imported texture has the same dimensions.
    pub fn valid_textures(&self) -> bool {
        self.valid_textures
    }

    /// Common texture dimensions, `None` for a material without textures.
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        self.texture_size
    }

    pub fn placement(&self) -> Option<&CellPlacement> {
        self.placement.as_ref()
    }

    pub fn uv_rect(&self) -> Option<UvRect> {
        self.placement.map(|p| p.uv)
    }

    pub fn is_imported(&self) -> bool {
        self.imported
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Recomputes `valid_textures` and `texture_size` from the imported textures.
    pub(crate) fn validate(&mut self) {
        let mut sizes = self.textures.values().map(|t| t.pixels.dimensions());
        self.texture_size = sizes.next();
        self.valid_textures = match self.texture_size {
            Some(first) => sizes.all(|size| size == first),
            None => true,
        };
    }
}
