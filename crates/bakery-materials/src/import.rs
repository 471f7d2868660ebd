//! Host texture import state and its scoped acquisition.
//!
//! Reading a texture's pixels requires switching its import settings to a
//! CPU-readable, size-clamped form. [`ImportScope`] captures the settings a
//! texture had before the bake and puts them back when the texture is
//! released or the scope is dropped.

use std::collections::BTreeMap;

use bakery_scene::TextureHandle;
use image::Rgba32FImage;
use image::imageops::FilterType;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ImportError
// ---------------------------------------------------------------------------

/// Failures reported by a [`TextureImporter`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The host does not know the texture.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),

    /// Pixels were requested while the texture was not CPU-readable.
    #[error("texture {0:?} is not readable")]
    NotReadable(TextureHandle),

    /// Any other host-side failure.
    #[error("host import failed: {0}")]
    Host(String),
}

// ---------------------------------------------------------------------------
// ImportSettings
// ---------------------------------------------------------------------------

/// How the host interprets a texture asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureKind {
    /// Plain color texture.
    #[default]
    Default,
    /// Normal map (host may swizzle or compress it).
    NormalMap,
    /// Single channel mask.
    SingleChannel,
}

/// The import state of one texture asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// CPU-side pixel access enabled.
    pub readable: bool,
    /// Interpretation of the texture.
    pub kind: TextureKind,
    /// Largest dimension the host will import at.
    pub max_size: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            readable: false,
            kind: TextureKind::Default,
            max_size: 2048,
        }
    }
}

impl ImportSettings {
    /// Readable, plain-color settings clamped to `max_size`.
    pub fn for_baking(max_size: u32) -> Self {
        Self {
            readable: true,
            kind: TextureKind::Default,
            max_size,
        }
    }
}

// ---------------------------------------------------------------------------
// TextureImporter
// ---------------------------------------------------------------------------

/// Host-side texture asset access.
pub trait TextureImporter {
    /// Current import settings of `texture`.
    fn import_settings(&self, texture: TextureHandle) -> Result<ImportSettings, ImportError>;

    /// Applies `settings` to `texture` and re-imports it.
    fn reimport(
        &mut self,
        texture: TextureHandle,
        settings: &ImportSettings,
    ) -> Result<(), ImportError>;

    /// Reads the imported pixels of `texture`, top row first.
    ///
    /// Fails with [`ImportError::NotReadable`] unless the current settings are readable.
    fn read_pixels(&self, texture: TextureHandle) -> Result<Rgba32FImage, ImportError>;
}

// ---------------------------------------------------------------------------
// ImportScope
// ---------------------------------------------------------------------------

struct HeldTexture {
    texture: TextureHandle,
    prior: ImportSettings,
    refs: u32,
}

/// Scoped acquisition of host import state.
///
/// Each texture's prior settings are captured once, however many materials
/// share it. A texture is restored when its last reference is released;
/// anything still held when the scope is dropped is restored then.
pub struct ImportScope<'h, T: TextureImporter + ?Sized> {
    host: &'h mut T,
    held: Vec<HeldTexture>,
    index: FxHashMap<TextureHandle, usize>,
}

impl<'h, T: TextureImporter + ?Sized> ImportScope<'h, T> {
    /// Opens a scope over `host`. Nothing is touched until a texture is acquired.
    pub fn new(host: &'h mut T) -> Self {
        Self {
            host,
            held: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Makes `texture` readable at no more than `max_size` pixels and reads it.
    pub fn acquire(
        &mut self,
        texture: TextureHandle,
        max_size: u32,
    ) -> Result<Rgba32FImage, ImportError> {
        match self.index.get(&texture) {
            Some(&slot) => self.held[slot].refs += 1,
            None => {
                let prior = self.host.import_settings(texture)?;
                self.host
                    .reimport(texture, &ImportSettings::for_baking(max_size))?;
                self.index.insert(texture, self.held.len());
                self.held.push(HeldTexture {
                    texture,
                    prior,
                    refs: 1,
                });
            }
        }
        self.host.read_pixels(texture)
    }

    /// Drops one reference to `texture`, restoring its prior settings on the last one.
    ///
    /// Returns `true` if the texture was restored. Releasing a texture the
    /// scope does not hold is a no-op.
    pub fn release(&mut self, texture: TextureHandle) -> Result<bool, ImportError> {
        let Some(&slot) = self.index.get(&texture) else {
            return Ok(false);
        };

        let held = &mut self.held[slot];
        held.refs = held.refs.saturating_sub(1);
        if held.refs > 0 {
            return Ok(false);
        }

        let prior = held.prior;
        self.index.remove(&texture);
        self.host.reimport(texture, &prior)?;
        Ok(true)
    }

    /// Number of textures currently switched to baking settings.
    pub fn held_count(&self) -> usize {
        self.index.len()
    }

    /// Restores every texture still held, attempting all of them even if
    /// some fail. The first failure is returned.
    pub fn restore_all(&mut self) -> Result<(), ImportError> {
        let mut first_error = None;
        for held in &self.held {
            if self.index.remove(&held.texture).is_none() {
                continue;
            }
            if let Err(err) = self.host.reimport(held.texture, &held.prior) {
                log::warn!("Failed to restore texture {:?}: {err}", held.texture);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<T: TextureImporter + ?Sized> Drop for ImportScope<'_, T> {
    fn drop(&mut self) {
        if self.index.is_empty() {
            return;
        }
        log::warn!(
            "Import scope dropped with {} texture(s) still held; restoring",
            self.index.len()
        );
        let _ = self.restore_all();
    }
}

// ---------------------------------------------------------------------------
// MemoryTextureImporter
// ---------------------------------------------------------------------------

struct MemoryTexture {
    source: Rgba32FImage,
    settings: ImportSettings,
}

/// In-memory texture host.
///
/// Holds each texture at its source resolution; [`TextureImporter::read_pixels`]
/// downsizes so the largest dimension fits `max_size`, keeping the aspect ratio.
#[derive(Default)]
pub struct MemoryTextureImporter {
    textures: BTreeMap<TextureHandle, MemoryTexture>,
    reimports: usize,
}

impl MemoryTextureImporter {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture with its initial import settings.
    pub fn insert(&mut self, texture: TextureHandle, source: Rgba32FImage, settings: ImportSettings) {
        self.textures
            .insert(texture, MemoryTexture { source, settings });
    }

    /// Total number of re-imports performed, for diagnostics.
    pub fn reimport_count(&self) -> usize {
        self.reimports
    }

    /// Current settings of every texture, in handle order.
    pub fn settings_snapshot(&self) -> Vec<(TextureHandle, ImportSettings)> {
        self.textures
            .iter()
            .map(|(&handle, texture)| (handle, texture.settings))
            .collect()
    }
}

impl TextureImporter for MemoryTextureImporter {
    fn import_settings(&self, texture: TextureHandle) -> Result<ImportSettings, ImportError> {
        self.textures
            .get(&texture)
            .map(|t| t.settings)
            .ok_or(ImportError::UnknownTexture(texture))
    }

    fn reimport(
        &mut self,
        texture: TextureHandle,
        settings: &ImportSettings,
    ) -> Result<(), ImportError> {
        let entry = self
            .textures
            .get_mut(&texture)
            .ok_or(ImportError::UnknownTexture(texture))?;
        entry.settings = *settings;
        self.reimports += 1;
        Ok(())
    }

    fn read_pixels(&self, texture: TextureHandle) -> Result<Rgba32FImage, ImportError> {
        let entry = self
            .textures
            .get(&texture)
            .ok_or(ImportError::UnknownTexture(texture))?;
        if !entry.settings.readable {
            return Err(ImportError::NotReadable(texture));
        }

        let (width, height) = entry.source.dimensions();
        let max_size = entry.settings.max_size.max(1);
        let largest = width.max(height);
        if largest <= max_size {
            return Ok(entry.source.clone());
        }

        let scale = max_size as f64 / largest as f64;
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        Ok(image::imageops::resize(
            &entry.source,
            new_width,
            new_height,
            FilterType::Triangle,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn host_with(texture: u64, size: u32, settings: ImportSettings) -> MemoryTextureImporter {
        let mut host = MemoryTextureImporter::new();
        host.insert(
            TextureHandle(texture),
            Rgba32FImage::from_pixel(size, size, Rgba([0.5, 0.5, 0.5, 1.0])),
            settings,
        );
        host
    }

    fn normal_map_settings() -> ImportSettings {
        ImportSettings {
            readable: false,
            kind: TextureKind::NormalMap,
            max_size: 4096,
        }
    }

    #[test]
    fn test_unreadable_texture_rejects_reads() {
        let host = host_with(1, 8, ImportSettings::default());
        assert!(matches!(
            host.read_pixels(TextureHandle(1)),
            Err(ImportError::NotReadable(_))
        ));
        assert!(matches!(
            host.read_pixels(TextureHandle(2)),
            Err(ImportError::UnknownTexture(_))
        ));
    }

    #[test]
    fn test_acquire_clamps_and_release_restores() {
        let mut host = host_with(1, 64, normal_map_settings());
        {
            let mut scope = ImportScope::new(&mut host);
            let pixels = scope.acquire(TextureHandle(1), 16).unwrap();
            assert_eq!(pixels.dimensions(), (16, 16));
            assert_eq!(scope.held_count(), 1);
            assert!(scope.release(TextureHandle(1)).unwrap());
            assert_eq!(scope.held_count(), 0);
        }
        assert_eq!(
            host.import_settings(TextureHandle(1)).unwrap(),
            normal_map_settings()
        );
    }

    #[test]
    fn test_shared_texture_captured_once() {
        let mut host = host_with(1, 8, normal_map_settings());
        {
            let mut scope = ImportScope::new(&mut host);
            scope.acquire(TextureHandle(1), 8).unwrap();
            scope.acquire(TextureHandle(1), 8).unwrap();
            assert!(!scope.release(TextureHandle(1)).unwrap());
            assert!(scope.release(TextureHandle(1)).unwrap());
            assert!(!scope.release(TextureHandle(1)).unwrap());
        }
        // Captured before the first switch, so the original kind survives.
        assert_eq!(
            host.import_settings(TextureHandle(1)).unwrap().kind,
            TextureKind::NormalMap
        );
        assert_eq!(host.reimport_count(), 2);
    }

    #[test]
    fn test_drop_restores_held_textures() {
        let mut host = host_with(1, 8, normal_map_settings());
        {
            let mut scope = ImportScope::new(&mut host);
            scope.acquire(TextureHandle(1), 4).unwrap();
        }
        assert_eq!(
            host.import_settings(TextureHandle(1)).unwrap(),
            normal_map_settings()
        );
    }

    #[test]
    fn test_failed_acquire_leaves_nothing_held() {
        let mut host = MemoryTextureImporter::new();
        let mut scope = ImportScope::new(&mut host);
        assert!(scope.acquire(TextureHandle(9), 4).is_err());
        assert_eq!(scope.held_count(), 0);
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let mut host = MemoryTextureImporter::new();
        host.insert(
            TextureHandle(3),
            Rgba32FImage::new(256, 64),
            ImportSettings::for_baking(128),
        );
        let pixels = host.read_pixels(TextureHandle(3)).unwrap();
        assert_eq!(pixels.dimensions(), (128, 32));
    }

    #[test]
    fn test_settings_ron_defaults() {
        let settings: ImportSettings = ron::from_str("(kind: NormalMap)").unwrap();
        assert_eq!(settings.kind, TextureKind::NormalMap);
        assert!(!settings.readable);
        assert_eq!(settings.max_size, 2048);
    }
}
