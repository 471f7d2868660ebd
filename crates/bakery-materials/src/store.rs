//! Material records in discovery order.

use bakery_atlas::{AtlasPlan, TextureChannel};
use bakery_scene::{MaterialHandle, MaterialInfo};
use rustc_hash::FxHashMap;

use crate::import::{ImportScope, TextureImporter};
use crate::material::{CellPlacement, ChannelTexture, MaterialError, MaterialRecord};

/// Arena of material records in discovery order.
///
/// A record's position in the arena is its atlas cell index; it is assigned
/// at registration and never reused.
pub struct MaterialTextureStore {
    records: Vec<MaterialRecord>,
    index: FxHashMap<MaterialHandle, usize>,
    cell_resolution: u32,
}

impl MaterialTextureStore {
    /// Creates an empty store whose cells are `cell_resolution` pixels square.
    pub fn new(cell_resolution: u32) -> Self {
        Self {
            records: Vec::new(),
            index: FxHashMap::default(),
            cell_resolution,
        }
    }

    pub fn cell_resolution(&self) -> u32 {
        self.cell_resolution
    }

    /// Registers `handle` on first encounter and returns its discovery index.
    ///
    /// Registering an already known material returns the existing index.
    pub fn register(&mut self, handle: MaterialHandle, name: &str) -> u32 {
        if let Some(&slot) = self.index.get(&handle) {
            return self.records[slot].index;
        }
        let slot = self.records.len();
        self.records
            .push(MaterialRecord::new(handle, name.to_owned(), slot as u32));
        self.index.insert(handle, slot);
        slot as u32
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&MaterialRecord> {
        self.index.get(&handle).map(|&slot| &self.records[slot])
    }

    fn get_mut(&mut self, handle: MaterialHandle) -> Result<&mut MaterialRecord, MaterialError> {
        let slot = *self
            .index
            .get(&handle)
            .ok_or(MaterialError::UnknownMaterial(handle))?;
        Ok(&mut self.records[slot])
    }

    /// Records in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &MaterialRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Imports every texture `info` binds for `channels`, reads the scalar
    /// properties and validates texture sizes.
    ///
    /// `on_texture` is called once per texture before it is read. Returns the
    /// number of textures imported.
    pub fn import<T: TextureImporter + ?Sized>(
        &mut self,
        handle: MaterialHandle,
        info: &MaterialInfo,
        channels: &[TextureChannel],
        scope: &mut ImportScope<'_, T>,
        mut on_texture: impl FnMut(TextureChannel),
    ) -> Result<usize, MaterialError> {
        let max_size = self.cell_resolution;
        let record = self.get_mut(handle)?;

        record.color_tint = info.color;
        record.metallic_strength = info.metallic_strength;
        record.imported = true;

        for &channel in channels {
            if record.textures.contains_key(&channel) {
                continue;
            }
            let Some(texture) = info.texture(channel.property_name()) else {
                log::debug!(
                    "Material '{}' has no {} texture",
                    record.name,
                    channel.property_name()
                );
                continue;
            };
            on_texture(channel);
            let pixels = scope.acquire(texture, max_size)?;
            record
                .textures
                .insert(channel, ChannelTexture { texture, pixels });
        }

        record.validate();
        if !record.valid_textures {
            log::warn!(
                "Material '{}' has textures of differing sizes; it keeps its own textures",
                record.name
            );
        }
        Ok(record.textures.len())
    }

    /// Returns the material's textures to their prior import settings.
    ///
    /// `on_texture` is called once per texture. Restoring twice is a no-op
    /// that returns zero.
    pub fn restore<T: TextureImporter + ?Sized>(
        &mut self,
        handle: MaterialHandle,
        scope: &mut ImportScope<'_, T>,
        mut on_texture: impl FnMut(TextureChannel),
    ) -> Result<usize, MaterialError> {
        let record = self.get_mut(handle)?;
        if record.restored || !record.imported {
            return Ok(0);
        }

        let mut restored = 0;
        for (&channel, texture) in &record.textures {
            on_texture(channel);
            scope.release(texture.texture)?;
            restored += 1;
        }
        record.restored = true;
        Ok(restored)
    }

    /// Assigns the material's cell and UV rectangle in `plan`.
    ///
    /// The copied extent is `min(cell_resolution, texture size)` per axis; a
    /// material without textures fills its whole cell. A placement is set
    /// once.
    pub fn compute_cell_uv(
        &mut self,
        handle: MaterialHandle,
        plan: &AtlasPlan,
    ) -> Result<CellPlacement, MaterialError> {
        let resolution = self.cell_resolution;
        let record = self.get_mut(handle)?;
        if record.placement.is_some() {
            return Err(MaterialError::AlreadyPlaced(handle));
        }

        let (width, height) = record.texture_size.unwrap_or((resolution, resolution));
        let extent = (width.min(resolution), height.min(resolution));
        let cell = plan.cell(record.index)?;
        let uv = plan.cell_uv(record.index, extent.0, extent.1)?;

        let placement = CellPlacement { cell, uv, extent };
        record.placement = Some(placement);
        Ok(placement)
    }

    /// `configured` filtered to channels at least one material has a texture for.
    pub fn used_channels(&self, configured: &[TextureChannel]) -> Vec<TextureChannel> {
        let mut used = Vec::new();
        for &channel in configured {
            if used.contains(&channel) {
                continue;
            }
            if self.records.iter().any(|r| r.has_texture(channel)) {
                used.push(channel);
            }
        }
        used
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{ImportSettings, MemoryTextureImporter};
    use bakery_atlas::DEFAULT_CHANNELS;
    use bakery_scene::TextureHandle;
    use image::{Rgba, Rgba32FImage};

    fn host() -> MemoryTextureImporter {
        let mut host = MemoryTextureImporter::new();
        for (id, size) in [(1u64, 8u32), (2, 8), (3, 4)] {
            host.insert(
                TextureHandle(id),
                Rgba32FImage::from_pixel(size, size, Rgba([1.0, 1.0, 1.0, 1.0])),
                ImportSettings::default(),
            );
        }
        host
    }

    fn material(textures: &[(&str, u64)]) -> MaterialInfo {
        let mut info = MaterialInfo::default();
        for &(prop, id) in textures {
            info.textures.insert(prop.to_owned(), TextureHandle(id));
        }
        info
    }

    #[test]
    fn test_register_assigns_discovery_order() {
        let mut store = MaterialTextureStore::new(8);
        assert_eq!(store.register(MaterialHandle(7), "a"), 0);
        assert_eq!(store.register(MaterialHandle(3), "b"), 1);
        assert_eq!(store.register(MaterialHandle(7), "a"), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_import_validates_sizes() {
        let mut host = host();
        let mut scope = ImportScope::new(&mut host);
        let mut store = MaterialTextureStore::new(8);
        store.register(MaterialHandle(1), "same");
        store.register(MaterialHandle(2), "mixed");

        let same = material(&[("_MainTex", 1), ("_BumpMap", 2)]);
        let mixed = material(&[("_MainTex", 1), ("_OcclusionMap", 3)]);

        let mut seen = Vec::new();
        let n = store
            .import(MaterialHandle(1), &same, &DEFAULT_CHANNELS, &mut scope, |c| seen.push(c))
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, vec![TextureChannel::Albedo, TextureChannel::Normal]);
        store
            .import(MaterialHandle(2), &mixed, &DEFAULT_CHANNELS, &mut scope, |_| {})
            .unwrap();

        let same = store.get(MaterialHandle(1)).unwrap();
        assert!(same.valid_textures());
        assert_eq!(same.texture_size(), Some((8, 8)));
        assert!(!store.get(MaterialHandle(2)).unwrap().valid_textures());
        // Texture 1 is shared and held once.
        assert_eq!(scope.held_count(), 3);
    }

    #[test]
    fn test_import_ignores_unconfigured_channels() {
        let mut host = host();
        let mut scope = ImportScope::new(&mut host);
        let mut store = MaterialTextureStore::new(8);
        store.register(MaterialHandle(1), "m");
        let info = material(&[("_MainTex", 1), ("_EmissionMap", 2)]);
        let n = store
            .import(MaterialHandle(1), &info, &[TextureChannel::Albedo], &mut scope, |_| {})
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            store.used_channels(&DEFAULT_CHANNELS),
            vec![TextureChannel::Albedo]
        );
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut host = host();
        {
            let mut scope = ImportScope::new(&mut host);
            let mut store = MaterialTextureStore::new(8);
            store.register(MaterialHandle(1), "m");
            let info = material(&[("_MainTex", 1)]);
            store
                .import(MaterialHandle(1), &info, &DEFAULT_CHANNELS, &mut scope, |_| {})
                .unwrap();
            assert_eq!(store.restore(MaterialHandle(1), &mut scope, |_| {}).unwrap(), 1);
            assert_eq!(store.restore(MaterialHandle(1), &mut scope, |_| {}).unwrap(), 0);
            assert!(store.get(MaterialHandle(1)).unwrap().is_restored());
            assert_eq!(scope.held_count(), 0);
        }
        assert!(!host.import_settings(TextureHandle(1)).unwrap().readable);
    }

    #[test]
    fn test_compute_cell_uv_once() {
        let plan = AtlasPlan::new(3, 8).unwrap();
        let mut host = host();
        let mut scope = ImportScope::new(&mut host);
        let mut store = MaterialTextureStore::new(8);
        store.register(MaterialHandle(1), "a");
        store.register(MaterialHandle(2), "small");
        store.register(MaterialHandle(3), "bare");
        store
            .import(MaterialHandle(2), &material(&[("_MainTex", 3)]), &DEFAULT_CHANNELS, &mut scope, |_| {})
            .unwrap();

        let small = store.compute_cell_uv(MaterialHandle(2), &plan).unwrap();
        assert_eq!(small.extent, (4, 4));
        assert_eq!(small.cell.column, 1);
        // Grid is 4 cells of 8 px, so a 4 px texture spans an eighth.
        assert_eq!(small.uv.size().to_array(), [0.125, 0.125]);

        let bare = store.compute_cell_uv(MaterialHandle(3), &plan).unwrap();
        assert_eq!(bare.extent, (8, 8));

        assert!(matches!(
            store.compute_cell_uv(MaterialHandle(2), &plan),
            Err(MaterialError::AlreadyPlaced(_))
        ));
        assert!(matches!(
            store.compute_cell_uv(MaterialHandle(9), &plan),
            Err(MaterialError::UnknownMaterial(_))
        ));
    }
}
