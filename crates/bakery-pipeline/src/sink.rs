//! Bake results and the persistence contract.

use std::collections::BTreeMap;

use bakery_atlas::{AtlasTextureSet, TextureChannel};
use bakery_mesh::CombinedMesh;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::Progress;

/// Failures while writing baked assets.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to encode asset '{name}': {reason}")]
    Encode { name: String, reason: String },
}

/// Destination for baked assets.
pub trait AssetSink {
    /// Stores one exported atlas image under `file_name` (extension included).
    fn save_texture(&mut self, file_name: &str, image: &RgbaImage) -> Result<(), SinkError>;
    /// Stores one combined LOD mesh.
    fn save_mesh(&mut self, asset_name: &str, mesh: &CombinedMesh) -> Result<(), SinkError>;
    /// Stores the material that binds the atlas images.
    fn save_material(
        &mut self,
        asset_name: &str,
        material: &CombinedMaterial,
    ) -> Result<(), SinkError>;
}

/// The single material every baked LOD mesh is drawn with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedMaterial {
    pub name: String,
    /// Source material whose shader the baked material reuses.
    pub template: Option<String>,
    /// Atlas image file per shader property.
    pub textures: BTreeMap<String, String>,
}

/// One merged mesh of the output LOD group.
#[derive(Clone, Debug, PartialEq)]
pub struct LodOutput {
    pub level: u32,
    pub asset_name: String,
    pub mesh: CombinedMesh,
    /// Screen-relative height below which the next level takes over.
    pub screen_relative_height: f32,
}

/// Everything a bake produces, ready to hand to an [`AssetSink`].
#[derive(Debug)]
pub struct BakeOutput {
    pub asset_name: String,
    pub image_extension: String,
    pub atlas: AtlasTextureSet,
    pub material: CombinedMaterial,
    pub lods: Vec<LodOutput>,
}

/// `<asset><tag>.<extension>`, e.g. `BakedMesh_alb.png`.
pub fn texture_file_name(asset_name: &str, channel: TextureChannel, extension: &str) -> String {
    format!("{asset_name}{}.{extension}", channel.file_tag())
}

impl BakeOutput {
    /// `true` when the output has more than one level and needs a LOD group.
    pub fn has_lod_group(&self) -> bool {
        self.lods.len() > 1
    }

    /// Writes the material, every atlas image and every LOD mesh.
    pub fn persist(
        &self,
        sink: &mut dyn AssetSink,
        progress: &mut Progress<'_>,
    ) -> Result<(), SinkError> {
        sink.save_material(&self.asset_name, &self.material)?;

        progress.set_title("Exporting final textures");
        for layer in self.atlas.layers() {
            progress.step(layer.channel.property_name());
            let file_name =
                texture_file_name(&self.asset_name, layer.channel, &self.image_extension);
            sink.save_texture(&file_name, &layer.image)?;
        }

        for lod in &self.lods {
            log::info!(
                "Saving {} ({} vertices, {} triangles)",
                lod.asset_name,
                lod.mesh.vertex_count(),
                lod.mesh.triangle_count()
            );
            sink.save_mesh(&lod.asset_name, &lod.mesh)?;
        }
        Ok(())
    }
}
