//! Writes baked assets into a directory.

use std::path::{Path, PathBuf};

use bakery_mesh::CombinedMesh;
use bakery_pipeline::{AssetSink, BakeOutput, CombinedMaterial, SinkError};
use image::RgbaImage;
use serde::Serialize;

/// One level of the written LOD group description.
#[derive(Debug, Serialize)]
struct LodEntry<'a> {
    mesh: &'a str,
    screen_relative_height: f32,
}

/// Filesystem [`AssetSink`]: `<name><tag>.png`, `<name>.mesh.ron`,
/// `<name>.mesh.bin` and `<name>.mat.ron`.
///
/// `.mesh.bin` holds a little-endian `u32` vertex count and `u32` index count,
/// then the interleaved [`BakedVertex`](bakery_mesh::BakedVertex) buffer and
/// the index buffer in native byte order.
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Writes `<name>.lods.ron` listing each level's mesh and transition height.
    ///
    /// Outputs with a single level have no LOD group and write nothing.
    pub fn save_lod_group(&mut self, output: &BakeOutput) -> Result<(), SinkError> {
        if !output.has_lod_group() {
            return Ok(());
        }
        let entries: Vec<LodEntry<'_>> = output
            .lods
            .iter()
            .map(|lod| LodEntry {
                mesh: &lod.asset_name,
                screen_relative_height: lod.screen_relative_height,
            })
            .collect();
        self.write_ron(&format!("{}.lods.ron", output.asset_name), &entries)
    }

    fn write_packed(&mut self, asset_name: &str, mesh: &CombinedMesh) -> Result<(), SinkError> {
        let vertices = mesh.vertex_bytes();
        let indices = mesh.index_bytes();
        let mut bytes = Vec::with_capacity(8 + vertices.len() + indices.len());
        bytes.extend_from_slice(&(mesh.vertex_count() as u32).to_le_bytes());
        bytes.extend_from_slice(&(mesh.indices.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&vertices);
        bytes.extend_from_slice(indices);

        let path = self.dir.join(format!("{asset_name}.mesh.bin"));
        std::fs::write(&path, bytes)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn write_ron<T: Serialize + ?Sized>(&mut self, file_name: &str, value: &T) -> Result<(), SinkError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        let serialized =
            ron::ser::to_string_pretty(value, pretty).map_err(|e| SinkError::Encode {
                name: file_name.to_string(),
                reason: e.to_string(),
            })?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, serialized)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl AssetSink for DirectorySink {
    fn save_texture(&mut self, file_name: &str, image: &RgbaImage) -> Result<(), SinkError> {
        let path = self.dir.join(file_name);
        image.save(&path)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn save_mesh(&mut self, asset_name: &str, mesh: &CombinedMesh) -> Result<(), SinkError> {
        self.write_ron(&format!("{asset_name}.mesh.ron"), mesh)?;
        self.write_packed(asset_name, mesh)
    }

    fn save_material(
        &mut self,
        asset_name: &str,
        material: &CombinedMaterial,
    ) -> Result<(), SinkError> {
        self.write_ron(&format!("{asset_name}.mat.ron"), material)
    }
}
