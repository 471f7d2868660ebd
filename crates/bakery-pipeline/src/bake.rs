//! Orchestration of one bake.

use std::collections::BTreeMap;

use bakery_atlas::{AtlasPlan, AtlasTextureSet, TextureChannel};
use bakery_config::{BakeSettings, Config, OutputConfig};
use bakery_lod::{LodClassifier, output_transition_heights};
use bakery_materials::{
    ImportScope, MaterialError, MaterialTextureStore, TextureImporter, composite,
};
use bakery_mesh::{GeometryCollector, MeshError};
use bakery_scene::{MaterialHandle, MaterialInfo, Scene};

use crate::error::BakeError;
use crate::progress::Progress;
use crate::sink::{BakeOutput, CombinedMaterial, LodOutput, texture_file_name};

/// Total progress steps of a bake.
///
/// One per registered submesh record, two per imported texture (import and
/// restore), one per tracked channel of every valid material, and one per
/// exported atlas channel.
pub fn count_steps(
    submesh_records: usize,
    imported_textures: usize,
    valid_materials: usize,
    tracked_channels: usize,
) -> usize {
    submesh_records + 2 * imported_textures + valid_materials * tracked_channels + tracked_channels
}

/// Merges the renderers of a [`Scene`] into one mesh per LOD and one atlas.
#[derive(Debug, Clone)]
pub struct Bakery {
    settings: BakeSettings,
    asset_name: String,
    image_extension: String,
}

impl Bakery {
    pub fn new(settings: BakeSettings, output: &OutputConfig) -> Self {
        Self {
            settings,
            asset_name: output.asset_name.clone(),
            image_extension: output.image_extension.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bake.clone(), &config.output)
    }

    pub fn settings(&self) -> &BakeSettings {
        &self.settings
    }

    /// Runs the bake against `importer`.
    ///
    /// Every texture import switched for the bake is restored before this
    /// returns, whether or not baking succeeded. A baking error takes
    /// precedence over a restore error.
    pub fn bake<T: TextureImporter + ?Sized>(
        &self,
        scene: &Scene,
        importer: &mut T,
        progress: &mut Progress<'_>,
    ) -> Result<BakeOutput, BakeError> {
        let classifier = LodClassifier::new(&scene.lod_groups);
        if !classifier.is_empty() {
            log::debug!(
                "{} LOD group(s) with up to {} level(s)",
                scene.lod_groups.len(),
                classifier.level_count()
            );
        }
        let (mut collector, records) = self.collect(scene, &classifier)?;
        if collector.material_count() == 0 {
            return Err(BakeError::EmptySelection);
        }

        let mut store = MaterialTextureStore::new(self.settings.cell_resolution.pixels());
        let mut materials = Vec::with_capacity(collector.material_count());
        for handle in collector.materials() {
            let info = scene.material(handle)?;
            store.register(handle, &info.name);
            materials.push((handle, info));
        }

        let plan = AtlasPlan::new(materials.len() as u32, store.cell_resolution())?;
        log::info!(
            "Packing {} material(s) into a {}x{} atlas ({}x{} cells)",
            materials.len(),
            plan.pixel_width,
            plan.pixel_height,
            plan.grid_width,
            plan.grid_height
        );

        progress.start(self.estimate_steps(records, &materials));

        let mut scope = ImportScope::new(importer);
        let baked = self.bake_with_scope(
            scene,
            &materials,
            &mut store,
            &mut collector,
            &plan,
            &mut scope,
            progress,
            records,
        );
        let restored = restore(&materials, &mut store, &mut scope, progress);
        drop(scope);

        let (atlas, lods) = baked?;
        restored?;

        let material = CombinedMaterial {
            name: self.asset_name.clone(),
            template: materials.first().map(|(_, info)| info.name.clone()),
            textures: atlas
                .channels()
                .map(|channel| {
                    (
                        channel.property_name().to_owned(),
                        texture_file_name(&self.asset_name, channel, &self.image_extension),
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        };

        Ok(BakeOutput {
            asset_name: self.asset_name.clone(),
            image_extension: self.image_extension.clone(),
            atlas,
            material,
            lods,
        })
    }

    /// Registers renderer geometry in scene order. Returns the collector and
    /// the number of submesh records created.
    fn collect(
        &self,
        scene: &Scene,
        classifier: &LodClassifier,
    ) -> Result<(GeometryCollector, usize), BakeError> {
        let mut collector = GeometryCollector::new();
        let mut records = 0;
        for renderer in &scene.renderers {
            let lod = classifier.lod_of(renderer.mesh);
            if !self.settings.combine_lods && lod.is_some_and(|level| level > 0) {
                log::debug!("Skipping '{}': only LOD 0 is baked", renderer.name);
                continue;
            }
            match collector.register_renderer(scene, renderer, lod) {
                Ok(created) => records += created,
                Err(err @ MeshError::SubmeshMismatch { .. }) => {
                    log::warn!("Skipping renderer: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok((collector, records))
    }

    /// Step estimate made before import, assuming every material is valid.
    fn estimate_steps(&self, records: usize, materials: &[(MaterialHandle, &MaterialInfo)]) -> usize {
        let channels = unique(&self.settings.channels);
        let bound = |channel: &TextureChannel, info: &MaterialInfo| {
            info.texture(channel.property_name()).is_some()
        };
        let textures = materials
            .iter()
            .map(|(_, info)| channels.iter().filter(|c| bound(c, info)).count())
            .sum();
        let tracked = channels
            .iter()
            .filter(|c| materials.iter().any(|(_, info)| bound(c, info)))
            .count();
        count_steps(records, textures, materials.len(), tracked)
    }

    #[allow(clippy::too_many_arguments)]
    fn bake_with_scope<T: TextureImporter + ?Sized>(
        &self,
        scene: &Scene,
        materials: &[(MaterialHandle, &MaterialInfo)],
        store: &mut MaterialTextureStore,
        collector: &mut GeometryCollector,
        plan: &AtlasPlan,
        scope: &mut ImportScope<'_, T>,
        progress: &mut Progress<'_>,
        records: usize,
    ) -> Result<(AtlasTextureSet, Vec<LodOutput>), BakeError> {
        let channels = unique(&self.settings.channels);

        progress.set_title("Processing");
        let mut imported = 0;
        for &(handle, info) in materials {
            imported += store.import(handle, info, &channels, scope, |channel| {
                progress.step(format!("Importing texture: {}", channel.property_name()));
            })?;
        }

        let tracked = store.used_channels(&channels);
        let valid = store.iter().filter(|r| r.valid_textures()).count();
        progress.retotal(count_steps(records, imported, valid, tracked.len()));

        let mut atlas = AtlasTextureSet::new(*plan, &tracked);

        progress.set_title("Baking...");
        for &(handle, _) in materials {
            let placement = store.compute_cell_uv(handle, plan)?;
            let record = store
                .get(handle)
                .ok_or(MaterialError::UnknownMaterial(handle))?;

            if !record.valid_textures() {
                log::warn!(
                    "Material '{}' keeps its own UVs: its textures differ in size",
                    record.name()
                );
                for submesh in collector.records_of(handle) {
                    progress.step(format!("model: {}", submesh.mesh_name()));
                }
                continue;
            }

            for &channel in &tracked {
                progress.step(format!("Baking texture: {}", channel.property_name()));
            }
            composite(record, &mut atlas)?;

            collector.remap_material(handle, &placement.uv, |mesh| {
                progress.step(format!("model: {mesh}"));
            })?;
        }

        let highest = collector.highest_lod().unwrap_or(0);
        let level_count = highest as usize + 1;
        let mut lods = Vec::with_capacity(level_count);
        for (level, height) in output_transition_heights(level_count).into_iter().enumerate() {
            let level = level as u32;
            let asset_name = if level_count > 1 {
                format!("{}_LOD{level}", self.asset_name)
            } else {
                self.asset_name.clone()
            };
            let include_unassigned = self.settings.merge_unassigned_into_every_lod || level == 0;
            let mesh = collector.combine_lod(asset_name.clone(), level, &scene.root, include_unassigned);

            log::info!(
                "Combined LOD {level}: {} vertices, {} triangles",
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            if mesh.vertex_count() > self.settings.vertex_warning_threshold {
                log::warn!(
                    "{asset_name} has {} vertices, above the {} vertex limit",
                    mesh.vertex_count(),
                    self.settings.vertex_warning_threshold
                );
            }

            lods.push(LodOutput {
                level,
                asset_name,
                mesh,
                screen_relative_height: height,
            });
        }

        Ok((atlas, lods))
    }
}

/// Restores every material's imports, then anything the scope still holds.
///
/// All materials are attempted; the first failure is returned.
fn restore<T: TextureImporter + ?Sized>(
    materials: &[(MaterialHandle, &MaterialInfo)],
    store: &mut MaterialTextureStore,
    scope: &mut ImportScope<'_, T>,
    progress: &mut Progress<'_>,
) -> Result<(), BakeError> {
    progress.set_title("Restoring");
    let mut first_error: Option<BakeError> = None;
    for &(handle, _) in materials {
        let result = store.restore(handle, scope, |channel| {
            progress.step(format!("Restoring texture: {}", channel.property_name()));
        });
        if let Err(err) = result {
            log::warn!("Failed to restore material {handle:?}: {err}");
            first_error.get_or_insert(err.into());
        }
    }
    if let Err(err) = scope.restore_all() {
        first_error.get_or_insert(err.into());
    }
    first_error.map_or(Ok(()), Err)
}

fn unique(channels: &[TextureChannel]) -> Vec<TextureChannel> {
    let mut out = Vec::with_capacity(channels.len());
    for &channel in channels {
        if !out.contains(&channel) {
            out.push(channel);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_steps() {
        // 4 records, 3 textures, 2 valid materials, 2 channels.
        assert_eq!(count_steps(4, 3, 2, 2), 4 + 6 + 4 + 2);
        assert_eq!(count_steps(0, 0, 0, 0), 0);
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        let channels = [
            TextureChannel::Normal,
            TextureChannel::Albedo,
            TextureChannel::Normal,
        ];
        assert_eq!(
            unique(&channels),
            vec![TextureChannel::Normal, TextureChannel::Albedo]
        );
    }
}
