//! Registration of renderer geometry per (material, mesh, LOD).

use std::collections::BTreeMap;

use bakery_atlas::UvRect;
use bakery_scene::{MaterialHandle, MeshHandle, Renderer, Scene, Transform};
use rustc_hash::FxHashMap;

use crate::combine::{CombineInstance, CombinedMesh};
use crate::geometry::{MeshError, SubmeshGeometry};
use crate::record::SubmeshRecord;

/// The submesh records of one source mesh under one material.
///
/// Records are keyed by LOD slot (`None` = not part of any LOD group) and
/// then by submesh index.
#[derive(Debug)]
pub struct MeshLodBucket {
    mesh: MeshHandle,
    levels: BTreeMap<Option<u32>, BTreeMap<usize, SubmeshRecord>>,
}

impl MeshLodBucket {
    fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            levels: BTreeMap::new(),
        }
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Records in the given LOD slot, by submesh index.
    pub fn level(&self, lod: Option<u32>) -> impl Iterator<Item = &SubmeshRecord> {
        self.levels.get(&lod).into_iter().flat_map(|m| m.values())
    }

    pub fn records(&self) -> impl Iterator<Item = &SubmeshRecord> {
        self.levels.values().flat_map(|m| m.values())
    }

    fn records_mut(&mut self) -> impl Iterator<Item = &mut SubmeshRecord> {
        self.levels.values_mut().flat_map(|m| m.values_mut())
    }
}

/// All geometry drawn with one source material, in mesh discovery order.
#[derive(Debug)]
pub struct MaterialGeometry {
    material: MaterialHandle,
    buckets: Vec<MeshLodBucket>,
}

impl MaterialGeometry {
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn buckets(&self) -> &[MeshLodBucket] {
        &self.buckets
    }

    pub fn records(&self) -> impl Iterator<Item = &SubmeshRecord> {
        self.buckets.iter().flat_map(|b| b.records())
    }

    fn bucket_mut(&mut self, mesh: MeshHandle) -> &mut MeshLodBucket {
        let slot = match self.buckets.iter().position(|b| b.mesh == mesh) {
            Some(slot) => slot,
            None => {
                self.buckets.push(MeshLodBucket::new(mesh));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[slot]
    }
}

/// Groups renderer geometry by material and discovers materials in walk order.
#[derive(Debug, Default)]
pub struct GeometryCollector {
    materials: Vec<MaterialGeometry>,
    index: FxHashMap<MaterialHandle, usize>,
}

impl GeometryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every submesh of `renderer` under its material at `lod`.
    ///
    /// Returns the number of new submesh records. A renderer whose material
    /// count differs from its mesh's submesh count is rejected with
    /// [`MeshError::SubmeshMismatch`] before anything is registered.
    pub fn register_renderer(
        &mut self,
        scene: &Scene,
        renderer: &Renderer,
        lod: Option<u32>,
    ) -> Result<usize, MeshError> {
        let mesh = scene.mesh(renderer.mesh)?;
        if mesh.submesh_count() != renderer.materials.len() {
            return Err(MeshError::SubmeshMismatch {
                renderer: renderer.name.clone(),
                submeshes: mesh.submesh_count(),
                materials: renderer.materials.len(),
            });
        }

        let mut created = 0;
        for (submesh, &material) in renderer.materials.iter().enumerate() {
            let bucket = self.material_mut(material).bucket_mut(renderer.mesh);
            let records = bucket.levels.entry(lod).or_default();
            let record = match records.entry(submesh) {
                std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::btree_map::Entry::Vacant(entry) => {
                    let geometry = SubmeshGeometry::extract(mesh, submesh)?;
                    created += 1;
                    entry.insert(SubmeshRecord::new(mesh.name.clone(), submesh, geometry))
                }
            };
            record.add_placement(renderer.transform);
        }
        Ok(created)
    }

    fn material_mut(&mut self, material: MaterialHandle) -> &mut MaterialGeometry {
        let slot = *self.index.entry(material).or_insert_with(|| {
            self.materials.push(MaterialGeometry {
                material,
                buckets: Vec::new(),
            });
            self.materials.len() - 1
        });
        &mut self.materials[slot]
    }

    /// Materials in discovery order.
    pub fn materials(&self) -> impl Iterator<Item = MaterialHandle> + '_ {
        self.materials.iter().map(|m| m.material)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn geometry(&self, material: MaterialHandle) -> Option<&MaterialGeometry> {
        self.index.get(&material).map(|&slot| &self.materials[slot])
    }

    /// Every submesh record of `material`.
    pub fn records_of(&self, material: MaterialHandle) -> impl Iterator<Item = &SubmeshRecord> {
        self.geometry(material).into_iter().flat_map(|g| g.records())
    }

    pub fn record_count(&self) -> usize {
        self.materials.iter().map(|m| m.records().count()).sum()
    }

    /// Highest LOD level any record was registered at.
    pub fn highest_lod(&self) -> Option<u32> {
        self.materials
            .iter()
            .flat_map(|m| &m.buckets)
            .filter_map(|b| b.levels.keys().next_back().copied().flatten())
            .max()
    }

    /// Remaps every record of `material` into `rect`, calling `on_record`
    /// with each record's mesh name. Returns the number of records remapped.
    pub fn remap_material(
        &mut self,
        material: MaterialHandle,
        rect: &UvRect,
        mut on_record: impl FnMut(&str),
    ) -> Result<usize, MeshError> {
        let Some(&slot) = self.index.get(&material) else {
            return Ok(0);
        };
        let mut remapped = 0;
        for bucket in &mut self.materials[slot].buckets {
            for record in bucket.records_mut() {
                on_record(record.mesh_name());
                record.remap(rect)?;
                remapped += 1;
            }
        }
        Ok(remapped)
    }

    /// Merges every placement at `level`, plus the LOD-less placements when
    /// `include_unassigned` is set, into one mesh.
    ///
    /// Materials are emitted in discovery order and meshes in the order they
    /// were first seen under each material.
    pub fn combine_lod(
        &mut self,
        name: impl Into<String>,
        level: u32,
        root: &Transform,
        include_unassigned: bool,
    ) -> CombinedMesh {
        let mut slots = vec![Some(level)];
        if include_unassigned {
            slots.push(None);
        }

        let mut instances = Vec::new();
        for material in &self.materials {
            for bucket in &material.buckets {
                for &slot in &slots {
                    for record in bucket.level(slot) {
                        for placement in record.placements() {
                            instances.push(CombineInstance {
                                geometry: record.geometry(),
                                transform: placement.relative_to(root),
                            });
                        }
                    }
                }
            }
        }
        let mesh = CombinedMesh::from_instances(name, &instances);

        for material in &mut self.materials {
            for bucket in &mut material.buckets {
                for &slot in &slots {
                    if let Some(records) = bucket.levels.get_mut(&slot) {
                        records.values_mut().for_each(SubmeshRecord::mark_combined);
                    }
                }
            }
        }
        mesh
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SubmeshState;
    use bakery_scene::MeshData;
    use glam::{Vec2, Vec3};

    fn quad(name: &str, submeshes: usize) -> MeshData {
        MeshData {
            name: name.into(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
            uvs: vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE],
            submeshes: (0..submeshes).map(|_| vec![0, 1, 2, 2, 1, 3]).collect(),
            ..MeshData::default()
        }
    }

    fn renderer(name: &str, mesh: u64, materials: &[u64], x: f32) -> Renderer {
        Renderer {
            name: name.into(),
            mesh: MeshHandle(mesh),
            materials: materials.iter().map(|&m| MaterialHandle(m)).collect(),
            transform: Transform::from_position(Vec3::new(x, 0.0, 0.0)),
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene.meshes.insert(MeshHandle(1), quad("single", 1));
        scene.meshes.insert(MeshHandle(2), quad("double", 2));
        scene
    }

    #[test]
    fn test_discovery_order_and_shared_records() {
        let scene = scene();
        let mut collector = GeometryCollector::new();
        assert_eq!(
            collector
                .register_renderer(&scene, &renderer("a", 2, &[20, 10], 0.0), None)
                .unwrap(),
            2
        );
        // Same mesh again: placements append, no new records.
        assert_eq!(
            collector
                .register_renderer(&scene, &renderer("b", 2, &[20, 10], 5.0), None)
                .unwrap(),
            0
        );
        collector
            .register_renderer(&scene, &renderer("c", 1, &[30], 0.0), Some(1))
            .unwrap();

        let order: Vec<_> = collector.materials().collect();
        assert_eq!(order, vec![MaterialHandle(20), MaterialHandle(10), MaterialHandle(30)]);
        assert_eq!(collector.record_count(), 3);
        let record = collector.records_of(MaterialHandle(20)).next().unwrap();
        assert_eq!(record.placements().len(), 2);
        assert_eq!(collector.highest_lod(), Some(1));
    }

    #[test]
    fn test_submesh_mismatch_registers_nothing() {
        let scene = scene();
        let mut collector = GeometryCollector::new();
        let err = collector
            .register_renderer(&scene, &renderer("bad", 2, &[1], 0.0), None)
            .unwrap_err();
        assert!(matches!(
            err,
            MeshError::SubmeshMismatch { submeshes: 2, materials: 1, .. }
        ));
        assert_eq!(collector.material_count(), 0);
    }

    #[test]
    fn test_remap_once_per_shared_geometry() {
        let scene = scene();
        let mut collector = GeometryCollector::new();
        collector
            .register_renderer(&scene, &renderer("a", 1, &[7], 0.0), None)
            .unwrap();
        collector
            .register_renderer(&scene, &renderer("b", 1, &[7], 3.0), None)
            .unwrap();

        let rect = UvRect {
            start: Vec2::ZERO,
            end: Vec2::splat(0.5),
        };
        let mut seen = Vec::new();
        let n = collector
            .remap_material(MaterialHandle(7), &rect, |name| seen.push(name.to_owned()))
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(seen, vec!["single".to_owned()]);
        assert!(matches!(
            collector.remap_material(MaterialHandle(7), &rect, |_| {}),
            Err(MeshError::AlreadyRemapped { .. })
        ));

        let mesh = collector.combine_lod("out", 0, &Transform::IDENTITY, true);
        // Two placements of the same remapped geometry.
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.uvs[3], Vec2::splat(0.5));
        assert_eq!(mesh.uvs[7], Vec2::splat(0.5));
        assert_eq!(mesh.positions[5], Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(
            collector.records_of(MaterialHandle(7)).next().unwrap().state(),
            SubmeshState::Combined
        );
        assert!(collector.records_of(MaterialHandle(7)).all(SubmeshRecord::is_uv_remapped));
    }

    #[test]
    fn test_combine_without_remap_keeps_flag_clear() {
        let scene = scene();
        let mut collector = GeometryCollector::new();
        collector
            .register_renderer(&scene, &renderer("raw", 1, &[3], 0.0), None)
            .unwrap();

        let mesh = collector.combine_lod("out", 0, &Transform::IDENTITY, true);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.uvs[3], Vec2::ONE);

        let record = collector.records_of(MaterialHandle(3)).next().unwrap();
        assert_eq!(record.state(), SubmeshState::Combined);
        assert!(!record.is_uv_remapped());
    }

    #[test]
    fn test_combine_lod_includes_unassigned_on_request() {
        let scene = scene();
        let mut collector = GeometryCollector::new();
        collector
            .register_renderer(&scene, &renderer("lod0", 1, &[1], 0.0), Some(0))
            .unwrap();
        collector
            .register_renderer(&scene, &renderer("lod1", 1, &[1], 0.0), Some(1))
            .unwrap();
        collector
            .register_renderer(&scene, &renderer("prop", 1, &[2], 0.0), None)
            .unwrap();

        let root = Transform::IDENTITY;
        assert_eq!(collector.combine_lod("l0", 0, &root, true).vertex_count(), 8);
        assert_eq!(collector.combine_lod("l1", 1, &root, true).vertex_count(), 8);
        assert_eq!(collector.combine_lod("l1", 1, &root, false).vertex_count(), 4);
        assert_eq!(collector.combine_lod("l2", 2, &root, false).vertex_count(), 0);
    }
}
