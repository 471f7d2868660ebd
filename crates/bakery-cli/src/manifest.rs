//! RON scene manifests: a scene snapshot plus the image files behind its textures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bakery_materials::{ImportSettings, MemoryTextureImporter};
use bakery_scene::{Scene, TextureHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("failed to load texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One texture asset: its image file and the import settings it starts with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureEntry {
    /// Image path, relative to the manifest.
    pub path: PathBuf,
    #[serde(default)]
    pub settings: ImportSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneManifest {
    pub scene: Scene,
    pub textures: BTreeMap<TextureHandle, TextureEntry>,
}

impl SceneManifest {
    pub fn from_ron(contents: &str) -> Result<Self, ManifestError> {
        ron::from_str(contents).map_err(ManifestError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&contents)
    }

    /// Loads every texture image, resolving paths against `base_dir`.
    pub fn texture_host(&self, base_dir: &Path) -> Result<MemoryTextureImporter, ManifestError> {
        let mut host = MemoryTextureImporter::new();
        for (&handle, entry) in &self.textures {
            let path = base_dir.join(&entry.path);
            let pixels = image::open(&path)
                .map_err(|source| ManifestError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgba32f();
            tracing::debug!(
                "Loaded texture {:?} from {} ({}x{})",
                handle,
                path.display(),
                pixels.width(),
                pixels.height()
            );
            host.insert(handle, pixels, entry.settings);
        }
        Ok(host)
    }
}
