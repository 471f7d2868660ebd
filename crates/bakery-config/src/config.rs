//! Configuration structs with sensible defaults and RON persistence.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bakery_atlas::{DEFAULT_CHANNELS, TextureChannel};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level bakery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Input scene settings.
    pub scene: SceneConfig,
    /// Atlas and merge settings.
    pub bake: BakeSettings,
    /// Where and how results are written.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Supported per-material cell resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TextureSize {
    S512,
    #[default]
    S1024,
    S2048,
    S4096,
}

impl TextureSize {
    /// Side length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::S512 => 512,
            Self::S1024 => 1024,
            Self::S2048 => 2048,
            Self::S4096 => 4096,
        }
    }
}

impl TryFrom<u32> for TextureSize {
    type Error = ConfigError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        match pixels {
            512 => Ok(Self::S512),
            1024 => Ok(Self::S1024),
            2048 => Ok(Self::S2048),
            4096 => Ok(Self::S4096),
            other => Err(ConfigError::InvalidTextureSize(other.to_string())),
        }
    }
}

impl From<TextureSize> for u32 {
    fn from(size: TextureSize) -> Self {
        size.pixels()
    }
}

impl FromStr for TextureSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pixels: u32 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidTextureSize(s.to_string()))?;
        Self::try_from(pixels)
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Input scene settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene manifest to bake.
    pub manifest: Option<PathBuf>,
}

/// Atlas and merge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BakeSettings {
    /// Side of each material's atlas cell; textures are imported at most this large.
    pub cell_resolution: TextureSize,
    /// Add geometry outside every LOD group to each output LOD, not just LOD 0.
    pub merge_unassigned_into_every_lod: bool,
    /// Bake every LOD level; when false only LOD 0 and LOD-less renderers are used.
    pub combine_lods: bool,
    /// Channels to pack, in export order.
    pub channels: Vec<TextureChannel>,
    /// Combined meshes above this many vertices log a warning.
    pub vertex_warning_threshold: usize,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            cell_resolution: TextureSize::default(),
            merge_unassigned_into_every_lod: true,
            combine_lods: true,
            channels: DEFAULT_CHANNELS.to_vec(),
            vertex_warning_threshold: 65_000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory baked assets are written to.
    pub directory: PathBuf,
    /// Base name of every baked asset.
    pub asset_name: String,
    /// File extension of exported atlas images.
    pub image_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("baked"),
            asset_name: "BakedMesh".to_string(),
            image_extension: "png".to_string(),
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Per-user configuration directory, `<config_dir>/bakery`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bakery"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Returns `Some(new_config)` if the file on disk differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("cell_resolution: 1024"));
        assert!(ron_str.contains("asset_name: \"BakedMesh\""));
        assert!(ron_str.contains("vertex_warning_threshold: 65000"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(bake: (cell_resolution: 512))").unwrap();
        assert_eq!(config.bake.cell_resolution, TextureSize::S512);
        assert!(config.bake.merge_unassigned_into_every_lod);
        assert_eq!(config.bake.channels.len(), 7);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_unsupported_resolution_rejected() {
        assert!(ron::from_str::<Config>("(bake: (cell_resolution: 300))").is_err());
        assert!(matches!(
            "300".parse::<TextureSize>(),
            Err(ConfigError::InvalidTextureSize(_))
        ));
        assert_eq!("2048".parse::<TextureSize>().unwrap(), TextureSize::S2048);
    }

    #[test]
    fn test_channel_subset_parses() {
        let config: Config = ron::from_str("(bake: (channels: [Albedo, Normal]))").unwrap();
        assert_eq!(
            config.bake.channels,
            vec![TextureChannel::Albedo, TextureChannel::Normal]
        );
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.bake.cell_resolution = TextureSize::S4096;
        config.bake.combine_lods = false;
        config.output.asset_name = "Street".to_string();
        config.scene.manifest = Some(PathBuf::from("scene.ron"));

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.bake.vertex_warning_threshold = 10;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().bake.vertex_warning_threshold, 10);
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{{not valid}}").unwrap();
        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
