//! Command-line argument parsing for the bakery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::TextureSize;

/// Mesh bakery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "bakery", about = "Bake scene geometry into one mesh per LOD and a shared texture atlas")]
pub struct CliArgs {
    /// Scene manifest (RON) to bake.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Atlas cell resolution (512, 1024, 2048 or 4096).
    #[arg(long)]
    pub resolution: Option<TextureSize>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Base name of the baked assets.
    #[arg(long)]
    pub name: Option<String>,

    /// Only add LOD-less geometry to LOD 0.
    #[arg(long)]
    pub no_merge_unassigned: bool,

    /// Bake LOD 0 only.
    #[arg(long)]
    pub finest_lod_only: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref scene) = args.scene {
            self.scene.manifest = Some(scene.clone());
        }
        if let Some(resolution) = args.resolution {
            self.bake.cell_resolution = resolution;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref name) = args.name {
            self.output.asset_name = name.clone();
        }
        if args.no_merge_unassigned {
            self.bake.merge_unassigned_into_every_lod = false;
        }
        if args.finest_lod_only {
            self.bake.combine_lods = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            resolution: Some(TextureSize::S2048),
            name: Some("Block".to_string()),
            finest_lod_only: true,
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.bake.cell_resolution, TextureSize::S2048);
        assert_eq!(config.output.asset_name, "Block");
        assert!(!config.bake.combine_lods);
        // Non-overridden fields retain defaults
        assert!(config.bake.merge_unassigned_into_every_lod);
        assert_eq!(config.output.image_extension, "png");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "bakery",
            "--scene",
            "street.ron",
            "--resolution",
            "512",
            "--no-merge-unassigned",
        ]);
        assert_eq!(args.scene, Some(PathBuf::from("street.ron")));
        assert_eq!(args.resolution, Some(TextureSize::S512));
        assert!(args.no_merge_unassigned);
        assert!(!args.finest_lod_only);
        assert!(CliArgs::try_parse_from(["bakery", "--resolution", "300"]).is_err());
    }
}
