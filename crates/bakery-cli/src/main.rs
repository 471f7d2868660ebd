//! `bakery`: bakes a RON scene manifest into one mesh per LOD and a shared atlas.

mod manifest;
mod sink;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bakery_config::{CliArgs, Config};
use bakery_pipeline::{BakeError, Bakery, LogProgress, Progress, SinkError};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use crate::manifest::{ManifestError, SceneManifest};
use crate::sink::DirectorySink;

#[derive(Debug, Error)]
enum CliError {
    #[error("no scene manifest given (use --scene or set scene.manifest in config.ron)")]
    NoScene,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Bake(#[from] BakeError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    bakery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Bake failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), CliError> {
    let manifest_path = config.scene.manifest.as_deref().ok_or(CliError::NoScene)?;
    let manifest = SceneManifest::load(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let mut host = manifest.texture_host(base_dir)?;

    info!(
        "Baking {} renderer(s) from {} at {} px per material",
        manifest.scene.renderers.len(),
        manifest_path.display(),
        config.bake.cell_resolution
    );

    let mut log_progress = LogProgress;
    let mut progress = Progress::new(&mut log_progress);
    let bakery = Bakery::from_config(config);

    let result = bakery
        .bake(&manifest.scene, &mut host, &mut progress)
        .map_err(CliError::from)
        .and_then(|output| {
            let mut sink = DirectorySink::new(&config.output.directory)?;
            output.persist(&mut sink, &mut progress)?;
            sink.save_lod_group(&output)?;
            info!(
                "Wrote {} file(s) to {}",
                sink.written().len(),
                sink.dir().display()
            );
            Ok(())
        });
    progress.finish();
    result
}
