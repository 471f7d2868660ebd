//! Configuration for the mesh bakery.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Missing fields fall back to defaults so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BakeSettings, CONFIG_FILE_NAME, Config, DebugConfig, OutputConfig, SceneConfig, TextureSize,
};
pub use error::ConfigError;
