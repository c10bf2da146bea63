//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, BodyConfig, CameraConfig, Config, DebugConfig, SceneConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
