//! Command-line argument parsing for the orrery viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Textured sun and earth orbit viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Wait for vertical sync when presenting.
    #[arg(long)]
    pub vsync: Option<bool>,

    /// Tessellation of the sun sphere.
    #[arg(long)]
    pub sun_split: Option<u32>,

    /// Tessellation of the earth sphere.
    #[arg(long)]
    pub earth_split: Option<u32>,

    /// Fixed starting orbit angle of the earth, in radians.
    #[arg(long, allow_negative_numbers = true)]
    pub earth_angle: Option<f32>,

    /// Directory holding the background, sun and earth images.
    #[arg(long)]
    pub assets: Option<PathBuf>,

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
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(vsync) = args.vsync {
            self.window.vsync = vsync;
        }
        if let Some(split) = args.sun_split {
            self.scene.sun.split = split;
        }
        if let Some(split) = args.earth_split {
            self.scene.earth.split = split;
        }
        if let Some(angle) = args.earth_angle {
            self.scene.earth_initial_angle = Some(angle);
        }
        if let Some(ref dir) = args.assets {
            self.assets.dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
