//! The `orrery` binary: load config, set up logging, open the viewer.

use clap::Parser;
use orrery_app::{SceneState, run};
use orrery_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("{e}, using defaults");
        config = Config::default();
    }

    let scene = SceneState::from_config(&config.scene, &mut rand::thread_rng());
    info!(
        "Starting orrery: sun split {}, earth split {}, earth angle {:.3} rad",
        config.scene.sun.split, config.scene.earth.split, scene.earth_initial_angle
    );

    if let Err(e) = run(config, scene, config_dir) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
