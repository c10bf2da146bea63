//! Configuration structs with defaults matching the classic scene and RON persistence.

use std::path::{Path, PathBuf};

use orrery_mesh::{MAX_SPLIT, MIN_SPLIT};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Scene geometry and animation.
    pub scene: SceneConfig,
    /// Fixed camera placement.
    pub camera: CameraConfig,
    /// Texture locations.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Tessellation and size of one sphere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Longitude and latitude divisions, between 3 and 26754.
    pub split: u32,
    /// Sphere radius in world units.
    pub radius: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            split: 100,
            radius: 10.0,
        }
    }
}

/// Scene layout and animation rates.
///
/// Angular speeds are in radians per second of elapsed time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub sun: BodyConfig,
    pub earth: BodyConfig,
    /// Distance from the sun to the earth's center.
    pub orbit_radius: f32,
    /// Earth's angular speed around the sun.
    pub orbit_speed: f32,
    /// Self-rotation speed of both spheres about their Z axis.
    pub spin_speed: f32,
    /// Starting orbit angle in radians. `None` picks one at random on startup.
    pub earth_initial_angle: Option<f32>,
    /// Ambient light fraction on the earth.
    pub ambient_strength: f32,
}

/// Fixed camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Texture file locations. Relative file names resolve against `dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub background: String,
    pub sun: String,
    pub earth: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sun: BodyConfig {
                split: 100,
                radius: 20.0,
            },
            earth: BodyConfig {
                split: 100,
                radius: 10.0,
            },
            orbit_radius: 42.0,
            orbit_speed: 0.3,
            spin_speed: 0.2,
            earth_initial_angle: None,
            ambient_strength: 0.1,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [10.0, -90.0, 90.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            background: "background.jpg".to_string(),
            sun: "sun.jpg".to_string(),
            earth: "earth.jpg".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AssetConfig {
    pub fn background_path(&self) -> PathBuf {
        self.dir.join(&self.background)
    }

    pub fn sun_path(&self) -> PathBuf {
        self.dir.join(&self.sun)
    }

    pub fn earth_path(&self) -> PathBuf {
        self.dir.join(&self.earth)
    }
}

/// `<platform config dir>/orrery`, or `./config` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("orrery"))
        .unwrap_or_else(|| PathBuf::from("config"))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    let reason = format!("must be positive and finite, got {value}");
    Err(invalid(field, reason))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
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
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject settings the scene cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bodies = [
            ("scene.sun.split", &self.scene.sun),
            ("scene.earth.split", &self.scene.earth),
        ];
        for (field, body) in bodies {
            if !(MIN_SPLIT..=MAX_SPLIT).contains(&body.split) {
                let reason = format!("must be in {MIN_SPLIT}..={MAX_SPLIT}, got {}", body.split);
                return Err(invalid(field, reason));
            }
        }
        check_positive("scene.sun.radius", self.scene.sun.radius)?;
        check_positive("scene.earth.radius", self.scene.earth.radius)?;
        check_positive("camera.fov_y_degrees", self.camera.fov_y_degrees)?;
        check_positive("camera.near", self.camera.near)?;
        let (near, far) = (self.camera.near, self.camera.far);
        if far.is_nan() || far <= near {
            return Err(invalid(
                "camera.far",
                format!("must exceed near ({near}), got {far}"),
            ));
        }
        Ok(())
    }
}
