//! Scene layout and the per-frame model matrices of the sun and the earth.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use orrery_config::SceneConfig;
use rand::Rng;

/// Animation state: configuration plus the earth's starting orbit angle.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub orbit_radius: f32,
    /// Radians per second.
    pub orbit_speed: f32,
    /// Radians per second.
    pub spin_speed: f32,
    /// Orbit angle of the earth at `t = 0`, in radians.
    pub earth_initial_angle: f32,
    pub ambient_strength: f32,
}

impl SceneState {
    /// Build from config, drawing the initial angle from `rng` when the config leaves it unset.
    pub fn from_config<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let earth_initial_angle = config
            .earth_initial_angle
            .unwrap_or_else(|| rng.gen_range(0.0..TAU));
        Self {
            orbit_radius: config.orbit_radius,
            orbit_speed: config.orbit_speed,
            spin_speed: config.spin_speed,
            earth_initial_angle,
            ambient_strength: config.ambient_strength,
        }
    }

    /// Take the orbit, spin and lighting settings from `config`, keeping the
    /// earth's starting angle.
    pub fn apply_live_settings(&mut self, config: &SceneConfig) {
        self.orbit_radius = config.orbit_radius;
        self.orbit_speed = config.orbit_speed;
        self.spin_speed = config.spin_speed;
        self.ambient_strength = config.ambient_strength;
    }

    /// Sun model matrix at `seconds` of animation time: a spin about Z.
    pub fn sun_model(&self, seconds: f32) -> Mat4 {
        Mat4::from_rotation_z(seconds * self.spin_speed)
    }

    /// Earth model matrix at `seconds`: orbit about the sun, then spin about its own Z axis.
    pub fn earth_model(&self, seconds: f32) -> Mat4 {
        Mat4::from_rotation_z(seconds * self.orbit_speed)
            * Mat4::from_rotation_z(self.earth_initial_angle)
            * Mat4::from_translation(Vec3::new(self.orbit_radius, 0.0, 0.0))
            * Mat4::from_rotation_z(seconds * self.spin_speed)
    }

    /// World-space center of the earth at `seconds`.
    pub fn earth_position(&self, seconds: f32) -> Vec3 {
        self.earth_model(seconds).transform_point3(Vec3::ZERO)
    }

    /// The sun stays at the origin and is the light source.
    pub fn sun_position(&self) -> Vec3 {
        Vec3::ZERO
    }
}
