//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]; [`run`] starts the
//! event loop.

use std::path::PathBuf;
use std::sync::Arc;

use orrery_config::Config;
use orrery_render::{Camera, RenderContext, SurfaceError, init_render_context_blocking};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::clock::FrameClock;
use crate::renderer::{SceneRenderer, camera_from_config};
use crate::scene::SceneState;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_fullscreen(
            config
                .window
                .fullscreen
                .then_some(Fullscreen::Borderless(None)),
        )
}

/// Application state: window, GPU context, scene resources and animation.
pub struct AppState {
    /// The window handle, shared with the surface.
    pub window: Option<Arc<Window>>,
    /// GPU context owning device, queue, and surface.
    pub gpu: Option<RenderContext>,
    pub renderer: Option<SceneRenderer>,
    pub config: Config,
    /// Directory of `config.ron`, re-read when the window gains focus.
    pub config_dir: Option<PathBuf>,
    pub clock: FrameClock,
    pub scene: SceneState,
    pub camera: Camera,
}

impl AppState {
    pub fn new(config: Config, scene: SceneState) -> Self {
        let mut camera = camera_from_config(&config.camera);
        camera.set_aspect_ratio(config.window.width, config.window.height);

        Self {
            window: None,
            gpu: None,
            renderer: None,
            config,
            config_dir: None,
            clock: FrameClock::new(),
            scene,
            camera,
        }
    }

    /// Make the surface, depth buffer and camera follow a new physical size.
    pub fn sync_surface_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect_ratio(width, height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(gpu, width, height);
            }
        }
    }

    /// Re-read `config.ron` and apply its scene animation settings.
    ///
    /// Window, mesh and texture settings only take effect on the next start.
    /// Returns whether anything was applied.
    pub fn reload_config(&mut self) -> bool {
        let Some(dir) = &self.config_dir else {
            return false;
        };
        let reloaded = match self.config.reload(dir) {
            Ok(Some(config)) => config,
            Ok(None) => return false,
            Err(e) => {
                warn!("Config reload failed: {e}");
                return false;
            }
        };
        if let Err(e) = reloaded.validate() {
            warn!("Ignoring reloaded config: {e}");
            return false;
        }

        let scene = &reloaded.scene;
        self.scene.apply_live_settings(scene);
        self.config.scene.orbit_radius = scene.orbit_radius;
        self.config.scene.orbit_speed = scene.orbit_speed;
        self.config.scene.spin_speed = scene.spin_speed;
        self.config.scene.ambient_strength = scene.ambient_strength;
        info!(
            "Applied reloaded scene settings: orbit speed {}, spin speed {}",
            scene.orbit_speed, scene.spin_speed
        );
        true
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            // Minimized. Rendering resumes with the next resize.
            return;
        }
        self.sync_surface_size(size.width, size.height);

        let time = self.clock.tick();
        let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) else {
            return;
        };

        match renderer.render(gpu, &self.camera, &self.scene, time.elapsed as f32) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                warn!("Surface lost, skipping frame");
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match SceneRenderer::new(&gpu, &self.config) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                error!("Scene initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        let (width, height) = gpu.size();
        self.camera.set_aspect_ratio(width, height);
        info!("Surface initialized: {}x{}", width, height);

        self.gpu = Some(gpu);
        self.clock.reset();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.sync_surface_size(new_size.width, new_size.height);
                info!("Window resized to {}x{}", new_size.width, new_size.height);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    info!(
                        "Scale factor changed to {:.2}, resized to {}x{}",
                        scale_factor, size.width, size.height
                    );
                    self.sync_surface_size(size.width, size.height);
                }
            }
            WindowEvent::Focused(true) => {
                self.reload_config();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window is closed.
#[instrument(skip_all)]
pub fn run(config: Config, scene: SceneState, config_dir: PathBuf) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, scene);
    app.config_dir = Some(config_dir);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_config::SceneConfig;

    fn app() -> AppState {
        let scene = SceneConfig {
            earth_initial_angle: Some(0.0),
            ..SceneConfig::default()
        };
        let scene = SceneState::from_config(&scene, &mut rand::thread_rng());
        AppState::new(Config::default(), scene)
    }

    #[test]
    fn test_app_state_starts_without_window() {
        let state = app();
        assert!(state.window.is_none());
        assert!(state.gpu.is_none());
        assert!(state.renderer.is_none());
        assert_eq!(state.clock.frame_count(), 0);
    }

    #[test]
    fn test_initial_aspect_from_config() {
        let state = app();
        assert!((state.camera.aspect_ratio - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_updates_camera_without_gpu() {
        let mut state = app();
        state.sync_surface_size(1000, 500);
        assert!((state.camera.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_is_ignored() {
        let mut state = app();
        state.sync_surface_size(0, 600);
        assert!((state.camera.aspect_ratio - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.fullscreen = true;
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Orrery");
        assert!(attrs.fullscreen.is_some());
    }

    #[test]
    fn test_reload_applies_scene_settings_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app();
        state.config.save(dir.path()).unwrap();
        assert!(!state.reload_config(), "no config dir yet");

        state.config_dir = Some(dir.path().to_path_buf());
        assert!(!state.reload_config(), "file unchanged");

        let mut edited = state.config.clone();
        edited.scene.orbit_speed = 2.0;
        edited.scene.ambient_strength = 0.3;
        edited.window.width = 640;
        edited.save(dir.path()).unwrap();
        assert!(state.reload_config());
        assert_eq!(state.scene.orbit_speed, 2.0);
        assert_eq!(state.scene.ambient_strength, 0.3);
        assert_eq!(state.scene.earth_initial_angle, 0.0);
        assert_eq!(state.config.scene.orbit_speed, 2.0);
        assert_eq!(state.config.window.width, 1280);
    }

    #[test]
    fn test_reload_ignores_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app();
        state.config_dir = Some(dir.path().to_path_buf());

        let mut edited = state.config.clone();
        edited.scene.orbit_speed = 2.0;
        edited.camera.near = -1.0;
        edited.save(dir.path()).unwrap();
        assert!(!state.reload_config());
        assert_eq!(state.scene.orbit_speed, state.config.scene.orbit_speed);
        assert_ne!(state.scene.orbit_speed, 2.0);
    }
}
