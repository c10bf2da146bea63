//! Orrery viewer application: window, frame loop, and scene animation.

pub mod clock;
pub mod renderer;
pub mod scene;
pub mod window;

pub use clock::{FrameClock, FrameTime};
pub use renderer::{RendererError, SceneRenderer, camera_from_config};
pub use scene::SceneState;
pub use window::{AppState, run};
