//! Animation clock for the redraw loop.
//!
//! The scene is a pure function of elapsed time, so there is no fixed-rate
//! simulation step. Each frame advances the animation time by the measured
//! frame delta, clamped so that a long stall (window drag, breakpoint) does not
//! make the earth jump along its orbit.

use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Largest frame delta fed into the animation, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// How often the frame rate is logged, in seconds of wall time.
pub const FPS_REPORT_INTERVAL: f64 = 1.0;

/// Timing for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Clamped time since the previous frame, in seconds.
    pub delta: f64,
    /// Total animation time, in seconds.
    pub elapsed: f64,
    /// Index of this frame, starting at 0.
    pub frame: u64,
}

/// Per-frame timing state.
///
/// Call [`tick`](Self::tick) once per redraw.
pub struct FrameClock {
    previous_time: Instant,
    elapsed: f64,
    frame_count: u64,
    report_frames: u64,
    report_time: f64,
}

impl FrameClock {
    /// Creates a clock starting from the current instant.
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            elapsed: 0.0,
            frame_count: 0,
            report_frames: 0,
            report_time: 0.0,
        }
    }

    /// Restarts wall-time measurement from now, keeping the animation time.
    ///
    /// Call once setup finishes so the first frame does not absorb startup.
    pub fn reset(&mut self) {
        self.previous_time = Instant::now();
        self.report_frames = 0;
        self.report_time = 0.0;
    }

    /// Measures the wall time since the last tick and advances the animation.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time);
        self.previous_time = now;
        self.advance(frame_time)
    }

    /// Advances the animation by an explicit frame time.
    pub fn advance(&mut self, frame_time: Duration) -> FrameTime {
        let mut delta = frame_time.as_secs_f64();
        if delta > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            delta = MAX_FRAME_TIME;
        }

        let time = FrameTime {
            delta,
            elapsed: self.elapsed + delta,
            frame: self.frame_count,
        };
        self.elapsed = time.elapsed;
        self.frame_count += 1;

        self.report_frames += 1;
        self.report_time += frame_time.as_secs_f64();
        if self.report_time >= FPS_REPORT_INTERVAL {
            info!(
                "{:.1} fps ({} frames in {:.2}s)",
                self.report_frames as f64 / self.report_time,
                self.report_frames,
                self.report_time
            );
            self.report_frames = 0;
            self.report_time = 0.0;
        }

        time
    }

    /// Total animation time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
