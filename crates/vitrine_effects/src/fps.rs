//! Frame-rate sampling
//!
//! A tumbling window opened by the first observed frame. Each frame after
//! that counts; once the window has elapsed, the meter yields
//! `round(frames * 1000 / elapsed_ms)` and starts a new window at that
//! frame.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct FpsMeter {
    window: Duration,
    window_start: Option<Instant>,
    frames: u32,
    last_sample: Option<u32>,
}

impl FpsMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: None,
            frames: 0,
            last_sample: None,
        }
    }

    /// Record a frame; returns a sample when a window closes
    pub fn tick(&mut self, at: Instant) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(at);
            return None;
        };

        self.frames += 1;
        let elapsed = at.saturating_duration_since(start);
        if elapsed < self.window {
            return None;
        }

        let fps = (f64::from(self.frames) / elapsed.as_secs_f64()).round() as u32;
        self.window_start = Some(at);
        self.frames = 0;
        self.last_sample = Some(fps);
        Some(fps)
    }

    /// Forget the open window; the next frame starts a new one
    pub fn reset(&mut self) {
        self.window_start = None;
        self.frames = 0;
    }

    pub fn last_sample(&self) -> Option<u32> {
        self.last_sample
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
