//! Frame clock
//!
//! Converts host timestamps (milliseconds) into the simulation delta: elapsed
//! time in 60 Hz frames, clamped to `[0, MAX_DELTA]`.

use crate::consts::{FRAME_INTERVAL_MS, MAX_DELTA};

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous call; the first call counts as one frame
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last) / FRAME_INTERVAL_MS) as f32,
            None => 1.0,
        };
        self.last_ms = Some(now_ms);
        delta.clamp(0.0, MAX_DELTA)
    }

    /// Forget the last timestamp (after the loop was paused)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
