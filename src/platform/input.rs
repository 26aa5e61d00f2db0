//! Input adapter
//!
//! Host event handlers feed pointer, touch and keyboard events in; the frame
//! loop takes one [`TickInput`] out per frame. Events only ever set the paddle
//! target or queue a start/acknowledge request.

use crate::sim::TickInput;

/// Keyboard code that starts or acknowledges a round
pub const ADVANCE_KEY: &str = "Space";

/// Accumulates host input between frames
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    target_x: Option<f32>,
    advance: bool,
    /// Let the autopilot drive the paddle
    pub idle_mode: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved to `x` (surface pixels); centers the paddle under it
    pub fn pointer_moved(&mut self, x: f32, paddle_width: f32) {
        self.target_x = Some(x - paddle_width / 2.0);
    }

    /// Click or tap
    pub fn press(&mut self) {
        self.advance = true;
    }

    /// Touch began at `x`: move the paddle there and count it as a press
    pub fn touch_start(&mut self, x: f32, paddle_width: f32) {
        self.pointer_moved(x, paddle_width);
        self.press();
    }

    /// Key pressed; returns true if the key was consumed
    pub fn key_down(&mut self, code: &str) -> bool {
        if code == ADVANCE_KEY {
            self.press();
            true
        } else {
            false
        }
    }

    /// Input for the next tick; one-shot requests are cleared
    pub fn take(&mut self) -> TickInput {
        TickInput {
            target_x: self.target_x.take(),
            advance: std::mem::take(&mut self.advance),
            idle_mode: self.idle_mode,
        }
    }
}
