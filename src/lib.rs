//! Rialo Bounce - A breakout-style canvas bouncer
//!
//! Core modules:
//! - `sim`: Simulation (patterns, physics, collisions, round state machine)
//! - `renderer`: Software rasterizer with cached brick/background layers, WebGPU presenter
//! - `platform`: Input adapter and frame clock
//! - `session`: Per-frame driver tying input, simulation and rendering together
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Brick grid dimensions
    pub const BRICK_COLUMNS: usize = 12;
    pub const BRICK_ROWS: usize = 10;

    /// Width of the decorative frame around the playfield (pixels)
    pub const FRAME_WIDTH: f32 = 5.0;
    /// Corner radius of the frame path
    pub const FRAME_CORNER_RADIUS: f32 = 15.0;
    /// Corner radius of a brick
    pub const BRICK_CORNER_RADIUS: f32 = 5.0;
    /// Number of brick colors; a brick takes `row % PALETTE_SIZE`
    pub const PALETTE_SIZE: u8 = 3;

    /// Baseline frame interval the per-tick delta is normalized to (~60 Hz)
    pub const FRAME_INTERVAL_MS: f64 = 16.67;
    /// Largest delta a single tick may advance by
    pub const MAX_DELTA: f32 = 2.0;
}

/// Clamp a value into `[min, max]`, preferring `min` when the range is inverted
#[inline]
pub fn clamp_lenient(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Unit direction for an angle measured from straight up (screen coords, y down)
#[inline]
pub fn direction_from_vertical(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}
