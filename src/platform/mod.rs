//! Platform abstraction layer
//!
//! Host-facing glue shared by the browser and native entry points:
//! - Input events into per-tick commands
//! - Timestamps into simulation deltas

pub mod input;
pub mod time;

pub use input::InputAdapter;
pub use time::FrameClock;
