//! Rendering module
//!
//! Frames are rasterized on the CPU into a [`Surface`] and handed to the
//! WebGPU [`Presenter`] for display.

pub mod draw;
pub mod present;
pub mod sdf;
pub mod surface;

pub use draw::{CacheStats, Overlay, PALETTE, Palette, Renderer};
pub use present::Presenter;
pub use surface::{Color, Gradient, PixelRect, Sprite, Surface};
