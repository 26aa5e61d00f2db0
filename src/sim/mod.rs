//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the
//! renderer or the host platform:
//! - One variable step per frame, clamped delta
//! - Seeded RNG only (owned by `World`)
//! - Host notifications go through the `GameEvent` queue

pub mod collision;
pub mod layout;
pub mod machine;
pub mod patterns;
pub mod state;
pub mod tick;

pub use layout::{Layout, Rect};
pub use machine::{GameAction, next_phase};
pub use patterns::{Occupancy, PATTERNS, Pattern};
pub use state::{
    Ball, Brick, BrickGrid, GameEvent, GamePhase, Paddle, Particle, PowerUp, PowerUpKind,
    PowerUpStatus, World,
};
pub use tick::{TickInput, tick};
