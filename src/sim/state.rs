//! Entity store
//!
//! Everything one session mutates lives in [`World`]. It is owned by the
//! session and passed by reference into the tick and the renderer.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::{Layout, Rect};
use super::patterns::{Occupancy, Pattern};
use crate::consts::{BRICK_COLUMNS, BRICK_ROWS, PALETTE_SIZE};
use crate::tuning::Tuning;

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start trigger
    Waiting,
    /// Active gameplay
    Playing,
    /// Last ball lost
    GameOver,
    /// Every brick destroyed
    Win,
}

impl GamePhase {
    /// Whether the round is over and awaiting acknowledgement
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Win)
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Recent positions for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            trail: Vec::new(),
        }
    }

    /// Record current position to trail, dropping the oldest past `max_len`
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.insert(0, self.pos);
        self.trail.truncate(max_len);
    }

    /// Bounding box
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// The player's paddle, resting on the bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Left edge the paddle eases toward
    pub target_x: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Centered paddle sized for `layout`
    pub fn centered(layout: &Layout) -> Self {
        let x = (layout.width - layout.paddle_width) / 2.0;
        Self {
            x,
            target_x: x,
            width: layout.paddle_width,
            height: layout.paddle_height,
        }
    }

    /// Set the easing target, clamped inside the frame
    pub fn set_target(&mut self, x: f32, layout: &Layout) {
        let (min, max) = layout.paddle_x_range(self.width);
        self.target_x = crate::clamp_lenient(x, min, max);
    }

    /// Cover `factor` of the remaining distance to the target
    pub fn ease(&mut self, factor: f32) {
        self.x += (self.target_x - self.x) * factor;
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Paddle rectangle on the bottom edge of `layout`
    pub fn rect(&self, layout: &Layout) -> Rect {
        Rect::new(self.x, layout.paddle_top(self.height), self.width, self.height)
    }
}

/// One brick cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Brick {
    /// 0 = empty, 1 = normal, 2 = reinforced
    pub health: u8,
    /// Palette index
    pub color: u8,
}

impl Brick {
    pub fn is_solid(&self) -> bool {
        self.health > 0
    }

    /// Take one hit; returns the remaining health
    pub fn hit(&mut self) -> u8 {
        self.health = self.health.saturating_sub(1);
        self.health
    }
}

/// Brick cells for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Brick>,
}

impl BrickGrid {
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Brick::default(); cols * rows],
        }
    }

    /// Populate from an occupancy matrix, rolling reinforced bricks
    pub fn from_occupancy(occupancy: &Occupancy, reinforced_chance: f64, rng: &mut dyn RngCore) -> Self {
        let mut grid = Self::empty(occupancy.cols(), occupancy.rows());
        for r in 0..grid.rows {
            for c in 0..grid.cols {
                if occupancy.get(c as i32, r as i32) {
                    let health = if rng.random_bool(reinforced_chance) { 2 } else { 1 };
                    grid.cells[r * grid.cols + c] = Brick {
                        health,
                        color: (r % PALETTE_SIZE as usize) as u8,
                    };
                }
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, c: usize, r: usize) -> Option<&Brick> {
        if c >= self.cols || r >= self.rows {
            return None;
        }
        self.cells.get(r * self.cols + c)
    }

    pub fn get_mut(&mut self, c: usize, r: usize) -> Option<&mut Brick> {
        if c >= self.cols || r >= self.rows {
            return None;
        }
        self.cells.get_mut(r * self.cols + c)
    }

    /// Solid cells as `(col, row, brick)`
    pub fn solid(&self) -> impl Iterator<Item = (usize, usize, &Brick)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_solid())
            .map(|(i, b)| (i % self.cols, i / self.cols, b))
    }

    pub fn count_solid(&self) -> u32 {
        self.cells.iter().filter(|b| b.is_solid()).count() as u32
    }
}

/// A cosmetic burst particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Palette index of the brick that emitted it
    pub color: u8,
    /// Remaining ticks
    pub life: i32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Releases an extra ball from the paddle
    ExtraBall,
}

/// Power-up lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpStatus {
    Falling,
    /// Collected or fell out; removed on the next cleanup
    Spent,
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub size: f32,
    pub status: PowerUpStatus,
}

/// Notifications for the host and the render caches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted { pattern: &'static str, level: u32 },
    BrickHit { col: usize, row: usize, health: u8 },
    BrickDestroyed { col: usize, row: usize },
    PowerUpSpawned,
    PowerUpCollected,
    BallLost,
    ScoreChanged(u64),
    PhaseChanged(GamePhase),
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG started from
    pub seed: u64,
    pub phase: GamePhase,
    pub layout: Layout,
    pub tuning: Tuning,
    /// Live particle cap (0 disables bursts)
    pub max_particles: usize,
    pub score: u64,
    /// 1-based level within the current game
    pub level: u32,
    /// Shared ball speed, grows with paddle bounces
    pub speed: f32,
    pub bricks_remaining: u32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: BrickGrid,
    pub particles: Vec<Particle>,
    pub power_ups: Vec<PowerUp>,
    /// Ticks spent in the current terminal phase
    pub reveal: f32,
    /// Simulated ticks since the world was created
    pub ticks: u64,
    /// Layout the current round was generated from
    pub pattern: &'static str,
    /// Use this layout instead of a random pick (debug hosts, tests)
    pub fixed_pattern: Option<&'static Pattern>,
    /// Whether the next start resets score and level
    pub(crate) fresh_game: bool,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl World {
    /// Create a world with no size yet; call [`World::resize`] before ticking
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let layout = Layout::pending(BRICK_COLUMNS, BRICK_ROWS);
        let tuning = tuning.sanitized();
        Self {
            seed,
            phase: GamePhase::Waiting,
            layout,
            tuning,
            max_particles: usize::MAX,
            score: 0,
            level: 0,
            speed: tuning.base_speed,
            bricks_remaining: 0,
            paddle: Paddle::centered(&layout),
            balls: Vec::new(),
            bricks: BrickGrid::empty(BRICK_COLUMNS, BRICK_ROWS),
            particles: Vec::new(),
            power_ups: Vec::new(),
            reveal: 0.0,
            ticks: 0,
            pattern: "",
            fixed_pattern: None,
            fresh_game: true,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Re-derive layout metrics for a new surface size
    ///
    /// Bricks survive; paddle, balls, pickups and particles are rescaled so a
    /// mid-round resize keeps the round playable.
    pub fn resize(&mut self, width: f32, height: f32) {
        let old = self.layout;
        self.layout = Layout::new(width, height, self.bricks.cols(), self.bricks.rows());
        log::info!("Layout resized to {}x{}", width, height);

        if !self.layout.is_ready() {
            return;
        }
        if !old.is_ready() {
            self.paddle = Paddle::centered(&self.layout);
            for ball in &mut self.balls {
                ball.radius = self.layout.ball_radius;
            }
            return;
        }

        let scale = Vec2::new(width / old.width, height / old.height);
        self.paddle.x *= scale.x;
        self.paddle.target_x *= scale.x;
        self.paddle.width = self.layout.paddle_width;
        self.paddle.height = self.layout.paddle_height;
        for ball in &mut self.balls {
            ball.pos *= scale;
            ball.radius = self.layout.ball_radius;
            ball.trail.clear();
        }
        for power_up in &mut self.power_ups {
            power_up.pos *= scale;
        }
        for particle in &mut self.particles {
            particle.pos *= scale;
        }
    }

    /// Queue a notification
    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all notifications since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Install a specific brick layout for the current round
    pub fn set_bricks(&mut self, bricks: BrickGrid) {
        self.bricks_remaining = bricks.count_solid();
        self.bricks = bricks;
        self.layout = Layout::new(self.layout.width, self.layout.height, self.bricks.cols(), self.bricks.rows());
    }

    /// Fresh ball above the paddle, launched up and to the right
    pub fn serve_ball(&self) -> Ball {
        let l = &self.layout;
        Ball::new(
            Vec2::new(l.width / 2.0, l.height - 50.0),
            Vec2::new(l.initial_speed, -l.initial_speed),
            l.ball_radius,
        )
    }
}
