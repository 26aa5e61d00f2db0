//! Frame composition
//!
//! Two cached layers sit under every frame: the background (gradient and
//! frame border, rebuilt on resize) and the brick layer (rebuilt at round
//! start, patched one cell at a time as bricks are hit). The per-frame pass
//! blits both and draws the moving entities on top.

use glam::Vec2;

use super::sdf::{sd_box, sd_circle, sd_round_rect};
use super::surface::{Color, Gradient, PixelRect, Sprite, Surface};
use crate::consts::{BRICK_CORNER_RADIUS, FRAME_CORNER_RADIUS, FRAME_WIDTH};
use crate::sim::{Ball, Brick, GameEvent, GamePhase, Layout, Paddle, Rect, World};

/// Colors used for every drawn element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Brick color by `row % 3`
    pub bricks: [Color; 3],
    pub background: Gradient<3>,
    pub frame: Color,
    pub paddle: Gradient<3>,
    pub ball: Color,
    pub power_up: Color,
}

pub const PALETTE: Palette = Palette {
    bricks: [Color::hex(0xfdbb2d), Color::hex(0xb21f1f), Color::hex(0x1a2a6c)],
    background: Gradient::new([Color::hex(0x1a2a6c), Color::hex(0xb21f1f), Color::hex(0xfdbb2d)]),
    frame: Color::hex(0xdab452),
    paddle: Gradient::new([Color::hex(0x666666), Color::hex(0x999999), Color::hex(0x666666)]),
    ball: Color::WHITE,
    power_up: Color::hex(0xfdbb2d),
};

/// Text the host should show over the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub title: String,
    pub lines: Vec<String>,
    /// 0 = invisible, 1 = fully shown
    pub opacity: f32,
}

/// Cache maintenance counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub background_renders: u32,
    pub brick_renders: u32,
    pub brick_patches: u32,
}

/// Software renderer with cached background and brick layers
pub struct Renderer {
    frame: Surface,
    background: Surface,
    bricks: Surface,
    background_dirty: bool,
    bricks_dirty: bool,
    ball_sprite: Option<Sprite>,
    palette: Palette,
    /// Draw ball trails
    pub trails: bool,
    /// Show terminal overlays at full opacity immediately
    pub reduced_motion: bool,
    stats: CacheStats,
}

/// Logo drawn inside every ball
const BALL_LOGO_PNG: &[u8] = include_bytes!("../../assets/ball_logo.png");

fn ball_logo() -> Option<Sprite> {
    match Sprite::from_png(BALL_LOGO_PNG) {
        Ok(sprite) => Some(sprite),
        Err(e) => {
            log::warn!("Ball logo unreadable, drawing plain balls: {}", e);
            None
        }
    }
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Surface::new(width, height),
            background: Surface::new(width, height),
            bricks: Surface::new(width, height),
            background_dirty: true,
            bricks_dirty: true,
            ball_sprite: ball_logo(),
            palette: PALETTE,
            trails: true,
            reduced_motion: false,
            stats: CacheStats::default(),
        }
    }

    /// Reallocate every layer; both caches rebuild on the next frame
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
        self.background.resize(width, height);
        self.bricks.resize(width, height);
        self.invalidate();
    }

    /// Force both caches to rebuild on the next frame
    pub fn invalidate(&mut self) {
        self.background_dirty = true;
        self.bricks_dirty = true;
    }

    pub fn frame(&self) -> &Surface {
        &self.frame
    }

    pub fn brick_layer(&self) -> &Surface {
        &self.bricks
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Keep the caches in step with the simulation
    pub fn handle_event(&mut self, event: &GameEvent, world: &World) {
        match event {
            GameEvent::RoundStarted { .. } => self.bricks_dirty = true,
            GameEvent::BrickHit { col, row, .. } => {
                if !self.bricks_dirty {
                    self.patch_brick(world, *col, *row);
                }
            }
            _ => {}
        }
    }

    /// Compose the frame for `world`; returns the overlay text, if any
    pub fn render(&mut self, world: &World) -> Option<Overlay> {
        let layout = &world.layout;
        if !layout.is_ready() {
            log::debug!("Render before layout is ready, skipping");
            return None;
        }
        if !self.matches(layout) {
            log::warn!(
                "Surface {}x{} does not match layout {}x{}, skipping",
                self.frame.width(),
                self.frame.height(),
                layout.width,
                layout.height
            );
            return None;
        }

        if self.background_dirty {
            self.render_background(layout);
        }
        if self.bricks_dirty {
            self.render_bricks(world);
        }

        self.frame.clear();
        self.frame.blit(&self.background);
        self.frame.set_clip(Some(PixelRect::touched_by(&frame_rect(layout))));

        let overlay = match world.phase {
            GamePhase::Playing => {
                self.frame.blit(&self.bricks);
                self.draw_particles(world);
                self.draw_power_ups(world);
                for ball in &world.balls {
                    self.draw_ball(ball);
                }
                self.draw_paddle(&world.paddle, layout);
                None
            }
            GamePhase::Waiting => {
                self.frame.fill(Color::BLACK.with_alpha(0.5));
                Some(Overlay {
                    title: "Click or Press Space to Start".to_string(),
                    lines: Vec::new(),
                    opacity: 1.0,
                })
            }
            GamePhase::GameOver => {
                let progress = self.reveal_progress(world);
                self.frame.fill(Color::BLACK.with_alpha(0.7 * progress));
                Some(Overlay {
                    title: "Game Over".to_string(),
                    lines: vec![
                        format!("Final Score: {}", world.score),
                        "Click to Restart".to_string(),
                    ],
                    opacity: progress,
                })
            }
            GamePhase::Win => {
                let progress = self.reveal_progress(world);
                self.frame.fill(Color::BLACK.with_alpha(0.7 * progress));
                Some(Overlay {
                    title: "Pattern Cleared!".to_string(),
                    lines: vec![
                        format!("Level {} - Score: {}", world.level, world.score),
                        "Click to Play Again".to_string(),
                    ],
                    opacity: progress,
                })
            }
        };

        self.frame.set_clip(None);
        overlay
    }

    fn matches(&self, layout: &Layout) -> bool {
        self.frame.width() == layout.width as u32 && self.frame.height() == layout.height as u32
    }

    fn reveal_progress(&self, world: &World) -> f32 {
        if self.reduced_motion || world.tuning.reveal_ticks <= 0.0 {
            return 1.0;
        }
        (world.reveal / world.tuning.reveal_ticks).min(1.0)
    }

    fn render_background(&mut self, layout: &Layout) {
        let bg = &mut self.background;
        bg.clear();

        let frame = frame_rect(layout);
        let height = layout.height.max(1.0);
        let diagonal = Vec2::new(layout.width, layout.height);
        let gradient = self.palette.background;
        bg.fill_shape(
            &frame,
            |p| sd_round_rect(p, &frame, FRAME_CORNER_RADIUS),
            |p| gradient.at(p.y / height),
        );

        let sheen = Gradient::new([
            Color::WHITE.with_alpha(0.2),
            Color::WHITE.with_alpha(0.0),
            Color::BLACK.with_alpha(0.2),
        ]);
        let len2 = diagonal.length_squared().max(1.0);
        bg.stroke_shape(
            &frame,
            FRAME_WIDTH,
            |p| sd_round_rect(p, &frame, FRAME_CORNER_RADIUS),
            |p| sheen.at(p.dot(diagonal) / len2),
        );
        let edge = self.palette.frame;
        bg.stroke_shape(
            &frame,
            2.0,
            |p| sd_round_rect(p, &frame, FRAME_CORNER_RADIUS),
            |_| edge,
        );

        self.background_dirty = false;
        self.stats.background_renders += 1;
    }

    /// Rebuild the whole brick layer
    fn render_bricks(&mut self, world: &World) {
        self.bricks.clear();
        for (c, r, brick) in world.bricks.solid() {
            draw_brick(&mut self.bricks, &world.layout.brick_rect(c, r), brick, &self.palette);
        }
        self.bricks_dirty = false;
        self.stats.brick_renders += 1;
    }

    /// Clear and redraw the area around one cell
    ///
    /// The cleared area reaches two pixels past the cell, so neighbours that
    /// share those pixels are redrawn clipped to it.
    fn patch_brick(&mut self, world: &World, col: usize, row: usize) {
        let layout = &world.layout;
        let region = layout.brick_rect(col, row).inflate(2.0);

        self.bricks.clear_rect(&region);
        self.bricks.set_clip(Some(PixelRect::touched_by(&region)));
        for r in row.saturating_sub(1)..=row + 1 {
            for c in col.saturating_sub(1)..=col + 1 {
                if let Some(brick) = world.bricks.get(c, r).filter(|b| b.is_solid()) {
                    draw_brick(&mut self.bricks, &layout.brick_rect(c, r), brick, &self.palette);
                }
            }
        }
        self.bricks.set_clip(None);
        self.stats.brick_patches += 1;
    }

    fn draw_particles(&mut self, world: &World) {
        let lifetime = world.tuning.particle_lifetime.max(1) as f32;
        for p in &world.particles {
            let color = brick_color(&self.palette, p.color).with_alpha(p.life as f32 / lifetime);
            let extent = Rect::new(p.pos.x - p.size, p.pos.y - p.size, p.size * 2.0, p.size * 2.0);
            self.frame
                .fill_shape(&extent, |q| sd_circle(q, p.pos, p.size), |_| color);
        }
    }

    fn draw_power_ups(&mut self, world: &World) {
        let fill = self.palette.power_up;
        for p in &world.power_ups {
            let extent = Rect::new(p.pos.x - p.size, p.pos.y - p.size, p.size * 2.0, p.size * 2.0);
            self.frame
                .fill_shape(&extent, |q| sd_circle(q, p.pos, p.size), |_| fill);
            // Dark core marks it as a pickup
            let core = p.size * 0.35;
            self.frame.fill_shape(
                &extent,
                |q| sd_circle(q, p.pos, core),
                |_| Color::BLACK.with_alpha(0.85),
            );
        }
    }

    fn draw_ball(&mut self, ball: &Ball) {
        if self.trails {
            let len = ball.trail.len() as f32;
            // Oldest first so newer ghosts land on top
            for (age, pos) in ball.trail.iter().enumerate().rev() {
                let opacity = (len - age as f32) / len;
                let radius = ball.radius * opacity;
                let extent = Rect::new(pos.x - radius, pos.y - radius, radius * 2.0, radius * 2.0);
                self.frame.fill_shape(
                    &extent,
                    |q| sd_circle(q, *pos, radius),
                    |_| Color::WHITE.with_alpha(opacity * 0.5),
                );
            }
        }

        let bounds = ball.bounds();
        let color = self.palette.ball;
        self.frame
            .fill_shape(&bounds, |q| sd_circle(q, ball.pos, ball.radius), |_| color);
        if let Some(sprite) = &self.ball_sprite {
            self.frame
                .draw_image(sprite, &bounds, |q| sd_circle(q, ball.pos, ball.radius));
        }
    }

    fn draw_paddle(&mut self, paddle: &Paddle, layout: &Layout) {
        let rect = paddle.rect(layout);
        let gradient = self.palette.paddle;
        let h = rect.h.max(1.0);
        self.frame.fill_shape(
            &rect,
            |q| sd_round_rect(q, &rect, rect.h / 2.0),
            |q| gradient.at((q.y - rect.y) / h),
        );
    }
}

/// Rounded frame path, centered on the border stroke
fn frame_rect(layout: &Layout) -> Rect {
    let half = FRAME_WIDTH / 2.0;
    Rect::new(half, half, layout.width - FRAME_WIDTH, layout.height - FRAME_WIDTH)
}

fn brick_color(palette: &Palette, index: u8) -> Color {
    palette.bricks[index as usize % palette.bricks.len()]
}

/// Brick art: tinted body, darker inset, top-lit sheen
///
/// Reinforced bricks are opaque, damaged ones translucent. Every pixel drawn
/// lies inside `rect`.
fn draw_brick(surface: &mut Surface, rect: &Rect, brick: &Brick, palette: &Palette) {
    let alpha = if brick.health > 1 { 1.0 } else { 0.7 };
    let body = brick_color(palette, brick.color).with_alpha(alpha);
    let rounded = |p: Vec2| sd_round_rect(p, rect, BRICK_CORNER_RADIUS);

    surface.fill_shape(rect, rounded, |_| body);

    let inset = Rect::new(rect.x + 2.0, rect.y + 2.0, rect.w - 4.0, rect.h - 4.0);
    if inset.w > 0.0 && inset.h > 0.0 {
        let shade = Color::BLACK.with_alpha(0.2 * alpha);
        surface.fill_shape(&inset, |p| sd_box(p, &inset), |_| shade);
    }

    let sheen = Gradient::new([Color::WHITE.with_alpha(0.4), Color::BLACK.with_alpha(0.4)]);
    let h = rect.h.max(1.0);
    surface.fill_shape(rect, rounded, |p| sheen.at((p.y - rect.y) / h).fade(alpha));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameAction, TickInput, tick};
    use crate::tuning::Tuning;

    fn setup(width: u32, height: u32, seed: u64) -> (World, Renderer) {
        let mut world = World::new(seed, Tuning::default());
        world.resize(width as f32, height as f32);
        world.fixed_pattern = crate::sim::patterns::by_name("wall");
        world.advance();
        let mut renderer = Renderer::new(width, height);
        for event in world.drain_events() {
            renderer.handle_event(&event, &world);
        }
        renderer.render(&world);
        (world, renderer)
    }

    fn hit(world: &mut World, renderer: &mut Renderer, col: usize, row: usize) {
        if let Some(brick) = world.bricks.get_mut(col, row) {
            let health = brick.hit();
            world.emit(GameEvent::BrickHit { col, row, health });
        }
        for event in world.drain_events() {
            renderer.handle_event(&event, world);
        }
    }

    fn full_rerender(world: &World) -> Surface {
        let mut fresh = Renderer::new(world.layout.width as u32, world.layout.height as u32);
        fresh.render(world);
        fresh.bricks
    }

    #[test]
    fn test_ball_carries_logo() {
        let (world, renderer) = setup(700, 700, 5);
        let ball = &world.balls[0];
        let center = renderer
            .frame()
            .pixel(ball.pos.x as u32, ball.pos.y as u32)
            .unwrap();
        assert_eq!(center, [0x1a, 0x2a, 0x6c, 255]);
        // Outside the circle the logo is masked off
        let corner = renderer
            .frame()
            .pixel((ball.pos.x - ball.radius) as u32, (ball.pos.y - ball.radius) as u32)
            .unwrap();
        assert_ne!(corner, [0x1a, 0x2a, 0x6c, 255]);
    }

    #[test]
    fn test_patch_matches_full_rerender() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        for (c, r) in [(0, 0), (5, 4), (11, 9), (6, 4)] {
            hit(&mut world, &mut renderer, c, r);
            assert_eq!(renderer.bricks, full_rerender(&world), "after hit on ({c}, {r})");
        }
        assert_eq!(renderer.stats().brick_renders, 1);
        assert_eq!(renderer.stats().brick_patches, 4);
    }

    #[test]
    fn test_patch_matches_with_tight_padding() {
        // Padding under two pixels makes the cleared area reach the neighbours
        let (mut world, mut renderer) = setup(150, 300, 11);
        if let Some(brick) = world.bricks.get_mut(3, 3) {
            brick.health = 2;
        }
        renderer.invalidate();
        renderer.render(&world);
        hit(&mut world, &mut renderer, 3, 3);
        hit(&mut world, &mut renderer, 4, 3);
        assert_eq!(renderer.bricks, full_rerender(&world));
    }

    #[test]
    fn test_destroyed_brick_leaves_empty_cell() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        let rect = world.layout.brick_rect(2, 2);
        let center = rect.center();
        let before = renderer.bricks.pixel(center.x as u32, center.y as u32).unwrap();
        assert!(before[3] > 0);
        while world.bricks.get(2, 2).is_some_and(|b| b.is_solid()) {
            hit(&mut world, &mut renderer, 2, 2);
        }
        assert_eq!(renderer.bricks.pixel(center.x as u32, center.y as u32), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_reinforced_brick_is_more_opaque() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        if let Some(brick) = world.bricks.get_mut(1, 1) {
            brick.health = 2;
        }
        if let Some(brick) = world.bricks.get_mut(2, 1) {
            brick.health = 1;
        }
        renderer.invalidate();
        renderer.render(&world);
        let alpha = |c: usize| {
            let p = world.layout.brick_rect(c, 1).center();
            renderer.bricks.pixel(p.x as u32, p.y as u32).unwrap()[3]
        };
        assert!(alpha(1) > alpha(2));
    }

    #[test]
    fn test_round_start_rebuilds_cache() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        world.transition(GameAction::BricksCleared);
        world.advance();
        world.advance();
        for event in world.drain_events() {
            renderer.handle_event(&event, &world);
        }
        renderer.render(&world);
        assert_eq!(renderer.stats().brick_renders, 2);
        assert_eq!(renderer.bricks, full_rerender(&world));
    }

    #[test]
    fn test_overlays_follow_phase() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        assert!(renderer.render(&world).is_none());

        world.transition(GameAction::LastBallLost);
        let overlay = renderer.render(&world).unwrap();
        assert_eq!(overlay.title, "Game Over");
        assert_eq!(overlay.opacity, 0.0);

        for _ in 0..40 {
            tick(&mut world, &TickInput::default(), 2.0);
        }
        let overlay = renderer.render(&world).unwrap();
        assert_eq!(overlay.opacity, 1.0);
        assert!(overlay.lines.iter().any(|l| l.starts_with("Final Score")));

        world.advance();
        let overlay = renderer.render(&world).unwrap();
        assert_eq!(overlay.title, "Click or Press Space to Start");
    }

    #[test]
    fn test_reduced_motion_skips_reveal() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        renderer.reduced_motion = true;
        world.transition(GameAction::BricksCleared);
        assert_eq!(renderer.render(&world).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_render_guards_size_mismatch() {
        let (world, _) = setup(700, 700, 5);
        let mut small = Renderer::new(100, 100);
        assert!(small.render(&world).is_none());
        assert_eq!(small.stats(), CacheStats::default());
    }

    #[test]
    fn test_resize_invalidates_both_caches() {
        let (mut world, mut renderer) = setup(700, 700, 5);
        world.resize(500.0, 400.0);
        renderer.resize(500, 400);
        renderer.render(&world);
        assert_eq!(renderer.stats().background_renders, 2);
        assert_eq!(renderer.stats().brick_renders, 2);
        assert_eq!(renderer.bricks, full_rerender(&world));
    }
}
