//! Collision detection and response
//!
//! Balls are treated as their bounding boxes against walls, the paddle and
//! bricks. Everything here is pure math on the entity types; side effects
//! (scoring, particles, phase changes) are the tick's job.

use glam::Vec2;

use super::layout::{Layout, Rect};
use super::state::Ball;
use crate::tuning::Tuning;

/// Whether the ball's bounding box overlaps `rect`
pub fn ball_overlaps_rect(pos: Vec2, radius: f32, rect: &Rect) -> bool {
    pos.x + radius > rect.x
        && pos.x - radius < rect.right()
        && pos.y + radius > rect.y
        && pos.y - radius < rect.bottom()
}

/// Keep the ball inside the left, right and top walls
///
/// The bottom is open. Returns true if any wall was touched.
pub fn resolve_walls(ball: &mut Ball, layout: &Layout) -> bool {
    let mut touched = false;

    if ball.pos.x + ball.radius > layout.wall_right() {
        ball.pos.x = layout.wall_right() - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
        touched = true;
    }
    if ball.pos.x - ball.radius < layout.wall_left() {
        ball.pos.x = layout.wall_left() + ball.radius;
        ball.vel.x = ball.vel.x.abs();
        touched = true;
    }
    if ball.pos.y - ball.radius < layout.wall_top() {
        ball.pos.y = layout.wall_top() + ball.radius;
        ball.vel.y = ball.vel.y.abs();
        touched = true;
    }

    touched
}

/// Whether a descending ball is resting on the paddle band
pub fn hits_paddle(ball: &Ball, paddle: &Rect) -> bool {
    ball.vel.y > 0.0
        && ball.pos.y + ball.radius >= paddle.y
        && ball.pos.x >= paddle.x
        && ball.pos.x <= paddle.right()
}

/// Velocity after bouncing off the paddle at `speed`
///
/// The offset from the paddle center maps linearly onto
/// `[-max_bounce_angle, max_bounce_angle]` from vertical. The result always
/// points up and never has less horizontal speed than the configured floor.
pub fn paddle_bounce(ball_x: f32, paddle: &Rect, speed: f32, tuning: &Tuning) -> Vec2 {
    let half = paddle.w / 2.0;
    let offset = if half > 0.0 {
        ((ball_x - paddle.center().x) / half).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let angle = offset * tuning.max_bounce_angle;

    let mut vel = crate::direction_from_vertical(angle) * speed;
    vel.y = -vel.y.abs();
    if vel.x.abs() < tuning.min_horizontal_speed {
        let sign = if vel.x < 0.0 { -1.0 } else { 1.0 };
        vel.x = tuning.min_horizontal_speed * sign;
    }
    vel
}

/// Axis a brick hit reflected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitAxis {
    /// Approached from above or below
    Vertical,
    /// Approached from the left or right
    Horizontal,
    /// Already overlapping on both axes last tick
    Embedded,
}

/// Reflect a ball off a brick it overlaps
///
/// The approach side comes from where the ball was one step ago
/// (`pos - vel * delta`). A vertical or horizontal approach pushes the ball
/// back out of that face; an embedded ball only has `vy` flipped.
pub fn resolve_brick_hit(ball: &mut Ball, brick: &Rect, delta: f32) -> HitAxis {
    let prev = ball.pos - ball.vel * delta;
    let r = ball.radius;

    if prev.y + r <= brick.y || prev.y - r >= brick.bottom() {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = if ball.pos.y < brick.y {
            brick.y - r
        } else {
            brick.bottom() + r
        };
        HitAxis::Vertical
    } else if prev.x + r <= brick.x || prev.x - r >= brick.right() {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = if ball.pos.x < brick.x {
            brick.x - r
        } else {
            brick.right() + r
        };
        HitAxis::Horizontal
    } else {
        ball.vel.y = -ball.vel.y;
        HitAxis::Embedded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(700.0, 700.0, 12, 10)
    }

    #[test]
    fn test_walls_reflect_and_clamp() {
        let layout = layout();
        let mut ball = Ball::new(Vec2::new(2.0, 300.0), Vec2::new(-4.0, 1.0), 10.0);
        assert!(resolve_walls(&mut ball, &layout));
        assert_eq!(ball.pos.x, layout.wall_left() + 10.0);
        assert!(ball.vel.x > 0.0);

        let mut ball = Ball::new(Vec2::new(699.0, 300.0), Vec2::new(4.0, 1.0), 10.0);
        resolve_walls(&mut ball, &layout);
        assert_eq!(ball.pos.x, layout.wall_right() - 10.0);
        assert!(ball.vel.x < 0.0);

        let mut ball = Ball::new(Vec2::new(300.0, 1.0), Vec2::new(1.0, -4.0), 10.0);
        resolve_walls(&mut ball, &layout);
        assert!(ball.vel.y > 0.0);
    }

    #[test]
    fn test_bottom_is_open() {
        let layout = layout();
        let mut ball = Ball::new(Vec2::new(300.0, 720.0), Vec2::new(1.0, 4.0), 10.0);
        assert!(!resolve_walls(&mut ball, &layout));
        assert_eq!(ball.pos.y, 720.0);
    }

    #[test]
    fn test_center_hit_gets_minimum_horizontal_speed() {
        let tuning = Tuning::default();
        let paddle = Rect::new(300.0, 680.0, 100.0, 20.0);
        let ball = Ball::new(Vec2::new(350.0, 675.0), Vec2::new(0.0, 5.0), 10.0);
        assert!(hits_paddle(&ball, &paddle));

        let vel = paddle_bounce(ball.pos.x, &paddle, tuning.next_speed(5.0), &tuning);
        assert!(vel.y < 0.0);
        assert!(vel.x.abs() >= tuning.min_horizontal_speed);
    }

    #[test]
    fn test_edge_hit_uses_max_angle() {
        let tuning = Tuning::default();
        let paddle = Rect::new(300.0, 680.0, 100.0, 20.0);
        let vel = paddle_bounce(400.0, &paddle, 10.0, &tuning);
        let angle = vel.x.atan2(-vel.y);
        assert!((angle - tuning.max_bounce_angle).abs() < 1e-4);
        assert!((vel.length() - 10.0).abs() < 1e-3);

        let vel = paddle_bounce(300.0, &paddle, 10.0, &tuning);
        assert!(vel.x < 0.0 && vel.y < 0.0);
    }

    #[test]
    fn test_rising_ball_ignores_paddle() {
        let paddle = Rect::new(300.0, 680.0, 100.0, 20.0);
        let ball = Ball::new(Vec2::new(350.0, 675.0), Vec2::new(0.0, -5.0), 10.0);
        assert!(!hits_paddle(&ball, &paddle));
    }

    #[test]
    fn test_brick_hit_from_below_flips_vy() {
        let brick = Rect::new(100.0, 100.0, 50.0, 20.0);
        let mut ball = Ball::new(Vec2::new(125.0, 125.0), Vec2::new(1.0, -6.0), 8.0);
        assert!(ball_overlaps_rect(ball.pos, ball.radius, &brick));
        assert_eq!(resolve_brick_hit(&mut ball, &brick, 1.0), HitAxis::Vertical);
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.pos.y, brick.bottom() + 8.0);
    }

    #[test]
    fn test_brick_hit_from_side_flips_vx() {
        let brick = Rect::new(100.0, 100.0, 50.0, 20.0);
        let mut ball = Ball::new(Vec2::new(95.0, 110.0), Vec2::new(6.0, 0.5), 8.0);
        assert_eq!(resolve_brick_hit(&mut ball, &brick, 1.0), HitAxis::Horizontal);
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.pos.x, brick.x - 8.0);
    }

    #[test]
    fn test_embedded_ball_flips_vy_only() {
        let brick = Rect::new(100.0, 100.0, 50.0, 20.0);
        let mut ball = Ball::new(Vec2::new(125.0, 110.0), Vec2::new(0.5, 0.5), 8.0);
        assert_eq!(resolve_brick_hit(&mut ball, &brick, 1.0), HitAxis::Embedded);
        assert_eq!(ball.vel, Vec2::new(0.5, -0.5));
        assert_eq!(ball.pos, Vec2::new(125.0, 110.0));
    }
}
