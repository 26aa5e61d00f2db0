//! Per-frame simulation tick
//!
//! Advances the world by one variable step. `delta` is elapsed time in units
//! of a 60 Hz frame; it is clamped so a stalled tab can't teleport balls
//! through bricks.

use glam::Vec2;
use rand::{Rng, RngCore};

use super::collision::{ball_overlaps_rect, hits_paddle, paddle_bounce, resolve_brick_hit, resolve_walls};
use super::machine::GameAction;
use super::state::{
    Ball, GameEvent, Particle, PowerUp, PowerUpKind, PowerUpStatus, World,
};
use crate::consts::MAX_DELTA;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested paddle left edge (from pointer/touch position)
    pub target_x: Option<f32>,
    /// Start or acknowledge (click/tap/space)
    pub advance: bool,
    /// Autopilot drives the paddle (headless runs, attract mode)
    pub idle_mode: bool,
}

/// Advance the world by `delta` baseline frames
pub fn tick(world: &mut World, input: &TickInput, delta: f32) {
    if !world.layout.is_ready() {
        log::warn!("Tick before layout is ready, skipping");
        return;
    }
    let delta = delta.clamp(0.0, MAX_DELTA);

    if let Some(x) = input.target_x {
        let layout = world.layout;
        world.paddle.set_target(x, &layout);
    }
    if input.advance || (input.idle_mode && !world.is_simulating()) {
        world.advance();
    }

    if !world.is_simulating() {
        if world.phase.is_terminal() {
            world.reveal += delta;
        }
        return;
    }

    world.ticks += 1;
    if input.idle_mode {
        autopilot(world);
    }

    world.paddle.ease(world.tuning.paddle_easing);
    step_particles(world);
    step_power_ups(world, delta);
    step_balls(world, delta);
    world.power_ups.retain(|p| p.status == PowerUpStatus::Falling);
}

/// Steer the paddle under the most urgent descending ball
fn autopilot(world: &mut World) {
    let target = world
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        .or_else(|| world.balls.first());

    if let Some(ball) = target {
        // Wobble the contact point so rallies don't lock into a loop
        let wobble = (world.ticks as f32 * 0.05).sin() * 0.3;
        let x = ball.pos.x - world.paddle.width * (0.5 + wobble);
        let layout = world.layout;
        world.paddle.set_target(x, &layout);
    }
}

fn step_particles(world: &mut World) {
    let tuning = &world.tuning;
    for p in &mut world.particles {
        p.vel *= tuning.particle_damping;
        p.vel.y += tuning.particle_gravity;
        p.pos += p.vel;
        p.life -= 1;
    }
    world.particles.retain(|p| p.life > 0);
}

fn step_power_ups(world: &mut World, delta: f32) {
    let layout = world.layout;
    let tuning = world.tuning;
    let paddle = world.paddle.rect(&layout);
    let mut released = 0;

    for p in world
        .power_ups
        .iter_mut()
        .filter(|p| p.status == PowerUpStatus::Falling)
    {
        p.pos.y += tuning.power_up_fall_speed * delta;
        if p.pos.y > layout.height {
            p.status = PowerUpStatus::Spent;
            continue;
        }
        if p.pos.y + p.size > paddle.y
            && p.pos.x + p.size > paddle.x
            && p.pos.x - p.size < paddle.right()
        {
            p.status = PowerUpStatus::Spent;
            world.events.push(GameEvent::PowerUpCollected);
            match p.kind {
                PowerUpKind::ExtraBall => released += 1,
            }
        }
    }

    for _ in 0..released {
        let vx = (world.rng.random::<f32>() - 0.5) * tuning.extra_ball_spread;
        world.balls.push(Ball::new(
            Vec2::new(paddle.center().x, paddle.y - 20.0),
            Vec2::new(vx, -tuning.extra_ball_speed),
            layout.ball_radius,
        ));
    }
}

fn step_balls(world: &mut World, delta: f32) {
    let layout = world.layout;
    let tuning = world.tuning;
    let paddle = world.paddle.rect(&layout);

    let mut cleared = false;
    let mut last_ball_lost = false;
    let mut i = 0;

    while i < world.balls.len() {
        let ball = &mut world.balls[i];

        ball.record_trail(tuning.trail_length);
        ball.pos += ball.vel * delta;
        resolve_walls(ball, &layout);

        if hits_paddle(ball, &paddle) {
            world.speed = tuning.next_speed(world.speed);
            ball.vel = paddle_bounce(ball.pos.x, &paddle, world.speed, &tuning);
            ball.pos.y = paddle.y - ball.radius;
        }

        if let Some((cols, rows)) = layout.cells_overlapping(ball.bounds()) {
            for c in cols {
                for r in rows.clone() {
                    let Some(brick) = world.bricks.get_mut(c, r) else {
                        continue;
                    };
                    let rect = layout.brick_rect(c, r);
                    if !brick.is_solid() || !ball_overlaps_rect(ball.pos, ball.radius, &rect) {
                        continue;
                    }

                    resolve_brick_hit(ball, &rect, delta);
                    let health = brick.hit();
                    let color = brick.color;
                    world.events.push(GameEvent::BrickHit { col: c, row: r, health });
                    burst(
                        &mut world.particles,
                        &mut world.rng,
                        ball.pos,
                        color,
                        &tuning,
                        world.max_particles,
                    );

                    if health == 0 {
                        world.events.push(GameEvent::BrickDestroyed { col: c, row: r });
                        if world.rng.random_bool(tuning.power_up_chance) {
                            world.power_ups.push(PowerUp {
                                pos: rect.center(),
                                kind: PowerUpKind::ExtraBall,
                                size: tuning.power_up_size,
                                status: PowerUpStatus::Falling,
                            });
                            world.events.push(GameEvent::PowerUpSpawned);
                        }
                        world.score += tuning.points_per_brick;
                        world.events.push(GameEvent::ScoreChanged(world.score));
                        world.bricks_remaining = world.bricks_remaining.saturating_sub(1);
                        cleared |= world.bricks_remaining == 0;
                    }
                }
            }
        }

        if cleared {
            break;
        }

        if ball.pos.y + ball.radius > layout.height {
            world.events.push(GameEvent::BallLost);
            if world.balls.len() == 1 {
                last_ball_lost = true;
                break;
            }
            world.balls.remove(i);
            continue;
        }

        i += 1;
    }

    if cleared {
        world.transition(GameAction::BricksCleared);
    } else if last_ball_lost {
        world.transition(GameAction::LastBallLost);
    }
}

/// Emit a particle burst at `pos`, dropping the oldest particles past `cap`
fn burst(
    particles: &mut Vec<Particle>,
    rng: &mut dyn RngCore,
    pos: Vec2,
    color: u8,
    tuning: &Tuning,
    cap: usize,
) {
    for _ in 0..tuning.particle_burst {
        let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
        let speed: f32 = rng.random_range(2.0..9.0);
        particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size: rng.random_range(2.0..6.0),
            color,
            life: tuning.particle_lifetime,
        });
    }
    if particles.len() > cap {
        let excess = particles.len() - cap;
        particles.drain(..excess);
    }
}
