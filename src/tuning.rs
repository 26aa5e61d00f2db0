//! Data-driven game balance
//!
//! Every gameplay number that isn't derived from the surface size lives here so
//! it can be overridden from JSON without touching the simulation.

use serde::{Deserialize, Serialize};

/// Gameplay tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fraction of the remaining distance the paddle covers each tick
    pub paddle_easing: f32,
    /// Ball speed after a round reset (pixels per baseline frame)
    pub base_speed: f32,
    /// Multiplicative speed growth per paddle bounce
    pub speed_growth: f32,
    /// Speed cap
    pub max_speed: f32,
    /// Horizontal speed floor after a paddle bounce
    pub min_horizontal_speed: f32,
    /// Largest bounce angle from vertical (radians)
    pub max_bounce_angle: f32,
    /// Chance that a placed brick is reinforced (health 2)
    pub reinforced_chance: f64,
    /// Chance that a destroyed brick drops a power-up
    pub power_up_chance: f64,
    /// Power-up fall speed (pixels per baseline frame)
    pub power_up_fall_speed: f32,
    /// Power-up radius
    pub power_up_size: f32,
    /// Upward speed of a ball released by a power-up
    pub extra_ball_speed: f32,
    /// Width of the random horizontal speed range of a released ball
    pub extra_ball_spread: f32,
    /// Particles emitted per brick hit
    pub particle_burst: usize,
    /// Particle lifetime in ticks
    pub particle_lifetime: i32,
    /// Per-tick particle velocity damping
    pub particle_damping: f32,
    /// Per-tick particle gravity
    pub particle_gravity: f32,
    /// Points per destroyed brick
    pub points_per_brick: u64,
    /// Ball trail history length
    pub trail_length: usize,
    /// Ticks for the game over / win reveal to reach full opacity
    pub reveal_ticks: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            paddle_easing: 0.3,
            base_speed: 5.0,
            speed_growth: 0.02,
            max_speed: 10.0,
            min_horizontal_speed: 2.0,
            max_bounce_angle: std::f32::consts::FRAC_PI_3,
            reinforced_chance: 0.2,
            power_up_chance: 0.1,
            power_up_fall_speed: 2.0,
            power_up_size: 15.0,
            extra_ball_speed: 5.0,
            extra_ball_spread: 8.0,
            particle_burst: 20,
            particle_lifetime: 60,
            particle_damping: 0.98,
            particle_gravity: 0.1,
            points_per_brick: 10,
            trail_length: 10,
            reveal_ticks: 60.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Chances forced into `[0, 1]`; a NaN chance falls back to its default
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let sanitized = Self {
            reinforced_chance: unit_chance(self.reinforced_chance, defaults.reinforced_chance),
            power_up_chance: unit_chance(self.power_up_chance, defaults.power_up_chance),
            ..self
        };
        if sanitized != self {
            log::warn!(
                "Tuning chances out of range, using reinforced {} and power-up {}",
                sanitized.reinforced_chance,
                sanitized.power_up_chance
            );
        }
        sanitized
    }

    /// Speed after one more paddle bounce
    pub fn next_speed(&self, speed: f32) -> f32 {
        (speed * (1.0 + self.speed_growth)).min(self.max_speed)
    }
}

fn unit_chance(chance: f64, fallback: f64) -> f64 {
    if chance.is_nan() {
        fallback
    } else {
        chance.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_speed": 14.0 }"#).unwrap();
        assert_eq!(tuning.max_speed, 14.0);
        assert_eq!(tuning.paddle_easing, Tuning::default().paddle_easing);
        assert_eq!(tuning.trail_length, 10);
    }

    #[test]
    fn test_chances_clamped_into_unit_range() {
        let tuning =
            Tuning::from_json(r#"{ "reinforced_chance": 1.5, "power_up_chance": -0.25 }"#).unwrap();
        assert_eq!(tuning.reinforced_chance, 1.0);
        assert_eq!(tuning.power_up_chance, 0.0);

        let nan = Tuning {
            power_up_chance: f64::NAN,
            ..Tuning::default()
        }
        .sanitized();
        assert_eq!(nan.power_up_chance, Tuning::default().power_up_chance);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_next_speed_grows_and_caps() {
        let tuning = Tuning::default();
        let faster = tuning.next_speed(5.0);
        assert!((faster - 5.1).abs() < 1e-5);
        assert_eq!(tuning.next_speed(9.99), tuning.max_speed);
        assert_eq!(tuning.next_speed(tuning.max_speed), tuning.max_speed);
    }
}
