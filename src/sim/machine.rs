//! Round state machine
//!
//! `waiting -> playing -> {gameOver, win} -> waiting`. Entering `playing`
//! builds a new round; there is no path from a terminal phase straight back
//! into play.

use super::patterns;
use super::state::{BrickGrid, GameEvent, GamePhase, Paddle, World};

/// Triggers that move the round between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Click, tap or space while waiting
    Start,
    /// Click, tap or space on a finished round
    Acknowledge,
    /// The only remaining ball left through the bottom
    LastBallLost,
    /// The remaining-brick counter reached zero
    BricksCleared,
}

/// Phase reached by applying `action` in `from`, if the transition exists
pub fn next_phase(from: GamePhase, action: GameAction) -> Option<GamePhase> {
    match (from, action) {
        (GamePhase::Waiting, GameAction::Start) => Some(GamePhase::Playing),

        (GamePhase::Playing, GameAction::LastBallLost) => Some(GamePhase::GameOver),
        (GamePhase::Playing, GameAction::BricksCleared) => Some(GamePhase::Win),

        (GamePhase::GameOver, GameAction::Acknowledge) => Some(GamePhase::Waiting),
        (GamePhase::Win, GameAction::Acknowledge) => Some(GamePhase::Waiting),

        _ => None,
    }
}

impl World {
    /// Apply `action`; returns the new phase, or `None` if it was ignored
    pub fn transition(&mut self, action: GameAction) -> Option<GamePhase> {
        let from = self.phase;
        let to = next_phase(from, action)?;

        if to == GamePhase::Playing && !self.layout.is_ready() {
            log::warn!("Start requested before layout is ready, ignoring");
            return None;
        }

        match to {
            GamePhase::Playing => self.setup_round(),
            GamePhase::GameOver => {
                self.reveal = 0.0;
                self.fresh_game = true;
            }
            GamePhase::Win => {
                self.reveal = 0.0;
                self.fresh_game = false;
            }
            GamePhase::Waiting => {}
        }

        self.phase = to;
        log::info!("Phase {:?} -> {:?} (score {})", from, to, self.score);
        self.emit(GameEvent::PhaseChanged(to));

        // A layout with no bricks is won on the spot
        if to == GamePhase::Playing && self.bricks_remaining == 0 {
            return self.transition(GameAction::BricksCleared);
        }
        Some(self.phase)
    }

    /// Start or acknowledge, whichever the current phase accepts
    pub fn advance(&mut self) -> Option<GamePhase> {
        if self.phase.is_terminal() {
            self.transition(GameAction::Acknowledge)
        } else if self.phase == GamePhase::Waiting {
            self.transition(GameAction::Start)
        } else {
            None
        }
    }

    /// Whether the physics engine runs this frame
    pub fn is_simulating(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Build a new round: bricks, paddle, one served ball, empty effects
    fn setup_round(&mut self) {
        if self.fresh_game {
            self.score = 0;
            self.level = 1;
        } else {
            self.level += 1;
        }
        self.fresh_game = true;

        let pattern = match self.fixed_pattern {
            Some(pattern) => pattern,
            None => patterns::choose(&mut self.rng),
        };
        let occupancy = (pattern.generate)(self.bricks.cols(), self.bricks.rows(), &mut self.rng);
        let bricks = BrickGrid::from_occupancy(&occupancy, self.tuning.reinforced_chance, &mut self.rng);
        log::debug!(
            "Level {} uses pattern '{}' ({} bricks)",
            self.level,
            pattern.name,
            bricks.count_solid()
        );

        self.pattern = pattern.name;
        self.set_bricks(bricks);
        self.speed = self.tuning.base_speed;
        self.paddle = Paddle::centered(&self.layout);
        self.balls.clear();
        self.balls.push(self.serve_ball());
        self.particles.clear();
        self.power_ups.clear();
        self.reveal = 0.0;

        self.emit(GameEvent::RoundStarted {
            pattern: pattern.name,
            level: self.level,
        });
        self.emit(GameEvent::ScoreChanged(self.score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::patterns::{Occupancy, Pattern};
    use crate::tuning::Tuning;

    fn ready_world() -> World {
        let mut world = World::new(42, Tuning::default());
        world.resize(700.0, 700.0);
        world
    }

    #[test]
    fn test_terminal_phases_never_jump_back_to_play() {
        for from in [GamePhase::GameOver, GamePhase::Win] {
            for action in [
                GameAction::Start,
                GameAction::LastBallLost,
                GameAction::BricksCleared,
            ] {
                assert_eq!(next_phase(from, action), None, "{:?} {:?}", from, action);
            }
            assert_eq!(next_phase(from, GameAction::Acknowledge), Some(GamePhase::Waiting));
        }
    }

    #[test]
    fn test_tick_gated_by_phase() {
        use crate::sim::tick::{TickInput, tick};

        let mut world = ready_world();
        assert!(!world.is_simulating());
        tick(&mut world, &TickInput::default(), 1.0);
        assert_eq!((world.ticks, world.reveal), (0, 0.0));

        world.advance();
        assert!(world.is_simulating());
        assert!(!world.phase.is_terminal());

        world.transition(GameAction::LastBallLost);
        assert!(world.phase.is_terminal());
        assert!(!world.is_simulating());
        tick(&mut world, &TickInput::default(), 1.0);
        assert_eq!(world.ticks, 0);
        assert_eq!(world.reveal, 1.0);
    }

    #[test]
    fn test_start_builds_round() {
        let mut world = ready_world();
        assert_eq!(world.advance(), Some(GamePhase::Playing));
        assert_eq!(world.balls.len(), 1);
        assert_eq!(world.level, 1);
        assert_eq!(world.bricks_remaining, world.bricks.count_solid());
        assert!(!world.pattern.is_empty());

        let events = world.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundStarted { level: 1, .. })));
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
    }

    #[test]
    fn test_start_ignored_before_layout() {
        let mut world = World::new(1, Tuning::default());
        assert_eq!(world.advance(), None);
        assert_eq!(world.phase, GamePhase::Waiting);
    }

    #[test]
    fn test_advance_is_noop_while_playing() {
        let mut world = ready_world();
        world.advance();
        let bricks = world.bricks.clone();
        assert_eq!(world.advance(), None);
        assert_eq!(world.bricks, bricks);
    }

    #[test]
    fn test_win_then_start_is_level_advance() {
        let mut world = ready_world();
        world.advance();
        world.score = 120;
        world.transition(GameAction::BricksCleared);
        assert_eq!(world.phase, GamePhase::Win);
        world.advance();
        assert_eq!(world.phase, GamePhase::Waiting);
        world.advance();
        assert_eq!(world.level, 2);
        assert_eq!(world.score, 120);
    }

    #[test]
    fn test_game_over_then_start_is_fresh_game() {
        let mut world = ready_world();
        world.advance();
        world.score = 70;
        world.transition(GameAction::LastBallLost);
        assert_eq!(world.phase, GamePhase::GameOver);
        world.advance();
        world.advance();
        assert_eq!(world.level, 1);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_reveal_resets_on_terminal_entry() {
        let mut world = ready_world();
        world.advance();
        world.reveal = 33.0;
        world.transition(GameAction::LastBallLost);
        assert_eq!(world.reveal, 0.0);
    }

    fn no_bricks(cols: usize, rows: usize, _rng: &mut dyn rand::RngCore) -> Occupancy {
        Occupancy::empty(cols, rows)
    }

    static EMPTY: Pattern = Pattern {
        name: "empty",
        generate: no_bricks,
    };

    #[test]
    fn test_empty_layout_is_immediate_win() {
        let mut world = ready_world();
        world.fixed_pattern = Some(&EMPTY);
        assert_eq!(world.advance(), Some(GamePhase::Win));
        let phases: Vec<_> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![GamePhase::Playing, GamePhase::Win]);
    }

    #[test]
    fn test_fixed_pattern_is_used() {
        let mut world = ready_world();
        world.fixed_pattern = patterns::by_name("wall");
        world.advance();
        assert_eq!(world.pattern, "wall");
        assert_eq!(world.bricks_remaining, 120);
    }
}
