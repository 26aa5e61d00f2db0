//! Per-frame driver
//!
//! One `Session` per mounted game. Each host animation frame calls
//! [`Session::frame`]: clock, input, tick, cache maintenance, render, in that
//! order, all on the caller's thread.

use crate::platform::{FrameClock, InputAdapter};
use crate::renderer::{Overlay, Renderer, Surface};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, World, tick};
use crate::tuning::Tuning;

/// What one frame produced for the host
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Overlay text to show, `None` while playing
    pub overlay: Option<Overlay>,
    /// Notifications raised during the tick
    pub events: Vec<GameEvent>,
}

pub struct Session {
    pub world: World,
    pub renderer: Renderer,
    pub input: InputAdapter,
    clock: FrameClock,
    settings: Settings,
    running: bool,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings, width: u32, height: u32) -> Self {
        let mut world = World::new(seed, tuning);
        world.resize(width as f32, height as f32);
        let renderer = Renderer::new(width, height);
        log::info!("Session created: seed {}, {}x{}", seed, width, height);

        let mut session = Self {
            world,
            renderer,
            input: InputAdapter::new(),
            clock: FrameClock::new(),
            settings,
            running: true,
        };
        session.apply_settings(settings);
        session
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Push preferences into the world and renderer
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.world.max_particles = settings.max_particles();
        self.renderer.trails = settings.trails;
        self.renderer.reduced_motion = settings.reduced_motion;
    }

    /// Host surface changed size; layout and caches are rebuilt
    pub fn resize(&mut self, width: u32, height: u32) {
        self.world.resize(width as f32, height as f32);
        self.renderer.resize(width, height);
    }

    pub fn pointer_moved(&mut self, x: f32) {
        self.input.pointer_moved(x, self.world.paddle.width);
    }

    pub fn touch_start(&mut self, x: f32) {
        self.input.touch_start(x, self.world.paddle.width);
    }

    /// Run one frame at host time `now_ms`; `None` once stopped
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameReport> {
        if !self.running {
            return None;
        }

        let delta = self.clock.delta(now_ms);
        let input = self.input.take();
        tick(&mut self.world, &input, delta);

        let events = self.world.drain_events();
        for event in &events {
            self.renderer.handle_event(event, &self.world);
        }
        let overlay = self.renderer.render(&self.world);

        Some(FrameReport { overlay, events })
    }

    /// Last composed frame
    pub fn surface(&self) -> &Surface {
        self.renderer.frame()
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    pub fn score(&self) -> u64 {
        self.world.score
    }

    /// Stop ticking; later frames are no-ops
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Session stopped at score {}", self.world.score);
        }
        self.running = false;
    }

    /// Resume after [`Session::stop`] without counting the gap as elapsed time
    ///
    /// Returns false if the session was already running; the clock is left alone.
    pub fn resume(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.clock.reset();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(3, Tuning::default(), Settings::default(), 640, 480)
    }

    #[test]
    fn test_waiting_frame_shows_start_prompt() {
        let mut s = session();
        let report = s.frame(0.0).unwrap();
        assert_eq!(report.overlay.unwrap().title, "Click or Press Space to Start");
        assert_eq!(s.phase(), GamePhase::Waiting);
    }

    #[test]
    fn test_press_starts_round() {
        let mut s = session();
        s.input.press();
        let report = s.frame(0.0).unwrap();
        assert!(report.overlay.is_none());
        assert!(report.events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
        assert_eq!(s.renderer.stats().brick_renders, 1);
    }

    #[test]
    fn test_stop_makes_frames_noops() {
        let mut s = session();
        s.input.press();
        s.frame(0.0);
        let ticks = s.world.ticks;
        s.stop();
        assert!(s.frame(16.67).is_none());
        assert_eq!(s.world.ticks, ticks);
        assert!(s.resume());
        assert!(s.frame(100_000.0).is_some());
        assert_eq!(s.world.ticks, ticks + 1);
    }

    #[test]
    fn test_resume_only_restarts_stopped_session() {
        let mut s = session();
        assert!(!s.resume());
        s.stop();
        assert!(!s.is_running());
        assert!(s.resume());
        assert!(s.is_running());
        assert!(!s.resume());
    }

    #[test]
    fn test_settings_reach_world_and_renderer() {
        let mut s = session();
        let settings = Settings {
            particles: false,
            trails: false,
            ..Settings::default()
        };
        s.apply_settings(settings);
        assert_eq!(s.world.max_particles, 0);
        assert!(!s.renderer.trails);
    }

    #[test]
    fn test_resize_mid_round_keeps_playing() {
        let mut s = session();
        s.input.press();
        s.frame(0.0);
        let remaining = s.world.bricks_remaining;
        s.resize(800, 600);
        s.frame(16.67);
        assert_eq!(s.surface().width(), 800);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.world.bricks_remaining <= remaining);
    }
}
