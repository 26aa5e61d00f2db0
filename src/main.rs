//! Rialo Bounce entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use rialo_bounce::renderer::{Overlay, Presenter};
    use rialo_bounce::sim::GameEvent;
    use rialo_bounce::{Session, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: Session,
        presenter: Option<Presenter>,
        canvas: HtmlCanvasElement,
        /// Pending animation frame, cancelled when the page goes away
        frame_id: Option<i32>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(session: Session, canvas: HtmlCanvasElement) -> Self {
            Self {
                session,
                presenter: None,
                canvas,
                frame_id: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Canvas x in surface pixels for a client-space x
        fn surface_x(&self, client_x: f32) -> f32 {
            let rect = self.canvas.get_bounding_client_rect();
            let scale = if rect.width() > 0.0 {
                self.canvas.width() as f64 / rect.width()
            } else {
                1.0
            };
            ((client_x as f64 - rect.left()) * scale) as f32
        }

        /// Match the backing store to the element size
        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = ((self.canvas.client_width() as f64 * dpr) as u32).max(1);
            let height = ((self.canvas.client_height() as f64 * dpr) as u32).max(1);
            if width == self.canvas.width() && height == self.canvas.height() {
                return;
            }
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.session.resize(width, height);
            if let Some(ref mut presenter) = self.presenter {
                presenter.resize(width, height);
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Present the last composed frame
        fn present(&mut self) {
            if let Some(ref mut presenter) = self.presenter {
                match presenter.present(self.session.surface()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        presenter.resize(presenter.size.0, presenter.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, events: &[GameEvent], overlay: Option<&Overlay>) {
            let Some(document) = document() else {
                return;
            };

            for event in events {
                match event {
                    GameEvent::ScoreChanged(score) => {
                        set_text(&document, "#hud-score .hud-value", &score.to_string());
                    }
                    GameEvent::RoundStarted { pattern, level } => {
                        set_text(&document, "#hud-level .hud-value", &level.to_string());
                        set_text(&document, "#hud-pattern .hud-value", pattern);
                    }
                    _ => {}
                }
            }

            set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());

            if let Some(el) = document.get_element_by_id("overlay") {
                match overlay {
                    Some(overlay) => {
                        let _ = el.set_attribute("class", "");
                        let _ = el.set_attribute(
                            "style",
                            &format!("opacity: {:.3}", overlay.opacity.clamp(0.0, 1.0)),
                        );
                        set_text(&document, "#overlay-title", &overlay.title);
                        set_text(&document, "#overlay-lines", &overlay.lines.join("\n"));
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        /// Stop ticking and drop the pending animation frame
        fn halt(&mut self) {
            self.session.stop();
            if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Rialo Bounce starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed, Tuning::default(), Settings::load(), width, height);
        let game = Rc::new(RefCell::new(Game::new(session, canvas.clone())));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match Presenter::new(surface, &adapter, width, height).await {
            Ok(presenter) => game.borrow_mut().presenter = Some(presenter),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        }

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Set up resize and lifecycle listeners
        setup_lifecycle(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Rialo Bounce running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let x = g.surface_x(event.client_x() as f32);
                g.session.pointer_moved(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click - start or acknowledge
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.input.press();
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let x = g.surface_x(touch.client_x() as f32);
                    g.session.pointer_moved(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                match event.touches().get(0) {
                    Some(touch) => {
                        let x = g.surface_x(touch.client_x() as f32);
                        g.session.touch_start(x);
                    }
                    None => g.session.input.press(),
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.session.input.key_down(&event.code()) {
                    event.prevent_default();
                } else if event.code() == "KeyI" {
                    let idle = !g.session.input.idle_mode;
                    g.session.input.idle_mode = idle;
                    log::info!("Idle mode: {}", idle);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Window resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().fit_canvas();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().halt();
                    log::info!("Paused (tab hidden)");
                } else {
                    resume_loop(&game);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Page teardown
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.settings().save();
                g.halt();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back-forward cache
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                resume_loop(&game);
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Restart a halted loop; no-op while frames are already scheduled
    fn resume_loop(game: &Rc<RefCell<Game>>) {
        let resumed = game.borrow_mut().session.resume();
        if resumed {
            log::info!("Resumed");
            request_animation_frame(game.clone());
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().frame_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_id = None;

            let Some(report) = g.session.frame(time) else {
                return;
            };
            g.track_fps(time);
            g.present();
            g.update_hud(&report.events, report.overlay.as_ref());
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless autoplay: the autopilot runs rounds back to back and the log
/// records what happened.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rialo_bounce::consts::FRAME_INTERVAL_MS;
    use rialo_bounce::sim::GameEvent;
    use rialo_bounce::{QualityPreset, Session, Settings, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rialo Bounce (native) starting...");
    log::info!("Native mode runs the autopilot headless - build for wasm32 to play");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    let frames = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(60 * 60);
    let quality = args
        .next()
        .and_then(|s| QualityPreset::parse(&s))
        .unwrap_or_default();
    log::info!("Seed {}, {} frames, {} quality", seed, frames, quality.as_str());

    let settings = Settings {
        quality,
        ..Settings::default()
    };
    let mut session = Session::new(seed, Tuning::default(), settings, 960, 720);
    session.input.idle_mode = true;

    let mut rounds = 0u32;
    for frame in 0..frames {
        let Some(report) = session.frame(frame as f64 * FRAME_INTERVAL_MS) else {
            break;
        };
        for event in report.events {
            match event {
                GameEvent::RoundStarted { pattern, level } => {
                    rounds += 1;
                    log::info!("Frame {}: level {} with pattern '{}'", frame, level, pattern);
                }
                GameEvent::PhaseChanged(phase) => {
                    log::info!("Frame {}: {:?} (score {})", frame, phase, session.score());
                }
                _ => {}
            }
        }
    }

    session.stop();
    let stats = session.renderer.stats();
    log::info!(
        "Played {} rounds, final score {}, level {}",
        rounds,
        session.score(),
        session.world.level
    );
    log::info!(
        "Cache: {} background renders, {} brick renders, {} brick patches",
        stats.background_renders,
        stats.brick_renders,
        stats.brick_patches
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
