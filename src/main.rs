//! INSQ entry point
//!
//! Web: DOM grid, keyboard input and a requestAnimationFrame loop.
//! Native: headless attract-mode demo driven by the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use insq::audio::WebAudio;
    use insq::consts::SIM_DT;
    use insq::persistence::LocalStore;
    use insq::platform::dom::{DomDirector, DomLayer};
    use insq::platform::{SceneDirector, SceneId, Shell};
    use insq::sim::autopilot::DEFAULT_THINK_INTERVAL;
    use insq::sim::{Autopilot, Direction, GameEvent, GameOverReport, GameSession, InputEvent};
    use insq::{HighScoreRecord, Tuning};

    /// Chance per decision that the demo pilot fumbles
    const DEMO_MISTAKE_CHANCE: f64 = 0.03;

    type WebShell = Shell<DomLayer, WebAudio, DomDirector>;

    /// Game instance holding all state
    struct Game {
        document: Document,
        shell: WebShell,
        session: GameSession,
        scene: SceneId,
        /// Set while the attract-mode demo is running
        pilot: Option<Autopilot>,
        last_time: f64,
        /// Seconds spent on the title screen without input
        title_idle: f32,
        paused: bool,
    }

    impl Game {
        fn start(&mut self, demo: bool) {
            let seed = js_sys::Date::now() as u64;
            self.session.restart(seed);
            self.pilot = demo.then(|| Autopilot::new(seed, DEFAULT_THINK_INTERVAL, DEMO_MISTAKE_CHANCE));
            self.shell.begin(&mut self.session);
            self.scene = SceneId::Main;
            log::info!("{} started with seed: {}", if demo { "Demo" } else { "Game" }, seed);
        }

        fn to_title(&mut self) {
            self.shell.end();
            self.pilot = None;
            self.title_idle = 0.0;
            self.scene = SceneId::Start;
            self.shell.director.request_transition(SceneId::Start);
            show_best(&self.document, self.session.best());
        }

        fn on_key(&mut self, key: &str) {
            if matches!(key, "m" | "M") {
                self.shell.update_settings(|s| s.toggle_mute());
                log::info!("Muted: {}", self.shell.settings().muted);
                return;
            }
            match self.scene {
                SceneId::Start => {
                    self.title_idle = 0.0;
                    if matches!(key, " " | "Enter") {
                        self.start(false);
                    }
                }
                // Any key ends the demo
                SceneId::Main if self.pilot.is_some() => self.to_title(),
                SceneId::Main => {
                    let input = match key {
                        "ArrowUp" | "w" => InputEvent::Move(Direction::Up),
                        "ArrowDown" | "s" => InputEvent::Move(Direction::Down),
                        "ArrowLeft" | "a" => InputEvent::Move(Direction::Left),
                        "ArrowRight" | "d" => InputEvent::Move(Direction::Right),
                        " " => InputEvent::Absorb,
                        _ => return,
                    };
                    let events = self.shell.input(&mut self.session, input);
                    self.after(&events);
                }
                SceneId::GameOver => match key {
                    " " | "Enter" => self.start(false),
                    "Escape" => self.to_title(),
                    _ => {}
                },
            }
        }

        fn after(&mut self, events: &[GameEvent]) {
            let Some(report) = events.iter().find_map(|e| match e {
                GameEvent::GameOver(report) => Some(*report),
                _ => None,
            }) else {
                return;
            };
            if self.pilot.is_some() {
                self.to_title();
                return;
            }
            self.scene = SceneId::GameOver;
            show_report(&self.document, &report);
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;
            if self.paused {
                return;
            }

            match self.scene {
                SceneId::Start => {
                    self.title_idle += dt;
                    if self.title_idle >= self.shell.settings().demo_after {
                        self.start(true);
                    }
                }
                SceneId::Main => {
                    let events = self.shell.frame(&mut self.session, dt, self.pilot.as_mut());
                    self.after(&events);
                }
                SceneId::GameOver => {}
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show_best(document: &Document, best: HighScoreRecord) {
        set_text(document, "title-high-score", &best.high_score.to_string());
        set_text(document, "title-high-level", &best.high_level.to_string());
    }

    fn show_report(document: &Document, report: &GameOverReport) {
        set_text(document, "final-score", &report.score.to_string());
        set_text(document, "final-level", &report.level.to_string());
        set_text(document, "high-score", &report.high_score.to_string());
        set_text(document, "high-level", &report.high_level.to_string());
        if let Some(el) = document.get_element_by_id("new-record") {
            let class = if report.outcome.any() { "" } else { "hidden" };
            let _ = el.set_attribute("class", class);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("INSQ starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(layer) = DomLayer::new(document.clone(), "board") else {
            log::error!("Missing #board element");
            return;
        };
        let mut shell = Shell::new(
            layer,
            WebAudio::new(),
            DomDirector::new(document.clone()),
            Box::new(LocalStore::open()),
        );
        let best = shell.load_best();
        let seed = js_sys::Date::now() as u64;
        let session = match GameSession::new(Tuning::default(), seed, best) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Bad tuning: {e}");
                return;
            }
        };

        shell.director.request_transition(SceneId::Start);
        show_best(&document, best);

        let game = Rc::new(RefCell::new(Game {
            document: document.clone(),
            shell,
            session,
            scene: SceneId::Start,
            pilot: None,
            last_time: 0.0,
            title_idle: 0.0,
            paused: false,
        }));

        setup_keyboard(game.clone());
        setup_auto_pause(game.clone(), &document);
        request_animation_frame(game);

        log::info!("INSQ running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            // Keep arrows and space from scrolling the page
            if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                event.prevent_default();
            }
            if event.repeat() {
                return;
            }
            game.borrow_mut().on_key(&key);
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>, document: &Document) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            g.paused = hidden && g.shell.settings().pause_when_hidden;
            // Don't count the hidden time as one huge frame
            g.last_time = 0.0;
            if g.paused {
                log::info!("Auto-paused (tab hidden)");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::process::ExitCode;
    use std::time::{SystemTime, UNIX_EPOCH};

    use insq::Tuning;
    use insq::audio::NullSink;
    use insq::consts::SIM_DT;
    use insq::persistence::MemoryStore;
    use insq::platform::{HeadlessLayer, RecordingDirector, Shell};
    use insq::sim::autopilot::DEFAULT_THINK_INTERVAL;
    use insq::sim::{Autopilot, GameEvent, GameSession};

    /// Simulated seconds before the demo gives up
    const DEMO_SECONDS: f32 = 600.0;
    const DEMO_MISTAKE_CHANCE: f64 = 0.03;

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    fn load_tuning(path: &str) -> Result<Tuning, String> {
        let json = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
        Tuning::from_json(&json).map_err(|e| format!("{path}: {e}"))
    }

    /// `insq [seed] [tuning.json]`
    pub fn run() -> ExitCode {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(clock_seed);
        let tuning = match args.next() {
            Some(path) => match load_tuning(&path) {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::error!("Could not load tuning: {e}");
                    return ExitCode::FAILURE;
                }
            },
            None => Tuning::default(),
        };

        let mut shell = Shell::new(
            HeadlessLayer::new(),
            NullSink,
            RecordingDirector::default(),
            Box::new(MemoryStore::new()),
        );
        let best = shell.load_best();
        let mut session = match GameSession::new(tuning, seed, best) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid tuning: {e}");
                return ExitCode::FAILURE;
            }
        };
        shell.begin(&mut session);
        let mut pilot = Autopilot::new(seed, DEFAULT_THINK_INTERVAL, DEMO_MISTAKE_CHANCE);

        log::info!("Demo running with seed {seed}");
        println!("== Level 1: {} ==", session.criteria().describe());
        println!("{}", shell.layer.render_ascii());

        let mut elapsed = 0.0;
        while !session.is_over() && elapsed < DEMO_SECONDS {
            let events = shell.frame(&mut session, SIM_DT, Some(&mut pilot));
            elapsed += SIM_DT;
            for event in &events {
                match event {
                    GameEvent::LevelUp { level, criteria } => {
                        println!("== Level {level}: {criteria} ==");
                        println!("{}", shell.layer.render_ascii());
                    }
                    GameEvent::Missed { lives } => println!("Miss! {lives} lives left"),
                    GameEvent::Extend { lives } => println!("Extend! {lives} lives"),
                    _ => {}
                }
            }
        }

        match session.report() {
            Some(report) => println!(
                "Game over: score {}, level {} (best {} / level {})",
                report.score, report.level, report.high_score, report.high_level
            ),
            None => println!(
                "Demo stopped after {DEMO_SECONDS}s: score {}, level {}",
                session.state().score,
                session.state().level
            ),
        }
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("INSQ (native) starting attract-mode demo...");
    demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
