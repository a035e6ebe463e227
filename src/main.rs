//! Neon Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use neon_runner::Progress;
    use neon_runner::consts::*;
    use neon_runner::sim::autopilot::suggest_action;
    use neon_runner::sim::{Action, GameEvent, GameState, RunStatus, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        progress: Progress,
        last_time: f64,
        input: TickInput,
        /// Attract mode: the autopilot plays
        idle_mode: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let progress = Progress::load();
            Self {
                state: GameState::with_config(seed, progress.run_config()),
                progress,
                last_time: 0.0,
                input: TickInput::default(),
                idle_mode: false,
            }
        }

        /// Run one simulation tick and route its events
        fn update(&mut self, dt: f32) {
            if self.idle_mode && self.state.run.status == RunStatus::Playing {
                if let Some(action) = suggest_action(&self.state) {
                    self.input.actions.push(action);
                }
            }

            let input = std::mem::take(&mut self.input);
            let output = tick(&mut self.state, &input, dt);

            for event in output.events {
                match event {
                    GameEvent::LevelComplete { level, .. } => {
                        self.progress.record_stage(level + 1);
                        self.progress.save();
                    }
                    GameEvent::RunEnded {
                        score,
                        coins,
                        level,
                    } => {
                        self.progress.commit_run(score, coins, level);
                        self.progress.save();
                    }
                    _ => {}
                }
            }
        }

        /// Start a run with the current store selections
        fn start(&mut self) {
            let config = self.progress.run_config();
            if self.state.start_run_with(config) {
                self.input = TickInput::default();
            }
        }

        fn handle_key(&mut self, key: &str) {
            let action = match key {
                "ArrowLeft" | "a" | "A" => Some(Action::Left),
                "ArrowRight" | "d" | "D" => Some(Action::Right),
                "ArrowUp" | "w" | "W" | " " => Some(Action::Jump),
                "ArrowDown" | "s" | "S" => Some(Action::Slide),
                "Shift" | "e" | "E" => Some(Action::Skill),
                _ => None,
            };
            if let Some(action) = action {
                if self.state.run.status == RunStatus::Playing {
                    self.input.actions.push(action);
                }
                return;
            }

            match key {
                "Escape" | "p" | "P" => {
                    if !self.state.pause() {
                        self.state.resume();
                    }
                }
                "Enter" => match self.state.run.status {
                    RunStatus::Idle | RunStatus::GameOver => self.start(),
                    RunStatus::LevelComplete => {
                        self.state.acknowledge_level();
                    }
                    _ => {}
                },
                "1" | "2" | "3" => {
                    let option = key.parse::<usize>().unwrap_or(1) - 1;
                    self.state.choose_modifier(option);
                }
                "g" | "G" if self.state.run.status.is_menu() => {
                    let difficulty = self.progress.cycle_difficulty();
                    self.progress.save();
                    log::info!("Difficulty: {}", difficulty.mods().label);
                }
                "m" | "M" => {
                    self.state.return_to_menu();
                }
                "i" | "I" => {
                    self.idle_mode = !self.idle_mode;
                    log::info!("Idle mode: {}", self.idle_mode);
                }
                _ => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.state.hud();

            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set_text("#hud-score .hud-value", &format!("{:.0}", hud.score));
            set_text("#hud-coins .hud-value", &hud.coins.to_string());
            set_text("#hud-level .hud-value", &hud.level.to_string());
            set_text(
                "#hud-skill .hud-value",
                &if hud.skill_cooldown > 0.0 {
                    format!("{:.1}s", hud.skill_cooldown)
                } else {
                    "READY".to_string()
                },
            );
            set_text(
                "#hud-powerup .hud-value",
                &format!("{:?} {:.0}%", hud.power_up, hud.power_up_percent),
            );

            // Full snapshot for the renderer
            if let Some(el) = document.get_element_by_id("hud") {
                if let Ok(json) = serde_json::to_string(&hud) {
                    let _ = el.set_attribute("data-state", &json);
                }
            }

            let overlays = [
                ("pause-menu", RunStatus::Paused),
                ("level-complete", RunStatus::LevelComplete),
                ("level-up", RunStatus::LevelUpChoice),
                ("game-over", RunStatus::GameOver),
                ("title", RunStatus::Idle),
            ];
            for (id, status) in overlays {
                if let Some(el) = document.get_element_by_id(id) {
                    let class = if hud.status == status { "" } else { "hidden" };
                    let _ = el.set_attribute("class", class);
                }
            }

            if hud.status == RunStatus::GameOver {
                set_text("#final-score", &format!("{:.0}", hud.score));
                set_text("#final-best", &self.progress.high_score.to_string());
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Runner starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Seed: {}", seed);

        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if event.repeat() {
                return;
            }
            game.borrow_mut().handle_key(&event.key());
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time (tick caps it)
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                REFERENCE_FRAME_SECS
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().state.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow_mut().state.pause() {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Frames the headless demo will simulate before giving up
#[cfg(not(target_arch = "wasm32"))]
const DEMO_MAX_FRAMES: u32 = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_runner::Progress;
    use neon_runner::consts::REFERENCE_FRAME_SECS;
    use neon_runner::sim::autopilot::suggest_action;
    use neon_runner::sim::{GameEvent, GameState, RunStatus, TickInput, tick};

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Neon Runner (native) headless demo, seed {}", seed);

    let mut progress = Progress::load();
    let mut state = GameState::with_config(seed, progress.run_config());
    state.start_run();

    let mut recap_frames = 0;
    let mut frames = 0;
    while frames < DEMO_MAX_FRAMES {
        frames += 1;
        let input = TickInput {
            actions: suggest_action(&state).into_iter().collect(),
        };
        let output = tick(&mut state, &input, REFERENCE_FRAME_SECS);

        for event in &output.events {
            match event {
                GameEvent::LevelComplete { level, score } => {
                    println!("Level {} complete at {:.0}", level, score);
                    progress.record_stage(level + 1);
                }
                GameEvent::RunEnded {
                    score,
                    coins,
                    level,
                } => {
                    progress.commit_run(*score, *coins, *level);
                }
                _ => {}
            }
        }

        match state.run.status {
            RunStatus::LevelComplete => {
                // Let the warp play for a second, then take the first glitch
                recap_frames += 1;
                if recap_frames >= 60 {
                    recap_frames = 0;
                    state.acknowledge_level();
                    if let Some(glitch) = state.choose_modifier(0) {
                        println!("Glitch acquired: {}", glitch.title());
                    }
                }
            }
            RunStatus::GameOver => break,
            _ => {}
        }
    }

    let hud = state.hud();
    println!(
        "Run finished after {} frames: score {:.0}, {} coins, level {}",
        frames, hud.score, hud.coins, hud.level
    );
    println!(
        "Wallet {} coins, best score {}",
        progress.total_coins, progress.high_score
    );
    progress.save();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
