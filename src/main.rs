//! Color Switch Runner entry point
//!
//! On the web this wires the DOM (screens, buttons, input, parent-frame
//! messaging) to the game session and runs it on animation frames. Natively it
//! plays a headless run with the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent};

    use color_switch_runner::consts::*;
    use color_switch_runner::game::run_loop;
    use color_switch_runner::persistence::{LocalStorage, MemoryStorage, Storage};
    use color_switch_runner::platform::messages::{IncomingMessage, OutgoingMessage};
    use color_switch_runner::platform::{AnimationFrameSource, LoopHandle};
    use color_switch_runner::renderer::{MeshRenderer, RenderState, Renderer};
    use color_switch_runner::sim::{GameEvent, palette};
    use color_switch_runner::{Game, Tuning};

    const SCREENS: [&str; 3] = ["startScreen", "gameScreen", "gameOverScreen"];
    /// Delay before the game over screen replaces the playfield
    const GAME_OVER_DELAY_MS: i32 = 500;
    /// Duration of the canvas pulse on a color change
    const PULSE_MS: i32 = 100;

    /// State shared by all DOM handlers
    struct App {
        game: Rc<RefCell<Game>>,
        renderer: Rc<RefCell<dyn Renderer>>,
        source: RefCell<AnimationFrameSource>,
        loop_handle: RefCell<LoopHandle>,
    }

    impl App {
        fn start_game(&self) {
            let name = input_value("playerNameInput");
            if !self.game.borrow_mut().start(&name) {
                log::warn!("Start ignored (phase {:?})", self.game.borrow().phase());
                return;
            }
            self.enter_game_screen();
        }

        fn restart_game(&self) {
            if !self.game.borrow_mut().restart() {
                return;
            }
            self.enter_game_screen();
        }

        fn main_menu(&self) {
            self.loop_handle.borrow().cancel();
            self.game.borrow_mut().return_to_menu();
            show_screen("startScreen");
            self.refresh_menu();
        }

        fn close_game(&self) {
            self.loop_handle.borrow().cancel();
            self.game.borrow_mut().close();
            if let Some(window) = web_sys::window() {
                let _ = window.close();
            }
        }

        fn enter_game_screen(&self) {
            show_screen("gameScreen");
            {
                let game = self.game.borrow();
                update_score_display(&game);
                update_color_indicator(&game);
            }
            self.start_loop();
        }

        fn start_loop(&self) {
            self.loop_handle.borrow().cancel();
            let handle = run_loop(
                self.game.clone(),
                &mut *self.source.borrow_mut(),
                self.renderer.clone(),
                update_hud,
            );
            *self.loop_handle.borrow_mut() = handle;
        }

        fn refresh_menu(&self) {
            let game = self.game.borrow();
            if let Some(el) = element("highScoreDisplay") {
                el.set_text_content(Some(&format!("High Score: {}", game.high_score())));
                let _ = el.style().set_property("display", "block");
            }
            display_leaderboard(&game.leaderboard_lines());
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element(id: &str) -> Option<HtmlElement> {
        document()?.get_element_by_id(id)?.dyn_into().ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn input_value(id: &str) -> String {
        document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn show_screen(name: &str) {
        for screen in SCREENS {
            if let Some(el) = element(screen) {
                let _ = el.class_list().remove_1("active");
            }
        }
        if let Some(el) = element(name) {
            let _ = el.class_list().add_1("active");
        }
    }

    fn set_timeout(callback: impl FnOnce() + 'static, delay_ms: i32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once_into_js(callback);
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            delay_ms,
        );
    }

    fn update_score_display(game: &Game) {
        set_text("scoreDisplay", &format!("Score: {}", game.score()));
    }

    fn update_color_indicator(game: &Game) {
        set_text(
            "currentColor",
            palette::color(game.state.player.color_index).emoji,
        );
    }

    /// Brief scale pulse on the canvas as color-change feedback
    fn pulse_canvas() {
        let Some(canvas) = element("gameCanvas") else {
            return;
        };
        let _ = canvas.style().set_property("transform", "scale(1.02)");
        set_timeout(
            move || {
                let _ = canvas.style().set_property("transform", "scale(1)");
            },
            PULSE_MS,
        );
    }

    /// Runs after every frame with the session still borrowed
    fn update_hud(game: &mut Game) {
        for event in game.drain_events() {
            match event {
                GameEvent::ObstaclePassed { .. } | GameEvent::ObstacleMatched { .. } => {
                    update_score_display(game);
                }
                GameEvent::ColorChanged { .. } => {
                    update_color_indicator(game);
                    pulse_canvas();
                }
                GameEvent::GameOver {
                    score,
                    new_high_score,
                } => show_game_over(score, game.high_score(), new_high_score),
                GameEvent::ObstacleSpawned { .. } => {}
            }
        }
    }

    fn show_game_over(score: u64, high_score: u64, new_high_score: bool) {
        if let Some(el) = element("newHighScore") {
            let display = if new_high_score { "block" } else { "none" };
            let _ = el.style().set_property("display", display);
        }
        set_text("finalScore", &format!("Score: {}", score));
        set_text("finalHighScore", &high_score.to_string());
        set_timeout(|| show_screen("gameOverScreen"), GAME_OVER_DELAY_MS);
    }

    fn display_leaderboard(lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let (Some(doc), Some(container), Some(list)) = (
            document(),
            element("leaderboardContainer"),
            element("topScoresList"),
        ) else {
            return;
        };
        let _ = container.style().set_property("display", "block");
        list.set_inner_html("");
        for line in lines {
            if let Ok(div) = doc.create_element("div") {
                div.set_text_content(Some(line));
                let _ = list.append_child(&div);
            }
        }
    }

    fn post_to_parent(message: &OutgoingMessage) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(Some(parent)) = window.parent() else {
            log::info!("No parent frame, score kept locally");
            return;
        };
        let value = match serde_json::to_string(message) {
            Ok(json) => js_sys::JSON::parse(&json),
            Err(e) => {
                log::warn!("Could not encode parent message: {}", e);
                return;
            }
        };
        match value {
            Ok(value) => {
                if let Err(e) = parent.post_message(&value, "*") {
                    log::warn!("Parent message failed: {:?}", e);
                }
            }
            Err(e) => log::warn!("Could not build parent message: {:?}", e),
        }
    }

    fn open_storage() -> Box<dyn Storage> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}, scores will not persist", e);
                Box::new(MemoryStorage::new())
            }
        }
    }

    async fn create_renderer(canvas: &HtmlCanvasElement, tuning: &Tuning) -> Rc<RefCell<dyn Renderer>> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return Rc::new(RefCell::new(MeshRenderer::default()));
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return Rc::new(RefCell::new(MeshRenderer::default()));
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let playfield = (tuning.canvas_width, tuning.canvas_height);
        match RenderState::new(surface, &adapter, canvas.width(), canvas.height(), playfield).await {
            Ok(state) => Rc::new(RefCell::new(state)),
            Err(e) => {
                log::error!("Renderer unavailable: {}", e);
                Rc::new(RefCell::new(MeshRenderer::default()))
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Color Switch Runner starting...");

        let Some(doc) = document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = doc
            .get_element_by_id("gameCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #gameCanvas element");
            return;
        };

        let tuning = Tuning::load();
        canvas.set_width(tuning.canvas_width as u32);
        canvas.set_height(tuning.canvas_height as u32);

        let seed = js_sys::Date::now() as u64;
        let renderer = create_renderer(&canvas, &tuning).await;
        let mut game = Game::new(open_storage(), tuning, seed);
        game.on_score_reported(|report| post_to_parent(&OutgoingMessage::from(report)));
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(App {
            game: Rc::new(RefCell::new(game)),
            renderer,
            source: RefCell::new(AnimationFrameSource::new()),
            loop_handle: RefCell::new(LoopHandle::default()),
        });

        setup_buttons(&doc, app.clone());
        setup_input_handlers(&doc, &canvas, app.clone());
        setup_parent_messages(app.clone());

        show_screen("startScreen");
        app.refresh_menu();
        if let Some(input) = doc
            .get_element_by_id("playerNameInput")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(app.game.borrow().player_name());
        }

        post_to_parent(&OutgoingMessage::LoadData {
            game_id: GAME_ID.to_string(),
        });
    }

    fn on_click(doc: &Document, id: &str, handler: impl Fn() + 'static) {
        let Some(el) = doc.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(doc: &Document, app: Rc<App>) {
        {
            let app = app.clone();
            on_click(doc, "startButton", move || app.start_game());
        }
        {
            let app = app.clone();
            on_click(doc, "closeButton", move || app.close_game());
        }
        {
            let app = app.clone();
            on_click(doc, "restartButton", move || app.restart_game());
        }
        {
            let app = app.clone();
            on_click(doc, "mainMenuButton", move || app.main_menu());
        }

        if let Some(input) = doc.get_element_by_id("playerNameInput") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    app.start_game();
                }
            });
            let _ = input.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(doc: &Document, canvas: &HtmlCanvasElement, app: Rc<App>) {
        // Click / tap
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.game.borrow_mut().activate();
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                app.game.borrow_mut().activate();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Space bar
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.code() != "Space" {
                return;
            }
            // Spaces still reach the name field outside a run
            let mut game = app.game.borrow_mut();
            if game.state.is_playing() {
                event.prevent_default();
                game.activate();
            }
        });
        let _ = doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_parent_messages(app: Rc<App>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MessageEvent| {
            let Ok(json) = js_sys::JSON::stringify(&event.data()) else {
                return;
            };
            let Some(json) = json.as_string() else {
                return;
            };
            let Ok(message) = serde_json::from_str::<IncomingMessage>(&json) else {
                return;
            };
            if let Some(scores) = message.into_scores() {
                log::info!("Received {} scores from host", scores.len());
                app.game.borrow_mut().set_remote_scores(scores);
                display_leaderboard(&app.game.borrow().leaderboard_lines());
            }
        });
        let _ = window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Frames the headless run may last before it is stopped
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_FRAMES: usize = 60 * 60 * 5;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::Context;
    use color_switch_runner::game::run_loop;
    use color_switch_runner::persistence::MemoryStorage;
    use color_switch_runner::platform::{self, ManualTickSource};
    use color_switch_runner::renderer::MeshRenderer;
    use color_switch_runner::sim::autopilot_wants_switch;
    use color_switch_runner::{Game, Tuning};

    env_logger::init();
    log::info!("Color Switch Runner (native) starting...");
    log::info!("Native mode plays a headless autopilot run - use `trunk serve` for the web version");

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("seed must be an unsigned integer, got {arg:?}"))?,
        None => platform::now_ms() as u64,
    };

    let game = Rc::new(RefCell::new(Game::new(
        Box::new(MemoryStorage::new()),
        Tuning::load(),
        seed,
    )));
    game.borrow_mut().on_score_reported(|report| {
        log::info!("Score reported: {} scored {}", report.player_name, report.score);
    });
    game.borrow_mut().start("Autopilot");

    let renderer = Rc::new(RefCell::new(MeshRenderer::default()));
    let mut source = ManualTickSource::new();
    let handle = run_loop(game.clone(), &mut source, renderer.clone(), |game| {
        if autopilot_wants_switch(&game.state, 6) {
            game.activate();
        }
        game.drain_events();
    });

    let frames = source.pump(MAX_HEADLESS_FRAMES);
    if handle.cancel() {
        log::info!("Stopped after {} frames", frames);
    }

    let game = game.borrow();
    println!(
        "seed {seed}: score {} after {frames} frames ({:?}), {} vertices in last frame",
        game.score(),
        game.phase(),
        renderer.borrow().vertices.len()
    );
    Ok(())
}
