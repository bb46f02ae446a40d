//! Hoop Shot entry point
//!
//! On the web: wires DOM pointer/touch events into the session, drives it from
//! requestAnimationFrame and mirrors renderer notifications onto the page.
//! Natively: plays a scripted headless session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, MouseEvent, TouchEvent};

    use hoop_shot::input::PointerEvent;
    use hoop_shot::persistence::LocalStorageStore;
    use hoop_shot::renderer::effects::{SinkAnimation, SinkFrame, miss_landing};
    use hoop_shot::sim::{ArenaLayout, Rect, ShotOutcome, ShotPath};
    use hoop_shot::{GameConfig, GameSession, Renderer};

    /// Ball element edge length (px)
    const BALL_SIZE: f32 = 80.0;

    /// Mirrors session notifications onto the page
    struct DomRenderer {
        document: Document,
        /// Y the ball falls to on a miss
        floor_y: f32,
        last_power: f32,
        basket_offset: f32,
        hoop_scale: f32,
        sink: Option<SinkAnimation>,
    }

    impl DomRenderer {
        fn element(&self, id: &str) -> Option<HtmlElement> {
            self.document.get_element_by_id(id)?.dyn_into().ok()
        }

        fn query(&self, selector: &str) -> Option<HtmlElement> {
            self.document
                .query_selector(selector)
                .ok()
                .flatten()?
                .dyn_into()
                .ok()
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_style(el: &HtmlElement, props: &[(&str, &str)]) {
            let style = el.style();
            for (name, value) in props {
                let _ = style.set_property(name, value);
            }
        }

        fn new(document: Document, floor_y: f32) -> Self {
            Self {
                document,
                floor_y,
                last_power: 0.0,
                basket_offset: 0.0,
                hoop_scale: 1.0,
                sink: None,
            }
        }

        /// Apply every sink keyframe due at `time` (rAF ms)
        fn animate(&mut self, time: f64) {
            let Some(sink) = self.sink.as_mut() else {
                return;
            };
            let frames = sink.advance(time);
            if sink.is_finished() {
                self.sink = None;
            }
            for frame in &frames {
                self.apply_sink_frame(frame);
            }
        }

        fn apply_sink_frame(&self, frame: &SinkFrame) {
            let Some(ball) = self.element("ball") else {
                return;
            };
            let left = format!("{}px", frame.x - BALL_SIZE / 2.0);
            let transform = format!("scale({}) rotate({}deg)", frame.scale, frame.rotation);
            let transition = if frame.delay_ms == 0.0 {
                "all 0.3s ease-in"
            } else {
                "all 0.2s ease"
            };
            Self::set_style(
                &ball,
                &[
                    ("left", left.as_str()),
                    ("transform", transform.as_str()),
                    ("transition", transition),
                ],
            );
            if let Some(y) = frame.y {
                let top = format!("{}px", y - BALL_SIZE / 2.0);
                Self::set_style(&ball, &[("top", top.as_str())]);
            }
            if let Some(opacity) = frame.opacity {
                let opacity = opacity.to_string();
                Self::set_style(&ball, &[("opacity", opacity.as_str())]);
            }
        }

        /// Basket transform: oscillation offset, then level scale
        fn place_basket(&self) {
            let transform = format!(
                "translate(calc(-50% + {}%), -50%) scale({})",
                self.basket_offset, self.hoop_scale
            );
            for selector in [".baseket", "#basket-in", "#basket-area"] {
                if let Some(el) = self.query(selector) {
                    Self::set_style(&el, &[("transform", transform.as_str())]);
                }
            }
        }

        /// Move the ball so its center sits on `pos`
        fn place_ball(&self, pos: Vec2, transition: &str) {
            if let Some(ball) = self.element("ball") {
                let left = format!("{}px", pos.x - BALL_SIZE / 2.0);
                let top = format!("{}px", pos.y - BALL_SIZE / 2.0);
                Self::set_style(
                    &ball,
                    &[("left", left.as_str()), ("top", top.as_str()), ("transition", transition)],
                );
            }
        }
    }

    impl Renderer for DomRenderer {
        fn on_shot_launched(&mut self, path: &ShotPath, power: f32) {
            self.last_power = power;
            if let Some(ball) = self.element("ball") {
                let _ = ball.class_list().add_1("shooting");
                let spin = format!("rotate({}deg) scale(0.8)", power * 3.0);
                Self::set_style(&ball, &[("transform", spin.as_str()), ("opacity", "1")]);
            }
            if let ShotPath::Drop { to, duration_ms, .. } = path {
                self.place_ball(*to, &format!("all {}ms ease-in", duration_ms));
            }
        }

        fn on_ball_position_update(&mut self, pos: Vec2) {
            self.place_ball(pos, "all 30ms linear");
        }

        fn on_shot_resolved(&mut self, outcome: ShotOutcome, position: Vec2) {
            match outcome {
                ShotOutcome::Hit { .. } => {
                    if let Some(hoop) = self.element("basket-in") {
                        let _ = hoop.class_list().add_1("show");
                    }
                    self.sink = Some(SinkAnimation::new(position));
                    log::debug!("Swish at {}", position);
                }
                ShotOutcome::Miss => {
                    self.place_ball(miss_landing(position, self.floor_y), "all 0.6s ease-in");
                    if let Some(ball) = self.element("ball") {
                        let spin = format!("rotate({}deg) scale(0.8)", self.last_power * 4.0);
                        Self::set_style(&ball, &[("transform", spin.as_str()), ("opacity", "0.8")]);
                    }
                }
                ShotOutcome::OutOfBounds => {
                    if let Some(ball) = self.element("ball") {
                        Self::set_style(
                            &ball,
                            &[("opacity", "0"), ("transition", "none"), ("transform", "scale(0)")],
                        );
                    }
                }
            }
        }

        fn on_ball_reset(&mut self, origin: Vec2) {
            self.sink = None;
            self.place_ball(origin, "all 0.3s ease");
            if let Some(ball) = self.element("ball") {
                let _ = ball.class_list().remove_2("shooting", "dragging");
                Self::set_style(&ball, &[("transform", "none"), ("opacity", "1")]);
            }
            if let Some(hoop) = self.element("basket-in") {
                let _ = hoop.class_list().remove_1("show");
            }
        }

        fn on_power_changed(&mut self, power: f32) {
            if let Some(bar) = self.element("power-bar") {
                let width = format!("{}%", power);
                Self::set_style(&bar, &[("width", width.as_str())]);
            }
        }

        fn on_score_changed(&mut self, score: u32, _points_awarded: u32) {
            self.set_text("score", &score.to_string());
        }

        fn on_combo_changed(&mut self, combo: u32) {
            let text = if combo > 1 {
                format!("COMBO x{}!", combo)
            } else {
                String::new()
            };
            self.set_text("combo", &text);
        }

        fn on_level_up(&mut self, level: u8) {
            log::info!("LEVEL {}!", level);
        }

        fn on_level_changed(&mut self, level: u8, hoop_scale: f32) {
            self.set_text("level", &level.to_string());
            self.hoop_scale = hoop_scale;
            self.place_basket();
        }

        fn on_basket_moved(&mut self, offset: f32) {
            self.basket_offset = offset;
            self.place_basket();
        }

        fn on_time_changed(&mut self, seconds_left: u32) {
            self.set_text("timer", &seconds_left.to_string());
        }

        fn on_session_ended(&mut self, final_score: u32, top_score: u32, is_new_record: bool) {
            self.set_text("final-score", &final_score.to_string());
            self.set_text("final-top-score", &top_score.to_string());
            self.set_text("top-score", &top_score.to_string());
            if is_new_record {
                log::info!("New record: {}", top_score);
            }
            if let Some(modal) = self.element("game-over-modal") {
                Self::set_style(&modal, &[("display", "block")]);
            }
        }
    }

    type Session = GameSession<LocalStorageStore, DomRenderer>;

    struct Game {
        session: Session,
        /// rAF timestamp of the first frame
        epoch: Option<f64>,
    }

    fn container(document: &Document) -> Option<Element> {
        document.query_selector(".container").ok().flatten()
    }

    /// Measure the arena in container-local pixels
    fn measure_layout(document: &Document) -> Option<ArenaLayout> {
        let container = container(document)?.get_bounding_client_rect();
        let hoop = document
            .get_element_by_id("basket-in")?
            .get_bounding_client_rect();
        let floor_y = document
            .query_selector(".desk")
            .ok()
            .flatten()
            .map(|desk| (desk.get_bounding_client_rect().top() - container.top()) as f32)
            .unwrap_or(container.height() as f32 * 0.9);

        let size = Vec2::new(container.width() as f32, container.height() as f32);
        Some(ArenaLayout {
            container: size,
            ball_origin: Vec2::new(size.x * 0.5, size.y * 0.7),
            hoop: Rect::new(
                (hoop.left() - container.left()) as f32,
                (hoop.top() - container.top()) as f32,
                hoop.width() as f32,
                hoop.height() as f32,
            ),
            floor_y,
        })
    }

    /// Client coordinates -> container-local
    fn to_local(document: &Document, client_x: f64, client_y: f64) -> Option<PointerEvent> {
        let rect = container(document)?.get_bounding_client_rect();
        Some(PointerEvent::new(
            (client_x - rect.left()) as f32,
            (client_y - rect.top()) as f32,
        ))
    }

    fn mouse_point(document: &Document, event: &MouseEvent) -> Option<PointerEvent> {
        to_local(document, event.client_x() as f64, event.client_y() as f64)
    }

    /// First touch, falling back to changedTouches for touchend
    fn touch_point(document: &Document, event: &TouchEvent) -> Option<PointerEvent> {
        let touch = event
            .touches()
            .get(0)
            .or_else(|| event.changed_touches().get(0))?;
        to_local(document, touch.client_x() as f64, touch.client_y() as f64)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Hoop Shot starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let arena = measure_layout(&document).unwrap_or_default();

        let renderer = DomRenderer::new(document.clone(), arena.floor_y);
        let mut session = GameSession::new(GameConfig::default(), arena, LocalStorageStore, renderer);
        let top_score = session.score_state().top_score;
        if let Some(el) = document.get_element_by_id("top-score") {
            el.set_text_content(Some(&top_score.to_string()));
        }
        session.start();

        let game = Rc::new(RefCell::new(Game {
            session,
            epoch: None,
        }));

        setup_input_handlers(&document, game.clone())?;
        setup_restart_button(&document, game.clone())?;
        setup_resize(game.clone())?;
        request_animation_frame(game);

        log::info!("Hoop Shot running!");
        Ok(())
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let ball = document.get_element_by_id("ball").ok_or("no #ball")?;

        // Pointer down on the ball
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                if let Some(p) = mouse_point(&doc, &event) {
                    game.borrow_mut().session.on_drag_start(p);
                }
            });
            ball.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(p) = touch_point(&doc, &event) {
                    game.borrow_mut().session.on_drag_start(p);
                }
            });
            ball.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Moves anywhere on the page
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(p) = mouse_point(&doc, &event) {
                    game.borrow_mut().session.on_drag_move(p);
                }
            });
            document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.session.is_dragging() {
                    event.prevent_default();
                }
                if let Some(p) = touch_point(&doc, &event) {
                    g.session.on_drag_move(p);
                }
            });
            document.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Release
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(p) = mouse_point(&doc, &event) {
                    game.borrow_mut().session.on_drag_end(p);
                }
            });
            document.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(p) = touch_point(&doc, &event) {
                    game.borrow_mut().session.on_drag_end(p);
                }
            });
            document.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id("restart-btn") else {
            log::warn!("No #restart-btn, restart disabled");
            return Ok(());
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().session.restart();
            if let Some(modal) = doc.get_element_by_id("game-over-modal") {
                let _ = modal.set_attribute("style", "display: none");
            }
            log::info!("Game restarted");
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let mut g = game.borrow_mut();
            if let Some(mut layout) = measure_layout(&document) {
                // The hoop was measured scaled and mid-swing; store it at rest
                let scale = g.session.config().hoop_scale(g.session.level());
                let rest = layout.hoop.scaled(1.0 / scale);
                let shift = g.session.basket_offset() / 100.0 * rest.width();
                layout.hoop = rest.translated(Vec2::new(-shift, 0.0));
                g.session.renderer_mut().floor_y = layout.floor_y;
                g.session.set_layout(layout);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
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
            let epoch = *g.epoch.get_or_insert(time);
            let now = (time - epoch).max(0.0) as u64;
            g.session.advance_to(now);
            g.session.renderer_mut().animate(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hoop Shot (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the real game");

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| hoop_shot::GameConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::error!("Config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => hoop_shot::GameConfig::default(),
    };

    demo_session(config);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Throw a fixed sequence of shots until the clock runs out
#[cfg(not(target_arch = "wasm32"))]
fn demo_session(config: hoop_shot::GameConfig) {
    use glam::Vec2;
    use hoop_shot::input::PointerEvent;
    use hoop_shot::persistence::MemoryStore;
    use hoop_shot::sim::{ArenaLayout, ShotPhase};
    use hoop_shot::{GameSession, RecordingRenderer, RenderEvent};

    let arena = ArenaLayout::default();
    let mut session = GameSession::new(config, arena, MemoryStore::new(), RecordingRenderer::quiet());
    session.start();

    // Straight pull (swish), pull to the left (miss right), tiny flick (cancelled)
    let pulls = [
        Vec2::new(0.0, 145.0),
        Vec2::new(-60.0, 100.0),
        Vec2::new(0.0, 145.0),
        Vec2::new(5.0, 5.0),
    ];

    let mut throw = 0usize;
    while session.is_active() {
        if session.shot_phase() == ShotPhase::Idle && !session.is_dragging() {
            let pull = pulls[throw % pulls.len()];
            throw += 1;
            let from = arena.ball_origin;
            session.on_drag_start(PointerEvent { position: from });
            session.on_drag_move(PointerEvent { position: from + pull });
            session.on_drag_end(PointerEvent { position: from + pull });
        }
        session.advance(10);
    }

    let renderer = session.renderer();
    let hits = renderer.count(|e| {
        matches!(
            e,
            RenderEvent::ShotResolved {
                outcome: hoop_shot::sim::ShotOutcome::Hit { .. },
                ..
            }
        )
    });
    let shots = renderer.count(|e| matches!(e, RenderEvent::ShotResolved { .. }));

    log::info!(
        "Demo finished: {} throws, {}/{} hits, score {}, level {}",
        throw,
        hits,
        shots,
        session.score_state().score,
        session.level()
    );
    println!(
        "score {} | level {} | {}/{} hits",
        session.score_state().score,
        session.level(),
        hits,
        shots
    );
}
