//! Ketunkolo entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use ketunkolo::consts::*;
    use ketunkolo::game::GameConfig;
    use ketunkolo::input::{Pointer, TOUCH_BUTTONS};
    use ketunkolo::{FrameInput, Game, Key, Layer, SceneId};

    /// Browser-side state around the simulation
    struct App {
        game: Game,
        input: FrameInput,
        /// Pointer in view coordinates, converted to world space each frame
        pointer_view: Option<(Vec2, bool)>,
        last_time: f64,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                DEFAULT_DT
            };
            self.last_time = time;

            self.input.pointer = self.pointer_view.map(|(view, down)| {
                let world = match self.game.topdown() {
                    Some(level) => level.screen_to_world(view),
                    None => view,
                };
                Pointer { world, down }
            });

            self.game.frame(dt, &self.input);
            self.input.end_frame();
        }

        fn hud_lines(&self) -> (String, String) {
            let scene = match self.game.scene() {
                Some(SceneId::Intro) => "Intro",
                Some(SceneId::Platform) => "Fox's room",
                Some(SceneId::TopDown) => "Outside",
                None => "",
            };

            let mut status = String::new();
            match self.game.top() {
                Some(Layer::Combat(session)) => {
                    if let Some(prompt) = session.prompt_text() {
                        status = prompt;
                    } else if let Some(feedback) = session.feedback_text() {
                        status = feedback.to_string();
                    }
                }
                Some(Layer::Intro(intro)) => {
                    if intro.title_alpha() > 0.0 {
                        status = intro.title().to_string();
                    } else if let Some(teller) = intro.narration() {
                        status = teller.text().to_string();
                    } else if let Some((_, text)) = intro.bubble() {
                        status = text.to_string();
                    }
                }
                Some(Layer::Platform(level)) => {
                    if let Some(message) = level.blackout_message() {
                        status = message.to_string();
                    } else if let Some(prompt) = level.drink_prompt() {
                        status = prompt.to_string();
                    }
                    if self.game.settings().show_meter {
                        status = format!("Segis: {:.2}  {}", self.game.meter().get(), status);
                    }
                }
                Some(Layer::TopDown(level)) => {
                    let pos = level.pos();
                    status = format!("{:?} at ({:.0}, {:.0})", level.facing(), pos.x, pos.y);
                }
                None => {}
            }
            (scene.to_string(), status)
        }

        fn meter_color(&self) -> Option<String> {
            self.game.platform().map(|level| level.meter_color().to_hex())
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }
        log::info!("Ketunkolo starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no #canvas element")?
            .dyn_into()?;
        canvas.set_width(VIEW_WIDTH as u32);
        canvas.set_height(VIEW_HEIGHT as u32);

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(GameConfig::default(), None, seed).map_err(|e| JsValue::from_str(&e.to_string()))?;
        apply_theme(&document, &game);
        apply_touch_controls(&document, &game);

        let app = Rc::new(RefCell::new(App {
            game,
            input: FrameInput::default(),
            pointer_view: None,
            last_time: 0.0,
        }));

        setup_keyboard(&document, app.clone());
        setup_pointer(&canvas, app.clone());
        setup_theme_toggle(&document, app.clone());
        setup_touch_buttons(&document, app.clone());
        setup_settings_toggles(&document, app.clone());

        request_animation_frame(app);
        Ok(())
    }

    fn setup_keyboard(document: &Document, app: Rc<RefCell<App>>) {
        // Key down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                if let Some(key) = Key::from_dom(&event.key()) {
                    if matches!(key, Key::Up | Key::Down | Key::Left | Key::Right | Key::Space) {
                        event.prevent_default();
                    }
                    app.borrow_mut().input.press(key);
                }
            });
            let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    app.borrow_mut().input.release(key);
                }
            });
            let _ = document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Canvas-relative pointer position scaled to the logical view
    fn view_pos(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let sx = VIEW_WIDTH / rect.width().max(1.0) as f32;
        let sy = VIEW_HEIGHT / rect.height().max(1.0) as f32;
        Vec2::new(
            (event.client_x() as f64 - rect.left()) as f32 * sx,
            (event.client_y() as f64 - rect.top()) as f32 * sy,
        )
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        for (name, down) in [("pointerdown", Some(true)), ("pointermove", None), ("pointerup", Some(false))] {
            let app = app.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = view_pos(&target, &event);
                let mut app = app.borrow_mut();
                let was_down = app.pointer_view.map(|(_, d)| d).unwrap_or(false);
                app.pointer_view = Some((pos, down.unwrap_or(was_down)));
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_theme_toggle(document: &Document, app: Rc<RefCell<App>>) {
        let Some(btn) = document.get_element_by_id("theme-toggle") else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut app = app.borrow_mut();
            let settings = app.game.settings_mut();
            settings.theme = settings.theme.toggle();
            settings.save();
            apply_theme(&doc, &app.game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Each on-screen button holds its key while pressed
    fn setup_touch_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for (id, key) in TOUCH_BUTTONS {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (name, down) in [
                ("pointerdown", true),
                ("pointerup", false),
                ("pointerleave", false),
                ("pointercancel", false),
            ] {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                    event.prevent_default();
                    let mut app = app.borrow_mut();
                    if down {
                        app.input.press(key);
                    } else {
                        app.input.release(key);
                    }
                });
                let _ = btn.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Touch-controls and reduced-motion switches
    fn setup_settings_toggles(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("touch-toggle") {
            let app = app.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut app = app.borrow_mut();
                let settings = app.game.settings_mut();
                settings.touch_controls = !settings.touch_controls;
                settings.save();
                apply_touch_controls(&doc, &app.game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("motion-toggle") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut app = app.borrow_mut();
                let settings = app.game.settings_mut();
                settings.reduced_motion = !settings.reduced_motion;
                settings.save();
                // Applies from the next scene start
                log::info!("Reduced motion: {}", settings.reduced_motion);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn apply_touch_controls(document: &Document, game: &Game) {
        if let Some(el) = document.get_element_by_id("touch-controls") {
            el.set_class_name(if game.settings().touch_controls { "" } else { "hidden" });
        }
    }

    fn apply_theme(document: &Document, game: &Game) {
        let theme = game.settings().theme;
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        if let Some(btn) = document.get_element_by_id("theme-toggle") {
            btn.set_text_content(Some(theme.icon()));
        }
    }

    fn update_hud(app: &App) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let (scene, status) = app.hud_lines();
        if let Some(el) = document.get_element_by_id("scene") {
            el.set_text_content(Some(&scene));
        }
        if let Some(el) = document.get_element_by_id("status") {
            el.set_text_content(Some(&status));
            if let Some(color) = app.meter_color() {
                let _ = el.set_attribute("style", &format!("color: {}", color));
            } else {
                let _ = el.remove_attribute("style");
            }
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.frame(time);
            update_hud(&a);
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Ketunkolo (native) starting...");
    log::info!("Native mode plays a scripted run - use `trunk serve` for the web version");

    // Optional walkability mask for the top-down level
    let mask = match std::env::args().nth(1) {
        Some(path) => Some(ketunkolo::sim::MaskImage::from_png_bytes(&std::fs::read(&path)?)?),
        None => None,
    };

    let mut game = ketunkolo::Game::new(ketunkolo::game::GameConfig::default(), mask, 42)?;
    scripted::run(&mut game);
    Ok(())
}

/// Headless playthrough: skip the intro, drink once, walk out, roam
#[cfg(not(target_arch = "wasm32"))]
mod scripted {
    use ketunkolo::consts::DEFAULT_DT;
    use ketunkolo::{FrameInput, Game, Key, SceneId};

    const MAX_FRAMES: u32 = 60 * 60;

    fn step(game: &mut Game, input: &mut FrameInput) {
        game.frame(DEFAULT_DT, input);
        input.end_frame();
    }

    pub fn run(game: &mut Game) {
        let mut input = FrameInput::default();
        input.press(Key::Enter);
        step(game, &mut input);
        input.release(Key::Enter);

        // Walk to the fridge
        input.press(Key::Right);
        for _ in 0..MAX_FRAMES {
            step(game, &mut input);
            if game.platform().and_then(|p| p.drink_prompt()).is_some() {
                break;
            }
        }
        input.release(Key::Right);

        input.press(Key::letter('g'));
        step(game, &mut input);
        input.release(Key::letter('g'));

        // Answer the prompt once grace has passed
        for _ in 0..MAX_FRAMES {
            let Some(session) = game.combat() else {
                break;
            };
            if let (true, Some(target), Some(prompt)) = (session.is_active(), session.target(), session.prompt()) {
                if prompt.grace_remaining <= 0.0 {
                    input.press(Key::letter(target));
                }
            }
            step(game, &mut input);
            input.held.clear();
        }
        log::info!("Segis after the fridge: {:.2}", game.meter().get());

        // Out the door
        input.press(Key::Right);
        for _ in 0..MAX_FRAMES {
            step(game, &mut input);
            if game.scene() != Some(SceneId::Platform) {
                break;
            }
        }
        input.release(Key::Right);

        // Roam a little
        input.press(Key::letter('w'));
        input.press(Key::letter('a'));
        for _ in 0..120 {
            step(game, &mut input);
        }
        if let Some(level) = game.topdown() {
            log::info!("Fox ended at {:?} facing {:?}", level.pos(), level.facing());
        }
        log::info!("Scripted run finished after {} frames", game.frame_count());
    }
}
