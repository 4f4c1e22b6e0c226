//! Browser glue
//!
//! Owns the canvas, the DOM listeners and the animation-frame loop. All page
//! state lives in one [`Runtime`] behind a thread-local; DOM callbacks and
//! the exported functions reach it through [`with_runtime`].
//!
//! Expected page layout:
//! - `<canvas id="canvas" width="800" height="600">`
//! - optional `#level-title` and `#controls-help` text elements
//! - virtual buttons carrying `data-control="up|down|left|right|action|jump|boost|brake"`

use std::cell::RefCell;

use glam::Vec2;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, EventTarget, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, Navigator,
    TouchEvent, Window,
};

use crate::audio::AudioManager;
use crate::engine::{FrameHandle, FrameOutcome, FrameScheduler, GameContext, GameLoop, Level, LevelKind};
use crate::error::{ArcadeError, Result};
use crate::input::{Action, Controls, GamepadSnapshot, GamepadSource, Vibrator};
use crate::renderer::canvas::CanvasPainter;
use crate::renderer::{SpriteBank, SpriteKind};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Edge length of generated placeholder sprites
const PLACEHOLDER_SIZE: u32 = 64;

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

/// Run `f` against the page runtime. `None` if it is not initialised or
/// already borrowed (a re-entrant DOM callback).
fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
    RUNTIME.with(|slot| match slot.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            log::warn!("Arcade runtime busy, event dropped");
            None
        }
    })
}

fn platform_err(what: &str) -> ArcadeError {
    ArcadeError::Platform(what.to_string())
}

/// `requestAnimationFrame` with a single long-lived callback
struct RafScheduler {
    window: Window,
    callback: js_sys::Function,
}

impl FrameScheduler for RafScheduler {
    fn request(&mut self) -> Option<FrameHandle> {
        match self.window.request_animation_frame(&self.callback) {
            Ok(id) => Some(FrameHandle(id)),
            Err(_) => {
                log::warn!("requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}

/// First connected pad from `navigator.getGamepads()`
struct NavigatorGamepads {
    navigator: Navigator,
}

impl GamepadSource for NavigatorGamepads {
    fn poll(&mut self) -> Option<GamepadSnapshot> {
        let pads = self.navigator.get_gamepads().ok()?;
        let pad = pads
            .iter()
            .filter_map(|p| p.dyn_into::<web_sys::Gamepad>().ok())
            .find(|p| p.connected())?;
        Some(GamepadSnapshot {
            axes: pad
                .axes()
                .iter()
                .filter_map(|a| a.as_f64())
                .map(|a| a as f32)
                .collect(),
            buttons: pad
                .buttons()
                .iter()
                .filter_map(|b| b.dyn_into::<web_sys::GamepadButton>().ok())
                .map(|b| b.pressed())
                .collect(),
        })
    }
}

/// `navigator.vibrate`
struct NavigatorVibrator {
    navigator: Navigator,
}

impl Vibrator for NavigatorVibrator {
    fn vibrate(&mut self, duration_ms: u32) -> bool {
        self.navigator.vibrate_with_duration(duration_ms)
    }
}

struct Runtime {
    window: Window,
    document: Document,
    ctx: GameContext,
    painter: CanvasPainter,
    sprites: SpriteBank<HtmlImageElement>,
    scheduler: RafScheduler,
    game: Option<GameLoop>,
    /// Keeps the frame callback alive for the page's lifetime
    _frame_callback: Closure<dyn FnMut(f64)>,
}

impl Runtime {
    fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| platform_err("no window"))?;
        let document = window.document().ok_or_else(|| platform_err("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| platform_err("no #canvas element"))?
            .dyn_into()
            .map_err(|_| platform_err("#canvas is not a canvas"))?;
        let painter = CanvasPainter::new(&canvas)?;

        let settings = Settings::load();
        let navigator = window.navigator();
        let touch_capable = navigator.max_touch_points() > 0;
        let controls = Controls::new(
            &settings,
            touch_capable,
            Box::new(NavigatorGamepads {
                navigator: navigator.clone(),
            }),
            Box::new(NavigatorVibrator { navigator }),
        );
        let audio = AudioManager::new(settings.master_volume, settings.sfx_volume, settings.muted);
        let seed = js_sys::Date::now() as u64;
        log::info!("Arcade seed: {}", seed);
        let ctx = GameContext::new(settings, Tuning::default(), controls, Box::new(audio), seed);

        let frame_callback = Closure::<dyn FnMut(f64)>::new(|now: f64| {
            with_runtime(|rt| rt.on_frame(now));
        });
        let scheduler = RafScheduler {
            window: window.clone(),
            callback: frame_callback.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        };

        Ok(Self {
            window,
            document,
            ctx,
            painter,
            sprites: SpriteBank::new(PLACEHOLDER_SIZE),
            scheduler,
            game: None,
            _frame_callback: frame_callback,
        })
    }

    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn on_frame(&mut self, now: f64) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let outcome = game.on_frame(
            now,
            &mut self.ctx.controls,
            self.ctx.audio.as_mut(),
            &mut self.scheduler,
        );
        if outcome == FrameOutcome::Stepped {
            self.painter.replay(game.frame(), &mut self.sprites);
        }
    }

    /// Stop whatever is running, then build and start `kind`
    fn start(&mut self, kind: LevelKind) {
        self.stop();
        let mut game = self.ctx.new_loop(kind);
        self.load_sprites(game.level().sprites());
        self.show_level_info(game.level());
        let now = self.now();
        game.start(now, &mut self.scheduler);
        self.painter.replay(game.frame(), &mut self.sprites);
        self.game = Some(game);
    }

    fn stop(&mut self) -> bool {
        match self.game.take() {
            Some(mut game) => game.stop(&mut self.scheduler),
            None => false,
        }
    }

    /// Fire-and-forget image loads; the painter uses placeholders until
    /// (or unless) they arrive
    fn load_sprites(&mut self, kinds: &[SpriteKind]) {
        for &kind in kinds {
            let Some(path) = self.sprites.request(kind) else {
                continue;
            };
            let Ok(image) = HtmlImageElement::new() else {
                self.sprites.on_failed(kind);
                continue;
            };

            let loaded = image.clone();
            let onload = Closure::once_into_js(move || {
                with_runtime(|rt| rt.sprites.on_loaded(kind, loaded));
            });
            let onerror = Closure::once_into_js(move || {
                with_runtime(|rt| rt.sprites.on_failed(kind));
            });
            image.set_onload(Some(onload.unchecked_ref()));
            image.set_onerror(Some(onerror.unchecked_ref()));
            image.set_src(&path);
        }
    }

    fn show_level_info(&self, level: &dyn Level) {
        if let Some(el) = self.document.get_element_by_id("level-title") {
            el.set_text_content(Some(level.kind().title()));
        }
        if let Some(el) = self.document.get_element_by_id("controls-help") {
            let hints: Vec<String> = level
                .controls_description()
                .iter()
                .map(|(keys, what)| format!("{}: {}", keys, what))
                .collect();
            el.set_text_content(Some(&hints.join(" | ")));
        }
    }
}

/// Attach `handler` to `event` on `target` for the page's lifetime
fn listen<E>(target: &EventTarget, event: &str, handler: impl FnMut(E) + 'static) -> Result<()>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|_| ArcadeError::Platform(format!("addEventListener('{}') failed", event)))?;
    closure.forget();
    Ok(())
}

/// Virtual button under a screen point, via its `data-control` attribute
fn control_at(document: &Document, pos: Vec2) -> Option<Action> {
    let element = document.element_from_point(pos.x, pos.y)?;
    let button = element.closest("[data-control]").ok()??;
    let name = button.get_attribute("data-control")?;
    Action::from_control_name(&name)
}

fn for_each_changed_touch(event: &TouchEvent, mut f: impl FnMut(i32, Vec2)) {
    let touches = event.changed_touches();
    for i in 0..touches.length() {
        if let Some(touch) = touches.get(i) {
            f(
                touch.identifier(),
                Vec2::new(touch.client_x() as f32, touch.client_y() as f32),
            );
        }
    }
}

fn install_listeners(window: &Window, document: &Document) -> Result<()> {
    listen(window, "keydown", |event: KeyboardEvent| {
        let bound = with_runtime(|rt| {
            rt.ctx.audio.resume();
            rt.ctx.controls.key_down(&event.key(), &event.code())
        });
        if bound == Some(true) {
            event.prevent_default();
        }
    })?;
    listen(window, "keyup", |event: KeyboardEvent| {
        with_runtime(|rt| rt.ctx.controls.key_up(&event.key(), &event.code()));
    })?;
    listen(window, "blur", |_event: web_sys::Event| {
        with_runtime(|rt| rt.ctx.controls.release_all());
    })?;

    {
        let doc = document.clone();
        listen(document, "touchstart", move |event: TouchEvent| {
            let mut on_button = false;
            for_each_changed_touch(&event, |id, pos| {
                let zone = control_at(&doc, pos);
                on_button |= zone.is_some();
                with_runtime(|rt| {
                    rt.ctx.audio.resume();
                    rt.ctx.controls.touch_start(id, pos, zone);
                });
            });
            if on_button {
                event.prevent_default();
            }
        })?;
    }
    listen(document, "touchmove", |event: TouchEvent| {
        for_each_changed_touch(&event, |id, pos| {
            with_runtime(|rt| rt.ctx.controls.touch_move(id, pos));
        });
    })?;
    for name in ["touchend", "touchcancel"] {
        listen(document, name, |event: TouchEvent| {
            for_each_changed_touch(&event, |id, _| {
                with_runtime(|rt| rt.ctx.controls.touch_end(id));
            });
        })?;
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub async fn init() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialised");
    }

    let runtime = Runtime::new()?;
    install_listeners(&runtime.window, &runtime.document)?;
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));

    log::info!("Retro Arcade ready");
    Ok(())
}

/// Stop the current level (if any) and start the named one
#[wasm_bindgen]
pub fn start_level(name: &str) -> std::result::Result<(), JsValue> {
    let kind: LevelKind = name.parse()?;
    with_runtime(|rt| rt.start(kind)).ok_or_else(|| JsValue::from_str("arcade not initialised"))
}

/// Returns false if nothing was running
#[wasm_bindgen]
pub fn stop_level() -> bool {
    with_runtime(|rt| rt.stop()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn restart_level() {
    with_runtime(|rt| {
        if let Some(game) = rt.game.as_mut() {
            log::info!("{} restarted", game.level().kind().title());
            game.level_mut().restart();
        }
    });
}

/// Override level balance from JSON; applies from the next `start_level`
#[wasm_bindgen]
pub fn load_tuning(json: &str) -> std::result::Result<(), JsValue> {
    let tuning = Tuning::from_json(json)?;
    with_runtime(|rt| rt.ctx.tuning = tuning);
    Ok(())
}

/// Persist new settings; input and mute apply immediately
#[wasm_bindgen]
pub fn apply_settings(json: &str) -> std::result::Result<(), JsValue> {
    let settings = Settings::from_json(json)?;
    settings.save();
    with_runtime(|rt| rt.ctx.apply_settings(settings));
    Ok(())
}
