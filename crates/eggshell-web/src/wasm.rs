#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use eggshell_core::event::InputEvent;
use eggshell_core::render::{RenderLoop, Rgba, Surface};
use eggshell_core::scheduler::FrameScheduler;
use eggshell_core::validation::RegistrationForm;
use eggshell_core::{EasterEggs, EggConfig};
use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::form::{form_state_json, parse_field};
use crate::input::decode_inputs;
use crate::toast::{ToastQueue, deliver_queued, toast_json};

type FrameCallback = Closure<dyn FnMut(f64)>;
type NotifyCallback = Rc<RefCell<Option<Function>>>;

fn to_js(err: impl fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// DOMHighResTimeStamp (ms) to a scheduler instant.
fn timestamp(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Platform adapters
// ---------------------------------------------------------------------------

struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.ctx.begin_path();
        if self.ctx.arc(x, y, radius, 0.0, TAU).is_ok() {
            self.ctx.set_fill_style_str(&color.to_string());
            self.ctx.fill();
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill_rect(x, y, width, height);
    }
}

/// Hand queued toasts to the page's `notify(json)` callback. Runs with the
/// session released, so the callback may call back into [`EggshellWeb`].
fn flush_toasts(session: &RefCell<Session>, notify: &RefCell<Option<Function>>) {
    deliver_queued(session, |s| s.eggs.sink_mut(), |notification| {
        // Cloned so the callback may replace itself via `setNotify`.
        let Some(callback) = notify.borrow().clone() else {
            return;
        };
        let Ok(json) = toast_json(&notification) else {
            return;
        };
        if callback
            .call1(&JsValue::NULL, &JsValue::from_str(&json))
            .is_err()
        {
            eggshell_core::warn!("notify callback threw");
        }
    });
}

/// `requestAnimationFrame` as a [`FrameScheduler`].
struct AnimationFrames<'a> {
    window: &'a Window,
    callback: &'a RefCell<Option<FrameCallback>>,
    handle: &'a Cell<Option<i32>>,
}

impl FrameScheduler for AnimationFrames<'_> {
    fn request_frame(&mut self) {
        if let Some(callback) = self.callback.borrow().as_ref()
            && let Ok(id) = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            self.handle.set(Some(id));
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct Session {
    eggs: EasterEggs<ToastQueue>,
    render: RenderLoop,
    surface: Option<CanvasSurface>,
    form: RegistrationForm,
}

impl Session {
    fn frame(&mut self, now: f64, frames: &mut AnimationFrames<'_>) {
        self.eggs.advance_to(timestamp(now));
        match self.surface.as_mut() {
            Some(surface) => {
                self.render.tick(self.eggs.effects(), surface, frames);
            }
            None if self.render.is_running() => frames.request_frame(),
            None => {}
        }
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        if let Some(surface) = &self.surface {
            surface.canvas.set_width(width);
            surface.canvas.set_height(height);
        }
    }
}

// ---------------------------------------------------------------------------
// JS API
// ---------------------------------------------------------------------------

/// One page session: recognizers, effects and the canvas render loop.
///
/// Timers (long press, confetti window, reveals) fire only when the session
/// is polled, on each animation frame and on each `input` call. Call
/// `start()` even without a canvas, or a long press held perfectly still
/// never activates.
#[wasm_bindgen]
pub struct EggshellWeb {
    session: Rc<RefCell<Session>>,
    notify: NotifyCallback,
    window: Window,
    frame: Rc<RefCell<Option<FrameCallback>>>,
    frame_handle: Rc<Cell<Option<i32>>>,
}

#[wasm_bindgen]
impl EggshellWeb {
    /// Create a session. `options` is an optional JSON object overriding
    /// configuration fields.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<EggshellWeb, JsValue> {
        let config = match options.as_deref() {
            Some(json) => EggConfig::from_json(json).map_err(to_js)?,
            None => EggConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let eggs = EasterEggs::new(config, ToastQueue::default()).map_err(to_js)?;
        let render = eggs.render_loop();
        Ok(Self {
            session: Rc::new(RefCell::new(Session {
                eggs,
                render,
                surface: None,
                form: RegistrationForm::new(),
            })),
            notify: Rc::new(RefCell::new(None)),
            window,
            frame: Rc::new(RefCell::new(None)),
            frame_handle: Rc::new(Cell::new(None)),
        })
    }

    /// Paint onto an existing `<canvas>`.
    pub fn attach(&mut self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        self.session.borrow_mut().surface = Some(CanvasSurface { canvas, ctx });
        Ok(())
    }

    /// Register `notify(json)`; each call receives
    /// `{title, message, duration_ms, kind}`. Toasts are delivered after the
    /// triggering call has finished with the session, so the callback may
    /// read state such as `secretDots()`.
    #[wasm_bindgen(js_name = setNotify)]
    pub fn set_notify(&mut self, callback: Function) {
        *self.notify.borrow_mut() = Some(callback);
    }

    /// Feed one JSON event or an array of them. Returns the names of the
    /// hidden interactions that fired.
    pub fn input(&mut self, json: &str) -> Result<Vec<String>, JsValue> {
        let events = decode_inputs(json).map_err(to_js)?;
        let now = self.now();
        let fired = {
            let mut session = self.session.borrow_mut();
            let mut fired = session.eggs.advance_to(now);
            for event in &events {
                if let InputEvent::Resize { width, height } = *event {
                    session.resize_canvas(width, height);
                }
                fired.extend(session.eggs.handle(event));
            }
            fired
        };
        flush_toasts(&self.session, &self.notify);
        Ok(fired.into_iter().map(|a| a.name().to_string()).collect())
    }

    /// Resize the canvas to the viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut session = self.session.borrow_mut();
        session.resize_canvas(width, height);
        session.eggs.handle(&InputEvent::Resize { width, height });
    }

    /// Start the animation-frame loop. No-op if already running.
    pub fn start(&mut self) {
        if self.frame.borrow().is_none() {
            let session = Rc::clone(&self.session);
            let notify = Rc::clone(&self.notify);
            let callback = Rc::clone(&self.frame);
            let handle = Rc::clone(&self.frame_handle);
            let window = self.window.clone();
            let closure = FrameCallback::new(move |now: f64| {
                handle.set(None);
                let mut frames = AnimationFrames {
                    window: &window,
                    callback: &callback,
                    handle: &handle,
                };
                session.borrow_mut().frame(now, &mut frames);
                flush_toasts(&session, &notify);
            });
            *self.frame.borrow_mut() = Some(closure);
        }
        let mut frames = AnimationFrames {
            window: &self.window,
            callback: &self.frame,
            handle: &self.frame_handle,
        };
        self.session.borrow_mut().render.start(&mut frames);
    }

    /// Stop painting and cancel the pending frame.
    pub fn stop(&mut self) {
        self.session.borrow_mut().render.stop();
        if let Some(id) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }

    /// Explicit teardown for JS callers. Drops the frame closure and the
    /// canvas so both can be reclaimed.
    pub fn destroy(&mut self) {
        self.stop();
        self.frame.borrow_mut().take();
        self.notify.borrow_mut().take();
        let mut session = self.session.borrow_mut();
        session.surface = None;
        session.eggs.sink_mut().take();
    }

    // --- state for the page ---

    #[wasm_bindgen(js_name = secretDots)]
    pub fn secret_dots(&self) -> usize {
        self.session.borrow().eggs.secret_dots()
    }

    #[wasm_bindgen(js_name = isSecretRevealed)]
    pub fn is_secret_revealed(&self) -> bool {
        self.session.borrow().eggs.effects().is_secret_revealed()
    }

    #[wasm_bindgen(js_name = isKonamiRevealed)]
    pub fn is_konami_revealed(&self) -> bool {
        self.session.borrow().eggs.effects().is_konami_revealed()
    }

    #[wasm_bindgen(js_name = isLongPressActive)]
    pub fn is_long_press_active(&self) -> bool {
        self.session.borrow().eggs.is_long_press_active()
    }

    #[wasm_bindgen(js_name = isConfettiActive)]
    pub fn is_confetti_active(&self) -> bool {
        self.session.borrow().eggs.effects().is_confetti_active()
    }

    #[wasm_bindgen(js_name = lastKey)]
    pub fn last_key(&self) -> Option<String> {
        self.session.borrow().eggs.last_key().map(|k| k.identifier())
    }

    #[wasm_bindgen(js_name = clickCount)]
    pub fn click_count(&self) -> f64 {
        self.session.borrow().eggs.click_count() as f64
    }

    // --- registration form ---

    #[wasm_bindgen(js_name = formInput)]
    pub fn form_input(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        let field = parse_field(field).ok_or_else(|| to_js(format!("unknown field {field}")))?;
        self.session.borrow_mut().form.input(field, value);
        Ok(())
    }

    #[wasm_bindgen(js_name = formBlur)]
    pub fn form_blur(&mut self, field: &str) -> Result<bool, JsValue> {
        let field = parse_field(field).ok_or_else(|| to_js(format!("unknown field {field}")))?;
        Ok(self.session.borrow_mut().form.blur(field))
    }

    /// Validate everything and toast the outcome.
    #[wasm_bindgen(js_name = formSubmit)]
    pub fn form_submit(&mut self) -> bool {
        let ok = {
            let session = &mut *self.session.borrow_mut();
            session.form.submit(session.eggs.sink_mut())
        };
        flush_toasts(&self.session, &self.notify);
        ok
    }

    /// Field errors, touched flags and the strength meter as JSON.
    #[wasm_bindgen(js_name = formState)]
    pub fn form_state(&self) -> Result<String, JsValue> {
        form_state_json(&self.session.borrow().form).map_err(to_js)
    }
}

impl EggshellWeb {
    fn now(&self) -> Duration {
        self.window
            .performance()
            .map_or(Duration::ZERO, |p| timestamp(p.now()))
    }
}
