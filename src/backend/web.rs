use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, Performance, WebGlContextAttributes, Window};

use crate::backend::{
    Clock, Notifier, RenderEngine, RepaintScheduler, Surface, SurfaceOptions, SurfaceProvider,
};
use crate::config::{self, FrameLoopConfig};
use crate::error::{EngineError, ScheduleError};
use crate::frame_loop::{FrameLoop, LoopControl, StopHandle};
use crate::runtime;

type FrameCallback = Closure<dyn FnMut(f64)>;
type WebFrameLoop = FrameLoop<CanvasSurface, JsEngine, AnimationFrameClock>;

static HOOKS: Once = Once::new();

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl Surface for CanvasSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }
}

pub struct CanvasProvider {
    window: Window,
}

impl CanvasProvider {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl SurfaceProvider for CanvasProvider {
    type Surface = CanvasSurface;

    fn name(&self) -> &'static str {
        "web-canvas"
    }

    fn acquire(&mut self, target: &str, options: SurfaceOptions) -> Option<CanvasSurface> {
        let document = self.window.document()?;
        let canvas = document
            .get_element_by_id(target)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let attributes = WebGlContextAttributes::new();
        attributes.set_antialias(options.antialias);
        // The engine binds its own context; this only proves one is available.
        canvas
            .get_context_with_context_options("webgl", &attributes)
            .ok()
            .flatten()?;
        Some(CanvasSurface { canvas })
    }
}

/// Adapter over a JavaScript engine object created with `new Engine(canvasId)`
/// and exposing `render(width, height, elapsedSeconds)`.
pub struct JsEngine {
    instance: JsValue,
    render_fn: Function,
}

impl JsEngine {
    pub fn construct(ctor: &Function, canvas_id: &str) -> Result<Self, EngineError> {
        let args = Array::of1(&JsValue::from_str(canvas_id));
        let instance = Reflect::construct(ctor, &args).map_err(js_error)?;
        let render_fn = Reflect::get(&instance, &JsValue::from_str("render"))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| EngineError::new("engine object has no render method"))?;
        Ok(Self {
            instance,
            render_fn,
        })
    }
}

impl RenderEngine for JsEngine {
    fn render(&mut self, width: u32, height: u32, elapsed_seconds: f64) -> Result<(), EngineError> {
        self.render_fn
            .call3(
                &self.instance,
                &JsValue::from(width),
                &JsValue::from(height),
                &JsValue::from_f64(elapsed_seconds),
            )
            .map(|_| ())
            .map_err(js_error)
    }
}

/// `window.requestAnimationFrame` bound to a callback slot filled once the
/// loop exists.
#[derive(Clone)]
pub struct AnimationFrameScheduler {
    window: Window,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl RepaintScheduler for AnimationFrameScheduler {
    fn request_next(&mut self) -> Result<(), ScheduleError> {
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            return Err(ScheduleError::new("frame callback not installed"));
        };
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(|_| ())
            .map_err(|err| ScheduleError::new(js_error(err).message()))
    }
}

impl AnimationFrameScheduler {
    /// Drops the installed callback, breaking the callback -> scheduler ->
    /// callback cycle. Safe from inside the callback: wasm-bindgen defers the
    /// destructor until the running invocation returns.
    fn release(&self) {
        let retired = self.callback.borrow_mut().take();
        drop(retired);
    }
}

/// Clock fed with the vsync-aligned timestamp `requestAnimationFrame` hands
/// its callback. Before the first callback it reads `performance.now()`
/// (or `Date.now()` where the page has no Performance). Readings never go
/// below an earlier reading, because a frame timestamp may predate the
/// `performance.now()` taken when the loop started.
pub struct AnimationFrameClock {
    performance: Option<Performance>,
    frame_time: Rc<Cell<Option<f64>>>,
    floor: Cell<f64>,
}

impl AnimationFrameClock {
    pub fn new(performance: Option<Performance>) -> Self {
        Self {
            performance,
            frame_time: Rc::new(Cell::new(None)),
            floor: Cell::new(f64::NEG_INFINITY),
        }
    }

    /// Slot the repaint callback writes its timestamp into.
    pub fn frame_time(&self) -> Rc<Cell<Option<f64>>> {
        self.frame_time.clone()
    }

    fn page_now(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}

impl Clock for AnimationFrameClock {
    fn now_ms(&self) -> f64 {
        let raw = self.frame_time.get().unwrap_or_else(|| self.page_now());
        let now = raw.max(self.floor.get());
        self.floor.set(now);
        now
    }
}

pub struct AlertNotifier {
    window: Window,
}

impl Notifier for AlertNotifier {
    fn notify(&mut self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            log::error!("[notice] alert failed: {}", js_error(err));
        }
    }
}

#[wasm_bindgen]
pub struct FrameLoopHandle {
    stop: StopHandle,
    throttle_interval_ms: f64,
}

#[wasm_bindgen]
impl FrameLoopHandle {
    pub fn stop(&self) {
        self.stop.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    #[wasm_bindgen(getter, js_name = throttleIntervalMs)]
    pub fn throttle_interval_ms(&self) -> f64 {
        self.throttle_interval_ms
    }
}

/// Starts a render loop on the canvas `canvas_id`, driving an engine built
/// with `new engine_ctor(canvas_id)`. `target_fps` is rounded to a whole
/// number; NaN, infinities and values below 1 are rejected. Startup failures
/// have already been alerted when the error is returned.
#[wasm_bindgen]
pub fn start(
    canvas_id: &str,
    engine_ctor: &Function,
    target_fps: Option<f64>,
) -> Result<FrameLoopHandle, JsValue> {
    HOOKS.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    });

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let mut config = FrameLoopConfig::default().with_canvas_id(canvas_id);
    if let Some(raw) = target_fps {
        let fps = config::fps_from_number(raw)
            .ok_or_else(|| JsValue::from_str(&format!("invalid target fps: {raw}")))?;
        config = config.with_target_fps(fps);
    }

    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let current: Rc<RefCell<Option<WebFrameLoop>>> = Rc::new(RefCell::new(None));
    let mut repaint = AnimationFrameScheduler {
        window: window.clone(),
        callback: slot.clone(),
    };
    let clock = AnimationFrameClock::new(window.performance());
    let frame_time = clock.frame_time();

    // The slot is filled before the first request; after that it is only
    // borrowed immutably until the loop stops or startup fails.
    let mut callback_repaint = repaint.clone();
    let callback_loop = current.clone();
    *slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        frame_time.set(Some(timestamp));
        if runtime::pump_frame(&callback_loop, &mut callback_repaint) == LoopControl::Stop {
            callback_repaint.release();
        }
    }));

    let mut provider = CanvasProvider::new(window.clone());
    let engine_id = canvas_id.to_string();
    let booted = runtime::boot(
        &config,
        &mut provider,
        |_surface: &CanvasSurface| JsEngine::construct(engine_ctor, &engine_id),
        clock,
        &mut repaint,
        &mut AlertNotifier {
            window: window.clone(),
        },
    );

    match booted {
        Ok(frame_loop) => {
            let handle = FrameLoopHandle {
                stop: frame_loop.stop_handle(),
                throttle_interval_ms: frame_loop.scheduler().throttle_interval_ms(),
            };
            *current.borrow_mut() = Some(frame_loop);
            Ok(handle)
        }
        Err(err) => {
            repaint.release();
            Err(JsValue::from_str(&err.to_string()))
        }
    }
}

fn js_error(value: JsValue) -> EngineError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    EngineError::new(message)
}
