use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::backend::{
    Clock, Notifier, RenderEngine, RepaintScheduler, Surface, SurfaceOptions, SurfaceProvider,
};
use crate::error::{EngineError, ScheduleError};

/// In-process surface. Clones share one size, so a host can resize the
/// surface a running loop is drawing to.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: Rc<Cell<(u32, u32)>>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Surface for HeadlessSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.size.get()
    }
}

pub struct HeadlessProvider {
    width: u32,
    height: u32,
    available: bool,
}

impl HeadlessProvider {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
        }
    }

    /// Provider whose surfaces can never be acquired.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0, 0)
        }
    }
}

impl SurfaceProvider for HeadlessProvider {
    type Surface = HeadlessSurface;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn acquire(&mut self, target: &str, options: SurfaceOptions) -> Option<HeadlessSurface> {
        if !self.available {
            return None;
        }
        log::info!(
            "[backend:{}] surface target={} {}x{} antialias={}",
            self.name(),
            target,
            self.width,
            self.height,
            options.antialias
        );
        Some(HeadlessSurface::new(self.width, self.height))
    }
}

/// Repaint primitive for hosts that pump callbacks themselves: a request
/// only marks a callback as pending.
#[derive(Debug, Default)]
pub struct ManualRepaint {
    pending: bool,
    requests: u64,
}

impl ManualRepaint {
    /// Consumes the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl RepaintScheduler for ManualRepaint {
    fn request_next(&mut self) -> Result<(), ScheduleError> {
        self.pending = true;
        self.requests += 1;
        Ok(())
    }
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock advanced by hand; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        log::warn!("[notice] {message}");
    }
}

/// Engine that draws nothing and logs what it would have drawn.
#[derive(Debug, Default)]
pub struct LogEngine {
    frames: u64,
}

impl LogEngine {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderEngine for LogEngine {
    fn render(&mut self, width: u32, height: u32, elapsed_seconds: f64) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::new(format!(
                "cannot draw into a {width}x{height} surface"
            )));
        }
        self.frames += 1;
        log::trace!(
            "[engine:log] frame={} {}x{} elapsed={:.3}s",
            self.frames,
            width,
            height,
            elapsed_seconds
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_clones_share_size() {
        let surface = HeadlessSurface::new(800, 600);
        let handle = surface.clone();
        handle.resize(1024, 768);
        assert_eq!(surface.dimensions(), (1024, 768));
    }

    #[test]
    fn unavailable_provider_yields_nothing() {
        let mut provider = HeadlessProvider::unavailable();
        let options = SurfaceOptions { antialias: true };
        assert!(provider.acquire("hello-webgl", options).is_none());
    }

    #[test]
    fn manual_repaint_pending_is_consumed() {
        let mut repaint = ManualRepaint::default();
        assert!(!repaint.take_pending());
        repaint.request_next().unwrap();
        assert!(repaint.take_pending());
        assert!(!repaint.take_pending());
        assert_eq!(repaint.requests(), 1);
    }

    #[test]
    fn log_engine_rejects_empty_surface() {
        let mut engine = LogEngine::default();
        assert!(engine.render(0, 480, 0.0).is_err());
        assert!(engine.render(640, 480, 0.5).is_ok());
        assert_eq!(engine.frames(), 1);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::default();
        clock.advance(16.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 32.0);
    }
}
