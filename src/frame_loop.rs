use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{Clock, RenderEngine, RepaintScheduler, Surface};
use crate::error::{EngineError, FrameRenderError, InitError};
use crate::scheduler::FrameScheduler;

/// Timing state of a running loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopState {
    init_time: f64,
    last_draw_time: Option<f64>,
}

impl LoopState {
    fn new(init_time: f64) -> Self {
        Self {
            init_time,
            last_draw_time: None,
        }
    }

    pub fn init_time(&self) -> f64 {
        self.init_time
    }

    /// `None` until the first frame has been accepted.
    pub fn last_draw_time(&self) -> Option<f64> {
        self.last_draw_time
    }

    fn elapsed_seconds(&self, now_ms: f64) -> f64 {
        (now_ms - self.init_time) / 1000.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub accepted: u64,
    pub throttled: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Cancels a loop from outside the frame callback. Checked before the next
/// frame is requested, so a stopped loop never schedules again.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub struct FrameLoop<S, E, C> {
    scheduler: FrameScheduler,
    state: LoopState,
    surface: S,
    engine: E,
    clock: C,
    stop: StopHandle,
    stats: LoopStats,
}

impl<S, E, C> FrameLoop<S, E, C>
where
    S: Surface,
    E: RenderEngine,
    C: Clock,
{
    /// Runs the startup sequence: an absent surface stops here without
    /// touching `build_engine`; otherwise the engine is built exactly once
    /// and the first frame is requested.
    pub fn init<F, R>(
        surface: Option<S>,
        target: &str,
        build_engine: F,
        scheduler: FrameScheduler,
        clock: C,
        repaint: &mut R,
    ) -> Result<Self, InitError>
    where
        F: FnOnce(&S) -> Result<E, EngineError>,
        R: RepaintScheduler,
    {
        let surface = surface.ok_or_else(|| InitError::EngineUnavailable {
            target: target.to_string(),
        })?;
        let engine = build_engine(&surface)
            .map_err(|source| InitError::EngineConstructionFailed { source })?;
        Self::start(scheduler, surface, engine, clock, repaint)
    }

    pub fn start<R: RepaintScheduler>(
        scheduler: FrameScheduler,
        surface: S,
        engine: E,
        clock: C,
        repaint: &mut R,
    ) -> Result<Self, InitError> {
        let state = LoopState::new(clock.now_ms());
        repaint
            .request_next()
            .map_err(|source| InitError::SchedulingFailed { source })?;
        log::debug!(
            "[frameloop] started init_time={:.3} throttle_interval_ms={:.3}",
            state.init_time,
            scheduler.throttle_interval_ms()
        );
        Ok(Self {
            scheduler,
            state,
            surface,
            engine,
            clock,
            stop: StopHandle::default(),
            stats: LoopStats::default(),
        })
    }

    /// Body of one repaint callback.
    ///
    /// The next callback is requested before anything else, so a failing
    /// render never ends the loop. Render errors are logged and the loop
    /// keeps going; only a stop request or a rejected repaint request
    /// returns [`LoopControl::Stop`].
    pub fn on_frame<R: RepaintScheduler>(&mut self, repaint: &mut R) -> LoopControl {
        if self.stop.is_stopped() {
            log::debug!("[frameloop] stop requested, not rescheduling");
            return LoopControl::Stop;
        }
        if let Err(err) = repaint.request_next() {
            log::error!("[frameloop] {err}; render loop halted");
            return LoopControl::Stop;
        }

        let now = self.clock.now_ms();
        if !self.scheduler.should_draw(now, self.state.last_draw_time) {
            self.stats.throttled += 1;
            return LoopControl::Continue;
        }

        self.state.last_draw_time = Some(now);
        let elapsed = self.state.elapsed_seconds(now);
        let (width, height) = self.surface.dimensions();
        self.stats.accepted += 1;

        if let Err(source) = self.engine.render(width, height, elapsed) {
            self.stats.failed += 1;
            let err = FrameRenderError {
                frame: self.stats.accepted,
                source,
            };
            log::error!("[frameloop] {err}");
        }
        LoopControl::Continue
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn scheduler(&self) -> FrameScheduler {
        self.scheduler
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
