use std::cell::RefCell;
use std::thread;
use std::time::Duration;

use crate::backend::headless::{
    HeadlessProvider, HeadlessSurface, InstantClock, LogNotifier, ManualRepaint,
};
use crate::backend::{
    Clock, Notifier, RenderEngine, RepaintScheduler, Surface, SurfaceOptions, SurfaceProvider,
};
use crate::config::FrameLoopConfig;
use crate::error::{EngineError, InitError};
use crate::frame_loop::{FrameLoop, LoopControl, LoopStats};
use crate::scheduler::FrameScheduler;

const PROGRESS_EVERY: u64 = 120;

/// Acquires the surface named by `config`, builds the engine and starts the
/// loop. Any startup failure produces one notice and one diagnostic record
/// before it is returned.
pub fn boot<P, E, F, C, R, N>(
    config: &FrameLoopConfig,
    provider: &mut P,
    build_engine: F,
    clock: C,
    repaint: &mut R,
    notifier: &mut N,
) -> Result<FrameLoop<P::Surface, E, C>, InitError>
where
    P: SurfaceProvider,
    E: RenderEngine,
    F: FnOnce(&P::Surface) -> Result<E, EngineError>,
    C: Clock,
    R: RepaintScheduler,
    N: Notifier,
{
    log::info!(
        "[frameloop] bootstrap: backend={} target={} target_fps={} antialias={}",
        provider.name(),
        config.canvas_id,
        config.target_fps,
        config.antialias
    );
    let options = SurfaceOptions {
        antialias: config.antialias,
    };
    let surface = provider.acquire(&config.canvas_id, options);
    let result = FrameLoop::init(
        surface,
        &config.canvas_id,
        build_engine,
        FrameScheduler::new(config.target_fps),
        clock,
        repaint,
    );
    if let Err(err) = &result {
        log::error!("[frameloop] startup failed: {err}");
        notifier.notify(err.notice());
    }
    result
}

/// Runs one callback for a loop parked in `current`, for hosts whose repaint
/// callback outlives the call that started the loop. Once the loop stops it
/// is taken out of the cell, which releases its engine and surface. An empty
/// cell reports [`LoopControl::Stop`].
pub fn pump_frame<S, E, C, R>(
    current: &RefCell<Option<FrameLoop<S, E, C>>>,
    repaint: &mut R,
) -> LoopControl
where
    S: Surface,
    E: RenderEngine,
    C: Clock,
    R: RepaintScheduler,
{
    let control = match current.borrow_mut().as_mut() {
        Some(frame_loop) => frame_loop.on_frame(repaint),
        None => LoopControl::Stop,
    };
    if control == LoopControl::Stop {
        if let Some(frame_loop) = current.borrow_mut().take() {
            let stats = frame_loop.stats();
            log::info!(
                "[frameloop] loop released: accepted={} throttled={} failed={}",
                stats.accepted,
                stats.throttled,
                stats.failed
            );
        }
    }
    control
}

pub struct HeadlessRuntime<E> {
    config: FrameLoopConfig,
    frame_loop: FrameLoop<HeadlessSurface, E, InstantClock>,
    repaint: ManualRepaint,
}

impl<E: RenderEngine> HeadlessRuntime<E> {
    pub fn bootstrap<F>(config: FrameLoopConfig, build_engine: F) -> Result<Self, InitError>
    where
        F: FnOnce(&HeadlessSurface) -> Result<E, EngineError>,
    {
        let mut provider = HeadlessProvider::new(1280, 720);
        Self::bootstrap_with(config, &mut provider, build_engine)
    }

    pub fn bootstrap_with<F>(
        config: FrameLoopConfig,
        provider: &mut HeadlessProvider,
        build_engine: F,
    ) -> Result<Self, InitError>
    where
        F: FnOnce(&HeadlessSurface) -> Result<E, EngineError>,
    {
        let mut repaint = ManualRepaint::default();
        let frame_loop = boot(
            &config,
            provider,
            build_engine,
            InstantClock::default(),
            &mut repaint,
            &mut LogNotifier,
        )?;
        Ok(Self {
            config,
            frame_loop,
            repaint,
        })
    }

    pub fn frame_loop(&self) -> &FrameLoop<HeadlessSurface, E, InstantClock> {
        &self.frame_loop
    }

    /// Pumps callbacks at the simulated refresh rate until the loop stops.
    /// Without `max_frames` this only returns if the loop is stopped from
    /// elsewhere.
    pub fn run(&mut self) -> LoopStats {
        let refresh = Duration::from_secs_f64(1.0 / f64::from(self.config.refresh_hz.max(1)));
        log::info!(
            "[frameloop] run: refresh_hz={} throttle_interval_ms={:.3} max_frames={:?}",
            self.config.refresh_hz,
            self.frame_loop.scheduler().throttle_interval_ms(),
            self.config.max_frames
        );

        let stop = self.frame_loop.stop_handle();
        let mut reported = 0u64;
        while self.repaint.take_pending() {
            thread::sleep(refresh);
            if let Some(max) = self.config.max_frames {
                if self.frame_loop.stats().accepted >= max && !stop.is_stopped() {
                    log::info!("[frameloop] reached max_frames={max}, stopping loop");
                    stop.stop();
                }
            }
            if self.frame_loop.on_frame(&mut self.repaint) == LoopControl::Stop {
                break;
            }
            let accepted = self.frame_loop.stats().accepted;
            if accepted != reported && accepted % PROGRESS_EVERY == 0 {
                reported = accepted;
                log::info!("[frameloop] frame={accepted}");
            }
        }

        let stats = self.frame_loop.stats();
        log::info!(
            "[frameloop] loop ended: accepted={} throttled={} failed={}",
            stats.accepted,
            stats.throttled,
            stats.failed
        );
        stats
    }
}
