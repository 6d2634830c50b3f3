use canvas_frameloop::backend::headless::{
    HeadlessProvider, HeadlessSurface, ManualClock, ManualRepaint,
};
use canvas_frameloop::backend::{Notifier, RenderEngine};
use canvas_frameloop::runtime::boot;
use canvas_frameloop::{EngineError, FrameLoop, FrameLoopConfig, InitError, LoopControl};

#[derive(Default)]
struct Frames {
    calls: Vec<(u32, u32, f64)>,
    failing: bool,
}

impl RenderEngine for Frames {
    fn render(&mut self, width: u32, height: u32, elapsed: f64) -> Result<(), EngineError> {
        self.calls.push((width, height, elapsed));
        if std::mem::take(&mut self.failing) {
            return Err(EngineError::new("context lost"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct Notices(Vec<String>);

impl Notifier for Notices {
    fn notify(&mut self, message: &str) {
        self.0.push(message.to_string());
    }
}

fn config(fps: u32) -> FrameLoopConfig {
    FrameLoopConfig::from_lookup(|_| None).with_target_fps(fps)
}

fn boot_loop(
    fps: u32,
    engine: Frames,
) -> (FrameLoop<HeadlessSurface, Frames, ManualClock>, ManualClock, ManualRepaint) {
    let clock = ManualClock::default();
    let mut repaint = ManualRepaint::default();
    let frame_loop = boot(
        &config(fps),
        &mut HeadlessProvider::new(800, 600),
        |_| Ok(engine),
        clock.clone(),
        &mut repaint,
        &mut Notices::default(),
    )
    .expect("loop should start");
    (frame_loop, clock, repaint)
}

/// Fires the pending callback the way a display refresh would.
fn refresh(
    frame_loop: &mut FrameLoop<HeadlessSurface, Frames, ManualClock>,
    repaint: &mut ManualRepaint,
) -> LoopControl {
    assert!(repaint.take_pending(), "loop did not request a callback");
    frame_loop.on_frame(repaint)
}

#[test]
fn thirty_fps_on_sixty_hz_signal_draws_three_frames_in_100ms() {
    let (mut frame_loop, clock, mut repaint) = boot_loop(30, Frames::default());
    while clock_ms(&clock) <= 100.0 {
        refresh(&mut frame_loop, &mut repaint);
        clock.advance(16.0);
    }

    let calls = &frame_loop.engine().calls;
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|&(w, h, _)| (w, h) == (800, 600)));
    assert!(calls.windows(2).all(|pair| pair[0].2 < pair[1].2));
    assert!(calls.iter().all(|&(_, _, elapsed)| elapsed >= 0.0));
}

#[test]
fn thirty_fps_on_exact_sixty_hz_timestamps_draws_every_other_refresh() {
    let (mut frame_loop, clock, mut repaint) = boot_loop(30, Frames::default());
    for tick in 0..=60u32 {
        clock.set(f64::from(tick) * (1000.0 / 60.0));
        refresh(&mut frame_loop, &mut repaint);
    }
    assert_eq!(frame_loop.stats().accepted, 31);
    assert_eq!(frame_loop.stats().throttled, 30);
}

#[test]
fn render_error_is_followed_by_more_frames() {
    let engine = Frames {
        failing: true,
        ..Frames::default()
    };
    let (mut frame_loop, clock, mut repaint) = boot_loop(60, engine);
    for _ in 0..4 {
        assert_eq!(refresh(&mut frame_loop, &mut repaint), LoopControl::Continue);
        clock.advance(20.0);
    }
    assert_eq!(frame_loop.stats().failed, 1);
    assert_eq!(frame_loop.engine().calls.len(), 4);
}

#[test]
fn resize_reaches_next_accepted_frame() {
    let (mut frame_loop, clock, mut repaint) = boot_loop(30, Frames::default());
    refresh(&mut frame_loop, &mut repaint);
    frame_loop.surface().resize(1920, 1080);
    clock.advance(10.0);
    refresh(&mut frame_loop, &mut repaint);
    clock.advance(30.0);
    refresh(&mut frame_loop, &mut repaint);

    let calls = &frame_loop.engine().calls;
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[1].0, calls[1].1), (1920, 1080));
}

#[test]
fn missing_surface_never_renders() {
    let mut notices = Notices::default();
    let mut constructed = false;
    let result = boot(
        &config(30),
        &mut HeadlessProvider::unavailable(),
        |_| {
            constructed = true;
            Ok(Frames::default())
        },
        ManualClock::default(),
        &mut ManualRepaint::default(),
        &mut notices,
    );
    assert!(matches!(result, Err(InitError::EngineUnavailable { .. })));
    assert!(!constructed);
    assert_eq!(notices.0.len(), 1);
}

#[test]
fn failed_construction_produces_exactly_one_notice() {
    let mut notices = Notices::default();
    let mut repaint = ManualRepaint::default();
    let result = boot(
        &config(30),
        &mut HeadlessProvider::new(800, 600),
        |_| Err::<Frames, _>(EngineError::new("invalid canvas")),
        ManualClock::default(),
        &mut repaint,
        &mut notices,
    );
    assert!(matches!(
        result,
        Err(InitError::EngineConstructionFailed { .. })
    ));
    assert_eq!(notices.0.len(), 1);
    assert!(!repaint.take_pending());
}

fn clock_ms(clock: &ManualClock) -> f64 {
    use canvas_frameloop::backend::Clock;
    clock.now_ms()
}
