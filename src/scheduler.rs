/// Slack for float rounding in timestamp differences.
const BOUNDARY_EPSILON_MS: f64 = 1e-6;

/// Upper-bound frame-rate policy: two accepted frames are never closer
/// together than `throttle_interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScheduler {
    throttle_interval_ms: f64,
}

impl FrameScheduler {
    pub fn new(target_fps: u32) -> Self {
        let safe_fps = target_fps.max(1);
        let throttle_interval_ms = 1000.0 / f64::from(safe_fps);
        Self {
            throttle_interval_ms,
        }
    }

    pub fn throttle_interval_ms(&self) -> f64 {
        self.throttle_interval_ms
    }

    /// `last_draw_ms` is `None` until the first frame has been drawn, which
    /// always passes.
    pub fn should_draw(&self, now_ms: f64, last_draw_ms: Option<f64>) -> bool {
        match last_draw_ms {
            None => true,
            Some(last) => now_ms - last + BOUNDARY_EPSILON_MS >= self.throttle_interval_ms,
        }
    }
}
