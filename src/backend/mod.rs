pub mod headless;
#[cfg(feature = "web")]
pub mod web;

use crate::error::{EngineError, ScheduleError};

/// A drawable region. Dimensions are queried on every accepted frame, so
/// implementations must report the current size rather than a cached one.
pub trait Surface {
    fn dimensions(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub antialias: bool,
}

pub trait SurfaceProvider {
    type Surface: Surface;

    fn name(&self) -> &'static str;
    /// Returns `None` when the target does not exist or refuses a context.
    fn acquire(&mut self, target: &str, options: SurfaceOptions) -> Option<Self::Surface>;
}

pub trait RenderEngine {
    fn render(&mut self, width: u32, height: u32, elapsed_seconds: f64)
    -> Result<(), EngineError>;
}

/// "Run the frame callback before the next repaint."
pub trait RepaintScheduler {
    fn request_next(&mut self) -> Result<(), ScheduleError>;
}

pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// User-facing channel for fatal startup failures.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}
