//! Throttled render loop that drives an external rendering engine on a
//! host-provided drawing surface.
//!
//! The loop itself ([`FrameLoop`]) only talks to the host through the traits
//! in [`backend`]. A headless backend is always available; the `web` feature
//! adds a wasm32 backend built on `requestAnimationFrame` and an HTML canvas.

pub mod backend;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod runtime;
pub mod scheduler;

pub use config::FrameLoopConfig;
pub use error::{EngineError, FrameRenderError, InitError, ScheduleError};
pub use frame_loop::{FrameLoop, LoopControl, LoopState, LoopStats, StopHandle};
pub use scheduler::FrameScheduler;
