use thiserror::Error;

/// Failure reported by an external collaborator (engine or host primitive).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("repaint request rejected: {message}")]
pub struct ScheduleError {
    message: String,
}

impl ScheduleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Startup failures. None of these ever leave a loop running.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to acquire a drawable surface for `{target}`")]
    EngineUnavailable { target: String },
    #[error("failed to construct the rendering engine: {source}")]
    EngineConstructionFailed {
        #[source]
        source: EngineError,
    },
    #[error("failed to schedule the first frame: {source}")]
    SchedulingFailed {
        #[source]
        source: ScheduleError,
    },
}

impl InitError {
    /// Text shown on the user-facing notice channel.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::EngineUnavailable { .. } => "Failed to initialize WebGL",
            Self::EngineConstructionFailed { .. } => "Failed to start the rendering engine",
            Self::SchedulingFailed { .. } => "Failed to start the render loop",
        }
    }
}

#[derive(Debug, Error)]
#[error("frame {frame} failed to render: {source}")]
pub struct FrameRenderError {
    pub frame: u64,
    #[source]
    pub source: EngineError,
}
