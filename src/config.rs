#[derive(Debug, Clone, PartialEq)]
pub struct FrameLoopConfig {
    pub target_fps: u32,
    pub canvas_id: String,
    pub antialias: bool,
    pub max_frames: Option<u64>,
    pub refresh_hz: u32,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl FrameLoopConfig {
    pub const DEFAULT_TARGET_FPS: u32 = 30;
    pub const DEFAULT_CANVAS_ID: &'static str = "hello-webgl";
    pub const DEFAULT_REFRESH_HZ: u32 = 60;

    /// Builds a config from `FRAMELOOP_*` variables resolved through `lookup`.
    /// Unparseable or zero values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let target_fps = lookup("FRAMELOOP_TARGET_FPS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(Self::DEFAULT_TARGET_FPS);
        let canvas_id = lookup("FRAMELOOP_CANVAS_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_CANVAS_ID.to_string());
        let antialias = lookup("FRAMELOOP_ANTIALIAS")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(true);
        let max_frames = lookup("FRAMELOOP_MAX_FRAMES")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0);
        let refresh_hz = lookup("FRAMELOOP_REFRESH_HZ")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(Self::DEFAULT_REFRESH_HZ);
        Self {
            target_fps,
            canvas_id,
            antialias,
            max_frames,
            refresh_hz,
        }
    }

    pub fn with_target_fps(mut self, target_fps: u32) -> Self {
        self.target_fps = target_fps;
        self
    }

    pub fn with_canvas_id(mut self, canvas_id: impl Into<String>) -> Self {
        self.canvas_id = canvas_id.into();
        self
    }
}

/// Validates a frame rate handed over as a JS number. Rounds to the nearest
/// whole fps; NaN, infinities and anything below 1 are rejected.
pub fn fps_from_number(raw: f64) -> Option<u32> {
    if !raw.is_finite() {
        return None;
    }
    let rounded = raw.round();
    if rounded < 1.0 {
        return None;
    }
    Some(rounded.min(f64::from(u32::MAX)) as u32)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
