//! Rendering - software frames for observations, options for the viewer

mod frame;

pub use frame::{FrameRenderer, agent_color, save_png, tile_color};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for interactive rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Open a window (false = render off-screen only)
    pub show_display: bool,
    /// Frame rate cap (0 = unlimited)
    pub max_fps: u32,
    /// Arrow keys drive the first player agent
    pub enable_key_events: bool,
}

impl RendererOptions {
    pub fn new(show_display: bool, max_fps: u32, enable_key_events: bool) -> Self {
        Self {
            show_display,
            max_fps,
            enable_key_events,
        }
    }

    /// Minimum time between frames, None when uncapped
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.max_fps == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.max_fps as f64))
        }
    }
}
