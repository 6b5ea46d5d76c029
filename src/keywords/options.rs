use serde::{Deserialize, Serialize};

use crate::capture::MonitorIndex;
use crate::media::{ScreenshotFormat, TimeSpec};

/// Arguments shared by the screenshot keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotOptions {
    /// Basename, or a file name with an image extension used verbatim
    pub name: String,
    /// Falls back to the configured format
    pub format: Option<ScreenshotFormat>,
    /// Falls back to the configured quality
    pub quality: Option<u8>,
    /// Embed width; falls back to the configured width
    pub width: Option<String>,
    /// Wait before capturing; falls back to the configured delay
    pub delay: Option<TimeSpec>,
    pub monitor: MonitorIndex,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            name: "screenshot".to_string(),
            format: None,
            quality: None,
            width: None,
            delay: None,
            monitor: MonitorIndex::ALL,
        }
    }
}

impl ScreenshotOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Arguments of the GIF keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GifOptions {
    pub name: String,
    /// Frame scale relative to the screen, in (0, 1]
    pub size_percentage: f64,
    pub embed: bool,
    pub embed_width: Option<String>,
    pub monitor: MonitorIndex,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            name: "screenshot".to_string(),
            size_percentage: 0.5,
            embed: true,
            embed_width: None,
            monitor: MonitorIndex::ALL,
        }
    }
}

/// Arguments of `start_video_recording`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    /// Handle for stop/pause/resume; defaults to `name`
    pub alias: Option<String>,
    pub name: String,
    /// Overrides the configured or calibrated fps
    pub fps: Option<u8>,
    pub size_percentage: f64,
    pub embed: bool,
    pub embed_width: Option<String>,
    pub monitor: MonitorIndex,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            alias: None,
            name: "recording".to_string(),
            fps: None,
            size_percentage: 1.0,
            embed: true,
            embed_width: None,
            monitor: MonitorIndex::PRIMARY,
        }
    }
}

impl VideoOptions {
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
