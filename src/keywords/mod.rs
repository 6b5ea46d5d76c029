// The keyword library
//
// `ScreenCap` is what a test suite talks to: it resolves output paths, drives
// the capture backend and the recorders, and reports what it saved.

mod gif;
mod options;
mod screenshot;
mod video;

pub use options::{GifOptions, ScreenshotOptions, VideoOptions};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::capture::{backend_for, CaptureBackend, MonitorInfo};
use crate::config::ScreenCapConfig;
use crate::error::{Result, ScreenCapError};
use crate::media::paths::{normalize, screenshot_path, validate_save_path};
use crate::media::TimeSpec;
use crate::record::{default_encoder, Recording, VideoEncoder, CALIBRATION_WINDOW};
use crate::report::{link_path, ReportEvent, ReportSink, TracingReport};

struct ActiveGif {
    recording: Recording,
    embed: bool,
    embed_width: String,
}

struct ActiveVideo {
    alias: String,
    recording: Recording,
    embed: bool,
    embed_width: String,
}

/// Screen capture keywords bound to one configuration
pub struct ScreenCap {
    config: ScreenCapConfig,
    backend: Arc<dyn CaptureBackend>,
    encoder: Arc<dyn VideoEncoder>,
    report: Arc<dyn ReportSink>,
    calibration_window: Duration,
    calibrated_fps: Option<u32>,
    gif: Option<ActiveGif>,
    /// Active video recordings in start order
    videos: Vec<ActiveVideo>,
}

impl ScreenCap {
    /// Library with the configured backend, WebM output and tracing report
    pub fn new(config: ScreenCapConfig) -> Result<Self> {
        let backend = backend_for(config.backend);
        Self::with_parts(config, backend, default_encoder(), Arc::new(TracingReport))
    }

    pub fn with_parts(
        config: ScreenCapConfig,
        backend: Arc<dyn CaptureBackend>,
        encoder: Arc<dyn VideoEncoder>,
        report: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "Screen capture ready: backend={}, encoder={}, directory={:?}",
            backend.kind(),
            encoder.name(),
            config.effective_screenshot_directory()
        );

        Ok(Self {
            config,
            backend,
            encoder,
            report,
            calibration_window: CALIBRATION_WINDOW,
            calibrated_fps: None,
            gif: None,
            videos: Vec::new(),
        })
    }

    /// How long fps auto-calibration measures
    pub fn with_calibration_window(mut self, window: Duration) -> Self {
        self.calibration_window = window;
        self
    }

    pub fn config(&self) -> &ScreenCapConfig {
        &self.config
    }

    /// Directory captures are written to
    pub fn screenshot_directory(&self) -> &Path {
        self.config.effective_screenshot_directory()
    }

    /// Change the capture directory and return the previous one
    pub fn set_screenshot_directory(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = normalize(path);
        if !path.is_dir() {
            return Err(ScreenCapError::DirectoryNotFound(path));
        }
        let old = self.screenshot_directory().to_path_buf();
        self.config.screenshot_directory = Some(path);
        Ok(old)
    }

    /// Physical monitors, numbered from 1
    pub fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        Ok(self.backend.monitors()?)
    }

    /// Resolve and check the output path for `basename`
    fn save_path(&self, basename: &str, extension: &str) -> Result<PathBuf> {
        let path = screenshot_path(basename, extension, self.screenshot_directory());
        validate_save_path(&path)
    }

    fn embed_width(&self, width: Option<&str>) -> String {
        width.unwrap_or(&self.config.embed_width).to_string()
    }

    fn link(&self, path: &Path) -> String {
        link_path(path, &self.config.log_directory)
    }

    fn embed_screenshot(&self, path: &Path, width: &str) {
        self.report.record(&ReportEvent::ScreenshotEmbedded {
            path: path.to_path_buf(),
            link: self.link(path),
            width: width.to_string(),
        });
    }

    fn link_screenshot(&self, path: &Path) {
        self.report.record(&ReportEvent::ScreenshotLinked {
            path: path.to_path_buf(),
            link: self.link(path),
        });
    }

    fn embed_video(&self, path: &Path, width: &str) {
        self.report.record(&ReportEvent::VideoEmbedded {
            path: path.to_path_buf(),
            link: self.link(path),
            width: width.to_string(),
        });
    }

    fn message(&self, text: impl Into<String>) {
        self.report.record(&ReportEvent::Message { text: text.into() });
    }
}

fn wait(time: TimeSpec) {
    if !time.is_zero() {
        std::thread::sleep(time.duration());
    }
}

impl Drop for ScreenCap {
    fn drop(&mut self) {
        if let Some(mut gif) = self.gif.take() {
            if let Err(e) = gif.recording.stop() {
                error!("Failed to stop GIF recording: {}", e);
            }
        }
        for mut video in self.videos.drain(..) {
            if let Err(e) = video.recording.stop() {
                error!("Failed to stop video recording '{}': {}", video.alias, e);
            }
        }
    }
}

impl std::fmt::Debug for ScreenCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenCap")
            .field("config", &self.config)
            .field("backend", &self.backend.kind())
            .field("encoder", &self.encoder.name())
            .field("gif_recording", &self.gif.is_some())
            .field(
                "videos",
                &self.videos.iter().map(|v| &v.alias).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests;
