// Capture backend abstraction
//
// This module defines the contract for capture backends and provides
// the xcap and X11 implementations.

pub mod monitor;
pub mod xcap_backend;

#[cfg(target_os = "linux")]
pub mod x11;

#[cfg(test)]
pub mod fake;

pub use monitor::{MonitorIndex, MonitorInfo};

use crate::config::BackendKind;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Errors that can occur during capture operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum CaptureBackendError {
    /// No display could be enumerated
    #[error("No monitor found: {0}")]
    NoMonitor(String),
    /// Requested monitor index does not exist
    #[error("Monitor not available. Requested monitor {index}, {available} connected.")]
    MonitorUnavailable { index: u32, available: usize },
    /// The grabber returned no image
    #[error("Taking screenshot failed: {0}")]
    GrabFailed(String),
    /// Backend not available on this platform
    #[error("Not supported: {0}")]
    NotSupported(String),
    /// GStreamer pipeline failure
    #[error("Pipeline error: {0}")]
    Pipeline(String),
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Options applied when a frame source is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Ask the grabber to include the pointer when it can do so natively
    pub show_cursor: bool,
}

/// Trait for capture backends
///
/// A backend enumerates monitors and opens frame sources on them.
pub trait CaptureBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Physical monitors in enumeration order (index 1..N)
    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureBackendError>;

    /// Open a source that can be grabbed repeatedly
    fn open(
        &self,
        monitor: MonitorIndex,
        options: SourceOptions,
    ) -> Result<Box<dyn FrameSource>, CaptureBackendError>;

    /// Grab a single frame
    fn grab(&self, monitor: MonitorIndex) -> Result<RgbaImage, CaptureBackendError> {
        self.open(monitor, SourceOptions::default())?.grab()
    }
}

/// An opened capture target
pub trait FrameSource: Send {
    /// Size of the frames this source produces
    fn size(&self) -> (u32, u32);

    fn grab(&mut self) -> Result<RgbaImage, CaptureBackendError>;

    /// Pointer position relative to the source origin, when the backend knows it
    fn cursor_position(&self) -> Option<(i32, i32)> {
        None
    }

    /// True when grabbed frames already contain the pointer
    fn paints_cursor(&self) -> bool {
        false
    }
}

/// Get the backend for the configured kind
pub fn backend_for(kind: BackendKind) -> Arc<dyn CaptureBackend> {
    match kind {
        BackendKind::Xcap => Arc::new(xcap_backend::XcapBackend::new()),
        #[cfg(target_os = "linux")]
        BackendKind::X11 => Arc::new(x11::X11Backend::new()),
        #[cfg(not(target_os = "linux"))]
        BackendKind::X11 => Arc::new(StubBackend),
    }
}

/// Stub backend for unsupported platforms
#[cfg(not(target_os = "linux"))]
#[derive(Debug, Default)]
pub struct StubBackend;

#[cfg(not(target_os = "linux"))]
impl CaptureBackend for StubBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::X11
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureBackendError> {
        Err(CaptureBackendError::NotSupported(
            "X11 capture is only available on Linux".to_string(),
        ))
    }

    fn open(
        &self,
        _monitor: MonitorIndex,
        _options: SourceOptions,
    ) -> Result<Box<dyn FrameSource>, CaptureBackendError> {
        Err(CaptureBackendError::NotSupported(
            "X11 capture is only available on Linux".to_string(),
        ))
    }
}
