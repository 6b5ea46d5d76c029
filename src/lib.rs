pub mod capture;
pub mod config;
pub mod error;
pub mod keywords;
pub mod media;
pub mod record;
pub mod report;
pub mod state;

pub use capture::{backend_for, CaptureBackend, CaptureBackendError, MonitorIndex, MonitorInfo};
pub use config::{BackendKind, ConfigError, ScreenCapConfig};
pub use error::{Result, ScreenCapError};
pub use keywords::{GifOptions, ScreenCap, ScreenshotOptions, VideoOptions};
pub use media::{Region, ScreenshotFormat, TimeSpec};
pub use record::{RecordingResult, VideoEncoder};
pub use report::{ReportEvent, ReportSink};
