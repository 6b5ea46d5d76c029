// Background recording
//
// A recording owns a frame source and a frame sink and moves frames from one
// to the other on a dedicated worker thread until it is stopped.

pub mod calibrate;
pub mod gif;
pub mod webm;
mod worker;

pub use calibrate::{calibrate_fps, fps_for, CALIBRATION_WINDOW, MAX_FPS};
pub use gif::GifSink;
pub use webm::WebmVideoEncoder;
pub use worker::{next_frame, Recording, RecordingSettings};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors raised while encoding recorded frames
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// No usable encoder on this machine
    #[error("Encoder not available: {0}")]
    Unavailable(String),
    #[error("Encoder pipeline error: {0}")]
    Pipeline(String),
    #[error("Frame is {actual:?} but the encoder was opened for {expected:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a finished recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingResult {
    /// Output file path
    pub path: PathBuf,
    /// Number of frames written
    pub frames: u64,
    /// Playback duration in milliseconds
    pub duration_ms: u64,
    pub width: u32,
    pub height: u32,
}

/// Destination of recorded frames
pub trait FrameSink: Send {
    fn path(&self) -> &Path;

    /// Frame size the sink was opened with
    fn size(&self) -> (u32, u32);

    fn push(&mut self, frame: &RgbaImage) -> Result<(), EncoderError>;

    /// Flush and close the output file
    fn finish(self: Box<Self>) -> Result<RecordingResult, EncoderError>;
}

/// Factory for video sinks
pub trait VideoEncoder: Send + Sync {
    fn name(&self) -> &str;

    fn open(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Box<dyn FrameSink>, EncoderError>;
}

/// Encoder used when none is injected
pub fn default_encoder() -> Arc<dyn VideoEncoder> {
    Arc::new(WebmVideoEncoder::new())
}

pub(crate) fn check_frame_size(
    expected: (u32, u32),
    frame: &RgbaImage,
) -> Result<(), EncoderError> {
    let actual = frame.dimensions();
    if actual != expected {
        return Err(EncoderError::FrameSize { expected, actual });
    }
    Ok(())
}
