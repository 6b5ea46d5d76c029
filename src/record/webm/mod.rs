// WebM video output through GStreamer
//
// Frames are pushed into an appsrc and encoded with VP8 (or VP9) into a WebM
// container. Only built on Linux; other platforms report the encoder as
// unavailable.

#[cfg(target_os = "linux")]
mod encoding;
#[cfg(target_os = "linux")]
mod pipeline;

#[cfg(target_os = "linux")]
pub use encoding::{detect_available_encoder, VP_ENCODERS};
#[cfg(target_os = "linux")]
pub use pipeline::WebmSink;

use std::path::Path;

use super::{EncoderError, FrameSink, VideoEncoder};

/// Default video encoder writing `.webm` files
#[derive(Debug, Default, Clone)]
pub struct WebmVideoEncoder;

impl WebmVideoEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl VideoEncoder for WebmVideoEncoder {
    fn name(&self) -> &str {
        "webm"
    }

    #[cfg(target_os = "linux")]
    fn open(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Box<dyn FrameSink>, EncoderError> {
        Ok(Box::new(WebmSink::new(path, width, height, fps)?))
    }

    #[cfg(not(target_os = "linux"))]
    fn open(
        &self,
        _path: &Path,
        _width: u32,
        _height: u32,
        _fps: u32,
    ) -> Result<Box<dyn FrameSink>, EncoderError> {
        Err(EncoderError::Unavailable(
            "WebM recording is only available on Linux".to_string(),
        ))
    }
}
