use gstreamer::prelude::*;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::detect_available_encoder;
use crate::record::{check_frame_size, EncoderError, FrameSink, RecordingResult};

/// How long `finish` waits for the muxer to drain
const EOS_TIMEOUT_SECS: u64 = 5;

/// `appsrc ! videoconvert ! vp8enc ! webmmux ! filesink`
pub struct WebmSink {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    output_path: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    frames: u64,
}

impl WebmSink {
    pub(super) fn describe(encoder: &str, width: u32, height: u32, fps: u32) -> String {
        format!(
            "appsrc name=src format=time \
             caps=\"video/x-raw,format=RGBA,width={width},height={height},framerate={fps}/1\" ! \
             videoconvert ! \
             {encoder} deadline=1 ! \
             webmmux ! \
             filesink name=out",
            width = width,
            height = height,
            fps = fps,
            encoder = encoder
        )
    }

    pub fn new(path: &Path, width: u32, height: u32, fps: u32) -> Result<Self, EncoderError> {
        gstreamer::init().map_err(|e| {
            EncoderError::Pipeline(format!("Failed to initialize GStreamer: {}", e))
        })?;

        let encoder = detect_available_encoder()
            .ok_or_else(|| EncoderError::Unavailable("No VP8/VP9 encoder available".to_string()))?;

        let fps = fps.max(1);
        let pipeline_str = Self::describe(encoder, width, height, fps);
        debug!("Creating WebM pipeline: {}", pipeline_str);

        let pipeline = gstreamer::parse::launch(&pipeline_str).map_err(|e| {
            EncoderError::Pipeline(format!("Failed to create pipeline: {}", e))
        })?;

        let pipeline = pipeline.downcast::<gstreamer::Pipeline>().map_err(|_| {
            EncoderError::Pipeline("Failed to downcast to Pipeline".to_string())
        })?;

        let appsrc = pipeline
            .by_name("src")
            .and_then(|element| element.downcast::<gstreamer_app::AppSrc>().ok())
            .ok_or_else(|| EncoderError::Pipeline("Pipeline has no appsrc".to_string()))?;

        let filesink = pipeline
            .by_name("out")
            .ok_or_else(|| EncoderError::Pipeline("Pipeline has no filesink".to_string()))?;
        filesink.set_property("location", path.to_string_lossy().to_string());

        let sink = Self {
            pipeline,
            appsrc,
            output_path: path.to_path_buf(),
            width,
            height,
            fps,
            frames: 0,
        };
        sink.start()?;
        Ok(sink)
    }

    fn drain_bus_errors(&self) {
        if let Some(bus) = self.pipeline.bus() {
            while let Some(msg) = bus.pop() {
                if let gstreamer::MessageView::Error(err) = msg.view() {
                    error!("GStreamer error: {} ({:?})", err.error(), err.debug());
                }
            }
        }
    }

    fn start(&self) -> Result<(), EncoderError> {
        info!("Starting WebM pipeline to {:?}", self.output_path);

        self.pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| {
                self.drain_bus_errors();
                EncoderError::Pipeline(format!("Failed to start pipeline: {}", e))
            })?;
        Ok(())
    }

    fn frame_time(&self, n: u64) -> gstreamer::ClockTime {
        gstreamer::ClockTime::from_nseconds(n * 1_000_000_000 / self.fps as u64)
    }

    /// Wait for EOS or error (up to 5 seconds)
    fn wait_for_eos(&self) -> Result<(), EncoderError> {
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| EncoderError::Pipeline("Failed to get pipeline bus".to_string()))?;

        loop {
            match bus.timed_pop(gstreamer::ClockTime::from_seconds(EOS_TIMEOUT_SECS)) {
                Some(msg) => {
                    use gstreamer::MessageView;
                    match msg.view() {
                        MessageView::Eos(..) => {
                            debug!("WebM pipeline reached EOS");
                            return Ok(());
                        }
                        MessageView::Error(err) => {
                            let debug_info = err
                                .debug()
                                .map(|d| format!(" ({:?})", d))
                                .unwrap_or_default();
                            error!("WebM pipeline error: {}{}", err.error(), debug_info);
                            return Err(EncoderError::Pipeline(format!(
                                "Pipeline error: {}{}",
                                err.error(),
                                debug_info
                            )));
                        }
                        _ => {}
                    }
                }
                None => {
                    warn!("Timed out waiting for EOS");
                    return Ok(()); // Proceed anyway, file may still be valid
                }
            }
        }
    }
}

impl FrameSink for WebmSink {
    fn path(&self) -> &Path {
        &self.output_path
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn push(&mut self, frame: &RgbaImage) -> Result<(), EncoderError> {
        check_frame_size((self.width, self.height), frame)?;

        let mut buffer = gstreamer::Buffer::from_mut_slice(frame.as_raw().clone());
        {
            let buffer = buffer.make_mut();
            buffer.set_pts(self.frame_time(self.frames));
            buffer.set_duration(self.frame_time(1));
        }

        self.appsrc.push_buffer(buffer).map_err(|e| {
            self.drain_bus_errors();
            EncoderError::Pipeline(format!("Failed to push frame: {:?}", e))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingResult, EncoderError> {
        info!("Finalizing WebM recording {:?}", self.output_path);

        // Send EOS to trigger proper file finalization
        if let Err(e) = self.appsrc.end_of_stream() {
            warn!("appsrc refused EOS: {:?}", e);
        }
        let result = self.wait_for_eos();

        let _ = self.pipeline.set_state(gstreamer::State::Null);
        result?;

        if !self.output_path.exists() {
            return Err(EncoderError::Pipeline(
                "Recording file was not created".to_string(),
            ));
        }

        Ok(RecordingResult {
            path: self.output_path.clone(),
            frames: self.frames,
            duration_ms: self.frames * 1000 / self.fps as u64,
            width: self.width,
            height: self.height,
        })
    }
}

impl Drop for WebmSink {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

impl std::fmt::Debug for WebmSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebmSink")
            .field("output_path", &self.output_path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fps", &self.fps)
            .field("frames", &self.frames)
            .finish()
    }
}
