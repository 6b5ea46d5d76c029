use crate::capture::{CaptureBackendError, MonitorInfo};
use gstreamer::prelude::*;
use image::RgbaImage;
use tracing::{debug, error, info};

/// How long a pull waits for ximagesrc to deliver a frame
const PULL_TIMEOUT_SECS: u64 = 5;

/// Live `ximagesrc ! appsink` pipeline
pub struct GrabPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,
}

impl GrabPipeline {
    /// Build the launch description.
    ///
    /// Without bounds the whole root window is grabbed. ximagesrc end
    /// coordinates are inclusive.
    pub fn describe(bounds: Option<&MonitorInfo>, show_pointer: bool) -> String {
        let region = bounds
            .map(|b| {
                format!(
                    " startx={} starty={} endx={} endy={}",
                    b.x.max(0),
                    b.y.max(0),
                    b.right().max(1) - 1,
                    b.bottom().max(1) - 1
                )
            })
            .unwrap_or_default();

        format!(
            "ximagesrc use-damage=false show-pointer={show_pointer}{region} ! \
             videoconvert ! \
             video/x-raw,format=RGBA ! \
             appsink name=sink max-buffers=1 drop=true sync=false",
            show_pointer = show_pointer,
            region = region
        )
    }

    pub fn new(bounds: Option<&MonitorInfo>, show_pointer: bool) -> Result<Self, CaptureBackendError> {
        // Initialize GStreamer (safe to call multiple times)
        gstreamer::init().map_err(|e| {
            CaptureBackendError::Pipeline(format!("Failed to initialize GStreamer: {}", e))
        })?;

        let description = Self::describe(bounds, show_pointer);
        debug!("Creating grab pipeline: {}", description);

        let pipeline = gstreamer::parse::launch(&description).map_err(|e| {
            CaptureBackendError::Pipeline(format!("Failed to create pipeline: {}", e))
        })?;

        let pipeline = pipeline.downcast::<gstreamer::Pipeline>().map_err(|_| {
            CaptureBackendError::Pipeline("Failed to downcast to Pipeline".to_string())
        })?;

        let appsink = pipeline
            .by_name("sink")
            .and_then(|element| element.downcast::<gstreamer_app::AppSink>().ok())
            .ok_or_else(|| CaptureBackendError::Pipeline("Pipeline has no appsink".to_string()))?;

        let grab = Self { pipeline, appsink };
        grab.start()?;
        Ok(grab)
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

    fn start(&self) -> Result<(), CaptureBackendError> {
        info!("Starting ximagesrc grab pipeline");

        self.pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| {
                self.drain_bus_errors();
                CaptureBackendError::Pipeline(format!("Failed to start pipeline: {}", e))
            })?;
        Ok(())
    }

    /// Newest frame delivered by ximagesrc
    pub fn pull(&self) -> Result<RgbaImage, CaptureBackendError> {
        let sample = self
            .appsink
            .try_pull_sample(gstreamer::ClockTime::from_seconds(PULL_TIMEOUT_SECS))
            .ok_or_else(|| {
                self.drain_bus_errors();
                CaptureBackendError::GrabFailed("Timed out waiting for a frame from ximagesrc".to_string())
            })?;

        let caps = sample
            .caps()
            .ok_or_else(|| CaptureBackendError::GrabFailed("Sample has no caps".to_string()))?;
        let info = gstreamer_video::VideoInfo::from_caps(caps).map_err(|e| {
            CaptureBackendError::GrabFailed(format!("Unexpected frame caps: {}", e))
        })?;
        let buffer = sample
            .buffer()
            .ok_or_else(|| CaptureBackendError::GrabFailed("Sample has no buffer".to_string()))?;
        let map = buffer.map_readable().map_err(|e| {
            CaptureBackendError::GrabFailed(format!("Failed to map frame buffer: {}", e))
        })?;

        let stride = info.stride().first().copied().unwrap_or(0).max(0) as usize;
        pack_rows(map.as_slice(), info.width(), info.height(), stride)
    }
}

impl Drop for GrabPipeline {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

impl std::fmt::Debug for GrabPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrabPipeline")
            .field("pipeline", &self.pipeline.name())
            .finish()
    }
}

/// Copy padded RGBA rows into a tightly packed image
pub(super) fn pack_rows(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<RgbaImage, CaptureBackendError> {
    if width == 0 || height == 0 {
        return Err(CaptureBackendError::GrabFailed("Empty frame".to_string()));
    }
    let row_bytes = width as usize * 4;
    let stride = if stride == 0 { row_bytes } else { stride };
    if stride < row_bytes || data.len() < stride * (height as usize - 1) + row_bytes {
        return Err(CaptureBackendError::GrabFailed(format!(
            "Frame buffer too small for {}x{} (stride {}, {} bytes)",
            width,
            height,
            stride,
            data.len()
        )));
    }

    let mut packed = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        packed.extend_from_slice(&row[..row_bytes]);
    }
    RgbaImage::from_raw(width, height, packed)
        .ok_or_else(|| CaptureBackendError::Internal("Frame size mismatch".to_string()))
}
