use image::RgbaImage;
use tracing::debug;

use super::pipeline::GrabPipeline;
use crate::capture::monitor::select;
use crate::capture::xcap_backend::list_monitors;
use crate::capture::{
    CaptureBackend, CaptureBackendError, FrameSource, MonitorIndex, MonitorInfo, SourceOptions,
};
use crate::config::BackendKind;

/// X11 backend grabbing through GStreamer's ximagesrc
#[derive(Debug, Default, Clone)]
pub struct X11Backend;

impl X11Backend {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureBackend for X11Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::X11
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureBackendError> {
        list_monitors()
    }

    fn open(
        &self,
        monitor: MonitorIndex,
        options: SourceOptions,
    ) -> Result<Box<dyn FrameSource>, CaptureBackendError> {
        let monitors = list_monitors()?;
        let bounds = select(&monitors, monitor)?;

        // The root window already is the union of all monitors
        let region = if monitor.is_all() { None } else { Some(&bounds) };
        let pipeline = GrabPipeline::new(region, options.show_cursor)?;

        // The first frame tells the real size after videoconvert
        let primed = pipeline.pull()?;
        debug!(
            "Opened ximagesrc source on monitor {} ({}x{})",
            monitor,
            primed.width(),
            primed.height()
        );

        Ok(Box::new(X11Source {
            pipeline,
            size: primed.dimensions(),
            primed: Some(primed),
            show_cursor: options.show_cursor,
        }))
    }
}

#[derive(Debug)]
struct X11Source {
    pipeline: GrabPipeline,
    size: (u32, u32),
    primed: Option<RgbaImage>,
    show_cursor: bool,
}

impl FrameSource for X11Source {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn grab(&mut self) -> Result<RgbaImage, CaptureBackendError> {
        match self.primed.take() {
            Some(frame) => Ok(frame),
            None => self.pipeline.pull(),
        }
    }

    fn paints_cursor(&self) -> bool {
        self.show_cursor
    }
}
