// Cross-platform capture backend built on xcap
//
// Monitors are looked up again on every grab by id, so a source never holds
// platform monitor handles across threads.

use image::{imageops, RgbaImage};
use tracing::{debug, warn};
use xcap::Monitor;

use super::monitor::{covered, select};
use super::{
    CaptureBackend, CaptureBackendError, FrameSource, MonitorIndex, MonitorInfo, SourceOptions,
};
use crate::config::BackendKind;

#[derive(Debug, Default, Clone)]
pub struct XcapBackend;

impl XcapBackend {
    pub fn new() -> Self {
        Self
    }
}

fn monitor_info(index: u32, monitor: &Monitor) -> Result<MonitorInfo, CaptureBackendError> {
    let field = |e: xcap::XCapError| {
        CaptureBackendError::NoMonitor(format!("Failed to query monitor {}: {}", index, e))
    };
    Ok(MonitorInfo {
        index,
        id: monitor.id().map_err(field)?,
        name: monitor.name().map_err(field)?,
        x: monitor.x().map_err(field)?,
        y: monitor.y().map_err(field)?,
        width: monitor.width().map_err(field)?,
        height: monitor.height().map_err(field)?,
        is_primary: monitor.is_primary().unwrap_or(false),
    })
}

fn all_monitors() -> Result<Vec<Monitor>, CaptureBackendError> {
    Monitor::all()
        .map_err(|e| CaptureBackendError::NoMonitor(format!("Failed to get monitors: {}", e)))
}

/// Monitor geometry as seen by xcap, also used by the X11 backend
pub fn list_monitors() -> Result<Vec<MonitorInfo>, CaptureBackendError> {
    all_monitors()?
        .iter()
        .enumerate()
        .map(|(i, m)| monitor_info(i as u32 + 1, m))
        .collect()
}

impl CaptureBackend for XcapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Xcap
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
        let targets: Vec<MonitorInfo> = covered(&monitors, monitor).into_iter().cloned().collect();

        if options.show_cursor {
            warn!("xcap cannot locate the pointer; recordings will not show the cursor");
        }
        debug!(
            "Opened xcap source on monitor {} ({}x{} at {},{})",
            monitor, bounds.width, bounds.height, bounds.x, bounds.y
        );

        Ok(Box::new(XcapSource { bounds, targets }))
    }
}

/// One monitor, or the union of all of them
#[derive(Debug)]
struct XcapSource {
    bounds: MonitorInfo,
    targets: Vec<MonitorInfo>,
}

impl XcapSource {
    fn capture(monitor: &Monitor) -> Result<RgbaImage, CaptureBackendError> {
        monitor
            .capture_image()
            .map_err(|e| CaptureBackendError::GrabFailed(e.to_string()))
    }

    fn find<'a>(monitors: &'a [Monitor], target: &MonitorInfo) -> Result<&'a Monitor, CaptureBackendError> {
        monitors
            .iter()
            .find(|m| m.id().ok() == Some(target.id))
            .ok_or_else(|| {
                CaptureBackendError::GrabFailed(format!("Monitor '{}' disappeared", target.name))
            })
    }
}

impl FrameSource for XcapSource {
    fn size(&self) -> (u32, u32) {
        (self.bounds.width, self.bounds.height)
    }

    fn grab(&mut self) -> Result<RgbaImage, CaptureBackendError> {
        let monitors = all_monitors()?;

        if let [single] = self.targets.as_slice() {
            return Self::capture(Self::find(&monitors, single)?);
        }

        let mut canvas = RgbaImage::new(self.bounds.width, self.bounds.height);
        for target in &self.targets {
            let image = Self::capture(Self::find(&monitors, target)?)?;
            imageops::overlay(
                &mut canvas,
                &image,
                (target.x - self.bounds.x) as i64,
                (target.y - self.bounds.y) as i64,
            );
        }
        Ok(canvas)
    }
}
