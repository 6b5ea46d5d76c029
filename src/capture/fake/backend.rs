// Fake capture backend for testing
//
// Produces deterministic gradient frames so tests can run without a display.

use crate::capture::monitor::{covered, monitor, select};
use crate::capture::{
    CaptureBackend, CaptureBackendError, FrameSource, MonitorIndex, MonitorInfo, SourceOptions,
};
use crate::config::BackendKind;
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Configurable fake backend for testing
#[derive(Debug, Clone)]
pub struct FakeCaptureBackend {
    /// Whether open/grab should succeed
    should_succeed: Arc<AtomicBool>,
    /// Error to return on failure
    error_type: Arc<Mutex<FakeError>>,
    /// Monitors reported by `monitors()`
    layout: Arc<Mutex<Vec<MonitorInfo>>>,
    /// Grabs allowed before every further grab fails (0 = unlimited)
    fail_after: Arc<AtomicU32>,
    /// Sources opened on these monitors fail every grab
    failing_monitors: Arc<Mutex<Vec<MonitorIndex>>>,
    /// Pointer position relative to the source origin
    cursor: Arc<Mutex<Option<(i32, i32)>>>,
    /// Whether sources claim to paint the pointer natively
    paints_cursor: Arc<AtomicBool>,
    /// Count of open calls
    open_count: Arc<AtomicU32>,
    /// Count of grab calls
    grab_count: Arc<AtomicU32>,
}

#[derive(Debug, Clone)]
pub enum FakeError {
    NoMonitor,
    GrabFailed,
}

impl FakeError {
    fn to_backend_error(&self) -> CaptureBackendError {
        match self {
            FakeError::NoMonitor => CaptureBackendError::NoMonitor("No display found".to_string()),
            FakeError::GrabFailed => {
                CaptureBackendError::GrabFailed("Fake grab failure".to_string())
            }
        }
    }
}

impl Default for FakeCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic pixel for a point in global desktop coordinates
pub fn fake_pixel(x: i32, y: i32) -> Rgba<u8> {
    Rgba([
        (x.rem_euclid(64) * 4) as u8,
        (y.rem_euclid(64) * 4) as u8,
        128,
        255,
    ])
}

impl FakeCaptureBackend {
    /// Two monitors side by side: 64x48 and 32x48
    pub fn new() -> Self {
        Self::with_monitors(vec![monitor(1, 0, 0, 64, 48), monitor(2, 64, 0, 32, 48)])
    }

    pub fn with_monitors(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            should_succeed: Arc::new(AtomicBool::new(true)),
            error_type: Arc::new(Mutex::new(FakeError::GrabFailed)),
            layout: Arc::new(Mutex::new(monitors)),
            fail_after: Arc::new(AtomicU32::new(0)),
            failing_monitors: Arc::new(Mutex::new(Vec::new())),
            cursor: Arc::new(Mutex::new(None)),
            paints_cursor: Arc::new(AtomicBool::new(false)),
            open_count: Arc::new(AtomicU32::new(0)),
            grab_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Create a backend that always fails with a grab error
    pub fn failing() -> Self {
        let backend = Self::new();
        backend.should_succeed.store(false, Ordering::SeqCst);
        *backend.error_type.lock().unwrap() = FakeError::GrabFailed;
        backend
    }

    /// Create a backend without any display
    pub fn no_monitor() -> Self {
        let backend = Self::with_monitors(Vec::new());
        *backend.error_type.lock().unwrap() = FakeError::NoMonitor;
        backend
    }

    /// Set whether open/grab should succeed
    pub fn set_should_succeed(&self, succeed: bool) {
        self.should_succeed.store(succeed, Ordering::SeqCst);
    }

    /// Let `grabs` more grabs succeed, then fail every grab
    pub fn fail_after_grabs(&self, grabs: u32) {
        let done = self.grab_count.load(Ordering::SeqCst);
        self.fail_after.store(done + grabs, Ordering::SeqCst);
    }

    /// Make every grab from sources on `monitor` fail
    pub fn fail_monitor(&self, monitor: MonitorIndex) {
        self.failing_monitors.lock().unwrap().push(monitor);
    }

    pub fn set_cursor_position(&self, position: Option<(i32, i32)>) {
        *self.cursor.lock().unwrap() = position;
    }

    pub fn set_paints_cursor(&self, paints: bool) {
        self.paints_cursor.store(paints, Ordering::SeqCst);
    }

    /// Get count of open calls
    pub fn open_count(&self) -> u32 {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Get count of grab calls
    pub fn grab_count(&self) -> u32 {
        self.grab_count.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CaptureBackendError> {
        if self.should_succeed.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(self.error_type.lock().unwrap().to_backend_error())
        }
    }
}

impl CaptureBackend for FakeCaptureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Xcap
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureBackendError> {
        Ok(self.layout.lock().unwrap().clone())
    }

    fn open(
        &self,
        monitor: MonitorIndex,
        _options: SourceOptions,
    ) -> Result<Box<dyn FrameSource>, CaptureBackendError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        let monitors = self.monitors()?;
        let bounds = select(&monitors, monitor)?;
        // only the covered monitors carry pixels; gaps stay black
        let targets = covered(&monitors, monitor).into_iter().cloned().collect();

        Ok(Box::new(FakeSource {
            backend: self.clone(),
            monitor,
            bounds,
            targets,
        }))
    }
}

#[derive(Debug)]
struct FakeSource {
    backend: FakeCaptureBackend,
    monitor: MonitorIndex,
    bounds: MonitorInfo,
    targets: Vec<MonitorInfo>,
}

impl FrameSource for FakeSource {
    fn size(&self) -> (u32, u32) {
        (self.bounds.width, self.bounds.height)
    }

    fn grab(&mut self) -> Result<RgbaImage, CaptureBackendError> {
        let n = self.backend.grab_count.fetch_add(1, Ordering::SeqCst);
        self.backend.check()?;
        let limit = self.backend.fail_after.load(Ordering::SeqCst);
        if limit > 0 && n >= limit {
            return Err(FakeError::GrabFailed.to_backend_error());
        }
        if self.backend.failing_monitors.lock().unwrap().contains(&self.monitor) {
            return Err(FakeError::GrabFailed.to_backend_error());
        }

        let b = &self.bounds;
        Ok(RgbaImage::from_fn(b.width, b.height, |x, y| {
            let (gx, gy) = (b.x + x as i32, b.y + y as i32);
            let visible = self
                .targets
                .iter()
                .any(|m| gx >= m.x && gx < m.right() && gy >= m.y && gy < m.bottom());
            if visible {
                fake_pixel(gx, gy)
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        *self.backend.cursor.lock().unwrap()
    }

    fn paints_cursor(&self) -> bool {
        self.backend.paints_cursor.load(Ordering::SeqCst)
    }
}
