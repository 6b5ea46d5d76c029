use super::*;
use crate::capture::fake::{fake_pixel, FakeCaptureBackend, FakeVideoEncoder};
use crate::capture::MonitorIndex;
use crate::report::MemoryReport;
use tempfile::TempDir;


struct Harness {
    dir: TempDir,
    backend: FakeCaptureBackend,
    encoder: FakeVideoEncoder,
    report: MemoryReport,
    cap: ScreenCap,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(adjust: impl FnOnce(&mut ScreenCapConfig)) -> Self {
        Self::with_encoder(FakeVideoEncoder::new(), adjust)
    }

    fn with_encoder(encoder: FakeVideoEncoder, adjust: impl FnOnce(&mut ScreenCapConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScreenCapConfig {
            log_directory: dir.path().to_path_buf(),
            ..ScreenCapConfig::default()
        };
        adjust(&mut config);

        let backend = FakeCaptureBackend::new();
        let report = MemoryReport::new();
        let cap = ScreenCap::with_parts(
            config,
            Arc::new(backend.clone()),
            Arc::new(encoder.clone()),
            Arc::new(report.clone()),
        )
        .unwrap()
        .with_calibration_window(Duration::from_millis(50));

        Self {
            dir,
            backend,
            encoder,
            report,
            cap,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ScreenCapConfig {
        quality: 101,
        ..ScreenCapConfig::default()
    };
    let result = ScreenCap::with_parts(
        config,
        Arc::new(FakeCaptureBackend::new()),
        Arc::new(FakeVideoEncoder::new()),
        Arc::new(MemoryReport::new()),
    );
    assert!(matches!(result, Err(ScreenCapError::Config(_))));
}

#[test]
fn test_monitors_come_from_backend() {
    let h = Harness::new();
    let monitors = h.cap.monitors().unwrap();
    assert_eq!(monitors.len(), 2);
    assert_eq!(monitors[0].index, 1);
}

#[test]
fn test_set_screenshot_directory_returns_previous() {
    let mut h = Harness::new();
    let shots = h.dir.path().join("shots");
    std::fs::create_dir(&shots).unwrap();

    let old = h.cap.set_screenshot_directory(&shots).unwrap();
    assert_eq!(old, h.dir.path());
    assert_eq!(h.cap.screenshot_directory(), shots.as_path());

    let path = h.cap.take_screenshot(&ScreenshotOptions::default()).unwrap();
    assert_eq!(path, shots.join("screenshot_1.png"));

    // links stay relative to the log directory
    let events = h.report.events();
    assert!(matches!(
        &events[0],
        ReportEvent::ScreenshotEmbedded { link, .. } if link == "shots/screenshot_1.png"
    ));
}

#[test]
fn test_set_missing_screenshot_directory() {
    let mut h = Harness::new();
    let missing = h.dir.path().join("nope");
    let err = h.cap.set_screenshot_directory(&missing).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Directory '{}' does not exist.", missing.display())
    );
    assert_eq!(h.cap.screenshot_directory(), h.dir.path());
}

#[test]
fn test_drop_stops_active_recordings() {
    let encoder = FakeVideoEncoder::new();
    let h = Harness::with_encoder(encoder.clone(), |c| c.fps = Some(20));
    let Harness { mut cap, dir, .. } = h;

    cap.start_video_recording(&VideoOptions::default()).unwrap();
    cap.start_gif_recording(&GifOptions::default()).unwrap();
    drop(cap);

    assert_eq!(encoder.finished_count(), 1);
    assert!(dir.path().join("screenshot_1.gif").exists());
}
