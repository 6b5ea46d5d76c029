use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::{next_frame, VideoEncoder};
use crate::capture::FrameSource;
use crate::error::Result;

/// Default measuring window
pub const CALIBRATION_WINDOW: Duration = Duration::from_secs(2);

pub const MAX_FPS: u32 = 60;

/// Frames per second achieved over `window`, clamped to 1..=60
pub fn fps_for(frames: u64, window: Duration) -> u32 {
    let secs = window.as_secs_f64();
    if secs <= 0.0 {
        return MAX_FPS;
    }
    let fps = (frames as f64 / secs).floor() as u64;
    fps.clamp(1, MAX_FPS as u64) as u32
}

/// Measure how fast this machine can grab, resize and encode frames.
///
/// Frames go to a throwaway file in the temp directory that is removed
/// afterwards.
pub fn calibrate_fps(
    source: &mut dyn FrameSource,
    encoder: &dyn VideoEncoder,
    size: (u32, u32),
    display_cursor: bool,
    window: Duration,
) -> Result<u32> {
    let path = std::env::temp_dir().join(format!(
        "screencap-calibration-{}.webm",
        uuid::Uuid::new_v4()
    ));
    let mut sink = encoder.open(&path, size.0, size.1, MAX_FPS)?;

    let started = Instant::now();
    let mut frames = 0u64;
    let outcome = loop {
        if started.elapsed() >= window {
            break Ok(());
        }
        let pushed = next_frame(source, size, display_cursor)
            .and_then(|frame| sink.push(&frame).map_err(Into::into));
        match pushed {
            Ok(()) => frames += 1,
            Err(e) => break Err(e),
        }
    };

    let finished = sink.finish();
    if let Err(e) = std::fs::remove_file(&path) {
        warn!("Could not remove calibration file {:?}: {}", path, e);
    }
    outcome?;
    finished?;

    let fps = fps_for(frames, window);
    info!("Automatically setting a fps of {}", fps);
    Ok(fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::{FakeCaptureBackend, FakeVideoEncoder};
    use crate::capture::{CaptureBackend, MonitorIndex, SourceOptions};

    #[test]
    fn test_fps_for_floors_and_clamps() {
        assert_eq!(fps_for(45, Duration::from_secs(2)), 22);
        assert_eq!(fps_for(0, Duration::from_secs(2)), 1);
        assert_eq!(fps_for(1000, Duration::from_secs(2)), 60);
        assert_eq!(fps_for(10, Duration::ZERO), 60);
    }

    #[test]
    fn test_calibration_removes_dummy_file() {
        let backend = FakeCaptureBackend::new();
        let encoder = FakeVideoEncoder::new();
        let mut source = backend
            .open(MonitorIndex::PRIMARY, SourceOptions::default())
            .unwrap();

        let fps = calibrate_fps(
            source.as_mut(),
            &encoder,
            (64, 48),
            false,
            Duration::from_millis(100),
        )
        .unwrap();

        assert!((1..=MAX_FPS).contains(&fps));
        assert!(encoder.pushed_frames() > 0);
        let last = encoder.last_path().unwrap();
        assert!(!last.exists());
    }

    #[test]
    fn test_calibration_propagates_grab_failure() {
        let backend = FakeCaptureBackend::new();
        backend.fail_after_grabs(1);
        let encoder = FakeVideoEncoder::new();
        let mut source = backend
            .open(MonitorIndex::PRIMARY, SourceOptions::default())
            .unwrap();

        let result = calibrate_fps(
            source.as_mut(),
            &encoder,
            (64, 48),
            false,
            Duration::from_millis(200),
        );
        assert!(result.is_err());
        assert!(!encoder.last_path().unwrap().exists());
    }
}
