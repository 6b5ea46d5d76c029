use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::{FrameSink, RecordingResult};
use crate::capture::FrameSource;
use crate::error::{Result, ScreenCapError};
use crate::media::frame::{draw_cursor, resize_to};
use crate::state::{RecordingError, RecordingState, StateMachine};

/// How often a paused or pacing worker checks its flags
const PAUSE_POLL: Duration = Duration::from_millis(20);

/// Per-recording worker settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSettings {
    /// Target time between two frames
    pub frame_interval: Duration,
    /// Draw the pointer when the source does not
    pub display_cursor: bool,
}

impl RecordingSettings {
    pub fn at_fps(fps: u32, display_cursor: bool) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / fps.max(1),
            display_cursor,
        }
    }

    pub fn every(frame_time: Duration, display_cursor: bool) -> Self {
        Self {
            frame_interval: frame_time,
            display_cursor,
        }
    }
}

/// Grab one frame and bring it to the sink's size.
///
/// The pointer is drawn only when asked for, when the source does not already
/// paint it, and when the source knows where it is.
pub fn next_frame(
    source: &mut dyn FrameSource,
    size: (u32, u32),
    display_cursor: bool,
) -> Result<RgbaImage> {
    let mut frame = resize_to(source.grab()?, size);

    if display_cursor && !source.paints_cursor() {
        if let Some((x, y)) = source.cursor_position() {
            let (src_w, src_h) = source.size();
            let sx = (x as i64 * size.0 as i64 / src_w.max(1) as i64) as i32;
            let sy = (y as i64 * size.1 as i64 / src_h.max(1) as i64) as i32;
            draw_cursor(&mut frame, sx, sy);
        }
    }
    Ok(frame)
}

/// Sleep until `deadline` in short slices, returning early once `stop` is set
fn sleep_until(deadline: Instant, stop: &AtomicBool) {
    loop {
        let now = Instant::now();
        if now >= deadline || stop.load(Ordering::SeqCst) {
            return;
        }
        thread::sleep((deadline - now).min(PAUSE_POLL));
    }
}

#[derive(Debug, Clone)]
struct WorkerFlags {
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
}

fn capture_loop(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    settings: RecordingSettings,
    flags: &WorkerFlags,
) -> Result<()> {
    let size = sink.size();
    let mut next = Instant::now();

    while !flags.stop.load(Ordering::SeqCst) {
        if flags.paused.load(Ordering::SeqCst) {
            thread::sleep(PAUSE_POLL);
            next = Instant::now();
            continue;
        }

        let frame = next_frame(source, size, settings.display_cursor)?;
        sink.push(&frame)?;
        flags.frames.fetch_add(1, Ordering::SeqCst);

        next += settings.frame_interval;
        let now = Instant::now();
        if next > now {
            sleep_until(next, &flags.stop);
        } else {
            // running behind; don't try to catch up
            next = now;
        }
    }
    Ok(())
}

fn run_worker(
    mut source: Box<dyn FrameSource>,
    mut sink: Box<dyn FrameSink>,
    settings: RecordingSettings,
    flags: WorkerFlags,
) -> Result<RecordingResult> {
    let outcome = capture_loop(source.as_mut(), sink.as_mut(), settings, &flags);
    if let Err(e) = &outcome {
        error!("Recording to {:?} stopped early: {}", sink.path(), e);
    }

    // Always finalize so the partial file stays playable
    let finished = sink.finish();
    outcome?;
    Ok(finished?)
}

/// A running background recording
pub struct Recording {
    path: PathBuf,
    size: (u32, u32),
    state: StateMachine,
    flags: WorkerFlags,
    worker: Option<JoinHandle<Result<RecordingResult>>>,
}

impl Recording {
    /// Spawn the worker thread moving frames from `source` into `sink`
    pub fn start(
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        settings: RecordingSettings,
    ) -> Result<Self> {
        let path = sink.path().to_path_buf();
        let size = sink.size();
        let flags = WorkerFlags {
            stop: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            frames: Arc::new(AtomicU64::new(0)),
        };

        let mut state = StateMachine::new();
        state.begin_recording()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let worker_flags = flags.clone();
        let worker = thread::Builder::new()
            .name(format!("screencap-{}", name))
            .spawn(move || run_worker(source, sink, settings, worker_flags))?;

        info!(
            "Recording started: {:?} ({}x{}, {:?} per frame)",
            path, size.0, size.1, settings.frame_interval
        );

        Ok(Self {
            path,
            size,
            state,
            flags,
            worker: Some(worker),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn state(&self) -> RecordingState {
        self.state.state()
    }

    pub fn last_error(&self) -> Option<&RecordingError> {
        self.state.last_error()
    }

    /// Frames pushed to the sink so far
    pub fn frames(&self) -> u64 {
        self.flags.frames.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.state.state() == RecordingState::Paused
    }

    /// True once the worker has exited, for example after a grab failure
    pub fn worker_exited(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.state.pause()?;
        self.flags.paused.store(true, Ordering::SeqCst);
        debug!("Recording paused: {:?}", self.path);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.state.resume()?;
        self.flags.paused.store(false, Ordering::SeqCst);
        debug!("Recording resumed: {:?}", self.path);
        Ok(())
    }

    /// Signal the worker, wait for it and return what it wrote
    pub fn stop(&mut self) -> Result<RecordingResult> {
        self.state.stop()?;
        self.flags.paused.store(false, Ordering::SeqCst);
        self.flags.stop.store(true, Ordering::SeqCst);

        let worker = self.worker.take().ok_or(ScreenCapError::NoActiveRecording)?;
        let result = worker
            .join()
            .map_err(|_| ScreenCapError::WorkerPanicked)
            .and_then(|r| r);

        match &result {
            Ok(done) => {
                self.state.finalize_complete()?;
                info!(
                    "Recording complete: {:?} ({} frames, {} ms)",
                    done.path, done.frames, done.duration_ms
                );
            }
            Err(e) => {
                self.state.set_error(RecordingError::from(e));
            }
        }
        result
    }
}

impl Drop for Recording {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.flags.stop.store(true, Ordering::SeqCst);
            self.flags.paused.store(false, Ordering::SeqCst);
            if worker.join().is_err() {
                warn!("Recording worker for {:?} panicked", self.path);
            }
        }
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("state", &self.state.state())
            .field("frames", &self.frames())
            .finish()
    }
}
