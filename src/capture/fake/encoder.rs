// Fake video encoder for testing
//
// Counts frames instead of encoding them and leaves a small placeholder
// file at the output path.

use crate::record::{check_frame_size, EncoderError, FrameSink, RecordingResult, VideoEncoder};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Bytes written to every fake output file
pub const PLACEHOLDER: &[u8] = b"fake-webm";

#[derive(Debug, Clone, Default)]
pub struct FakeVideoEncoder {
    /// Make `open` fail as if no encoder were installed
    unavailable: Arc<AtomicBool>,
    open_count: Arc<AtomicU32>,
    finished_count: Arc<AtomicU32>,
    pushed_frames: Arc<AtomicU64>,
    /// fps passed to the last open call
    last_fps: Arc<AtomicU32>,
    last_path: Arc<Mutex<Option<PathBuf>>>,
}

impl FakeVideoEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let encoder = Self::new();
        encoder.unavailable.store(true, Ordering::SeqCst);
        encoder
    }

    pub fn open_count(&self) -> u32 {
        self.open_count.load(Ordering::SeqCst)
    }

    pub fn finished_count(&self) -> u32 {
        self.finished_count.load(Ordering::SeqCst)
    }

    /// Frames pushed across every sink this encoder opened
    pub fn pushed_frames(&self) -> u64 {
        self.pushed_frames.load(Ordering::SeqCst)
    }

    pub fn last_fps(&self) -> u32 {
        self.last_fps.load(Ordering::SeqCst)
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.lock().unwrap().clone()
    }
}

impl VideoEncoder for FakeVideoEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Box<dyn FrameSink>, EncoderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EncoderError::Unavailable("fake encoder disabled".to_string()));
        }
        self.open_count.fetch_add(1, Ordering::SeqCst);
        self.last_fps.store(fps, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(path.to_path_buf());
        std::fs::write(path, PLACEHOLDER)?;

        Ok(Box::new(FakeSink {
            encoder: self.clone(),
            path: path.to_path_buf(),
            size: (width, height),
            fps: fps.max(1),
            frames: 0,
        }))
    }
}

#[derive(Debug)]
struct FakeSink {
    encoder: FakeVideoEncoder,
    path: PathBuf,
    size: (u32, u32),
    fps: u32,
    frames: u64,
}

impl FrameSink for FakeSink {
    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn push(&mut self, frame: &RgbaImage) -> Result<(), EncoderError> {
        check_frame_size(self.size, frame)?;
        self.frames += 1;
        self.encoder.pushed_frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingResult, EncoderError> {
        self.encoder.finished_count.fetch_add(1, Ordering::SeqCst);
        Ok(RecordingResult {
            path: self.path,
            frames: self.frames,
            duration_ms: self.frames * 1000 / self.fps as u64,
            width: self.size.0,
            height: self.size.1,
        })
    }
}
