use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{check_frame_size, EncoderError, FrameSink, RecordingResult};

/// Quantizer speed, 1 (best) to 30 (fastest)
const GIF_SPEED: i32 = 10;

/// Animated GIF writer with a fixed per-frame delay
pub struct GifSink {
    path: PathBuf,
    size: (u32, u32),
    frame_time: Duration,
    frames: u64,
    encoder: GifEncoder<BufWriter<File>>,
}

impl GifSink {
    pub fn create(
        path: &Path,
        width: u32,
        height: u32,
        frame_time: Duration,
    ) -> Result<Self, EncoderError> {
        let file = File::create(path)?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        debug!(
            "Opened GIF sink {:?} ({}x{}, {:?} per frame)",
            path, width, height, frame_time
        );

        Ok(Self {
            path: path.to_path_buf(),
            size: (width, height),
            frame_time,
            frames: 0,
            encoder,
        })
    }

    fn delay(&self) -> Delay {
        Delay::from_saturating_duration(self.frame_time)
    }
}

impl FrameSink for GifSink {
    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn push(&mut self, frame: &RgbaImage) -> Result<(), EncoderError> {
        check_frame_size(self.size, frame)?;
        let delay = self.delay();
        self.encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingResult, EncoderError> {
        let Self {
            path,
            size,
            frame_time,
            frames,
            encoder,
        } = *self;
        // the trailer is written when the encoder goes away
        drop(encoder);

        Ok(RecordingResult {
            path,
            frames,
            duration_ms: frames * frame_time.as_millis() as u64,
            width: size.0,
            height: size.1,
        })
    }
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("frames", &self.frames)
            .finish()
    }
}
