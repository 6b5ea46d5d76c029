use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use super::{ActiveGif, GifOptions, ScreenCap};
use crate::capture::{FrameSource, SourceOptions};
use crate::error::{Result, ScreenCapError};
use crate::media::frame::{scaled_size, validate_size_percentage};
use crate::media::TimeSpec;
use crate::record::{next_frame, FrameSink, GifSink, Recording, RecordingSettings};

impl ScreenCap {
    fn gif_frame_time(&self) -> Duration {
        Duration::from_millis(self.config.gif_frame_time as u64)
    }

    fn open_gif(&self, opts: &GifOptions) -> Result<(Box<dyn FrameSource>, GifSink)> {
        let pct = validate_size_percentage(opts.size_percentage)?;
        let source = self.backend.open(opts.monitor, SourceOptions::default())?;
        let (width, height) = scaled_size(source.size(), pct);
        let path = self.save_path(&opts.name, "gif")?;
        let sink = GifSink::create(&path, width, height, self.gif_frame_time())?;
        Ok((source, sink))
    }

    fn finish_gif(&self, path: &std::path::Path, embed: bool, embed_width: &str) {
        if embed {
            self.embed_screenshot(path, embed_width);
        }
    }

    /// Record a GIF for `duration` and return once it is written
    pub fn take_gif(&mut self, opts: &GifOptions, duration: TimeSpec) -> Result<PathBuf> {
        let (mut source, mut sink) = self.open_gif(opts)?;
        let frame_time = self.gif_frame_time();
        let size = sink.size();

        let started = Instant::now();
        let mut next = started;
        loop {
            let frame = next_frame(source.as_mut(), size, false)?;
            sink.push(&frame)?;
            if started.elapsed() >= duration.duration() {
                break;
            }
            next += frame_time;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else {
                next = now;
            }
        }

        let result = Box::new(sink).finish()?;
        let width = self.embed_width(opts.embed_width.as_deref());
        self.finish_gif(&result.path, opts.embed, &width);
        Ok(result.path)
    }

    /// Start recording a GIF in the background; only one may run at a time
    pub fn start_gif_recording(&mut self, opts: &GifOptions) -> Result<PathBuf> {
        if self.gif.is_some() {
            return Err(ScreenCapError::GifAlreadyRecording);
        }
        let (source, sink) = self.open_gif(opts)?;
        let settings = RecordingSettings::every(self.gif_frame_time(), false);
        let recording = Recording::start(source, Box::new(sink), settings)?;
        let path = recording.path().to_path_buf();

        self.gif = Some(ActiveGif {
            recording,
            embed: opts.embed,
            embed_width: self.embed_width(opts.embed_width.as_deref()),
        });
        Ok(path)
    }

    /// Stop the background GIF and write the file
    pub fn stop_gif_recording(&mut self) -> Result<PathBuf> {
        let mut gif = self.gif.take().ok_or(ScreenCapError::NoGifRecording)?;
        let result = gif.recording.stop()?;
        self.finish_gif(&result.path, gif.embed, &gif.embed_width);
        Ok(result.path)
    }

    pub fn is_gif_recording(&self) -> bool {
        self.gif.is_some()
    }
}
