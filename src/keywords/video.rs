use std::path::PathBuf;
use tracing::{error, info};

use super::{ActiveVideo, ScreenCap, VideoOptions};
use crate::capture::{FrameSource, SourceOptions};
use crate::error::{Result, ScreenCapError};
use crate::media::frame::{scaled_size, validate_size_percentage};
use crate::record::{calibrate_fps, Recording, RecordingSettings, MAX_FPS};

fn validate_fps(fps: u8) -> Result<u32> {
    if fps == 0 || fps as u32 > MAX_FPS {
        return Err(ScreenCapError::invalid(format!(
            "The fps argument must be between 1 and {}.",
            MAX_FPS
        )));
    }
    Ok(fps as u32)
}

impl ScreenCap {
    /// Explicit fps, then the configured one, then a cached calibration
    fn video_fps(
        &mut self,
        requested: Option<u8>,
        source: &mut dyn FrameSource,
        size: (u32, u32),
    ) -> Result<u32> {
        if let Some(fps) = requested.or(self.config.fps) {
            return validate_fps(fps);
        }
        if let Some(fps) = self.calibrated_fps {
            return Ok(fps);
        }

        let fps = calibrate_fps(
            source,
            self.encoder.as_ref(),
            size,
            self.config.display_cursor,
            self.calibration_window,
        )?;
        self.calibrated_fps = Some(fps);
        self.message(format!("Automatically setting a fps of {}", fps));
        Ok(fps)
    }

    /// Index of `alias`, or of the most recently started recording
    fn video_index(&self, alias: Option<&str>) -> Result<usize> {
        match alias {
            Some(alias) => self
                .videos
                .iter()
                .position(|v| v.alias == alias)
                .ok_or_else(|| ScreenCapError::UnknownRecording(alias.to_string())),
            None => self
                .videos
                .len()
                .checked_sub(1)
                .ok_or(ScreenCapError::NoActiveRecording),
        }
    }

    /// Start a WebM recording in the background and return its path
    pub fn start_video_recording(&mut self, opts: &VideoOptions) -> Result<PathBuf> {
        let alias = opts.alias().to_string();
        if self.videos.iter().any(|v| v.alias == alias) {
            return Err(ScreenCapError::AliasInUse(alias));
        }
        let pct = validate_size_percentage(opts.size_percentage)?;
        let display_cursor = self.config.display_cursor;

        let mut source = self.backend.open(
            opts.monitor,
            SourceOptions {
                show_cursor: display_cursor,
            },
        )?;
        let size = scaled_size(source.size(), pct);
        let fps = self.video_fps(opts.fps, source.as_mut(), size)?;

        let path = self.save_path(&opts.name, "webm")?;
        let sink = self.encoder.open(&path, size.0, size.1, fps)?;
        let recording =
            Recording::start(source, sink, RecordingSettings::at_fps(fps, display_cursor))?;

        info!("Video recording '{}' started at {} fps", alias, fps);
        self.videos.push(ActiveVideo {
            alias,
            recording,
            embed: opts.embed,
            embed_width: self.embed_width(opts.embed_width.as_deref()),
        });
        Ok(path)
    }

    /// Stop one recording; without an alias the most recently started one
    pub fn stop_video_recording(&mut self, alias: Option<&str>) -> Result<PathBuf> {
        let index = self.video_index(alias)?;
        let mut video = self.videos.remove(index);
        let result = video.recording.stop()?;
        if video.embed {
            self.embed_video(&result.path, &video.embed_width);
        }
        Ok(result.path)
    }

    /// Stop every recording in start order.
    ///
    /// All recordings are stopped even when one fails; the first failure is
    /// returned afterwards.
    pub fn stop_all_video_recordings(&mut self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.videos.len());
        let mut first_error = None;

        for mut video in std::mem::take(&mut self.videos) {
            match video.recording.stop() {
                Ok(result) => {
                    if video.embed {
                        self.embed_video(&result.path, &video.embed_width);
                    }
                    paths.push(result.path);
                }
                Err(e) => {
                    error!("Failed to stop video recording '{}': {}", video.alias, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(paths),
        }
    }

    pub fn pause_video_recording(&mut self, alias: Option<&str>) -> Result<()> {
        let index = self.video_index(alias)?;
        self.videos[index].recording.pause()
    }

    pub fn resume_video_recording(&mut self, alias: Option<&str>) -> Result<()> {
        let index = self.video_index(alias)?;
        self.videos[index].recording.resume()
    }

    /// Aliases of the running recordings in start order
    pub fn active_video_recordings(&self) -> Vec<String> {
        self.videos.iter().map(|v| v.alias.clone()).collect()
    }
}
