use image::RgbaImage;
use std::path::PathBuf;
use tracing::info;

use super::{wait, ScreenCap, ScreenshotOptions};
use crate::capture::SourceOptions;
use crate::error::{Result, ScreenCapError};
use crate::media::frame::{crop, Region};
use crate::media::{save_still, ScreenshotFormat, TimeSpec};

/// Format implied by a still-image file name, if any
fn format_from_name(name: &str) -> Option<ScreenshotFormat> {
    let lower = name.to_ascii_lowercase();
    let (_, extension) = lower.rsplit_once('.')?;
    match extension {
        "png" | "jpg" | "jpeg" | "webp" => extension.parse().ok(),
        _ => None,
    }
}

impl ScreenCap {
    fn still_format(&self, opts: &ScreenshotOptions) -> ScreenshotFormat {
        format_from_name(&opts.name)
            .or(opts.format)
            .unwrap_or(self.config.format)
    }

    fn save_frame(&self, frame: &RgbaImage, opts: &ScreenshotOptions) -> Result<PathBuf> {
        let format = self.still_format(opts);
        let quality = opts.quality.unwrap_or(self.config.quality);
        let path = self.save_path(&opts.name, format.extension())?;
        let path = save_still(frame, &path, format, quality)?;
        info!("Screenshot saved to {:?}", path);
        Ok(path)
    }

    fn capture_still(&self, opts: &ScreenshotOptions) -> Result<PathBuf> {
        let frame = self.backend.grab(opts.monitor)?;
        self.save_frame(&frame, opts)
    }

    fn screenshot_delay(&self, opts: &ScreenshotOptions) -> TimeSpec {
        opts.delay.unwrap_or(self.config.delay)
    }

    /// Capture the screen, save it and embed it in the report
    pub fn take_screenshot(&mut self, opts: &ScreenshotOptions) -> Result<PathBuf> {
        wait(self.screenshot_delay(opts));
        let path = self.capture_still(opts)?;
        let width = self.embed_width(opts.width.as_deref());
        self.embed_screenshot(&path, &width);
        Ok(path)
    }

    /// Like `take_screenshot`, but only links the file
    pub fn take_screenshot_without_embedding(&mut self, opts: &ScreenshotOptions) -> Result<PathBuf> {
        wait(self.screenshot_delay(opts));
        let path = self.capture_still(opts)?;
        self.link_screenshot(&path);
        Ok(path)
    }

    /// Capture and save only `region` of the screen
    pub fn take_partial_screenshot(
        &mut self,
        opts: &ScreenshotOptions,
        region: Region,
        embed: bool,
        embed_width: Option<&str>,
    ) -> Result<PathBuf> {
        wait(self.screenshot_delay(opts));
        let frame = self.backend.grab(opts.monitor)?;
        let cropped = crop(&frame, region)?;
        let path = self.save_frame(&cropped, opts)?;
        if embed {
            let width = self.embed_width(embed_width);
            self.embed_screenshot(&path, &width);
        }
        Ok(path)
    }

    /// Take `count` screenshots, sleeping `delay_time` after each one
    pub fn take_multiple_screenshots(
        &mut self,
        opts: &ScreenshotOptions,
        count: u32,
        delay_time: TimeSpec,
        embed: bool,
        embed_width: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        if count == 0 {
            return Err(ScreenCapError::invalid(
                "Screenshot number argument must be at least 1.",
            ));
        }
        let width = self.embed_width(embed_width);
        let mut source = self.backend.open(opts.monitor, SourceOptions::default())?;

        let mut paths = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let frame = source.grab()?;
            let path = self.save_frame(&frame, opts)?;
            wait(delay_time);
            if embed {
                self.embed_screenshot(&path, &width);
            }
            paths.push(path);
        }
        Ok(paths)
    }
}
