use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::format::{jpeg_quality, png_compression, validate_quality, ScreenshotFormat};
use crate::error::ScreenCapError;

/// Writes a still frame to `path` in the given format and returns the path.
///
/// PNG maps quality onto a compression level, JPEG clamps it to [1, 95] and
/// WebP is always lossless.
pub fn save_still(
    frame: &RgbaImage,
    path: &Path,
    format: ScreenshotFormat,
    quality: u8,
) -> Result<PathBuf, ScreenCapError> {
    // Validate before touching the filesystem so a bad argument leaves no file behind
    validate_quality(quality)?;

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ScreenshotFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut writer, png_compression(quality)?, PngFilter::Adaptive);
            frame.write_with_encoder(encoder)?;
        }
        ScreenshotFormat::Jpeg | ScreenshotFormat::Jpg => {
            let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality(quality)?);
            rgb.write_with_encoder(encoder)?;
        }
        ScreenshotFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(&mut writer);
            frame.write_with_encoder(encoder)?;
        }
    }
    writer.flush()?;

    debug!(
        "Saved {}x{} {} to {:?}",
        frame.width(),
        frame.height(),
        format,
        path
    );
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(32, 24, |x, y| Rgba([(x * 8) as u8, (y * 10) as u8, 128, 255]))
    }

    #[test]
    fn test_each_format_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        for (format, expected) in [
            (ScreenshotFormat::Png, image::ImageFormat::Png),
            (ScreenshotFormat::Jpeg, image::ImageFormat::Jpeg),
            (ScreenshotFormat::Jpg, image::ImageFormat::Jpeg),
            (ScreenshotFormat::Webp, image::ImageFormat::WebP),
        ] {
            let path = dir.path().join(format!("shot.{}", format.extension()));
            let saved = save_still(&gradient(), &path, format, 50).unwrap();
            assert_eq!(saved, path);

            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected);
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (32, 24));
        }
    }

    #[test]
    fn test_invalid_quality_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        assert!(save_still(&gradient(), &path, ScreenshotFormat::Png, 120).is_err());
        assert!(!path.exists());
    }
}
