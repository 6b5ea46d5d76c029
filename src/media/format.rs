use image::codecs::png::CompressionType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScreenCapError;

/// Still image formats a screenshot can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum ScreenshotFormat {
    #[default]
    Png,
    Jpeg,
    /// JPEG saved with the `.jpg` extension
    Jpg,
    Webp,
}

impl ScreenshotFormat {
    pub fn is_jpeg(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Jpg)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ScreenshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ScreenshotFormat {
    type Err = ScreenCapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" => Ok(Self::Jpeg),
            "jpg" => Ok(Self::Jpg),
            "webp" => Ok(Self::Webp),
            _ => Err(ScreenCapError::invalid("Invalid screenshot format.")),
        }
    }
}

impl TryFrom<String> for ScreenshotFormat {
    type Error = ScreenCapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScreenshotFormat> for String {
    fn from(value: ScreenshotFormat) -> Self {
        value.extension().to_string()
    }
}

/// Quality is expressed on a 0..=100 scale for every format
pub fn validate_quality(quality: u8) -> Result<u8, ScreenCapError> {
    if quality > 100 {
        return Err(ScreenCapError::invalid(
            "Quality argument must be of between 0 and 100.",
        ));
    }
    Ok(quality)
}

/// Maps quality onto a zlib level in [0, 9]; 100 means no compression
pub fn png_compression_level(quality: u8) -> Result<u8, ScreenCapError> {
    let quality = validate_quality(quality)?;
    if quality == 100 {
        return Ok(0);
    }
    Ok(9 - quality / 11)
}

pub fn png_compression(quality: u8) -> Result<CompressionType, ScreenCapError> {
    let level = png_compression_level(quality)?;
    Ok(match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    })
}

/// JPEG encoders misbehave outside [1, 95]
pub fn jpeg_quality(quality: u8) -> Result<u8, ScreenCapError> {
    Ok(validate_quality(quality)?.clamp(1, 95))
}
