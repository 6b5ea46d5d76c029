use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::media::{ScreenshotFormat, TimeSpec};

/// Which grabber captures the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum BackendKind {
    /// Cross-platform grabber (xcap)
    #[default]
    Xcap,
    /// X11 root-window grabber (GStreamer ximagesrc), useful under VNC
    X11,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xcap => "xcap",
            Self::X11 => "x11",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "xcap" | "mss" => Ok(Self::Xcap),
            "x11" | "ximagesrc" | "pygtk" | "gtk" => Ok(Self::X11),
            other => Err(ConfigError {
                field: "backend".to_string(),
                message: format!("Unknown screenshot backend '{}'", other),
            }),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BackendKind> for String {
    fn from(value: BackendKind) -> Self {
        value.as_str().to_string()
    }
}

/// Library-wide settings, the equivalent of importing the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenCapConfig {
    /// Grabber used for every capture
    pub backend: BackendKind,
    /// Where captures are written; the log directory when unset
    pub screenshot_directory: Option<PathBuf>,
    /// Directory of the report that links/embeds the captures
    pub log_directory: PathBuf,
    /// Default still format
    pub format: ScreenshotFormat,
    /// Default quality (0-100)
    pub quality: u8,
    /// Default wait before a screenshot
    pub delay: TimeSpec,
    /// Video frames per second (1-60); calibrated on first use when unset
    pub fps: Option<u8>,
    /// Draw the pointer into video frames
    pub display_cursor: bool,
    /// Milliseconds each GIF frame is shown
    pub gif_frame_time: u32,
    /// Width of embedded media in the report
    pub embed_width: String,
}

impl Default for ScreenCapConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            screenshot_directory: None,
            log_directory: PathBuf::from("."),
            format: ScreenshotFormat::default(),
            quality: 50,
            delay: TimeSpec::ZERO,
            fps: None,
            display_cursor: false,
            gif_frame_time: 100,
            embed_width: "800px".to_string(),
        }
    }
}

/// Validation error for ScreenCapConfig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScreenCapConfig {
    /// Load from a JSON file and validate
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ConfigError::new("config", format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::new(
                "quality",
                "Quality argument must be of between 0 and 100.",
            ));
        }

        if let Some(fps) = self.fps {
            if fps == 0 || fps > 60 {
                return Err(ConfigError::new("fps", "FPS must be between 1 and 60"));
            }
        }

        if self.gif_frame_time < 10 {
            return Err(ConfigError::new(
                "gif_frame_time",
                "GIF frame time must be at least 10 ms",
            ));
        }

        if self.embed_width.trim().is_empty() {
            return Err(ConfigError::new("embed_width", "Embed width cannot be empty"));
        }

        if self.log_directory.as_os_str().is_empty() {
            return Err(ConfigError::new("log_directory", "Log directory cannot be empty"));
        }

        if let Some(dir) = &self.screenshot_directory {
            if !dir.is_dir() {
                return Err(ConfigError::new(
                    "screenshot_directory",
                    format!("Directory '{}' does not exist.", dir.display()),
                ));
            }
        }

        Ok(())
    }

    /// Directory captures land in when a keyword does not name one
    pub fn effective_screenshot_directory(&self) -> &Path {
        self.screenshot_directory
            .as_deref()
            .unwrap_or(&self.log_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = ScreenCapConfig::default();
        assert_eq!(config.backend, BackendKind::Xcap);
        assert_eq!(config.format, ScreenshotFormat::Png);
        assert_eq!(config.quality, 50);
        assert!(config.delay.is_zero());
        assert_eq!(config.fps, None);
        assert!(!config.display_cursor);
        assert_eq!(config.embed_width, "800px");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_fps_zero() {
        let config = ScreenCapConfig {
            fps: Some(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "fps");
    }

    #[test]
    fn test_validate_fps_too_high() {
        let config = ScreenCapConfig {
            fps: Some(61),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "fps");
    }

    #[test]
    fn test_validate_quality() {
        let config = ScreenCapConfig {
            quality: 101,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "quality");
    }

    #[test]
    fn test_validate_missing_screenshot_directory() {
        let config = ScreenCapConfig {
            screenshot_directory: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "screenshot_directory");
        assert!(err.message.contains("does not exist"));
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("MSS".parse::<BackendKind>().unwrap(), BackendKind::Xcap);
        assert_eq!("PyGTK".parse::<BackendKind>().unwrap(), BackendKind::X11);
        assert_eq!("x11".parse::<BackendKind>().unwrap(), BackendKind::X11);
        assert!("wayland".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_effective_directory_falls_back_to_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScreenCapConfig {
            log_directory: PathBuf::from("logs"),
            ..Default::default()
        };
        assert_eq!(config.effective_screenshot_directory(), Path::new("logs"));

        config.screenshot_directory = Some(dir.path().to_path_buf());
        assert_eq!(config.effective_screenshot_directory(), dir.path());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScreenCapConfig =
            serde_json::from_str(r#"{"backend": "pygtk", "format": "JPG", "delay": "1 min"}"#)
                .unwrap();
        assert_eq!(config.backend, BackendKind::X11);
        assert_eq!(config.format, ScreenshotFormat::Jpg);
        assert_eq!(config.delay.duration(), Duration::from_secs(60));
        assert_eq!(config.quality, 50);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = ScreenCapConfig {
            backend: BackendKind::X11,
            fps: Some(24),
            display_cursor: true,
            quality: 80,
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ScreenCapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_from_json_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screencap.json");
        std::fs::write(&path, r#"{"fps": 120}"#).unwrap();
        let err = ScreenCapConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.field, "fps");
    }
}
