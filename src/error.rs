use std::path::PathBuf;

use crate::capture::CaptureBackendError;
use crate::config::ConfigError;
use crate::record::EncoderError;
use crate::state::TransitionError;

/// Errors returned by the keyword API
#[derive(Debug, thiserror::Error)]
pub enum ScreenCapError {
    /// A keyword argument was out of range or malformed
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Directory '{}' does not exist.", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Directory '{}' where to save the screenshot does not exist", .0.display())]
    SaveDirectoryMissing(PathBuf),

    #[error("Top and left parameters must be lower than screen resolution.")]
    RegionOutOfBounds,

    #[error("No video recording is in progress")]
    NoActiveRecording,

    #[error("No video recording with alias '{0}'")]
    UnknownRecording(String),

    #[error("A video recording with alias '{0}' is already running")]
    AliasInUse(String),

    #[error("A GIF recording is already in progress")]
    GifAlreadyRecording,

    #[error("No GIF recording is in progress")]
    NoGifRecording,

    /// The background worker died before it could finalize the output
    #[error("Recording worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] CaptureBackendError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenCapError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T, E = ScreenCapError> = std::result::Result<T, E>;
