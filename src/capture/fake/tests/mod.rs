use super::*;
use crate::capture::{CaptureBackend, CaptureBackendError, MonitorIndex, SourceOptions};
use crate::record::{EncoderError, VideoEncoder};

mod encoder;
