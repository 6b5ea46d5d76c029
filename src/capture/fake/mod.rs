// Test doubles for the capture backends and video encoders
//
// These let the recording and keyword code run without a display, xcap or
// GStreamer.

mod backend;
mod encoder;

pub use backend::{fake_pixel, FakeCaptureBackend, FakeError};
pub use encoder::{FakeVideoEncoder, PLACEHOLDER};

#[cfg(test)]
mod tests;
