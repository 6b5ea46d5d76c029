use super::*;
use image::RgbaImage;

#[test]
fn test_fake_encoder_counts_frames() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeVideoEncoder::new();
    let path = dir.path().join("out.webm");

    let mut sink = encoder.open(&path, 8, 6, 4).unwrap();
    for _ in 0..6 {
        sink.push(&RgbaImage::new(8, 6)).unwrap();
    }
    let result = sink.finish().unwrap();

    assert_eq!(result.frames, 6);
    assert_eq!(result.duration_ms, 1500);
    assert_eq!(encoder.pushed_frames(), 6);
    assert_eq!(encoder.finished_count(), 1);
    assert_eq!(encoder.last_fps(), 4);
    assert_eq!(std::fs::read(&path).unwrap(), PLACEHOLDER);
}

#[test]
fn test_fake_encoder_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeVideoEncoder::unavailable();
    let result = encoder.open(&dir.path().join("out.webm"), 8, 6, 4);
    assert!(matches!(result, Err(EncoderError::Unavailable(_))));
    assert_eq!(encoder.open_count(), 0);
}

#[test]
fn test_fake_sink_checks_frame_size() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeVideoEncoder::new();
    let mut sink = encoder.open(&dir.path().join("out.webm"), 8, 6, 4).unwrap();
    assert!(sink.push(&RgbaImage::new(6, 8)).is_err());
}
