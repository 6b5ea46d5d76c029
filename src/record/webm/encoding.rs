use tracing::{debug, warn};

/// WebM-compatible video encoders in order of preference
pub const VP_ENCODERS: &[&str] = &[
    "vp8enc", // libvpx VP8, fast enough for realtime
    "vp9enc", // libvpx VP9
];

/// Detect the first usable VP8/VP9 encoder in the GStreamer registry
///
/// Returns None if GStreamer or the vpx plugin is missing.
pub fn detect_available_encoder() -> Option<&'static str> {
    // Ensure GStreamer is initialized (safe to call multiple times)
    if gstreamer::init().is_err() {
        warn!("Failed to initialize GStreamer for encoder detection");
        return None;
    }

    for encoder in VP_ENCODERS {
        if let Some(factory) = gstreamer::ElementFactory::find(encoder) {
            // Verify the factory can create an element (plugin is fully loaded)
            if factory.create().build().is_ok() {
                debug!("Found available WebM encoder: {}", encoder);
                return Some(encoder);
            }
        }
    }

    warn!("No VP8/VP9 encoder found in GStreamer registry");
    None
}
