// X11 capture backend using GStreamer's ximagesrc
//
// Grabs the X root window (or a monitor-sized part of it) through a live
// pipeline that ends in an appsink holding the newest frame.

mod backend;
mod pipeline;

pub use backend::X11Backend;
pub use pipeline::GrabPipeline;
