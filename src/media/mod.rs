// Media helpers shared by every keyword
//
// Argument parsing (time values, formats, quality), output path resolution,
// frame post-processing and still image encoding.

pub mod encode;
pub mod format;
pub mod frame;
pub mod paths;
pub mod time;

pub use encode::save_still;
pub use format::ScreenshotFormat;
pub use frame::Region;
pub use time::TimeSpec;
