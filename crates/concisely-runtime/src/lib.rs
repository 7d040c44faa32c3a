//! Process runtime and OS-level concerns for concisely.
//!
//! - [`FfmpegTranscoder`]: the `AudioTranscoder` port over an `ffmpeg` child
//!   process
//! - [`system`]: external tool probing
//! - [`JsonlWideLogSink`]: the `WideLogSink` port over daily JSONL files

pub mod system;
mod transcoder;
mod wide_log;

pub use system::{ToolStatus, check_dependencies, tool_version};
pub use transcoder::FfmpegTranscoder;
pub use wide_log::JsonlWideLogSink;
