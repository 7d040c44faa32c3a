//! External tool probing.
//!
//! concisely shells out to `ffmpeg` for voice notes. Startup and the
//! `check-deps` command use these checks to report whether it is usable.

mod commands;

pub use commands::tool_version;

/// Availability of one external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Display name, e.g. `ffmpeg`.
    pub name: &'static str,
    /// Command that was checked (may be a full path).
    pub command: String,
    /// First line of the tool's version output, if it ran.
    pub version: Option<String>,
    /// What stops working without it.
    pub needed_for: &'static str,
}

impl ToolStatus {
    pub const fn is_available(&self) -> bool {
        self.version.is_some()
    }
}

/// Check every external tool concisely uses.
pub fn check_dependencies(ffmpeg: &str) -> Vec<ToolStatus> {
    vec![ToolStatus {
        name: "ffmpeg",
        command: ffmpeg.to_string(),
        version: tool_version(ffmpeg),
        needed_for: "voice note transcription",
    }]
}
