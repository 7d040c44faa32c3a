//! Command existence and version extraction.

use std::process::Command;

/// Get the first line of a tool's version output.
///
/// Tries `-version` (ffmpeg style) first, then `--version`. Returns `None`
/// when the command can't be run or exits non-zero for both.
pub fn tool_version(cmd: &str) -> Option<String> {
    get_command_version(cmd, "-version").or_else(|| get_command_version(cmd, "--version"))
}

/// Run `cmd version_flag` and return the first line it prints.
fn get_command_version(cmd: &str, version_flag: &str) -> Option<String> {
    let output = Command::new(cmd).arg(version_flag).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Try stdout first, fall back to stderr (some tools output to stderr)
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    first_line(&text)
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToString::to_string)
}
