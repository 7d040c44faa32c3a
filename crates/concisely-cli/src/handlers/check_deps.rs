//! `concisely check-deps`: report external tools.

use concisely_runtime::{ToolStatus, check_dependencies};

use crate::config::Settings;
use crate::error::CliError;

pub fn execute(settings: &Settings) -> Result<(), CliError> {
    let tools = check_dependencies(&settings.ffmpeg);

    println!("{:<10} {:<10} {}", "TOOL", "STATUS", "DETAILS");
    println!("{}", "=".repeat(60));
    for tool in &tools {
        println!("{}", status_line(tool));
    }

    let missing: Vec<&str> = tools
        .iter()
        .filter(|t| !t.is_available())
        .map(|t| t.name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::MissingDependencies(missing.join(", ")))
    }
}

fn status_line(tool: &ToolStatus) -> String {
    match &tool.version {
        Some(version) => format!("{:<10} {:<10} {version}", tool.name, "ok"),
        None => format!(
            "{:<10} {:<10} `{}` not runnable; needed for {}",
            tool.name, "missing", tool.command, tool.needed_for
        ),
    }
}
