//! The `concisely` binary: composition root, commands and configuration.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies only some tests use
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;

// Used by main.rs
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use bootstrap::{BotContext, bootstrap};
pub use commands::{Commands, PromptArgs};
pub use config::{ConfigError, Settings};
pub use error::CliError;
pub use parser::Cli;

/// Run the selected command.
pub async fn dispatch(cli: &Cli, settings: &Settings) -> Result<(), CliError> {
    match cli.command_or_default() {
        Commands::Run => handlers::run::execute(settings).await,
        Commands::Prompt(args) => handlers::prompt::execute(settings, &args).await,
        Commands::CheckDeps => handlers::check_deps::execute(settings),
    }
}
