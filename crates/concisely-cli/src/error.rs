//! CLI error type and exit codes.

use concisely_core::{CoreError, RepositoryError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `prompt` found nothing to render.
    #[error("No messages found for chat_id={chat_id}, {selection}")]
    NoMessages { chat_id: i64, selection: String },

    #[error("Missing dependencies: {0}")]
    MissingDependencies(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wiring the bot failed before polling started.
    #[error("Startup failed: {0:#}")]
    Startup(anyhow::Error),
}

impl CliError {
    /// Map error to a process exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NoMessages { .. } | Self::Startup(_) => 1,
            Self::MissingDependencies(_) => 69, // EX_UNAVAILABLE
            Self::Database(_) => 73,            // EX_CANTCREAT
            Self::Io(_) => 74,                  // EX_IOERR
            Self::Config(_) => 78,              // EX_CONFIG
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(e) => e.into(),
            other => Self::Startup(other.into()),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::Startup(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let no_messages = CliError::NoMessages {
            chat_id: -1,
            selection: "last 100".to_string(),
        };
        assert_eq!(no_messages.exit_code(), 1);
        assert_eq!(
            CliError::from(ConfigError::Missing("BOT_TOKEN")).exit_code(),
            78
        );
        assert_eq!(
            CliError::MissingDependencies("ffmpeg".to_string()).exit_code(),
            69
        );
    }

    #[test]
    fn test_repository_errors_map_to_database() {
        let err: CliError = CoreError::Repository(RepositoryError::Storage("locked".to_string())).into();
        assert!(matches!(err, CliError::Database(ref msg) if msg.contains("locked")));
    }
}
