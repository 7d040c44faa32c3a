//! Environment configuration.
//!
//! Values come from the process environment, after `.env` has been loaded
//! by `main`. Secrets are only demanded by the commands that need them, so
//! `check-deps` and `prompt` work without a bot token.

use std::path::{Path, PathBuf};

use concisely_core::{ChatSettings, ChatSettingsError};
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "data/concisely.db";
pub const DEFAULT_CHATS_FILE: &str = "chats.json";
pub const DEFAULT_WIDE_LOG_DIR: &str = "logs";
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Failed to read chats file {path}: {source}")]
    ChatsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Chats(#[from] ChatSettingsError),
}

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    bot_token: Option<String>,
    openrouter_api_key: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub db_path: PathBuf,
    pub chats_file: PathBuf,
    pub wide_log_dir: PathBuf,
    pub ffmpeg: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            bot_token: get("BOT_TOKEN"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_base_url: get("OPENROUTER_BASE_URL"),
            db_path: get("CONCISELY_DB_PATH").map_or_else(|| DEFAULT_DB_PATH.into(), PathBuf::from),
            chats_file: get("CONCISELY_CHATS_FILE")
                .map_or_else(|| DEFAULT_CHATS_FILE.into(), PathBuf::from),
            wide_log_dir: get("CONCISELY_WIDE_LOG_DIR")
                .map_or_else(|| DEFAULT_WIDE_LOG_DIR.into(), PathBuf::from),
            ffmpeg: get("FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG.to_string()),
        }
    }

    pub fn bot_token(&self) -> Result<&str, ConfigError> {
        self.bot_token
            .as_deref()
            .ok_or(ConfigError::Missing("BOT_TOKEN"))
    }

    pub fn openrouter_api_key(&self) -> Result<&str, ConfigError> {
        self.openrouter_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))
    }

    /// Read and parse the chats file.
    pub fn load_chats(&self) -> Result<ChatSettings, ConfigError> {
        load_chats(&self.chats_file)
    }
}

fn load_chats(path: &Path) -> Result<ChatSettings, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ChatsFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ChatSettings::from_json(&json)?)
}
