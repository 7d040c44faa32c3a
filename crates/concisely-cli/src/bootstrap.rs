//! Composition root.
//!
//! The only place where adapters are instantiated and wired into the core
//! services:
//! - `SQLite` pool and repositories (via concisely-db)
//! - Telegram client (via concisely-telegram)
//! - OpenRouter client (via concisely-llm)
//! - ffmpeg transcoder and JSONL wide log (via concisely-runtime)

use std::sync::Arc;

use anyhow::{Context, Result};
use concisely_core::{
    ChatGateway, IngestService, LlmPort, MediaDescriber, MessageRepository, SummaryService,
};
use concisely_db::{CoreFactory, SqlitePool, setup_database};
use concisely_llm::{DefaultOpenRouterClient, OpenRouterConfig};
use concisely_runtime::{FfmpegTranscoder, JsonlWideLogSink, tool_version};
use concisely_telegram::{Poller, PollerConfig, TelegramClient, TelegramConfig};
use tracing::{info, warn};

use crate::config::Settings;

/// Everything `run` needs once wiring is done.
pub struct BotContext {
    pub pool: SqlitePool,
    pub poller: Poller,
}

/// Wire the bot from settings.
///
/// Fails on missing secrets, an unreadable chats file or an unusable
/// database. A missing ffmpeg only disables voice note descriptions, so it
/// is logged and startup continues.
pub async fn bootstrap(settings: &Settings) -> Result<BotContext> {
    let chats = settings.load_chats()?;
    if chats.is_empty() {
        warn!(
            "No chats listed in {}; every update will be ignored",
            settings.chats_file.display()
        );
    }

    let pool = setup_database(&settings.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", settings.db_path.display()))?;
    let repos = CoreFactory::build_repos(pool.clone());

    let telegram = Arc::new(
        TelegramClient::new(TelegramConfig::new(settings.bot_token()?))
            .context("Failed to build Telegram client")?,
    );

    let mut llm_config = OpenRouterConfig::new(settings.openrouter_api_key()?);
    if let Some(base_url) = &settings.openrouter_base_url {
        llm_config = llm_config.with_base_url(base_url.clone());
    }
    let llm: Arc<dyn LlmPort> = Arc::new(
        DefaultOpenRouterClient::new(&llm_config).context("Failed to build OpenRouter client")?,
    );

    let ffmpeg = settings.ffmpeg.clone();
    match tokio::task::spawn_blocking(move || tool_version(&ffmpeg)).await {
        Ok(Some(version)) => info!("Using {version}"),
        Ok(None) => warn!(
            "{} not found; voice notes will be stored without transcripts",
            settings.ffmpeg
        ),
        Err(e) => warn!("Failed to query {} version: {e}", settings.ffmpeg),
    }

    let gateway: Arc<dyn ChatGateway> = telegram.clone();
    let describer = MediaDescriber::new(
        Arc::clone(&llm),
        Arc::clone(&gateway),
        Arc::clone(&repos.stickers),
        Arc::new(FfmpegTranscoder::new(settings.ffmpeg.clone())),
    );
    let messages: Arc<dyn MessageRepository> = Arc::clone(&repos.messages);
    let summaries = Arc::new(SummaryService::new(repos, llm, gateway, chats.clone()));
    let ingest = Arc::new(IngestService::new(
        describer,
        messages,
        summaries,
        Arc::new(JsonlWideLogSink::new(settings.wide_log_dir.clone())),
    ));

    let poller = Poller::new(telegram, ingest, chats, PollerConfig::default());

    Ok(BotContext { pool, poller })
}

/// Open the database for read-only maintenance commands.
pub async fn open_messages(settings: &Settings) -> Result<(SqlitePool, Arc<dyn MessageRepository>)> {
    let pool = setup_database(&settings.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", settings.db_path.display()))?;
    let messages: Arc<dyn MessageRepository> = CoreFactory::message_repository(pool.clone());
    Ok((pool, messages))
}
