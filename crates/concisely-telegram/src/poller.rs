//! Long-polling loop.
//!
//! Fetches updates, filters them to tracked chats and hands each message to
//! a [`MessageHandler`] on its own task, so a slow summary in one chat never
//! stalls message intake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use concisely_core::{ChatSettings, GatewayError, IncomingMessage, IngestService};
use serde_json::Value;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::TelegramClient;
use crate::convert::into_incoming;
use crate::wire::Update;

/// Source of raw updates; [`TelegramClient`] in production.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Value>, GatewayError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Value>, GatewayError> {
        self.get_updates(offset, timeout_secs).await
    }
}

/// Receives messages from tracked chats.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, message: IncomingMessage);
}

#[async_trait]
impl MessageHandler for IngestService {
    async fn on_message(&self, message: IncomingMessage) {
        let record = self.handle(message).await;
        debug!(
            request_id = %record.request_id,
            total_ms = ?record.timings_ms.get("total"),
            "Message handled"
        );
    }
}

/// Polling parameters.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Long-poll wait passed to `getUpdates`.
    pub long_poll_secs: u32,
    /// First retry delay after a failed poll; doubles per failure.
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            long_poll_secs: 30,
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(60),
        }
    }
}

/// Delay before the next poll after `failures` consecutive errors.
fn backoff_delay(failures: u32, base: Duration, max: Duration) -> Duration {
    let exp = failures.saturating_sub(1).min(16);
    base.saturating_mul(1 << exp).min(max)
}

pub struct Poller {
    source: Arc<dyn UpdateSource>,
    handler: Arc<dyn MessageHandler>,
    settings: ChatSettings,
    config: PollerConfig,
}

impl Poller {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        handler: Arc<dyn MessageHandler>,
        settings: ChatSettings,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            handler,
            settings,
            config,
        }
    }

    /// Poll until `shutdown` is cancelled, then wait for in-flight handlers.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut offset: Option<i64> = None;
        let mut failures: u32 = 0;
        let mut tasks = JoinSet::new();

        info!(chats = self.settings.len(), "Polling for updates");

        loop {
            let result = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                result = self.source.fetch_updates(offset, self.config.long_poll_secs) => result,
            };

            match result {
                Ok(updates) => {
                    failures = 0;
                    for raw in updates {
                        if let Some(next) = self.dispatch(raw, &mut tasks) {
                            offset = Some(next);
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    let delay =
                        backoff_delay(failures, self.config.backoff_base, self.config.backoff_max);
                    warn!("getUpdates failed ({failures} in a row), retrying in {delay:?}: {e}");
                    tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }

            // Reap finished handlers so the set doesn't grow unbounded
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    warn!("Message handler task failed: {e}");
                }
            }
        }

        info!(in_flight = tasks.len(), "Polling stopped, waiting for handlers");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Message handler task failed: {e}");
            }
        }
    }

    /// Spawn a handler for one raw update. Returns the next offset.
    fn dispatch(&self, raw: Value, tasks: &mut JoinSet<()>) -> Option<i64> {
        let Some(update_id) = raw.get("update_id").and_then(Value::as_i64) else {
            warn!("Skipping update without update_id");
            return None;
        };
        let next = Some(update_id + 1);

        let update: Update = match serde_json::from_value(raw.clone()) {
            Ok(update) => update,
            Err(e) => {
                warn!(update_id, "Skipping malformed update: {e}");
                return next;
            }
        };
        let Some(message) = update.message else {
            return next;
        };
        if !self.settings.is_tracked(message.chat.id) {
            debug!(chat_id = message.chat.id, "Ignoring message from untracked chat");
            return next;
        }

        let raw_message = raw.get("message").cloned().unwrap_or(Value::Null);
        let incoming = into_incoming(&message, raw_message);
        let handler = Arc::clone(&self.handler);
        tasks.spawn(async move { handler.on_message(incoming).await });

        next
    }
}
