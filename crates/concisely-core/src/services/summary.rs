//! Summary scheduling and delivery.
//!
//! A chat is summarized every `interval` messages. Summaries for one chat
//! never overlap; different chats are independent.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::{ChatSettings, SummaryRecord};
use crate::error::CoreError;
use crate::html::fix_html;
use crate::ports::{ChatGateway, GatewayError, LlmPort, ParseMode, Repos};
use crate::prompt::{full_prompt, model_short_name};
use crate::wide_log::elapsed_ms;

/// Hashtag every summary starts with, so members can find them.
const SUMMARY_HASHTAG: &str = "#concisely";

/// Telegram caps messages at 4096 characters; leave room for the envelope
/// and any closing tags added by [`fix_html`].
const MAX_SUMMARY_CHARS: usize = 3000;

/// Why no summary was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyGenerating,
    /// No baseline yet; the current message becomes the baseline.
    FirstRun,
    IntervalNotReached,
    NoMessages,
    Error,
}

/// Result of a summary check, recorded in the wide log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryOutcome {
    pub attempted: bool,
    pub sent: bool,
    pub reason: Option<SkipReason>,
    pub last_summary_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_last_summary_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_since_last: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl SummaryOutcome {
    fn skipped(mut self, reason: SkipReason) -> Self {
        self.reason = Some(reason);
        self
    }

    fn failed(mut self, err: &CoreError) -> Self {
        self.reason = Some(SkipReason::Error);
        self.error = Some(err.to_string());
        self
    }
}

type GeneratingSet = Arc<Mutex<HashSet<i64>>>;

/// Clears a chat's "generating" flag when dropped, on every exit path.
struct GeneratingGuard {
    chats: GeneratingSet,
    chat_id: i64,
}

impl GeneratingGuard {
    fn mark(chats: &GeneratingSet, chat_id: i64) -> Self {
        chats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chat_id);
        Self {
            chats: Arc::clone(chats),
            chat_id,
        }
    }
}

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.chats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.chat_id);
    }
}

/// Decides when a chat is due for a summary, then generates and posts it.
pub struct SummaryService {
    repos: Repos,
    llm: Arc<dyn LlmPort>,
    gateway: Arc<dyn ChatGateway>,
    settings: ChatSettings,
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    generating: GeneratingSet,
}

impl SummaryService {
    pub fn new(
        repos: Repos,
        llm: Arc<dyn LlmPort>,
        gateway: Arc<dyn ChatGateway>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            repos,
            llm,
            gateway,
            settings,
            locks: Mutex::new(HashMap::new()),
            generating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a summary is currently being generated for `chat_id`.
    pub fn is_generating(&self, chat_id: i64) -> bool {
        self.generating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&chat_id)
    }

    fn chat_lock(&self, chat_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(chat_id).or_default())
    }

    /// Summarize `chat_id` if enough messages arrived since the last summary.
    ///
    /// The check-and-mark step runs under a per-chat lock; generation itself
    /// runs outside it, with concurrent callers turned away by the
    /// generating flag instead of queueing behind the LLM call.
    pub async fn maybe_summarize(&self, chat_id: i64, current_message_id: i64) -> SummaryOutcome {
        let mut outcome = SummaryOutcome::default();

        if self.is_generating(chat_id) {
            return outcome.skipped(SkipReason::AlreadyGenerating);
        }

        let lock = self.chat_lock(chat_id);
        let held = lock.lock().await;

        if self.is_generating(chat_id) {
            return outcome.skipped(SkipReason::AlreadyGenerating);
        }

        let last_id = match self.repos.chat_state.last_summary_message_id(chat_id).await {
            Ok(last) => last,
            Err(e) => return outcome.failed(&CoreError::from(e)),
        };
        outcome.last_summary_id = last_id;

        let Some(last_id) = last_id else {
            if let Err(e) = self
                .repos
                .chat_state
                .set_last_summary_message_id(chat_id, current_message_id)
                .await
            {
                return outcome.failed(&CoreError::from(e));
            }
            info!("Chat {chat_id}: summary baseline set to message {current_message_id}");
            outcome.new_last_summary_id = Some(current_message_id);
            return outcome.skipped(SkipReason::FirstRun);
        };

        let interval = self.settings.interval_for(chat_id);
        let since_last = current_message_id - last_id;
        if since_last < interval {
            outcome.messages_since_last = Some(since_last);
            outcome.interval = Some(interval);
            return outcome.skipped(SkipReason::IntervalNotReached);
        }

        let _generating = GeneratingGuard::mark(&self.generating, chat_id);
        drop(held);

        let start = Instant::now();
        outcome.attempted = true;
        info!(
            "Generating summary for chat {chat_id}, messages {} - {current_message_id}",
            last_id + 1
        );

        if let Err(e) = self
            .generate(chat_id, last_id, current_message_id, start, &mut outcome)
            .await
        {
            error!("Summary for chat {chat_id} failed: {e}");
            outcome = outcome.failed(&e);
        }

        outcome.duration_ms = Some(elapsed_ms(start));
        outcome
    }

    async fn generate(
        &self,
        chat_id: i64,
        last_id: i64,
        current_message_id: i64,
        start: Instant,
        outcome: &mut SummaryOutcome,
    ) -> Result<(), CoreError> {
        let messages = self
            .repos
            .messages
            .messages_in_range(chat_id, last_id, current_message_id)
            .await?;
        outcome.messages_count = Some(messages.len());

        if messages.is_empty() {
            warn!("No messages to summarize in chat {chat_id}");
            outcome.reason = Some(SkipReason::NoMessages);
            return Ok(());
        }

        let model = self.llm.roster().pick_summary_model().to_string();
        let prompt = full_prompt(&messages);
        let completion = self.llm.complete(&model, &prompt).await?;

        self.send_summary(chat_id, &completion.text, &model).await?;
        outcome.model = Some(model.clone());
        outcome.summary_chars = Some(completion.text.chars().count());
        outcome.cost = completion.cost;

        self.repos
            .chat_state
            .set_last_summary_message_id(chat_id, current_message_id)
            .await?;
        outcome.new_last_summary_id = Some(current_message_id);
        outcome.sent = true;

        self.repos
            .summaries
            .save_summary(SummaryRecord {
                chat_id,
                from_message_id: last_id,
                to_message_id: current_message_id,
                model,
                duration_ms: elapsed_ms(start),
                summary_text: completion.text,
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
                cost: completion.cost,
            })
            .await?;

        info!("Summary for chat {chat_id} sent, last summarized message is now {current_message_id}");
        Ok(())
    }

    /// Post a summary, retrying as plain text if Telegram rejects the HTML.
    pub async fn send_summary(
        &self,
        chat_id: i64,
        summary: &str,
        model: &str,
    ) -> Result<(), GatewayError> {
        let text = render_summary(summary, model);

        match self.gateway.send_message(chat_id, &text, ParseMode::Html).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Sending HTML summary to chat {chat_id} failed, retrying as plain text: {e}");
                self.gateway
                    .send_message(chat_id, &text, ParseMode::Plain)
                    .await
            }
        }
    }
}

/// Final message text: hashtag, repaired summary, model signature.
fn render_summary(summary: &str, model: &str) -> String {
    let truncated: String = summary.chars().take(MAX_SUMMARY_CHARS).collect();
    format!(
        "{SUMMARY_HASHTAG}\n{}\n\n{}",
        fix_html(&truncated),
        model_short_name(model)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatMessage;
    use crate::ports::MockChatGateway;
    use crate::testing::{FakeGateway, FakeLlm, InMemoryStore};

    const CHAT: i64 = -100;

    fn service_with(
        store: &Arc<InMemoryStore>,
        llm: Arc<FakeLlm>,
        gateway: Arc<dyn ChatGateway>,
        interval: i64,
    ) -> SummaryService {
        SummaryService::new(
            store.repos(),
            llm,
            gateway,
            ChatSettings::new([(CHAT, Some(interval))]),
        )
    }

    fn seed(store: &InMemoryStore, ids: std::ops::RangeInclusive<i64>) {
        for id in ids {
            store.put_message(ChatMessage::text(CHAT, id, "Anna", &format!("message {id}")));
        }
    }

    #[tokio::test]
    async fn test_first_run_sets_baseline() {
        let store = Arc::new(InMemoryStore::default());
        let gateway = Arc::new(FakeGateway::new());
        let service = service_with(&store, Arc::new(FakeLlm::new("s")), gateway.clone(), 10);

        let outcome = service.maybe_summarize(CHAT, 42).await;

        assert_eq!(outcome.reason, Some(SkipReason::FirstRun));
        assert_eq!(outcome.new_last_summary_id, Some(42));
        assert!(!outcome.attempted);
        assert_eq!(store.last_summary_id(CHAT), Some(42));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_interval_not_reached() {
        let store = Arc::new(InMemoryStore::default());
        store.set_last_summary_id(CHAT, 100);
        let service = service_with(
            &store,
            Arc::new(FakeLlm::new("s")),
            Arc::new(FakeGateway::new()),
            10,
        );

        let outcome = service.maybe_summarize(CHAT, 109).await;

        assert_eq!(outcome.reason, Some(SkipReason::IntervalNotReached));
        assert_eq!(outcome.messages_since_last, Some(9));
        assert_eq!(outcome.interval, Some(10));
        assert_eq!(outcome.last_summary_id, Some(100));
    }

    #[tokio::test]
    async fn test_generates_sends_and_records_summary() {
        let store = Arc::new(InMemoryStore::default());
        store.set_last_summary_id(CHAT, 100);
        seed(&store, 95..=110);
        let llm = Arc::new(FakeLlm::new("<b>Итоги</b> дня"));
        let gateway = Arc::new(FakeGateway::new());
        let service = service_with(&store, llm.clone(), gateway.clone(), 10);

        let outcome = service.maybe_summarize(CHAT, 110).await;

        assert!(outcome.attempted);
        assert!(outcome.sent);
        assert_eq!(outcome.reason, None);
        assert_eq!(outcome.messages_count, Some(10));
        assert_eq!(outcome.new_last_summary_id, Some(110));
        assert!(outcome.duration_ms.is_some());
        assert_eq!(store.last_summary_id(CHAT), Some(110));
        assert!(!service.is_generating(CHAT));

        // Only messages after the baseline reach the prompt.
        let prompt = &llm.complete_calls()[0].1;
        assert!(prompt.contains("### 101 Anna"));
        assert!(!prompt.contains("### 100 Anna"));

        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2, ParseMode::Html);
        assert!(sent[0].1.starts_with("#concisely\n<b>Итоги</b> дня\n\n"));

        let summaries = store.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].from_message_id, 100);
        assert_eq!(summaries[0].to_message_id, 110);
    }

    #[tokio::test]
    async fn test_no_messages_in_range() {
        let store = Arc::new(InMemoryStore::default());
        store.set_last_summary_id(CHAT, 0);
        let service = service_with(
            &store,
            Arc::new(FakeLlm::new("s")),
            Arc::new(FakeGateway::new()),
            10,
        );

        let outcome = service.maybe_summarize(CHAT, 20).await;

        assert!(outcome.attempted);
        assert!(!outcome.sent);
        assert_eq!(outcome.reason, Some(SkipReason::NoMessages));
        assert_eq!(store.last_summary_id(CHAT), Some(0));
    }

    #[tokio::test]
    async fn test_llm_failure_keeps_baseline_and_clears_flag() {
        let store = Arc::new(InMemoryStore::default());
        store.set_last_summary_id(CHAT, 0);
        seed(&store, 1..=10);
        let llm = Arc::new(FakeLlm::new("s").failing());
        let service = service_with(&store, llm, Arc::new(FakeGateway::new()), 10);

        let outcome = service.maybe_summarize(CHAT, 10).await;

        assert_eq!(outcome.reason, Some(SkipReason::Error));
        assert!(outcome.error.is_some());
        assert!(!outcome.sent);
        assert_eq!(store.last_summary_id(CHAT), Some(0));
        assert!(!service.is_generating(CHAT));
    }

    #[tokio::test]
    async fn test_skips_while_generating() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(
            &store,
            Arc::new(FakeLlm::new("s")),
            Arc::new(FakeGateway::new()),
            10,
        );

        let guard = GeneratingGuard::mark(&service.generating, CHAT);
        let outcome = service.maybe_summarize(CHAT, 10).await;
        assert_eq!(outcome.reason, Some(SkipReason::AlreadyGenerating));

        drop(guard);
        assert!(!service.is_generating(CHAT));
    }

    #[tokio::test]
    async fn test_concurrent_checks_generate_once() {
        let store = Arc::new(InMemoryStore::default());
        store.set_last_summary_id(CHAT, 0);
        seed(&store, 1..=20);
        let llm = Arc::new(FakeLlm::new("s").with_delay(std::time::Duration::from_millis(50)));
        let gateway = Arc::new(FakeGateway::new());
        let service = Arc::new(service_with(&store, llm, gateway.clone(), 10));

        let handles: Vec<_> = (11..=20)
            .map(|id| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.maybe_summarize(CHAT, id).await })
            })
            .collect();

        let mut sent = 0;
        for handle in handles {
            if handle.await.unwrap().sent {
                sent += 1;
            }
        }

        assert_eq!(sent, 1);
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_send_summary_falls_back_to_plain_text() {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_send_message()
            .withf(|_, _, mode| *mode == ParseMode::Html)
            .times(1)
            .returning(|_, _, _| {
                Err(GatewayError::Api {
                    code: Some(400),
                    description: "can't parse entities".to_string(),
                })
            });
        gateway
            .expect_send_message()
            .withf(|chat, text, mode| {
                *chat == CHAT && text.ends_with("\n\nclaude-opus-4.5") && *mode == ParseMode::Plain
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let store = Arc::new(InMemoryStore::default());
        let service = service_with(&store, Arc::new(FakeLlm::new("s")), Arc::new(gateway), 10);

        service
            .send_summary(CHAT, "summary", "anthropic/claude-opus-4.5")
            .await
            .unwrap();
    }

    #[test]
    fn test_render_summary_truncates_and_repairs() {
        let long = format!("<b>{}", "я".repeat(4000));
        let text = render_summary(&long, "google/gemini-2.5-pro");

        assert!(text.starts_with("#concisely\n<b>"));
        assert!(text.ends_with("</b>\n\ngemini-2.5-pro"));
        assert_eq!(text.matches('я').count(), MAX_SUMMARY_CHARS - 3);
    }
}
