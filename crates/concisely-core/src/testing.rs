//! In-memory fakes for the core ports.
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for adapter crates that want a working pipeline without I/O.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ChatMessage, NewChatMessage, SummaryRecord};
use crate::ports::{
    AudioTranscoder, ChatGateway, ChatStateRepository, Completion, Description, GatewayError,
    LlmError, LlmPort, MediaPayload, MessageRepository, ModelRoster, ParseMode, Repos,
    RepositoryError, StickerCacheRepository, SummaryRepository, TranscodeError, WideLogSink,
};
use crate::wide_log::WideLogRecord;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Default)]
struct StoreState {
    messages: BTreeMap<(i64, i64), ChatMessage>,
    last_summary: HashMap<i64, i64>,
    stickers: HashMap<String, String>,
    summaries: Vec<SummaryRecord>,
}

/// Implements every repository port over plain collections.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    fail_saves: AtomicBool,
}

impl InMemoryStore {
    /// All four repositories backed by this store.
    pub fn repos(self: &Arc<Self>) -> Repos {
        Repos::new(
            Arc::clone(self) as Arc<dyn MessageRepository>,
            Arc::clone(self) as Arc<dyn ChatStateRepository>,
            Arc::clone(self) as Arc<dyn StickerCacheRepository>,
            Arc::clone(self) as Arc<dyn SummaryRepository>,
        )
    }

    /// Make every subsequent `save_message` fail.
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn put_message(&self, msg: ChatMessage) {
        lock(&self.state)
            .messages
            .insert((msg.chat_id, msg.message_id), msg);
    }

    pub fn message(&self, chat_id: i64, message_id: i64) -> Option<ChatMessage> {
        lock(&self.state)
            .messages
            .get(&(chat_id, message_id))
            .cloned()
    }

    pub fn message_ids(&self, chat_id: i64) -> Vec<i64> {
        lock(&self.state)
            .messages
            .keys()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn set_last_summary_id(&self, chat_id: i64, message_id: i64) {
        lock(&self.state).last_summary.insert(chat_id, message_id);
    }

    pub fn last_summary_id(&self, chat_id: i64) -> Option<i64> {
        lock(&self.state).last_summary.get(&chat_id).copied()
    }

    pub fn put_sticker(&self, file_unique_id: &str, description: &str) {
        lock(&self.state)
            .stickers
            .insert(file_unique_id.to_string(), description.to_string());
    }

    pub fn sticker(&self, file_unique_id: &str) -> Option<String> {
        lock(&self.state).stickers.get(file_unique_id).cloned()
    }

    pub fn summaries(&self) -> Vec<SummaryRecord> {
        lock(&self.state).summaries.clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn save_message(&self, msg: NewChatMessage) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("disk full".to_string()));
        }
        self.put_message(msg.into());
        Ok(())
    }

    async fn messages_in_range(
        &self,
        chat_id: i64,
        after: i64,
        up_to: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        if after >= up_to {
            return Ok(Vec::new());
        }
        Ok(lock(&self.state)
            .messages
            .range((chat_id, after + 1)..=(chat_id, up_to))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn last_messages(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let state = lock(&self.state);
        let mut latest: Vec<ChatMessage> = state
            .messages
            .range((chat_id, i64::MIN)..=(chat_id, i64::MAX))
            .rev()
            .take(limit as usize)
            .map(|(_, m)| m.clone())
            .collect();
        latest.reverse();
        Ok(latest)
    }
}

#[async_trait]
impl ChatStateRepository for InMemoryStore {
    async fn last_summary_message_id(&self, chat_id: i64) -> Result<Option<i64>, RepositoryError> {
        Ok(self.last_summary_id(chat_id))
    }

    async fn set_last_summary_message_id(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), RepositoryError> {
        self.set_last_summary_id(chat_id, message_id);
        Ok(())
    }
}

#[async_trait]
impl StickerCacheRepository for InMemoryStore {
    async fn sticker_description(
        &self,
        file_unique_id: &str,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self.sticker(file_unique_id))
    }

    async fn save_sticker_description(
        &self,
        file_unique_id: &str,
        description: &str,
    ) -> Result<(), RepositoryError> {
        self.put_sticker(file_unique_id, description);
        Ok(())
    }
}

#[async_trait]
impl SummaryRepository for InMemoryStore {
    async fn save_summary(&self, record: SummaryRecord) -> Result<i64, RepositoryError> {
        let mut state = lock(&self.state);
        state.summaries.push(record);
        Ok(i64::try_from(state.summaries.len()).unwrap_or(i64::MAX))
    }

    async fn recent_summaries(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<SummaryRecord>, RepositoryError> {
        Ok(lock(&self.state)
            .summaries
            .iter()
            .rev()
            .filter(|s| s.chat_id == chat_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// LLM
// ============================================================================

/// Scripted LLM that records every call.
pub struct FakeLlm {
    roster: ModelRoster,
    summary: String,
    description: String,
    description_cost: Option<f64>,
    failing: bool,
    delay: Option<Duration>,
    complete_calls: Mutex<Vec<(String, String)>>,
    describe_calls: Mutex<Vec<(String, String, MediaPayload)>>,
}

impl FakeLlm {
    /// Completes every prompt with `summary`.
    pub fn new(summary: &str) -> Self {
        Self {
            roster: ModelRoster::default(),
            summary: summary.to_string(),
            description: "media".to_string(),
            description_cost: None,
            failing: false,
            delay: None,
            complete_calls: Mutex::new(Vec::new()),
            describe_calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_description(mut self, text: &str, cost: Option<f64>) -> Self {
        self.description = text.to_string();
        self.description_cost = cost;
        self
    }

    /// Fail every call with a 500.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Sleep before answering completions.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn complete_calls(&self) -> Vec<(String, String)> {
        lock(&self.complete_calls).clone()
    }

    pub fn describe_calls(&self) -> Vec<(String, String, MediaPayload)> {
        lock(&self.describe_calls).clone()
    }

    fn check(&self) -> Result<(), LlmError> {
        if self.failing {
            return Err(LlmError::Api {
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LlmPort for FakeLlm {
    fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, LlmError> {
        lock(&self.complete_calls).push((model.to_string(), prompt.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        Ok(Completion {
            text: self.summary.clone(),
            input_tokens: Some(100),
            output_tokens: Some(20),
            cost: Some(0.01),
        })
    }

    async fn describe(
        &self,
        model: &str,
        prompt: &str,
        media: MediaPayload,
    ) -> Result<Description, LlmError> {
        lock(&self.describe_calls).push((model.to_string(), prompt.to_string(), media));
        self.check()?;
        Ok(Description {
            text: self.description.clone(),
            cost: self.description_cost,
        })
    }
}

// ============================================================================
// Chat gateway
// ============================================================================

/// Gateway serving files from a map and recording sent messages.
#[derive(Default)]
pub struct FakeGateway {
    files: HashMap<String, Vec<u8>>,
    downloads: Mutex<Vec<String>>,
    sent: Mutex<Vec<(i64, String, ParseMode)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, file_id: &str, bytes: &[u8]) -> Self {
        self.files.insert(file_id.to_string(), bytes.to_vec());
        self
    }

    pub fn downloads(&self) -> Vec<String> {
        lock(&self.downloads).clone()
    }

    pub fn sent(&self) -> Vec<(i64, String, ParseMode)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), GatewayError> {
        lock(&self.sent).push((chat_id, text.to_string(), mode));
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, GatewayError> {
        lock(&self.downloads).push(file_id.to_string());
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                code: Some(400),
                description: format!("Bad Request: file {file_id} not found"),
            })
    }
}

// ============================================================================
// Transcoder and wide log
// ============================================================================

/// Prefixes the input with `mp3:` instead of running ffmpeg.
#[derive(Default)]
pub struct FakeTranscoder {
    inputs: Mutex<Vec<Vec<u8>>>,
}

impl FakeTranscoder {
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        lock(&self.inputs).clone()
    }
}

#[async_trait]
impl AudioTranscoder for FakeTranscoder {
    async fn ogg_to_mp3(&self, audio: Vec<u8>) -> Result<Vec<u8>, TranscodeError> {
        let mut out = b"mp3:".to_vec();
        out.extend_from_slice(&audio);
        lock(&self.inputs).push(audio);
        Ok(out)
    }
}

/// Keeps appended records in memory.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<WideLogRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<WideLogRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl WideLogSink for MemorySink {
    async fn append(&self, record: &WideLogRecord) -> std::io::Result<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }
}
