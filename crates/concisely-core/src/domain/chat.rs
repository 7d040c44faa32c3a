//! Per-chat summary settings.

use std::collections::HashMap;

/// Number of messages between summaries when a chat doesn't set its own.
pub const DEFAULT_SUMMARY_INTERVAL: i64 = 500;

/// The set of tracked chats and their summary intervals.
///
/// Only chats listed here are recorded and summarized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSettings {
    intervals: HashMap<i64, i64>,
}

impl ChatSettings {
    /// Build settings from `(chat_id, interval)` pairs.
    ///
    /// A missing or non-positive interval falls back to
    /// [`DEFAULT_SUMMARY_INTERVAL`].
    pub fn new(entries: impl IntoIterator<Item = (i64, Option<i64>)>) -> Self {
        let intervals = entries
            .into_iter()
            .map(|(chat_id, interval)| {
                let interval = interval
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_SUMMARY_INTERVAL);
                (chat_id, interval)
            })
            .collect();
        Self { intervals }
    }

    /// Parse the chats file: a JSON object of chat id strings to an interval
    /// or `null`.
    ///
    /// ```
    /// use concisely_core::ChatSettings;
    ///
    /// let settings = ChatSettings::from_json(r#"{"-100123": 300, "-100456": null}"#).unwrap();
    /// assert_eq!(settings.interval_for(-100123), 300);
    /// assert_eq!(settings.interval_for(-100456), 500);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ChatSettingsError> {
        let raw: HashMap<String, Option<i64>> =
            serde_json::from_str(json).map_err(|e| ChatSettingsError::Parse(e.to_string()))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (key, interval) in raw {
            let chat_id = key
                .trim()
                .parse::<i64>()
                .map_err(|_| ChatSettingsError::InvalidChatId(key.clone()))?;
            entries.push((chat_id, interval));
        }
        Ok(Self::new(entries))
    }

    /// Whether messages from this chat should be handled at all.
    pub fn is_tracked(&self, chat_id: i64) -> bool {
        self.intervals.contains_key(&chat_id)
    }

    /// Summary interval for a chat.
    pub fn interval_for(&self, chat_id: i64) -> i64 {
        self.intervals
            .get(&chat_id)
            .copied()
            .unwrap_or(DEFAULT_SUMMARY_INTERVAL)
    }

    /// Tracked chat ids, sorted.
    pub fn chat_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.intervals.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Errors raised while parsing chat settings.
#[derive(Debug, thiserror::Error)]
pub enum ChatSettingsError {
    #[error("Invalid chats file: {0}")]
    Parse(String),

    #[error("Invalid chat id: {0}")]
    InvalidChatId(String),
}
