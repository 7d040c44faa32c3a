//! Wide log records: one structured event per handled message.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::SummaryOutcome;

/// Milliseconds elapsed since `start`, rounded to two decimals.
pub fn elapsed_ms(start: Instant) -> f64 {
    round_ms(start.elapsed().as_secs_f64() * 1000.0)
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// Named step timings, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timings(BTreeMap<String, f64>);

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time elapsed since `start` under `key`, returning it.
    pub fn record(&mut self, key: &str, start: Instant) -> f64 {
        let ms = elapsed_ms(start);
        self.0.insert(key.to_string(), ms);
        ms
    }

    /// Record an already measured duration.
    pub fn insert(&mut self, key: &str, ms: f64) {
        self.0.insert(key.to_string(), round_ms(ms));
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Fold another set of timings into this one.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything that happened while handling one message.
#[derive(Debug, Clone, Serialize)]
pub struct WideLogRecord {
    pub timestamp: DateTime<Utc>,
    /// `"{chat_id}:{message_id}"`
    pub request_id: String,
    /// Raw update payload as received.
    pub message: serde_json::Value,
    pub timings_ms: Timings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub describe_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl WideLogRecord {
    pub fn new(request_id: String, message: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id,
            message,
            timings_ms: Timings::new(),
            attachment_description: None,
            describe_cost: None,
            summary: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
