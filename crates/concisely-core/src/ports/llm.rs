//! LLM provider port.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Models used for summaries and media descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    /// Candidates for summaries; one is picked at random per summary.
    pub summary_models: Vec<String>,
    pub image_model: String,
    pub video_model: String,
    pub voice_model: String,
}

impl Default for ModelRoster {
    fn default() -> Self {
        let flash = "google/gemini-3-flash-preview".to_string();
        Self {
            summary_models: [
                "anthropic/claude-opus-4.6",
                "anthropic/claude-opus-4.5",
                "anthropic/claude-sonnet-4.5",
                "google/gemini-3-pro-preview",
                "google/gemini-2.5-pro",
                "google/gemini-3-flash-preview",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            image_model: flash.clone(),
            video_model: flash.clone(),
            voice_model: flash,
        }
    }
}

impl ModelRoster {
    /// Pick a summary model uniformly at random.
    ///
    /// Falls back to the image model when no summary models are configured.
    pub fn pick_summary_model(&self) -> &str {
        self.summary_models
            .choose(&mut rand::thread_rng())
            .map_or(self.image_model.as_str(), String::as_str)
    }
}

/// Binary media sent alongside a describe prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    /// JPEG image bytes.
    Image(Vec<u8>),
    /// MP4 video bytes.
    Video(Vec<u8>),
    /// MP3 audio bytes.
    Audio(Vec<u8>),
}

/// Result of a text completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    /// Provider-reported cost in USD.
    pub cost: Option<f64>,
}

/// Result of describing a piece of media.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub text: String,
    pub cost: Option<f64>,
}

/// Errors from the LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Models this provider is configured with.
    fn roster(&self) -> &ModelRoster;

    /// Complete a plain text prompt.
    async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, LlmError>;

    /// Describe a piece of media, guided by `prompt`.
    async fn describe(
        &self,
        model: &str,
        prompt: &str,
        media: MediaPayload,
    ) -> Result<Description, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_summary_model_is_from_roster() {
        let roster = ModelRoster::default();
        for _ in 0..20 {
            let model = roster.pick_summary_model();
            assert!(roster.summary_models.iter().any(|m| m == model));
        }
    }

    #[test]
    fn test_pick_summary_model_empty_roster_falls_back() {
        let roster = ModelRoster {
            summary_models: Vec::new(),
            ..ModelRoster::default()
        };
        assert_eq!(roster.pick_summary_model(), "google/gemini-3-flash-preview");
    }
}
