//! Audio transcoding port.
//!
//! Voice notes arrive as OGG/Opus, which the LLM provider doesn't accept.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The transcoder binary could not be started (usually not on `PATH`).
    #[error("Failed to start transcoder: {0}")]
    Spawn(String),

    #[error("Transcoder I/O error: {0}")]
    Io(String),

    /// The transcoder exited non-zero; carries its stderr.
    #[error("Transcoding failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Convert OGG audio to MP3.
    async fn ogg_to_mp3(&self, audio: Vec<u8>) -> Result<Vec<u8>, TranscodeError>;
}
