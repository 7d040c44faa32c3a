//! Responses API request bodies and response parsing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use concisely_core::MediaPayload;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{OrError, OrResult};

/// Body for a plain text completion.
pub fn text_request(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "input": prompt,
    })
}

/// Body for a single user turn carrying a prompt and one media item.
pub fn media_request(model: &str, prompt: &str, media: &MediaPayload) -> Value {
    json!({
        "model": model,
        "input": [{
            "role": "user",
            "content": [
                {"type": "input_text", "text": prompt},
                media_item(media),
            ],
        }],
    })
}

fn media_item(media: &MediaPayload) -> Value {
    match media {
        MediaPayload::Image(bytes) => json!({
            "type": "input_image",
            "image_url": format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)),
        }),
        MediaPayload::Video(bytes) => json!({
            "type": "input_video",
            "video_url": format!("data:video/mp4;base64,{}", STANDARD.encode(bytes)),
        }),
        MediaPayload::Audio(bytes) => json!({
            "type": "input_audio",
            "input_audio": {"data": STANDARD.encode(bytes), "format": "mp3"},
        }),
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    /// USD, reported by OpenRouter
    pub cost: Option<f64>,
}

/// Text and usage extracted from a response.
#[derive(Debug)]
pub struct ParsedResponse {
    pub text: String,
    pub usage: Usage,
}

/// Extract output text and usage.
///
/// Prefers the top-level `output_text` convenience field; otherwise joins the
/// `output_text` parts of every message item.
pub fn parse_response(value: Value) -> OrResult<ParsedResponse> {
    let body: ResponseBody = serde_json::from_value(value)?;

    if let Some(error) = body.error.filter(|e| !e.is_null()) {
        return Err(OrError::InvalidResponse {
            message: format!("response carries an error: {error}"),
        });
    }

    let text = match body.output_text.filter(|t| !t.is_empty()) {
        Some(text) => text,
        None => body
            .output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<String>(),
    };

    if text.trim().is_empty() {
        return Err(OrError::InvalidResponse {
            message: "response contains no output text".to_string(),
        });
    }

    Ok(ParsedResponse {
        text,
        usage: body.usage.unwrap_or_default(),
    })
}
