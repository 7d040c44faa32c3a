//! Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use concisely_core::{ChatGateway, GatewayError, ParseMode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::wire::{ApiResponse, File};

/// Default Bot API host.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Configuration for [`TelegramClient`].
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub(crate) token: String,
    pub(crate) api_base: String,
    /// Timeout for regular calls; long polls add their own wait on top.
    pub(crate) timeout: Duration,
}

impl TelegramConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Point at a different Bot API server (e.g. a local one).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin client over the Telegram Bot API.
pub struct TelegramClient {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("concisely/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;
        Ok(Self { http, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_base, self.config.token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{file_path}",
            self.config.api_base, self.config.token
        )
    }

    /// Call a Bot API method and unwrap its envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        // Error envelopes come with non-2xx statuses, so parse regardless
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            GatewayError::InvalidResponse(format!("{method} returned {status}: {}", e.without_url()))
        })?;

        unwrap_envelope(method, envelope)
    }

    /// Fetch pending updates.
    ///
    /// Updates are returned as raw JSON so a malformed one can be skipped
    /// without losing the rest of the batch.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let wait = self.config.timeout + Duration::from_secs(u64::from(timeout_secs));
        self.call("getUpdates", &body, wait).await
    }

    /// Look up a file's download path.
    pub async fn get_file(&self, file_id: &str) -> Result<File, GatewayError> {
        self.call("getFile", &json!({ "file_id": file_id }), self.config.timeout)
            .await
    }
}

#[async_trait]
impl ChatGateway for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), GatewayError> {
        let body = send_message_body(chat_id, text, mode);
        let _: Value = self.call("sendMessage", &body, self.config.timeout).await?;
        debug!("Sent {} chars to chat {chat_id}", text.chars().count());
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, GatewayError> {
        let file = self.get_file(file_id).await?;
        let path = file.file_path.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("file {file_id} has no download path"))
        })?;

        let response = self
            .http
            .get(self.file_url(&path))
            .timeout(self.config.timeout * 4)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Api {
                code: Some(i64::from(status.as_u16())),
                description: format!("download of {file_id} failed"),
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        debug!("Downloaded {file_id} ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }
}

fn send_message_body(chat_id: i64, text: &str, mode: ParseMode) -> Value {
    let mut body = json!({ "chat_id": chat_id, "text": text });
    if mode == ParseMode::Html {
        body["parse_mode"] = json!("HTML");
    }
    body
}

fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T, GatewayError> {
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { ok: true, .. } => Err(GatewayError::InvalidResponse(format!(
            "{method} returned ok without a result"
        ))),
        ApiResponse {
            description,
            error_code,
            ..
        } => Err(GatewayError::Api {
            code: error_code,
            description: description.unwrap_or_else(|| format!("{method} failed")),
        }),
    }
}

/// Transport errors carry the request URL, which embeds the bot token.
fn transport_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Http(e.without_url().to_string())
}
