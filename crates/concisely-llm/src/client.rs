//! OpenRouter client implementing the core `LlmPort`.

use async_trait::async_trait;
use concisely_core::{Completion, Description, LlmError, LlmPort, MediaPayload, ModelRoster};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::OpenRouterConfig;
use crate::error::OrResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::wire::{ParsedResponse, media_request, parse_response, text_request};

/// Default OpenRouter client using the reqwest HTTP backend.
pub type DefaultOpenRouterClient = OpenRouterClient<ReqwestBackend>;

/// Client for the OpenRouter Responses API.
///
/// Generic over the HTTP backend so tests can run without a network. Use
/// [`DefaultOpenRouterClient`] in production.
pub struct OpenRouterClient<B: HttpBackend> {
    backend: B,
    responses_url: Url,
    roster: ModelRoster,
}

impl DefaultOpenRouterClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &OpenRouterConfig) -> Result<Self, LlmError> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: HttpBackend> OpenRouterClient<B> {
    /// Create a client over a custom backend.
    pub(crate) fn with_backend(config: &OpenRouterConfig, backend: B) -> Result<Self, LlmError> {
        let responses_url = Url::parse(&config.responses_url())
            .map_err(|e| LlmError::Http(format!("invalid base URL {}: {e}", config.base_url)))?;
        Ok(Self {
            backend,
            responses_url,
            roster: config.roster.clone(),
        })
    }

    async fn create_response(&self, body: &Value) -> OrResult<ParsedResponse> {
        let value = self.backend.post_json(&self.responses_url, body).await?;
        parse_response(value)
    }
}

#[async_trait]
impl<B: HttpBackend> LlmPort for OpenRouterClient<B> {
    fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, LlmError> {
        debug!("Requesting completion from {model} ({} chars)", prompt.len());
        let parsed = self.create_response(&text_request(model, prompt)).await?;

        Ok(Completion {
            text: parsed.text,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            cost: parsed.usage.cost,
        })
    }

    async fn describe(
        &self,
        model: &str,
        prompt: &str,
        media: MediaPayload,
    ) -> Result<Description, LlmError> {
        debug!("Requesting media description from {model}");
        let parsed = self
            .create_response(&media_request(model, prompt, &media))
            .await?;

        Ok(Description {
            text: parsed.text,
            cost: parsed.usage.cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use serde_json::json;

    fn client(backend: FakeBackend) -> OpenRouterClient<FakeBackend> {
        let config = OpenRouterConfig::new("key").with_base_url("https://router.test/api/v1");
        OpenRouterClient::with_backend(&config, backend).unwrap()
    }

    fn message(text: &str) -> Value {
        json!({
            "output": [{"type": "message", "content": [{"type": "output_text", "text": text}]}],
            "usage": {"input_tokens": 1200, "output_tokens": 80, "cost": 0.015}
        })
    }

    #[tokio::test]
    async fn test_complete_returns_text_and_usage() {
        let client = client(FakeBackend::new().with_response(message("<b>Итоги</b>")));

        let completion = client
            .complete("anthropic/claude-opus-4.5", "summarize")
            .await
            .unwrap();

        assert_eq!(completion.text, "<b>Итоги</b>");
        assert_eq!(completion.input_tokens, Some(1200));
        assert_eq!(completion.output_tokens, Some(80));
        assert_eq!(completion.cost, Some(0.015));

        let requests = client.backend.requests();
        assert_eq!(requests[0].0, "https://router.test/api/v1/responses");
        assert_eq!(requests[0].1["model"], "anthropic/claude-opus-4.5");
        assert_eq!(requests[0].1["input"], "summarize");
    }

    #[tokio::test]
    async fn test_describe_sends_media_item() {
        let client = client(FakeBackend::new().with_response(message("a cat")));

        let description = client
            .describe(
                "google/gemini-3-flash-preview",
                "what is it?",
                MediaPayload::Audio(vec![1, 2, 3]),
            )
            .await
            .unwrap();

        assert_eq!(description.text, "a cat");
        assert_eq!(description.cost, Some(0.015));
        let body = &client.backend.requests()[0].1;
        assert_eq!(body["input"][0]["content"][1]["type"], "input_audio");
    }

    #[tokio::test]
    async fn test_http_error_maps_to_api_error() {
        let client = client(FakeBackend::new().with_error(401, "bad key"));

        let err = client.complete("m", "p").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, ref body } if body == "bad key"));
    }

    #[tokio::test]
    async fn test_empty_output_is_invalid_response() {
        let client = client(FakeBackend::new().with_response(json!({"output": []})));

        let err = client.complete("m", "p").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = OpenRouterConfig::new("key").with_base_url("not a url");
        assert!(OpenRouterClient::with_backend(&config, FakeBackend::new()).is_err());
    }

    #[test]
    fn test_roster_comes_from_config() {
        let client = client(FakeBackend::new());
        assert_eq!(client.roster().summary_models.len(), 6);
    }
}
