//! Public configuration for the OpenRouter client.

use std::time::Duration;

use concisely_core::ModelRoster;

/// Default OpenRouter API root.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for the OpenRouter client.
///
/// # Example
///
/// ```
/// use concisely_llm::OpenRouterConfig;
/// use std::time::Duration;
///
/// let config = OpenRouterConfig::new("sk-or-...")
///     .with_timeout(Duration::from_secs(60))
///     .with_max_retries(1);
/// ```
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API root; requests go to `{base_url}/responses`
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    /// Sent as `X-Title` so usage shows up under this app on OpenRouter
    pub(crate) app_title: String,
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    pub(crate) roster: ModelRoster,
}

impl OpenRouterConfig {
    /// Create a configuration with default settings and the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            app_title: "concisely".to_string(),
            // Multimodal calls on long video notes can take a while
            timeout: Duration::from_secs(180),
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
            roster: ModelRoster::default(),
        }
    }

    /// Set the API root.
    ///
    /// Defaults to `https://openrouter.ai/api/v1`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 180 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 2 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 1s.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Replace the model roster.
    #[must_use]
    pub fn with_roster(mut self, roster: ModelRoster) -> Self {
        self.roster = roster;
        self
    }

    /// Full URL of the Responses endpoint.
    pub(crate) fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenRouterConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "key");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.roster, ModelRoster::default());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OpenRouterConfig::new("key")
            .with_base_url("http://localhost:8080/v1/")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(0)
            .with_retry_delay(Duration::from_millis(10));

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_base_delay, Duration::from_millis(10));
        assert_eq!(config.responses_url(), "http://localhost:8080/v1/responses");
    }

    #[test]
    fn test_responses_url_default() {
        assert_eq!(
            OpenRouterConfig::new("k").responses_url(),
            "https://openrouter.ai/api/v1/responses"
        );
    }
}
