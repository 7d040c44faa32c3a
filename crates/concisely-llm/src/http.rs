//! HTTP backend abstraction for the OpenRouter API.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors; tests swap in [`testing::FakeBackend`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::config::OpenRouterConfig;
use crate::error::{OrError, OrResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Posts JSON and returns the decoded JSON response.
///
/// This is an implementation detail; external code goes through `LlmPort`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn post_json(&self, url: &Url, body: &Value) -> OrResult<Value>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Server errors (5xx) and network errors are retried with exponential
/// backoff; client errors (4xx) fail immediately with the response body.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_key: String,
    app_title: String,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &OpenRouterConfig) -> OrResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("concisely/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            app_title: config.app_title.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    fn build_request(&self, url: &Url, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(url.as_str())
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.app_title)
            .json(body)
    }

    /// Post with automatic retry for transient errors.
    async fn post_with_retry(&self, url: &Url, body: &Value) -> OrResult<reqwest::Response> {
        let mut attempt: u8 = 0;

        loop {
            let (failure, error) = match self.build_request(url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error = OrError::ApiRequestFailed {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    };
                    (Failure::Status(status.as_u16()), error)
                }
                Err(e) => (Failure::Network, OrError::from(e)),
            };

            match retry_decision(failure, attempt, self.max_retries, self.retry_base_delay) {
                RetryDecision::Retry(delay) => {
                    attempt += 1;
                    warn!("OpenRouter request failed ({error}), retry {attempt} in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => return Err(error),
            }
        }
    }
}

/// Why an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Status(u16),
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

/// Decide what follows failed attempt number `attempt` (0-based).
///
/// Server errors and network errors are retried until `max_retries` retries
/// have been made; anything else gives up at once.
fn retry_decision(failure: Failure, attempt: u8, max_retries: u8, base: Duration) -> RetryDecision {
    let retryable = match failure {
        Failure::Status(status) => (500..600).contains(&status),
        Failure::Network => true,
    };
    if retryable && attempt < max_retries {
        RetryDecision::Retry(backoff_delay(attempt, base))
    } else {
        RetryDecision::GiveUp
    }
}

/// Delay before the retry that follows attempt `attempt`: `base * 2^attempt`.
fn backoff_delay(attempt: u8, base: Duration) -> Duration {
    base.saturating_mul(1 << u32::from(attempt.min(16)))
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json(&self, url: &Url, body: &Value) -> OrResult<Value> {
        let response = self.post_with_retry(url, body).await?;
        let data: Value = response.json().await?;
        Ok(data)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::FakeBackend;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reqwest_backend_creation() {
        let config = OpenRouterConfig::new("secret").with_max_retries(4);
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.max_retries, 4);
        assert_eq!(backend.api_key, "secret");
        assert_eq!(backend.retry_base_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fake_backend_replays_in_order() {
        let backend = FakeBackend::new()
            .with_response(json!({"n": 1}))
            .with_error(500, "boom");
        let url = Url::parse("https://example.com/responses").unwrap();

        let first = backend.post_json(&url, &json!({"a": 1})).await.unwrap();
        assert_eq!(first["n"], 1);

        let second = backend.post_json(&url, &json!({"a": 2})).await;
        assert!(matches!(
            second,
            Err(OrError::ApiRequestFailed { status: 500, .. })
        ));

        assert_eq!(backend.requests().len(), 2);
        assert_eq!(backend.requests()[1].1["a"], 2);
    }

    const BASE: Duration = Duration::from_millis(100);

    #[test]
    fn test_server_errors_retry_with_doubling_delay() {
        let failure = Failure::Status(502);
        assert_eq!(
            retry_decision(failure, 0, 2, BASE),
            RetryDecision::Retry(Duration::from_millis(100))
        );
        assert_eq!(
            retry_decision(failure, 1, 2, BASE),
            RetryDecision::Retry(Duration::from_millis(200))
        );
        assert_eq!(retry_decision(failure, 2, 2, BASE), RetryDecision::GiveUp);
    }

    #[test]
    fn test_network_errors_retry() {
        assert_eq!(
            retry_decision(Failure::Network, 0, 2, BASE),
            RetryDecision::Retry(BASE)
        );
        assert_eq!(
            retry_decision(Failure::Network, 0, 0, BASE),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_client_errors_give_up_immediately() {
        for status in [400, 401, 402, 404, 429] {
            assert_eq!(
                retry_decision(Failure::Status(status), 0, 2, BASE),
                RetryDecision::GiveUp
            );
        }
    }

    #[test]
    fn test_backoff_delay_saturates() {
        assert_eq!(backoff_delay(3, BASE), Duration::from_millis(800));
        assert!(backoff_delay(u8::MAX, Duration::from_secs(u64::MAX)) > Duration::ZERO);
    }

    mod over_http {
        use super::*;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        /// Serve one canned response per connection, in order, counting hits.
        /// The last response repeats once the list runs out.
        async fn serve(responses: Vec<(u16, &'static str)>) -> (Url, Arc<AtomicUsize>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hits);

            tokio::spawn(async move {
                loop {
                    let Ok((mut stream, _)) = listener.accept().await else {
                        break;
                    };
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = responses[n.min(responses.len() - 1)];
                    read_request(&mut stream).await;
                    let reply = format!(
                        "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(reply.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
            });

            let url = Url::parse(&format!("http://{addr}/responses")).unwrap();
            (url, hits)
        }

        /// Read headers plus a `content-length` body.
        async fn read_request(stream: &mut tokio::net::TcpStream) {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let Ok(n) = stream.read(&mut chunk).await else {
                    return;
                };
                if n == 0 {
                    return;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        return;
                    }
                }
            }
        }

        fn backend(max_retries: u8) -> ReqwestBackend {
            let config = OpenRouterConfig::new("key")
                .with_max_retries(max_retries)
                .with_retry_delay(Duration::from_millis(1));
            ReqwestBackend::new(&config).unwrap()
        }

        #[tokio::test]
        async fn test_server_error_then_success() {
            let (url, hits) = serve(vec![(503, "{}"), (500, "{}"), (200, r#"{"ok":true}"#)]).await;

            let value = backend(2).post_json(&url, &json!({})).await.unwrap();

            assert_eq!(value["ok"], true);
            assert_eq!(hits.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_gives_up_after_max_retries() {
            let (url, hits) = serve(vec![(500, "overloaded")]).await;

            let err = backend(2).post_json(&url, &json!({})).await.unwrap_err();

            assert!(matches!(
                err,
                OrError::ApiRequestFailed { status: 500, ref body } if body == "overloaded"
            ));
            assert_eq!(hits.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_client_error_is_not_retried() {
            let (url, hits) = serve(vec![(401, "bad key"), (200, "{}")]).await;

            let err = backend(2).post_json(&url, &json!({})).await.unwrap_err();

            assert!(matches!(err, OrError::ApiRequestFailed { status: 401, .. }));
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }
    }
}
