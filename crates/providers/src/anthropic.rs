//! Anthropic exact token counter.
//!
//! Uses the Messages API `count_tokens` endpoint, which prices a request
//! with the model's real tokenizer without running inference.
//!
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - Single request per call, no retries: the cost estimator falls back
//!   to its approximation on any error

use async_trait::async_trait;
use dailybrief_core::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exact token counter backed by Anthropic's `count_tokens` endpoint.
pub struct AnthropicTokenCounter {
    name: String,
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicTokenCounter {
    /// Create a new counter with the default base URL and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            client: Self::build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = Self::build_client(timeout);
        self
    }

    fn build_client(timeout: Duration) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    fn request_body<'a>(model: &'a str, text: &'a str) -> CountTokensRequest<'a> {
        CountTokensRequest {
            model,
            messages: vec![CountMessage {
                role: "user",
                content: text,
            }],
        }
    }
}

#[async_trait]
impl dailybrief_core::TokenCounter for AnthropicTokenCounter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count_tokens(&self, model: &str, text: &str) -> Result<usize, ProviderError> {
        let url = format!("{}/v1/messages/count_tokens", self.base_url);
        let body = Self::request_body(model, text);

        debug!(counter = "anthropic", model = %model, chars = text.len(), "Counting tokens");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!(
                        "count_tokens timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic count_tokens error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: CountTokensResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse count_tokens response: {e}"),
            })?;

        Ok(parsed.input_tokens as usize)
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct CountTokensRequest<'a> {
    model: &'a str,
    messages: Vec<CountMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CountMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CountTokensResponse {
    input_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailybrief_core::TokenCounter;

    #[test]
    fn constructor() {
        let counter = AnthropicTokenCounter::new("sk-ant-test");
        assert_eq!(counter.name(), "anthropic");
        assert_eq!(counter.base_url, DEFAULT_BASE_URL);
        assert_eq!(counter.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn constructor_with_base_url() {
        let counter =
            AnthropicTokenCounter::new("sk-ant-test").with_base_url("https://custom.proxy.com/");
        assert_eq!(counter.base_url, "https://custom.proxy.com");
    }

    #[test]
    fn request_body_shape() {
        let body = AnthropicTokenCounter::request_body("claude-sonnet-4", "hello there");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello there");
    }

    #[test]
    fn parse_count_response() {
        let resp: CountTokensResponse = serde_json::from_str(r#"{"input_tokens": 1234}"#).unwrap();
        assert_eq!(resp.input_tokens, 1234);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let counter = AnthropicTokenCounter::new("sk-ant-test")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let result = counter.count_tokens("claude-sonnet-4", "hi").await;
        assert!(result.is_err());
    }
}
