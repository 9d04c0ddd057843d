// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication and mapping of HTTP outcomes onto provider errors.

use std::time::Duration;

use mythiq_core::{MythiqError, upstream_excerpt};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Anthropic API version sent with every request.
pub const API_VERSION: &str = "2023-06-01";

/// HTTP client for Anthropic API communication.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    provider: String,
    endpoint: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// `provider` names the configured provider in errors; `base_url` is the
    /// API root, `/messages` is appended.
    pub fn new(provider: &str, api_key: &str, base_url: &str) -> Result<Self, MythiqError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| MythiqError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MythiqError::ProviderRejected {
                provider: provider.to_string(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            provider: provider.to_string(),
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming request and returns the full response.
    ///
    /// No retries: a failed call is reported once and the gateway moves on.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
        timeout: Duration,
    ) -> Result<MessageResponse, MythiqError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;

        let status = response.status();
        debug!(provider = %self.provider, status = %status, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_,
                    upstream_excerpt(&api_err.error.message)
                ),
                Err(_) => format!("API returned {status}: {}", upstream_excerpt(&body)),
            };
            return Err(MythiqError::rejected(&self.provider, message));
        }

        serde_json::from_str(&body).map_err(|e| MythiqError::ProviderRejected {
            provider: self.provider.clone(),
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn transport_error(&self, err: reqwest::Error, timeout: Duration) -> MythiqError {
        if err.is_timeout() {
            MythiqError::ProviderTimeout {
                provider: self.provider.clone(),
                duration: timeout,
            }
        } else {
            MythiqError::ProviderRejected {
                provider: self.provider.clone(),
                message: format!("HTTP request failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-3-haiku-20240307".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            system: None,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }

    fn ok_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-3-haiku-20240307",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[test]
    fn endpoint_appends_messages_path() {
        let client = AnthropicClient::new("claude", "k", "https://api.anthropic.com/v1/").unwrap();
        assert_eq!(client.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[tokio::test]
    async fn complete_message_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Hi there!")))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("claude", "test-api-key", &server.uri()).unwrap();
        let result = client
            .complete_message(&test_request(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.text(), "Hi there!");
    }

    #[tokio::test]
    async fn non_success_is_rejected_without_retry() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Service overloaded"}
        });
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("claude", "k", &server.uri()).unwrap();
        let err = client
            .complete_message(&test_request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MythiqError::ProviderRejected { .. }));
        assert!(err.to_string().contains("overloaded_error"), "got: {err}");
    }

    #[tokio::test]
    async fn long_api_error_message_is_cut_short() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "invalid_request_error", "message": "x".repeat(5_000)}
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::new("claude", "k", &server.uri()).unwrap();
        let err = client
            .complete_message(&test_request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid_request_error"), "got: {message}");
        assert!(message.ends_with("... (4800 more chars)"), "got: {message}");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AnthropicClient::new("claude", "k", &server.uri()).unwrap();
        let err = client
            .complete_message(&test_request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "got: {err}");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = AnthropicClient::new("claude", "k", &server.uri()).unwrap();
        let err = client
            .complete_message(&test_request(), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(
            matches!(err, MythiqError::ProviderTimeout { ref provider, .. } if provider == "claude"),
            "got: {err:?}"
        );
    }
}
