// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the Mythiq provider gateway.
//!
//! This crate implements [`ProviderAdapter`] for the Anthropic Messages API.
//! One instance corresponds to one `[[providers]]` entry with
//! `kind = "anthropic"`.

pub mod client;
pub mod types;

use async_trait::async_trait;
use mythiq_config::model::ProviderConfig;
use mythiq_core::error::MythiqError;
use mythiq_core::traits::{PluginAdapter, ProviderAdapter};
use mythiq_core::types::{AdapterType, HealthStatus, ProviderRequest};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Anthropic Claude provider implementing [`ProviderAdapter`].
pub struct AnthropicProvider {
    name: String,
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    /// Creates a provider for `config` using an already-resolved API key.
    pub fn new(config: &ProviderConfig, api_key: &str) -> Result<Self, MythiqError> {
        let client = AnthropicClient::new(&config.name, api_key, config.base_url())?;

        info!(
            provider = %config.name,
            model = %config.model,
            "Anthropic provider initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn to_message_request(&self, request: &ProviderRequest) -> MessageRequest {
        MessageRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
            system: request.system_prompt.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MythiqError> {
        // Avoid spending tokens on health checks; the gateway tracks real health.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MythiqError> {
        debug!(provider = %self.name, "Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn ask(&self, request: &ProviderRequest) -> Result<String, MythiqError> {
        let api_request = self.to_message_request(request);
        let response = self
            .client
            .complete_message(&api_request, request.timeout)
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(MythiqError::rejected(&self.name, "response contained no text"));
        }
        debug!(
            provider = %self.name,
            model = %response.model,
            stop_reason = ?response.stop_reason,
            "Anthropic reply received"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use mythiq_config::model::ProviderKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            name: "claude".into(),
            kind: ProviderKind::Anthropic,
            base_url: Some(base_url.to_string()),
            model: "claude-3-haiku-20240307".into(),
            api_key: Some("test-key".into()),
            api_key_env: None,
            max_tokens: 1000,
            temperature: 0.7,
            timeout_ms: None,
            enabled: true,
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            system_prompt: Some("You are Mythiq.".into()),
            prompt: "Hello".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn ask_returns_text_and_sends_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "system": "You are Mythiq.",
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "Hi!"}],
                "model": "claude-3-haiku-20240307",
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config(&server.uri()), "test-key").unwrap();
        assert_eq!(provider.name(), "claude");
        assert_eq!(provider.id().as_str(), "claude");
        assert_eq!(provider.ask(&request()).await.unwrap(), "Hi!");
    }

    #[tokio::test]
    async fn empty_reply_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "content": [],
                "model": "claude-3-haiku-20240307"
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config(&server.uri()), "test-key").unwrap();
        let err = provider.ask(&request()).await.unwrap_err();
        assert!(matches!(err, MythiqError::ProviderRejected { .. }));
    }

    #[test]
    fn invalid_key_is_config_error() {
        let result = AnthropicProvider::new(&config("http://localhost"), "bad\nkey");
        assert!(matches!(result, Err(MythiqError::Config(_))));
    }
}
