// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for the Mythiq provider gateway.
//!
//! Speaks the `/chat/completions` protocol with bearer authentication, which
//! covers OpenAI itself and compatible services such as Groq. One instance
//! corresponds to one `[[providers]]` entry with `kind = "openai"`.

pub mod client;
pub mod types;

use async_trait::async_trait;
use mythiq_config::model::ProviderConfig;
use mythiq_core::error::MythiqError;
use mythiq_core::traits::{PluginAdapter, ProviderAdapter};
use mythiq_core::types::{AdapterType, HealthStatus, ProviderRequest};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

/// OpenAI-compatible provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    name: String,
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// Creates a provider for `config` using an already-resolved API key.
    pub fn new(config: &ProviderConfig, api_key: &str) -> Result<Self, MythiqError> {
        let client = OpenAiClient::new(&config.name, api_key, config.base_url())?;

        info!(
            provider = %config.name,
            model = %config.model,
            base_url = %config.base_url(),
            "OpenAI-compatible provider initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn to_chat_request(&self, request: &ProviderRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
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
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MythiqError> {
        debug!(provider = %self.name, "OpenAI-compatible provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn ask(&self, request: &ProviderRequest) -> Result<String, MythiqError> {
        let chat_request = self.to_chat_request(request);
        let response = self.client.complete(&chat_request, request.timeout).await?;

        let text = response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MythiqError::rejected(&self.name, "response contained no text"))?
            .to_string();
        debug!(
            provider = %self.name,
            model = response.model.as_deref().unwrap_or(&self.model),
            "chat completion received"
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
            name: "groq".into(),
            kind: ProviderKind::Openai,
            base_url: Some(base_url.to_string()),
            model: "llama3-8b-8192".into(),
            api_key: None,
            api_key_env: Some("GROQ_API_KEY".into()),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_ms: Some(15_000),
            enabled: true,
        }
    }

    fn request(system: Option<&str>) -> ProviderRequest {
        ProviderRequest {
            system_prompt: system.map(str::to_string),
            prompt: "Hello".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn system_prompt_becomes_first_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3-8b-8192",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3-8b-8192",
                "choices": [{"message": {"role": "assistant", "content": "  Hi!  "}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&config(&server.uri()), "gsk").unwrap();
        assert_eq!(provider.ask(&request(Some("Be brief."))).await.unwrap(), "Hi!");
    }

    #[tokio::test]
    async fn without_system_prompt_only_user_message_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&config(&server.uri()), "gsk").unwrap();
        assert_eq!(provider.ask(&request(None)).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn empty_choices_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&config(&server.uri()), "gsk").unwrap();
        let err = provider.ask(&request(None)).await.unwrap_err();
        assert!(err.to_string().contains("no text"), "got: {err}");
    }
}
