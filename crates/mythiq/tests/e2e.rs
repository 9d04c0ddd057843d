// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios over the complete pipeline.
//!
//! Each test builds an isolated harness from a TOML configuration. Provider
//! traffic goes to local wiremock servers through the real HTTP adapters.

use std::sync::Arc;

use mythiq_anthropic::AnthropicProvider;
use mythiq_config::MythiqConfig;
use mythiq_config::model::ProviderKind;
use mythiq_core::{KnowledgeStore, ProviderAdapter, ServedBy, UserId};
use mythiq_openai::OpenAiProvider;
use mythiq_test_utils::TestHarness;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OFFLINE: &str = "Mythiq is offline right now.";

fn config(groq_url: &str, claude_url: &str) -> MythiqConfig {
    let toml = format!(
        r#"
[storage]
backend = "memory"

[gateway]
fallback_text = "{OFFLINE}"

[[providers]]
name = "groq"
kind = "openai"
base_url = "{groq_url}"
model = "llama3-8b-8192"
api_key = "gsk-test"

[[providers]]
name = "claude"
kind = "anthropic"
base_url = "{claude_url}"
model = "claude-3-haiku-20240307"
api_key = "sk-ant-test"
"#
    );
    mythiq_config::load_and_validate_str(&toml).expect("test config should be valid")
}

/// Harness whose providers are the real adapters described by `config`.
async fn harness(config: MythiqConfig) -> TestHarness {
    let mut builder = TestHarness::builder().with_config(config.clone());
    for provider in &config.providers {
        let key = provider.resolve_api_key().expect("inline key");
        let adapter: Arc<dyn ProviderAdapter> = match provider.kind {
            ProviderKind::Openai => Arc::new(OpenAiProvider::new(provider, &key).unwrap()),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(provider, &key).unwrap()),
        };
        builder = builder.provider(adapter);
    }
    builder.build().await.unwrap()
}

async fn failing_server(route: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": {"type": "overloaded_error", "message": "try again later"}
        })))
        .mount(&server)
        .await;
    server
}

async fn claude_replying(text: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_claude_reply(&server, text).await;
    server
}

async fn mount_claude_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-haiku-20240307",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn remembered_interest_is_recalled_without_any_provider() {
    let harness = TestHarness::builder().build().await.unwrap();

    let first = harness
        .chat("reader", "Remember that I love science fiction")
        .await
        .unwrap();
    assert_eq!(first.learned.len(), 1);

    let second = harness
        .chat("reader", "What do you know about my interests?")
        .await
        .unwrap();
    assert_eq!(second.served_by, ServedBy::LocalFallback);
    assert!(second.response.contains("science fiction"), "got: {}", second.response);
}

#[tokio::test]
async fn unreachable_providers_yield_the_configured_fallback() {
    let groq = failing_server("/chat/completions", 500).await;
    let claude = failing_server("/messages", 529).await;
    let harness = harness(config(&groq.uri(), &claude.uri())).await;

    let reply = harness.chat("u1", "Tell me something fun").await.unwrap();
    assert_eq!(reply.response, OFFLINE);
    assert!(reply.served_by.is_fallback());

    let status = harness.orchestrator().status().await;
    let failures: Vec<u32> = status.providers.iter().map(|p| p.consecutive_failures).collect();
    assert_eq!(failures, vec![1, 1]);

    let turns = harness.store().recent_turns(&UserId::new("u1"), 5).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].provider_used, ServedBy::LocalFallback);
}

#[tokio::test]
async fn second_provider_answers_when_the_first_is_down() {
    let groq = failing_server("/chat/completions", 503).await;
    let claude = claude_replying("Hello from Claude").await;
    let harness = harness(config(&groq.uri(), &claude.uri())).await;

    let reply = harness.chat("u1", "My name is Ada").await.unwrap();
    assert_eq!(reply.response, "Hello from Claude");
    assert_eq!(reply.served_by, ServedBy::Provider("claude".into()));

    let user = UserId::new("u1");
    let turns = harness.store().recent_turns(&user, 5).await.unwrap();
    assert_eq!(turns[0].provider_used.to_string(), "claude");
    assert_eq!(harness.store().get_facts(&user).await.unwrap()["name"], "Ada");
}

#[tokio::test]
async fn facts_survive_a_full_outage_and_reach_the_provider_later() {
    let groq = failing_server("/chat/completions", 500).await;
    let claude = failing_server("/messages", 500).await;
    let harness = harness(config(&groq.uri(), &claude.uri())).await;

    harness.chat("u1", "I prefer short answers").await.unwrap();
    let recall = harness.chat("u1", "What do you remember about me?").await.unwrap();
    assert!(recall.served_by.is_fallback());
    assert!(recall.response.contains("short answers"), "got: {}", recall.response);

    claude.reset().await;
    mount_claude_reply(&claude, "Sure.").await;
    let reply = harness.chat("u1", "Explain tides").await.unwrap();
    assert_eq!(reply.served_by, ServedBy::Provider("claude".into()));

    let requests = claude.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["system"].as_str().unwrap_or_default();
    assert!(system.contains("- style: short answers"), "got: {system}");
}
