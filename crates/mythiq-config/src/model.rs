// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Mythiq configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MythiqConfig {
    /// Identity and request bounds.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Knowledge Store backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Provider Gateway fallback and circuit-breaker tuning.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Fact extraction and deferred write settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// External providers in priority order.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for MythiqConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
            learning: LearningConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Agent identity and inbound request bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in the default system prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt. Replaces the built-in prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Number of recent turns included in each prompt.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Upper bound on inbound message length, in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Upper bound on user identity length, in characters.
    #[serde(default = "default_max_user_id_chars")]
    pub max_user_id_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            history_turns: default_history_turns(),
            max_message_chars: default_max_message_chars(),
            max_user_id_chars: default_max_user_id_chars(),
        }
    }
}

fn default_agent_name() -> String {
    "mythiq".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_turns() -> usize {
    5
}

fn default_max_message_chars() -> usize {
    8000
}

fn default_max_user_id_chars() -> usize {
    128
}

/// Which Knowledge Store implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable SQLite database.
    #[default]
    Sqlite,
    /// Process-local maps; nothing survives a restart.
    Memory,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mythiq").join("mythiq.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "mythiq.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Provider Gateway tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Consecutive failures that open a provider's circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// How long an open circuit stays open before a half-open probe.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Default per-call bound, used when a provider sets no `timeout_ms`.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Designated local response when every provider fails.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

impl GatewayConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
            call_timeout_ms: default_call_timeout_ms(),
            fallback_text: default_fallback_text(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_fallback_text() -> String {
    "I'm experiencing some technical difficulties, but I'm still here to help! 🤖".to_string()
}

/// Fact learning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Run the extraction rules on every message.
    #[serde(default = "default_learning_enabled")]
    pub enabled: bool,

    /// Longest fact value kept, in characters.
    #[serde(default = "default_max_value_chars")]
    pub max_value_chars: usize,

    /// Batches of failed writes kept for retry.
    #[serde(default = "default_deferred_capacity")]
    pub deferred_capacity: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: default_learning_enabled(),
            max_value_chars: default_max_value_chars(),
            deferred_capacity: default_deferred_capacity(),
        }
    }
}

fn default_learning_enabled() -> bool {
    true
}

fn default_max_value_chars() -> usize {
    200
}

fn default_deferred_capacity() -> usize {
    256
}

/// Wire protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI-compatible chat completions (OpenAI, Groq, ...).
    Openai,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Openai => "https://api.openai.com/v1",
        }
    }
}

/// One entry of the `[[providers]]` priority list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Unique name, used in logs, health snapshots and turn records.
    pub name: String,

    pub kind: ProviderKind,

    /// API root. Defaults to the kind's public endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    pub model: String,

    /// Inline API key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_provider_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-provider call bound overriding `gateway.call_timeout_ms`.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default = "default_provider_enabled")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }

    /// Inline key first, then the named environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Some(key.to_string());
        }
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self, default: Duration) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or(default)
    }
}

fn default_provider_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_provider_enabled() -> bool {
    true
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "groq".to_string(),
            kind: ProviderKind::Openai,
            base_url: Some("https://api.groq.com/openai/v1".to_string()),
            model: "llama3-8b-8192".to_string(),
            api_key: None,
            api_key_env: Some("GROQ_API_KEY".to_string()),
            max_tokens: default_provider_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: Some(15_000),
            enabled: true,
        },
        ProviderConfig {
            name: "claude".to_string(),
            kind: ProviderKind::Anthropic,
            base_url: None,
            model: "claude-3-haiku-20240307".to_string(),
            api_key: None,
            api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
            max_tokens: default_provider_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: None,
            enabled: true,
        },
        ProviderConfig {
            name: "openai".to_string(),
            kind: ProviderKind::Openai,
            base_url: None,
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            max_tokens: default_provider_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: None,
            enabled: true,
        },
    ]
}
