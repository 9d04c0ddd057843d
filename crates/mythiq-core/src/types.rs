// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the adapter traits and the orchestration core.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identity token of a conversation partner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Configured name of an external AI provider (e.g. `groq`, `claude`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// The closed set of emotional categories the classifier can assign.
///
/// Declaration order matters: it breaks ties between equally scored
/// categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Neutral,
    Curious,
    Excited,
    Grateful,
    Frustrated,
    Confused,
    Happy,
    Creative,
    Analytical,
    Playful,
    Sad,
    Anxious,
}

impl Emotion {
    /// All categories in declaration order.
    pub const ALL: [Emotion; 12] = [
        Emotion::Neutral,
        Emotion::Curious,
        Emotion::Excited,
        Emotion::Grateful,
        Emotion::Frustrated,
        Emotion::Confused,
        Emotion::Happy,
        Emotion::Creative,
        Emotion::Analytical,
        Emotion::Playful,
        Emotion::Sad,
        Emotion::Anxious,
    ];

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Fixed categories of the Preference specialization of a [`Fact`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PreferenceCategory {
    Likes,
    Dislikes,
    Style,
}

impl PreferenceCategory {
    /// Returns the category a fact key belongs to, if it is a preference key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::from_str(key).ok()
    }
}

/// A single learned key/value item attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub user_id: UserId,
    pub key: String,
    pub value: String,
    pub learned_at: DateTime<Utc>,
    /// Turn during which the fact was learned.
    pub source_turn: u64,
}

impl Fact {
    /// The preference category, when this fact is a preference.
    pub fn preference(&self) -> Option<PreferenceCategory> {
        PreferenceCategory::from_key(&self.key)
    }
}

/// Sentinel recorded when no provider served the request.
pub const LOCAL_FALLBACK_SENTINEL: &str = "local-fallback";

/// Which path ultimately produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ServedBy {
    Provider(ProviderId),
    LocalFallback,
}

impl ServedBy {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::LocalFallback)
    }
}

impl fmt::Display for ServedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(id) => f.write_str(id.as_str()),
            Self::LocalFallback => f.write_str(LOCAL_FALLBACK_SENTINEL),
        }
    }
}

impl From<String> for ServedBy {
    fn from(s: String) -> Self {
        if s == LOCAL_FALLBACK_SENTINEL {
            Self::LocalFallback
        } else {
            Self::Provider(ProviderId(s))
        }
    }
}

impl From<ServedBy> for String {
    fn from(s: ServedBy) -> Self {
        s.to_string()
    }
}

/// One request/response exchange. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_id: UserId,
    /// Monotonically increasing per user, starting at 1.
    pub turn_id: u64,
    pub input_text: String,
    pub detected_emotion: Emotion,
    pub provider_used: ServedBy,
    pub output_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counts exposed for operational visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub fact_count: u64,
    pub turn_count: u64,
    pub distinct_users: u64,
}

/// A single `ask` request handed to a provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    /// Upper bound the adapter applies to its own transport.
    pub timeout: Duration,
}
