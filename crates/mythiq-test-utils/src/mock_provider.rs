// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted outcomes, so
//! gateway and orchestrator tests run without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mythiq_core::traits::adapter::PluginAdapter;
use mythiq_core::traits::provider::ProviderAdapter;
use mythiq_core::types::{AdapterType, HealthStatus, ProviderRequest};
use mythiq_core::MythiqError;

/// What a single call to a [`MockProvider`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Return this text.
    Reply(String),
    /// Fail with `ProviderRejected` carrying this message.
    Fail(String),
    /// Return an empty string.
    Empty,
    /// Never complete; only a timeout ends the call.
    Hang,
    /// Panic inside `ask`.
    Panic,
}

/// A mock provider that plays back scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, the
/// provider's default outcome is used.
pub struct MockProvider {
    name: String,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    default: MockOutcome,
    calls: AtomicUsize,
    requests_seen: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    fn with_default(name: &str, default: MockOutcome) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            default,
            calls: AtomicUsize::new(0),
            requests_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers `"mock response from {name}"`.
    pub fn new(name: &str) -> Self {
        Self::with_default(name, MockOutcome::Reply(format!("mock response from {name}")))
    }

    /// Always answers `text`.
    pub fn replying(name: &str, text: &str) -> Self {
        Self::with_default(name, MockOutcome::Reply(text.to_string()))
    }

    /// Always fails.
    pub fn failing(name: &str) -> Self {
        Self::with_default(name, MockOutcome::Fail("simulated outage".to_string()))
    }

    /// Never answers.
    pub fn hanging(name: &str) -> Self {
        Self::with_default(name, MockOutcome::Hang)
    }

    /// Plays `script` first, then answers like [`MockProvider::new`].
    pub fn scripted(name: &str, script: Vec<MockOutcome>) -> Self {
        let mut provider = Self::new(name);
        provider.script = Arc::new(Mutex::new(VecDeque::from(script)));
        provider
    }

    /// Add an outcome to the end of the script.
    pub async fn push(&self, outcome: MockOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of times `ask` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests_seen.lock().await.clone()
    }

    async fn next_outcome(&self) -> MockOutcome {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
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
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn ask(&self, request: &ProviderRequest) -> Result<String, MythiqError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests_seen.lock().await.push(request.clone());
        match self.next_outcome().await {
            MockOutcome::Reply(text) => Ok(text),
            MockOutcome::Fail(message) => Err(MythiqError::rejected(&self.name, message)),
            MockOutcome::Empty => Ok(String::new()),
            MockOutcome::Hang => {
                std::future::pending::<()>().await;
                Err(MythiqError::Internal("unreachable".into()))
            }
            MockOutcome::Panic => panic!("mock provider {} panicked", self.name),
        }
    }
}
