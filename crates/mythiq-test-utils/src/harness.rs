// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles an orchestrator over mock providers and an
//! in-memory (or temp SQLite) knowledge store, and exposes `chat()` to drive
//! the full pipeline in tests.

use std::sync::Arc;
use std::time::Duration;

use mythiq_agent::{ChatReply, Orchestrator};
use mythiq_config::MythiqConfig;
use mythiq_config::model::{StorageBackend, StorageConfig};
use mythiq_core::{KnowledgeStore, MythiqError, ProviderAdapter};
use mythiq_gateway::ProviderGateway;
use mythiq_storage::{MemoryKnowledgeStore, open_store};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: MythiqConfig,
    providers: Vec<(Arc<dyn ProviderAdapter>, Option<Duration>)>,
    store: Option<Arc<dyn KnowledgeStore>>,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = MythiqConfig::default();
        config.providers.clear();
        config.storage.backend = StorageBackend::Memory;
        Self {
            config,
            providers: Vec::new(),
            store: None,
            sqlite: false,
        }
    }

    /// Start from an explicit configuration. Its `[[providers]]` are ignored;
    /// add adapters with [`TestHarnessBuilder::provider`].
    pub fn with_config(mut self, config: MythiqConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a provider using the gateway's default call timeout.
    pub fn provider(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push((adapter, None));
        self
    }

    /// Append a provider with its own call timeout.
    pub fn provider_with_timeout(mut self, adapter: Arc<dyn ProviderAdapter>, timeout: Duration) -> Self {
        self.providers.push((adapter, Some(timeout)));
        self
    }

    /// Use this store instead of a fresh in-memory one.
    pub fn store(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a SQLite store in a temporary directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.gateway.failure_threshold = threshold;
        self
    }

    pub fn cooldown_secs(mut self, secs: u64) -> Self {
        self.config.gateway.cooldown_secs = secs;
        self
    }

    pub fn call_timeout_ms(mut self, ms: u64) -> Self {
        self.config.gateway.call_timeout_ms = ms;
        self
    }

    pub fn fallback_text(mut self, text: &str) -> Self {
        self.config.gateway.fallback_text = text.to_string();
        self
    }

    pub fn deferred_capacity(mut self, capacity: usize) -> Self {
        self.config.learning.deferred_capacity = capacity;
        self
    }

    pub fn learning(mut self, enabled: bool) -> Self {
        self.config.learning.enabled = enabled;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, MythiqError> {
        let mut temp_dir = None;
        let store: Arc<dyn KnowledgeStore> = match (self.store, self.sqlite) {
            (Some(store), _) => store,
            (None, true) => {
                let dir = tempfile::TempDir::new().map_err(MythiqError::storage)?;
                let config = StorageConfig {
                    backend: StorageBackend::Sqlite,
                    database_path: dir.path().join("mythiq.db").to_string_lossy().to_string(),
                    wal_mode: true,
                };
                temp_dir = Some(dir);
                open_store(&config).await?
            }
            (None, false) => Arc::new(MemoryKnowledgeStore::new()),
        };

        let mut builder = ProviderGateway::builder(&self.config.gateway);
        for (adapter, timeout) in self.providers {
            builder = match timeout {
                Some(timeout) => builder.provider_with_timeout(adapter, timeout),
                None => builder.provider(adapter),
            };
        }
        let gateway = builder.build();

        let orchestrator = Orchestrator::new(&self.config, Arc::clone(&store), gateway);
        Ok(TestHarness {
            orchestrator,
            store,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete orchestrator stack over mocks.
pub struct TestHarness {
    orchestrator: Orchestrator,
    store: Arc<dyn KnowledgeStore>,
    config: MythiqConfig,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    pub fn config(&self) -> &MythiqConfig {
        &self.config
    }

    /// Drive one message through the orchestrator.
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply, MythiqError> {
        self.orchestrator.chat(user_id, message).await
    }
}
