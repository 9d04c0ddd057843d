// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge store whose reads and writes can be switched to fail.
//!
//! Wraps a [`MemoryKnowledgeStore`]; while a switch is off, calls pass
//! through, so tests can simulate an outage and then a recovery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use mythiq_core::{
    AdapterType, ConversationTurn, Fact, HealthStatus, KnowledgeStore, MythiqError, PluginAdapter,
    StoreStats, UserId,
};
use mythiq_storage::MemoryKnowledgeStore;

#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryKnowledgeStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
    slow_value: Mutex<Option<(String, Duration)>>,
}

impl FailingStore {
    /// Every read and every write fails.
    pub fn new() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    /// Reads succeed, writes fail.
    pub fn writes_failing() -> Self {
        let store = Self::default();
        store.set_fail_writes(true);
        store
    }

    /// Reads fail, writes succeed.
    pub fn reads_failing() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every upsert whose value is `value` by `delay`.
    pub fn slow_upserts_of(&self, value: &str, delay: Duration) {
        *self.slow_value.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((value.to_string(), delay));
    }

    fn upsert_delay(&self, value: &str) -> Option<Duration> {
        match &*self.slow_value.lock().unwrap_or_else(PoisonError::into_inner) {
            Some((slow, delay)) if slow == value => Some(*delay),
            _ => None,
        }
    }

    /// Write calls made so far, failed or not.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<(), MythiqError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(MythiqError::storage_read("simulated read outage"))
        } else {
            Ok(())
        }
    }

    fn write(&self) -> Result<(), MythiqError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(MythiqError::storage("simulated disk full"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MythiqError> {
        if self.fail_reads.load(Ordering::SeqCst) || self.fail_writes.load(Ordering::SeqCst) {
            Ok(HealthStatus::Degraded("simulated outage".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), MythiqError> {
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for FailingStore {
    async fn get_facts(&self, user_id: &UserId) -> Result<HashMap<String, String>, MythiqError> {
        self.read()?;
        self.inner.get_facts(user_id).await
    }

    async fn get_fact_records(&self, user_id: &UserId) -> Result<Vec<Fact>, MythiqError> {
        self.read()?;
        self.inner.get_fact_records(user_id).await
    }

    async fn upsert_fact(
        &self,
        user_id: &UserId,
        key: &str,
        value: &str,
        turn_id: u64,
    ) -> Result<(), MythiqError> {
        self.write()?;
        if let Some(delay) = self.upsert_delay(value) {
            tokio::time::sleep(delay).await;
        }
        self.inner.upsert_fact(user_id, key, value, turn_id).await
    }

    async fn reserve_turn_id(&self, user_id: &UserId) -> Result<u64, MythiqError> {
        self.write()?;
        self.inner.reserve_turn_id(user_id).await
    }

    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), MythiqError> {
        self.write()?;
        self.inner.append_turn(turn).await
    }

    async fn recent_turns(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MythiqError> {
        self.read()?;
        self.inner.recent_turns(user_id, limit).await
    }

    async fn stats(&self, user_id: Option<&UserId>) -> Result<StoreStats, MythiqError> {
        self.read()?;
        self.inner.stats(user_id).await
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<bool, MythiqError> {
        self.write()?;
        self.inner.delete_user(user_id).await
    }
}
