// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process knowledge store.
//!
//! Each user's data sits in one `DashMap` entry. Every operation on a user
//! runs under that entry's shard lock, so same-user writes are serialized
//! while other users proceed independently.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use mythiq_core::{
    AdapterType, ConversationTurn, Fact, HealthStatus, KnowledgeStore, MythiqError, PluginAdapter,
    StoreStats, UserId,
};

#[derive(Debug, Default)]
struct UserRecord {
    facts: HashMap<String, Fact>,
    turns: Vec<ConversationTurn>,
    last_turn_id: u64,
}

/// Knowledge store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryKnowledgeStore {
    users: DashMap<UserId, UserRecord>,
}

impl MemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryKnowledgeStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MythiqError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MythiqError> {
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for MemoryKnowledgeStore {
    async fn get_facts(&self, user_id: &UserId) -> Result<HashMap<String, String>, MythiqError> {
        Ok(self
            .users
            .get(user_id)
            .map(|record| {
                record
                    .facts
                    .iter()
                    .map(|(k, f)| (k.clone(), f.value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_fact_records(&self, user_id: &UserId) -> Result<Vec<Fact>, MythiqError> {
        let mut facts: Vec<Fact> = self
            .users
            .get(user_id)
            .map(|record| record.facts.values().cloned().collect())
            .unwrap_or_default();
        facts.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(facts)
    }

    async fn upsert_fact(
        &self,
        user_id: &UserId,
        key: &str,
        value: &str,
        turn_id: u64,
    ) -> Result<(), MythiqError> {
        let mut record = self.users.entry(user_id.clone()).or_default();
        record.facts.insert(
            key.to_string(),
            Fact {
                user_id: user_id.clone(),
                key: key.to_string(),
                value: value.to_string(),
                learned_at: Utc::now(),
                source_turn: turn_id,
            },
        );
        Ok(())
    }

    async fn reserve_turn_id(&self, user_id: &UserId) -> Result<u64, MythiqError> {
        let mut record = self.users.entry(user_id.clone()).or_default();
        record.last_turn_id += 1;
        Ok(record.last_turn_id)
    }

    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), MythiqError> {
        let mut record = self.users.entry(turn.user_id.clone()).or_default();
        if record.turns.iter().any(|t| t.turn_id == turn.turn_id) {
            return Err(MythiqError::storage(format!(
                "turn {} already recorded for user {}",
                turn.turn_id, turn.user_id
            )));
        }
        let pos = record.turns.partition_point(|t| t.turn_id < turn.turn_id);
        record.turns.insert(pos, turn.clone());
        record.last_turn_id = record.last_turn_id.max(turn.turn_id);
        Ok(())
    }

    async fn recent_turns(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MythiqError> {
        Ok(self
            .users
            .get(user_id)
            .map(|record| {
                let start = record.turns.len().saturating_sub(limit);
                record.turns[start..].to_vec()
            })
            .unwrap_or_default())
    }

    async fn stats(&self, user_id: Option<&UserId>) -> Result<StoreStats, MythiqError> {
        let stats = match user_id {
            Some(id) => self
                .users
                .get(id)
                .map(|record| StoreStats {
                    fact_count: record.facts.len() as u64,
                    turn_count: record.turns.len() as u64,
                    distinct_users: 1,
                })
                .unwrap_or_default(),
            None => self
                .users
                .iter()
                .fold(StoreStats::default(), |mut acc, entry| {
                    acc.fact_count += entry.facts.len() as u64;
                    acc.turn_count += entry.turns.len() as u64;
                    acc.distinct_users += 1;
                    acc
                }),
        };
        Ok(stats)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<bool, MythiqError> {
        Ok(self.users.remove(user_id).is_some())
    }
}
