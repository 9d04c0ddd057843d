// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge Store trait: durable per-user facts and conversation turns.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::MythiqError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationTurn, Fact, StoreStats, UserId};

/// Durable, key-oriented repository of learned facts and conversation turns.
///
/// Reads fail with [`MythiqError::StorageUnavailableForRead`], writes with
/// [`MythiqError::Storage`]. Writes for the same user are serialized; writes
/// for different users may proceed concurrently. A user never observes
/// another user's data.
#[async_trait]
pub trait KnowledgeStore: PluginAdapter {
    /// Current value for every fact key of `user_id`. Unknown users yield an
    /// empty map.
    async fn get_facts(&self, user_id: &UserId) -> Result<HashMap<String, String>, MythiqError>;

    /// Full fact rows for `user_id`, ordered by key.
    async fn get_fact_records(&self, user_id: &UserId) -> Result<Vec<Fact>, MythiqError>;

    /// Inserts or overwrites the value for `(user_id, key)`, recording the
    /// learning time and the source turn. Creates the user if needed.
    async fn upsert_fact(
        &self,
        user_id: &UserId,
        key: &str,
        value: &str,
        turn_id: u64,
    ) -> Result<(), MythiqError>;

    /// Allocates the next turn id for `user_id`. Ids are strictly increasing
    /// per user and are never handed out twice within a process.
    async fn reserve_turn_id(&self, user_id: &UserId) -> Result<u64, MythiqError>;

    /// Appends an immutable turn. Appending an existing `(user_id, turn_id)`
    /// is an error.
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), MythiqError>;

    /// Up to `limit` most recent turns for `user_id`, oldest first.
    async fn recent_turns(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MythiqError>;

    /// Counts for one user, or across all users when `user_id` is `None`.
    async fn stats(&self, user_id: Option<&UserId>) -> Result<StoreStats, MythiqError>;

    /// Removes the user with all of their facts and turns. Returns whether
    /// the user existed.
    async fn delete_user(&self, user_id: &UserId) -> Result<bool, MythiqError>;
}
