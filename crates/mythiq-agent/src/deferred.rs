// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded buffer of learning writes that failed and await a retry.
//!
//! A [`LearningBatch`] holds everything one message wanted to persist: the
//! extracted facts and the conversation turn. Applying a batch is resumable:
//! each successful write is removed from it, so a retry never repeats an
//! append that already landed.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mythiq_core::{ConversationTurn, Emotion, KnowledgeStore, MythiqError, ServedBy, UserId};
use tracing::warn;

/// Turn fields captured before a turn id is known.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDraft {
    pub input_text: String,
    pub detected_emotion: Emotion,
    pub provider_used: ServedBy,
    pub output_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Pending writes produced by one message.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningBatch {
    pub user_id: UserId,
    /// Reserved lazily; `None` until the store handed one out.
    pub turn_id: Option<u64>,
    pub facts: VecDeque<(String, String)>,
    pub turn: Option<TurnDraft>,
}

impl LearningBatch {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            turn_id: None,
            facts: VecDeque::new(),
            turn: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.turn.is_none()
    }

    async fn ensure_turn_id(&mut self, store: &dyn KnowledgeStore) -> Result<u64, MythiqError> {
        match self.turn_id {
            Some(id) => Ok(id),
            None => {
                let id = store.reserve_turn_id(&self.user_id).await?;
                self.turn_id = Some(id);
                Ok(id)
            }
        }
    }

    /// Upsert every remaining fact, in extraction order.
    pub async fn write_facts(&mut self, store: &dyn KnowledgeStore) -> Result<(), MythiqError> {
        if self.facts.is_empty() {
            return Ok(());
        }
        let turn_id = self.ensure_turn_id(store).await?;
        while let Some((key, value)) = self.facts.front() {
            store.upsert_fact(&self.user_id, key, value, turn_id).await?;
            self.facts.pop_front();
        }
        Ok(())
    }

    /// Append the turn if it has not landed yet.
    pub async fn write_turn(&mut self, store: &dyn KnowledgeStore) -> Result<(), MythiqError> {
        let Some(draft) = self.turn.clone() else {
            return Ok(());
        };
        let turn_id = self.ensure_turn_id(store).await?;
        let turn = ConversationTurn {
            user_id: self.user_id.clone(),
            turn_id,
            input_text: draft.input_text,
            detected_emotion: draft.detected_emotion,
            provider_used: draft.provider_used,
            output_text: draft.output_text,
            timestamp: draft.timestamp,
        };
        store.append_turn(&turn).await?;
        self.turn = None;
        Ok(())
    }

    /// Facts first, then the turn.
    pub async fn apply(&mut self, store: &dyn KnowledgeStore) -> Result<(), MythiqError> {
        self.write_facts(store).await?;
        self.write_turn(store).await
    }
}

/// FIFO of failed batches, bounded by `capacity`. When full, the oldest batch
/// is dropped with a warning.
#[derive(Debug)]
pub struct DeferredWrites {
    capacity: usize,
    queue: Mutex<VecDeque<LearningBatch>>,
}

impl DeferredWrites {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LearningBatch>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of batches waiting for `user_id`.
    pub fn pending_for(&self, user_id: &UserId) -> usize {
        self.lock().iter().filter(|b| &b.user_id == user_id).count()
    }

    /// Queue a batch at the back.
    pub fn push(&self, batch: LearningBatch) {
        if batch.is_empty() {
            return;
        }
        let mut queue = self.lock();
        queue.push_back(batch);
        self.trim(&mut queue);
    }

    /// Put batches back at the front, preserving their order.
    pub fn requeue_front(&self, batches: Vec<LearningBatch>) {
        let mut queue = self.lock();
        for batch in batches.into_iter().rev().filter(|b| !b.is_empty()) {
            queue.push_front(batch);
        }
        self.trim(&mut queue);
    }

    fn trim(&self, queue: &mut VecDeque<LearningBatch>) {
        while queue.len() > self.capacity {
            if let Some(dropped) = queue.pop_front() {
                warn!(
                    user_id = %dropped.user_id,
                    facts = dropped.facts.len(),
                    turn = dropped.turn.is_some(),
                    capacity = self.capacity,
                    "deferred learning buffer full, dropping oldest batch"
                );
            }
        }
    }

    /// Remove and return every batch for `user_id`, oldest first.
    pub fn take_for(&self, user_id: &UserId) -> Vec<LearningBatch> {
        let mut queue = self.lock();
        let (mine, rest): (VecDeque<_>, VecDeque<_>) =
            queue.drain(..).partition(|b| &b.user_id == user_id);
        *queue = rest;
        mine.into()
    }

    /// Users with pending batches, in order of their oldest batch.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = Vec::new();
        for batch in self.lock().iter() {
            if !users.contains(&batch.user_id) {
                users.push(batch.user_id.clone());
            }
        }
        users
    }

    /// Forget everything queued for `user_id`.
    pub fn discard_user(&self, user_id: &UserId) -> usize {
        self.take_for(user_id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(user: &str, key: &str) -> LearningBatch {
        let mut b = LearningBatch::new(UserId::new(user));
        b.facts.push_back((key.to_string(), "v".to_string()));
        b
    }

    fn keys(batches: &[LearningBatch]) -> Vec<String> {
        batches
            .iter()
            .map(|b| b.facts.front().map(|(k, _)| k.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn empty_batches_are_not_queued() {
        let deferred = DeferredWrites::new(4);
        deferred.push(LearningBatch::new(UserId::new("u1")));
        assert!(deferred.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let deferred = DeferredWrites::new(2);
        deferred.push(batch("u1", "a"));
        deferred.push(batch("u1", "b"));
        deferred.push(batch("u1", "c"));
        assert_eq!(deferred.len(), 2);
        assert_eq!(keys(&deferred.take_for(&UserId::new("u1"))), vec!["b", "c"]);
    }

    #[test]
    fn take_for_keeps_other_users_and_order() {
        let deferred = DeferredWrites::new(8);
        deferred.push(batch("u1", "a"));
        deferred.push(batch("u2", "x"));
        deferred.push(batch("u1", "b"));
        assert_eq!(deferred.pending_for(&UserId::new("u1")), 2);

        let mine = deferred.take_for(&UserId::new("u1"));
        assert_eq!(keys(&mine), vec!["a", "b"]);
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred.pending_for(&UserId::new("u2")), 1);
    }

    #[test]
    fn requeue_front_preserves_order_ahead_of_newer_batches() {
        let deferred = DeferredWrites::new(8);
        deferred.push(batch("u1", "c"));
        deferred.requeue_front(vec![batch("u1", "a"), batch("u1", "b")]);
        assert_eq!(keys(&deferred.take_for(&UserId::new("u1"))), vec!["a", "b", "c"]);
    }

    #[test]
    fn users_follow_oldest_batch_order() {
        let deferred = DeferredWrites::new(8);
        deferred.push(batch("u2", "a"));
        deferred.push(batch("u1", "b"));
        deferred.push(batch("u2", "c"));
        assert_eq!(deferred.users(), vec![UserId::new("u2"), UserId::new("u1")]);
    }

    #[test]
    fn discard_user_reports_count() {
        let deferred = DeferredWrites::new(8);
        deferred.push(batch("u1", "a"));
        deferred.push(batch("u2", "b"));
        assert_eq!(deferred.discard_user(&UserId::new("u1")), 1);
        assert_eq!(deferred.len(), 1);
    }
}
