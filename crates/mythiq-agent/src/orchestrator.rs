// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message orchestration: context, emotion, answer, learning, delivery.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use mythiq_config::MythiqConfig;
use mythiq_core::{
    ConversationTurn, Emotion, Fact, KnowledgeStore, MythiqError, PluginAdapter, ServedBy,
    StoreStats, UserId,
};
use mythiq_emotion::EmotionClassifier;
use mythiq_gateway::{GatewayRequest, ProviderGateway};
use mythiq_memory::{ExtractedFact, FactExtractor};
use mythiq_resilience::HealthSnapshot;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::deferred::{DeferredWrites, LearningBatch, TurnDraft};
use crate::prompt::{build_prompt, build_system_prompt, resolve_system_prompt};
use crate::stage::ChatStage;

/// What the presentation layer gets back from [`Orchestrator::chat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub emotion: Emotion,
    pub confidence: f32,
    pub served_by: ServedBy,
    /// Facts extracted from this message, whether written or deferred.
    pub learned: Vec<LearnedFact>,
    /// True when some write for this message is waiting in the retry buffer.
    pub deferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearnedFact {
    pub key: String,
    pub value: String,
}

impl From<ExtractedFact> for LearnedFact {
    fn from(fact: ExtractedFact) -> Self {
        Self {
            key: fact.key,
            value: fact.value,
        }
    }
}

/// Operational view combining store counts and provider health.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub store_backend: String,
    /// `None` when the store could not be read.
    pub store: Option<StoreStats>,
    pub providers: Vec<HealthSnapshot>,
    pub deferred_batches: usize,
}

#[derive(Debug, Clone)]
struct Limits {
    max_message_chars: usize,
    max_user_id_chars: usize,
    history_turns: usize,
}

/// Composes the knowledge store, emotion classifier and provider gateway.
///
/// Messages from the same user are handled one at a time, so their deferred
/// writes, new facts and turns reach the store in arrival order. Different
/// users proceed concurrently.
pub struct Orchestrator {
    store: Arc<dyn KnowledgeStore>,
    gateway: ProviderGateway,
    classifier: EmotionClassifier,
    extractor: FactExtractor,
    learning_enabled: bool,
    deferred: DeferredWrites,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
    persona: String,
    limits: Limits,
}

impl Orchestrator {
    pub fn new(config: &MythiqConfig, store: Arc<dyn KnowledgeStore>, gateway: ProviderGateway) -> Self {
        Self {
            store,
            gateway,
            classifier: EmotionClassifier::new(),
            extractor: FactExtractor::new(config.learning.max_value_chars),
            learning_enabled: config.learning.enabled,
            deferred: DeferredWrites::new(config.learning.deferred_capacity),
            user_locks: DashMap::new(),
            persona: resolve_system_prompt(&config.agent),
            limits: Limits {
                max_message_chars: config.agent.max_message_chars,
                max_user_id_chars: config.agent.max_user_id_chars,
                history_turns: config.agent.history_turns,
            },
        }
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    pub fn deferred(&self) -> &DeferredWrites {
        &self.deferred
    }

    /// Handle one inbound message.
    ///
    /// Only an invalid `user_id` or `message` is an error; provider and
    /// storage failures degrade to a fallback reply and deferred learning.
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply, MythiqError> {
        let (user, message) = self.validate(user_id, message)?;
        stage(&user, ChatStage::Received);

        let lock = self.user_lock(&user);
        let reply = {
            let _serialized = lock.lock().await;
            self.handle(&user, message).await
        };
        drop(lock);
        self.release_user_lock(&user);
        Ok(reply)
    }

    async fn handle(&self, user: &UserId, message: &str) -> ChatReply {
        let flushed = self.flush_user(user).await;
        let (facts, history) = self.load_context(user).await;
        stage(user, ChatStage::ContextLoaded);

        let classification = self.classifier.classify(message);
        stage(user, ChatStage::EmotionTagged);

        let request = GatewayRequest {
            system_prompt: Some(build_system_prompt(&self.persona, &facts)),
            prompt: build_prompt(message, &classification, &history),
            message: message.to_string(),
            facts,
        };
        let answer = self.gateway.ask(request).await;
        debug!(
            user_id = %user,
            served_by = %answer.served_by,
            attempts = answer.attempts,
            "answer produced"
        );
        stage(user, ChatStage::Answered);

        let extracted = if self.learning_enabled {
            self.extractor.extract(message)
        } else {
            Vec::new()
        };
        let mut batch = LearningBatch::new(user.clone());
        batch
            .facts
            .extend(extracted.iter().map(|f| (f.key.clone(), f.value.clone())));
        let mut writable = flushed;
        if writable {
            writable = self.persist(&mut batch, Write::Facts).await;
        }
        stage(user, ChatStage::Learned);

        batch.turn = Some(TurnDraft {
            input_text: message.to_string(),
            detected_emotion: classification.emotion,
            provider_used: answer.served_by.clone(),
            output_text: answer.text.clone(),
            timestamp: Utc::now(),
        });
        if writable {
            self.persist(&mut batch, Write::Turn).await;
        }
        let deferred = !batch.is_empty();
        if deferred {
            warn!(
                user_id = %user,
                facts = batch.facts.len(),
                "learning deferred until the store recovers"
            );
            self.deferred.push(batch);
        }
        stage(user, ChatStage::Delivered);

        if !extracted.is_empty() {
            info!(user_id = %user, facts = extracted.len(), deferred, "learned facts");
        }

        ChatReply {
            response: answer.text,
            emotion: classification.emotion,
            confidence: classification.confidence,
            served_by: answer.served_by,
            learned: extracted.into_iter().map(LearnedFact::from).collect(),
            deferred,
        }
    }

    fn user_lock(&self, user: &UserId) -> Arc<Mutex<()>> {
        self.user_locks.entry(user.clone()).or_default().clone()
    }

    /// Drop the lock entry once nobody else holds or awaits it.
    fn release_user_lock(&self, user: &UserId) {
        self.user_locks
            .remove_if(user, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn validate<'a>(
        &self,
        user_id: &'a str,
        message: &'a str,
    ) -> Result<(UserId, &'a str), MythiqError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(MythiqError::Validation("user_id must not be empty".into()));
        }
        if user_id.chars().count() > self.limits.max_user_id_chars {
            return Err(MythiqError::Validation(format!(
                "user_id exceeds {} characters",
                self.limits.max_user_id_chars
            )));
        }
        if user_id.chars().any(char::is_control) {
            return Err(MythiqError::Validation(
                "user_id must not contain control characters".into(),
            ));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(MythiqError::Validation("message must not be empty".into()));
        }
        if message.chars().count() > self.limits.max_message_chars {
            return Err(MythiqError::Validation(format!(
                "message exceeds {} characters",
                self.limits.max_message_chars
            )));
        }
        Ok((UserId::new(user_id), message))
    }

    async fn load_context(&self, user: &UserId) -> (HashMap<String, String>, Vec<ConversationTurn>) {
        let facts = match self.store.get_facts(user).await {
            Ok(facts) => facts,
            Err(err) => {
                warn!(user_id = %user, error = %err, "could not load facts, continuing without them");
                HashMap::new()
            }
        };
        let history = if self.limits.history_turns == 0 {
            Vec::new()
        } else {
            match self.store.recent_turns(user, self.limits.history_turns).await {
                Ok(turns) => turns,
                Err(err) => {
                    warn!(user_id = %user, error = %err, "could not load history, continuing without it");
                    Vec::new()
                }
            }
        };
        (facts, history)
    }

    /// Returns whether the write landed.
    async fn persist(&self, batch: &mut LearningBatch, write: Write) -> bool {
        let result = match write {
            Write::Facts => batch.write_facts(self.store.as_ref()).await,
            Write::Turn => batch.write_turn(self.store.as_ref()).await,
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(user_id = %batch.user_id, error = %err, "knowledge store write failed");
                false
            }
        }
    }

    /// Retry this user's deferred batches in order. Returns false when some
    /// batch still could not be written; new writes then queue behind it.
    async fn flush_user(&self, user: &UserId) -> bool {
        let pending = self.deferred.take_for(user);
        if pending.is_empty() {
            return true;
        }
        let remaining = self.apply_in_order(pending).await;
        let clear = remaining.is_empty();
        if clear {
            info!(user_id = %user, "deferred learning written");
        }
        self.deferred.requeue_front(remaining);
        clear
    }

    /// Apply one user's batches oldest first. The batch that fails and every
    /// later one are returned unapplied.
    async fn apply_in_order(&self, batches: Vec<LearningBatch>) -> Vec<LearningBatch> {
        let mut batches = batches.into_iter();
        while let Some(mut batch) = batches.next() {
            if let Err(err) = batch.apply(self.store.as_ref()).await {
                debug!(user_id = %batch.user_id, error = %err, "deferred write still failing");
                return std::iter::once(batch).chain(batches).collect();
            }
        }
        Vec::new()
    }

    /// Retry every deferred batch now, user by user. Returns how many are
    /// still pending.
    pub async fn flush_deferred(&self) -> usize {
        let users = self.deferred.users();
        if users.is_empty() {
            return 0;
        }
        let total = self.deferred.len();
        for user in &users {
            let lock = self.user_lock(user);
            {
                let _serialized = lock.lock().await;
                self.flush_user(user).await;
            }
            drop(lock);
            self.release_user_lock(user);
        }
        let left = self.deferred.len();
        if left > 0 {
            warn!(pending = left, "deferred learning still pending after flush");
        } else {
            info!(batches = total, "deferred learning flushed");
        }
        left
    }

    /// Store counts plus gateway health.
    pub async fn status(&self) -> OrchestratorStatus {
        let store = match self.store.stats(None).await {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(error = %err, "could not read store stats");
                None
            }
        };
        OrchestratorStatus {
            store_backend: self.store.name().to_string(),
            store,
            providers: self.gateway.health_snapshot(),
            deferred_batches: self.deferred.len(),
        }
    }

    /// Counts for one user.
    pub async fn user_stats(&self, user_id: &str) -> Result<StoreStats, MythiqError> {
        self.store.stats(Some(&UserId::new(user_id))).await
    }

    /// Full fact rows for one user.
    pub async fn facts(&self, user_id: &str) -> Result<Vec<Fact>, MythiqError> {
        self.store.get_fact_records(&UserId::new(user_id)).await
    }

    /// Delete a user, their facts and turns, and anything still deferred for
    /// them. Returns whether the user existed.
    pub async fn forget(&self, user_id: &str) -> Result<bool, MythiqError> {
        let user = UserId::new(user_id);
        let lock = self.user_lock(&user);
        let outcome = {
            let _serialized = lock.lock().await;
            let discarded = self.deferred.discard_user(&user);
            self.store.delete_user(&user).await.map(|existed| (existed, discarded))
        };
        drop(lock);
        self.release_user_lock(&user);
        let (existed, discarded) = outcome?;
        info!(user_id = %user, existed, discarded, "user forgotten");
        Ok(existed)
    }

    /// Flush what can be flushed, then shut down providers and the store.
    pub async fn shutdown(&self) -> Result<(), MythiqError> {
        self.flush_deferred().await;
        self.gateway.shutdown().await;
        self.store.shutdown().await
    }
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Facts,
    Turn,
}

fn stage(user: &UserId, stage: ChatStage) {
    debug!(user_id = %user, stage = %stage, "chat stage");
}
