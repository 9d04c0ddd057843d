// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestrator for the Mythiq conversational core.
//!
//! [`Orchestrator::chat`] drives one message through the stages in
//! [`ChatStage`]: load the user's facts and recent turns, classify emotion,
//! ask the provider gateway, extract and store facts, record the turn. Store
//! failures never reach the caller; writes that fail are kept in a bounded
//! [`DeferredWrites`] buffer and retried at the user's next message.

pub mod deferred;
pub mod orchestrator;
pub mod prompt;
pub mod stage;

pub use deferred::{DeferredWrites, LearningBatch, TurnDraft};
pub use orchestrator::{ChatReply, LearnedFact, Orchestrator, OrchestratorStatus};
pub use stage::ChatStage;
