// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stages a single inbound message passes through.

/// States of the per-message state machine, in order. Every message reaches
/// [`ChatStage::Delivered`]; none is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChatStage {
    /// Message accepted after validation.
    Received,
    /// Facts and recent history loaded (possibly empty).
    ContextLoaded,
    /// Emotion classified.
    EmotionTagged,
    /// A provider or the local responder produced the reply.
    Answered,
    /// Extracted facts written or deferred.
    Learned,
    /// Turn recorded (or deferred) and reply handed back.
    Delivered,
}

impl ChatStage {
    pub const ALL: [ChatStage; 6] = [
        ChatStage::Received,
        ChatStage::ContextLoaded,
        ChatStage::EmotionTagged,
        ChatStage::Answered,
        ChatStage::Learned,
        ChatStage::Delivered,
    ];

    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<ChatStage> {
        match self {
            ChatStage::Received => Some(ChatStage::ContextLoaded),
            ChatStage::ContextLoaded => Some(ChatStage::EmotionTagged),
            ChatStage::EmotionTagged => Some(ChatStage::Answered),
            ChatStage::Answered => Some(ChatStage::Learned),
            ChatStage::Learned => Some(ChatStage::Delivered),
            ChatStage::Delivered => None,
        }
    }
}

impl std::fmt::Display for ChatStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatStage::Received => write!(f, "received"),
            ChatStage::ContextLoaded => write!(f, "context_loaded"),
            ChatStage::EmotionTagged => write!(f, "emotion_tagged"),
            ChatStage::Answered => write!(f, "answered"),
            ChatStage::Learned => write!(f, "learned"),
            ChatStage::Delivered => write!(f, "delivered"),
        }
    }
}
