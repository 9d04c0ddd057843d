// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic responder used when every provider failed or was skipped.

use std::collections::HashMap;

use mythiq_memory::{is_recall_question, recall_response};

/// Answers recall questions from known facts, everything else with the
/// configured fallback text.
#[derive(Debug, Clone)]
pub struct LocalResponder {
    fallback_text: String,
}

impl LocalResponder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self {
            fallback_text: fallback_text.into(),
        }
    }

    pub fn fallback_text(&self) -> &str {
        &self.fallback_text
    }

    pub fn respond(&self, message: &str, facts: &HashMap<String, String>) -> String {
        if is_recall_question(message) {
            recall_response(facts)
        } else {
            self.fallback_text.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "I'm having trouble reaching my providers right now.";

    #[test]
    fn ordinary_message_gets_fallback_text() {
        let responder = LocalResponder::new(TEXT);
        assert_eq!(responder.respond("Tell me a joke", &HashMap::new()), TEXT);
    }

    #[test]
    fn recall_question_enumerates_facts() {
        let responder = LocalResponder::new(TEXT);
        let facts = HashMap::from([("likes".to_string(), "science fiction".to_string())]);
        let reply = responder.respond("What do you know about my interests?", &facts);
        assert!(reply.contains("science fiction"), "got: {reply}");
    }

    #[test]
    fn recall_question_without_facts_is_still_answered() {
        let responder = LocalResponder::new(TEXT);
        let reply = responder.respond("what do you remember about me?", &HashMap::new());
        assert!(!reply.is_empty());
        assert_ne!(reply, TEXT);
    }
}
