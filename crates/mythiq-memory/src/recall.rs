// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic rendering of known facts.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::NOTE_KEY;

static RECALL_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:what\s+do\s+you\s+(?:know|remember)\s+about\s+(?:me|my)\b|what\s+(?:are|is)\s+my\s+(?:interests|preferences|likes|hobbies)\b|do\s+you\s+remember\s+(?:me|my)\b|what\s+have\s+you\s+learned\s+about\s+me\b|who\s+am\s+i\b)",
    )
    .unwrap()
});

/// Keys rendered first, in this order. Everything else follows sorted by key,
/// with notes last.
const LEADING_KEYS: &[&str] = &["name", "likes", "dislikes", "style"];

/// Whether `text` asks what the assistant knows about the user.
pub fn is_recall_question(text: &str) -> bool {
    RECALL_QUESTION.is_match(text)
}

fn ordered(facts: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut rest: Vec<(&str, &str)> = facts
        .iter()
        .filter(|(k, _)| !LEADING_KEYS.contains(&k.as_str()) && k.as_str() != NOTE_KEY)
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    rest.sort_unstable();

    let mut out: Vec<(&str, &str)> = LEADING_KEYS
        .iter()
        .filter_map(|k| facts.get_key_value(*k).map(|(k, v)| (k.as_str(), v.as_str())))
        .collect();
    out.extend(rest);
    if let Some(note) = facts.get(NOTE_KEY) {
        out.push((NOTE_KEY, note.as_str()));
    }
    out
}

/// Second-person phrases describing each fact, in a stable order.
pub fn describe_facts(facts: &HashMap<String, String>) -> Vec<String> {
    ordered(facts)
        .into_iter()
        .map(|(key, value)| match key {
            "name" => format!("your name is {value}"),
            "likes" => format!("you like {value}"),
            "dislikes" => format!("you don't like {value}"),
            "style" => format!("you prefer {value}"),
            NOTE_KEY => format!("you asked me to remember that {value}"),
            other => format!("your {} is {value}", other.replace('_', " ")),
        })
        .collect()
}

/// `key: value` lines for inclusion in a provider prompt.
pub fn prompt_fact_lines(facts: &HashMap<String, String>) -> Vec<String> {
    ordered(facts)
        .into_iter()
        .map(|(key, value)| format!("- {key}: {value}"))
        .collect()
}

/// Answer to a recall question built only from stored facts.
pub fn recall_response(facts: &HashMap<String, String>) -> String {
    let described = describe_facts(facts);
    if described.is_empty() {
        return "I don't know anything about you yet. Tell me something, like \"remember that I love jazz\", and I'll keep it in mind.".to_string();
    }
    format!("Here's what I know about you: {}.", described.join("; "))
}
