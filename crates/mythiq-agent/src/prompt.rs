// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly.
//!
//! The system prompt carries the assistant persona plus everything known
//! about the user. The user prompt carries recent history, the detected
//! emotion and the message itself.

use std::collections::HashMap;
use std::fmt::Write;

use mythiq_config::model::AgentConfig;
use mythiq_core::ConversationTurn;
use mythiq_emotion::EmotionClassification;
use mythiq_memory::prompt_fact_lines;

/// Resolves the persona prompt: inline config first, then the default.
pub fn resolve_system_prompt(config: &AgentConfig) -> String {
    match config.system_prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => prompt.to_string(),
        _ => format!(
            "You are {}, an emotionally intelligent and creative AI assistant.",
            config.name
        ),
    }
}

/// Persona plus known facts.
pub fn build_system_prompt(persona: &str, facts: &HashMap<String, String>) -> String {
    let lines = prompt_fact_lines(facts);
    if lines.is_empty() {
        return persona.to_string();
    }
    format!(
        "{persona}\n\nWhat you know about this user:\n{}",
        lines.join("\n")
    )
}

/// History, emotion and the current message.
pub fn build_prompt(
    message: &str,
    emotion: &EmotionClassification,
    history: &[ConversationTurn],
) -> String {
    let mut prompt = String::new();
    if !history.is_empty() {
        prompt.push_str("Recent conversation:\n");
        for turn in history {
            let _ = writeln!(prompt, "User: {}", turn.input_text);
            let _ = writeln!(prompt, "Assistant: {}", turn.output_text);
        }
        prompt.push('\n');
    }
    let _ = writeln!(
        prompt,
        "The user seems {} (confidence {:.2}). Respond with matching empathy.",
        emotion.emotion, emotion.confidence
    );
    let _ = write!(prompt, "\nUser: {message}");
    prompt
}
