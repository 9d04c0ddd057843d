// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mythiq chat` and `mythiq forget`.

use std::io::IsTerminal;

use colored::Colorize;
use mythiq_agent::{ChatReply, Orchestrator};
use mythiq_core::MythiqError;

/// Send one message and print the reply.
pub async fn run_chat(
    orchestrator: &Orchestrator,
    user_id: &str,
    message: &str,
    json: bool,
) -> Result<(), MythiqError> {
    let reply = orchestrator.chat(user_id, message).await?;
    if json {
        let body = serde_json::to_string_pretty(&reply)
            .map_err(|e| MythiqError::Internal(format!("failed to encode reply: {e}")))?;
        println!("{body}");
    } else {
        println!("{}", reply.response);
        eprintln!("{}", reply_footer(&reply, std::io::stderr().is_terminal()));
    }
    Ok(())
}

/// Delete everything stored for a user.
pub async fn run_forget(orchestrator: &Orchestrator, user_id: &str) -> Result<(), MythiqError> {
    if orchestrator.forget(user_id).await? {
        println!("forgot everything about {user_id}");
    } else {
        println!("nothing stored for {user_id}");
    }
    Ok(())
}

/// One dim line under a reply: emotion, source and learning outcome.
pub fn reply_footer(reply: &ChatReply, use_color: bool) -> String {
    let mut parts = vec![
        format!("emotion: {} ({:.2})", reply.emotion, reply.confidence),
        format!("via: {}", reply.served_by),
    ];
    if !reply.learned.is_empty() {
        let keys: Vec<&str> = reply.learned.iter().map(|f| f.key.as_str()).collect();
        parts.push(format!("learned: {}", keys.join(", ")));
    }
    if reply.deferred {
        parts.push("learning deferred".to_string());
    }
    let line = format!("[{}]", parts.join(" | "));
    if use_color { line.dimmed().to_string() } else { line }
}

#[cfg(test)]
mod tests {
    use mythiq_agent::LearnedFact;
    use mythiq_core::{Emotion, ServedBy};

    use super::*;

    fn reply() -> ChatReply {
        ChatReply {
            response: "hi".into(),
            emotion: Emotion::Curious,
            confidence: 0.5,
            served_by: ServedBy::Provider("groq".into()),
            learned: Vec::new(),
            deferred: false,
        }
    }

    #[test]
    fn footer_names_emotion_and_source() {
        assert_eq!(reply_footer(&reply(), false), "[emotion: curious (0.50) | via: groq]");
    }

    #[test]
    fn footer_lists_learned_keys_and_deferral() {
        let mut r = reply();
        r.served_by = ServedBy::LocalFallback;
        r.learned = vec![LearnedFact {
            key: "likes".into(),
            value: "jazz".into(),
        }];
        r.deferred = true;
        assert_eq!(
            reply_footer(&r, false),
            "[emotion: curious (0.50) | via: local-fallback | learned: likes | learning deferred]"
        );
    }
}
