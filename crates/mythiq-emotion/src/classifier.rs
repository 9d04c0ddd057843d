// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cue-based emotion classifier.
//!
//! Every category owns a list of cue words and phrases. A cue matches when it
//! appears as whole words in the lowercased text; punctuation cues (`?`, `!`)
//! match anywhere. A category scores the summed length of its matched cues
//! and the highest score wins, ties going to the category declared first in
//! [`Emotion`].

use mythiq_core::Emotion;
use tracing::trace;

/// Result of classifying a message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionClassification {
    pub emotion: Emotion,
    /// Confidence in the classification (0.0-1.0).
    pub confidence: f32,
    /// Number of cues that matched for the winning category.
    pub matched_cues: usize,
}

/// Confidence reported when no cue matched at all.
const NO_CUE_CONFIDENCE: f32 = 0.2;

const CUES: &[(Emotion, &[&str])] = &[
    (Emotion::Neutral, &["ok", "okay", "fine", "sure", "yes", "no"]),
    (
        Emotion::Curious,
        &[
            "what", "how", "why", "when", "where", "explain", "tell me", "wonder", "curious", "?",
        ],
    ),
    (
        Emotion::Excited,
        &[
            "amazing",
            "awesome",
            "fantastic",
            "great",
            "wonderful",
            "love",
            "wow",
            "can't wait",
            "incredible",
            "!",
        ],
    ),
    (
        Emotion::Grateful,
        &[
            "thank",
            "thanks",
            "thank you",
            "appreciate",
            "grateful",
            "helpful",
        ],
    ),
    (
        Emotion::Frustrated,
        &[
            "annoying",
            "annoyed",
            "stupid",
            "hate",
            "terrible",
            "awful",
            "bad",
            "useless",
            "doesn't work",
            "not working",
        ],
    ),
    (
        Emotion::Confused,
        &[
            "confused",
            "confusing",
            "don't understand",
            "doesn't make sense",
            "unclear",
            "help",
            "lost",
        ],
    ),
    (
        Emotion::Happy,
        &["happy", "good", "nice", "pleased", "glad", "joy", "delighted"],
    ),
    (
        Emotion::Creative,
        &[
            "create", "generate", "make", "design", "build", "draw", "paint", "write", "imagine",
            "story",
        ],
    ),
    (
        Emotion::Analytical,
        &[
            "analyze",
            "analyse",
            "compare",
            "evaluate",
            "assess",
            "study",
            "pros and cons",
            "trade-off",
            "data",
        ],
    ),
    (
        Emotion::Playful,
        &["fun", "play", "game", "joke", "funny", "laugh", "haha", "lol"],
    ),
    (
        Emotion::Sad,
        &[
            "sad",
            "unhappy",
            "depressed",
            "lonely",
            "miss",
            "crying",
            "upset",
            "heartbroken",
            "down",
        ],
    ),
    (
        Emotion::Anxious,
        &[
            "worried",
            "worry",
            "anxious",
            "nervous",
            "scared",
            "afraid",
            "stressed",
            "panic",
            "overwhelmed",
        ],
    ),
];

/// Deterministic emotion classifier.
#[derive(Debug, Clone, Copy)]
pub struct EmotionClassifier {
    no_cue_confidence: f32,
}

impl EmotionClassifier {
    pub fn new() -> Self {
        Self {
            no_cue_confidence: NO_CUE_CONFIDENCE,
        }
    }

    /// Classify `text`. Never fails: text without any cue is `neutral` with
    /// low confidence.
    pub fn classify(&self, text: &str) -> EmotionClassification {
        let normalized = normalize(text);
        let mut scores = [0usize; Emotion::ALL.len()];
        let mut hits = [0usize; Emotion::ALL.len()];

        for (emotion, cues) in CUES {
            let idx = *emotion as usize;
            for cue in cues.iter() {
                if cue_matches(text, &normalized, cue) {
                    scores[idx] += cue.len();
                    hits[idx] += 1;
                }
            }
        }

        let mut best = 0usize;
        for idx in 1..scores.len() {
            if scores[idx] > scores[best] {
                best = idx;
            }
        }

        if scores[best] == 0 {
            return EmotionClassification {
                emotion: Emotion::Neutral,
                confidence: self.no_cue_confidence,
                matched_cues: 0,
            };
        }

        let runner_up = scores
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != best)
            .map(|(_, score)| *score)
            .max()
            .unwrap_or(0);

        let confidence = confidence(scores[best], runner_up, hits[best]);
        let emotion = Emotion::ALL[best];
        trace!(%emotion, confidence, score = scores[best], runner_up, "classified emotion");

        EmotionClassification {
            emotion,
            confidence,
            matched_cues: hits[best],
        }
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Wider margins over the runner-up and more matched cues raise confidence.
fn confidence(best: usize, runner_up: usize, hits: usize) -> f32 {
    let margin = (best - runner_up.min(best)) as f32 / best as f32;
    let support = hits.min(3) as f32 * 0.05;
    (0.35 + 0.5 * margin + support).min(0.95)
}

/// Lowercase, fold curly apostrophes and reduce to space-delimited word
/// tokens padded with a leading and trailing space.
fn normalize(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' => '\'',
            c if c.is_alphanumeric() || c == '\'' || c == '-' => c,
            _ => ' ',
        })
        .collect();

    let mut out = String::with_capacity(lowered.len() + 2);
    out.push(' ');
    for token in lowered.split_whitespace() {
        out.push_str(token);
        out.push(' ');
    }
    out
}

fn cue_matches(raw: &str, normalized: &str, cue: &str) -> bool {
    if cue.chars().all(|c| !c.is_alphanumeric()) {
        return raw.contains(cue);
    }
    let padded = format!(" {cue} ");
    normalized.contains(&padded)
}
