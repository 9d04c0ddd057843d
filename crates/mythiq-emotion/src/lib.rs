// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion classification for inbound messages.
//!
//! Pure cue matching: no network, no model, no state. Safe to run on every
//! message.

pub mod classifier;

pub use classifier::{EmotionClassification, EmotionClassifier};
