// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory for the Mythiq conversational core.
//!
//! - [`extractor`]: an ordered set of pure rules that turn explicit
//!   statements ("remember that ...", "my name is ...", "I love ...") into
//!   key/value facts.
//! - [`recall`]: deterministic rendering of what is known about a user, for
//!   prompts and for the local fallback responder.

pub mod extractor;
pub mod recall;

pub use extractor::{ExtractedFact, ExtractionRule, FactExtractor, RULES};
pub use recall::{describe_facts, is_recall_question, prompt_fact_lines, recall_response};
