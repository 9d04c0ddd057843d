// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based fact extraction.
//!
//! The text is split into sentences; questions are ignored. Each non-question
//! sentence is run through every rule in [`RULES`], in order. The first fact
//! produced for a key wins. An explicit "remember that X" with no other
//! match is kept verbatim under the `note` key.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// A fact produced by one extraction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    pub key: String,
    pub value: String,
    /// Name of the rule that produced the fact.
    pub rule: &'static str,
}

/// A single pure `sentence -> Option<(key, value)>` rule.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<(String, String)>,
}

/// Extraction rules in priority order.
pub const RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "name",
        apply: name_rule,
    },
    ExtractionRule {
        name: "likes",
        apply: likes_rule,
    },
    ExtractionRule {
        name: "dislikes",
        apply: dislikes_rule,
    },
    ExtractionRule {
        name: "style",
        apply: style_rule,
    },
    ExtractionRule {
        name: "attribute",
        apply: attribute_rule,
    },
];

/// Key used for explicit memories no other rule understood.
pub const NOTE_KEY: &str = "note";

static REMEMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:please\s+)?remember(?:\s+(?:that|this))?\s*:?\s+").unwrap()
});

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\b(?:my\s+name\s+is|call\s+me|i'm\s+called|i\s+am\s+called))\s+(\p{L}[\p{L}'-]*(?:\s+\p{Lu}[\p{L}'-]*){0,2})")
        .unwrap()
});

static LIKES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bi\s+(?:really\s+|also\s+|absolutely\s+)?(?:love|like|enjoy|adore)\s+(.+)")
        .unwrap()
});

static DISLIKES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bi\s+(?:really\s+|also\s+|absolutely\s+)?(?:hate|dislike|can't\s+stand|cannot\s+stand|don't\s+like|do\s+not\s+like)\s+(.+)",
    )
    .unwrap()
});

static STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bi\s+prefer\s+((?:[\w-]+\s+){0,3}?[\w-]+)\s+(?:answers|responses|explanations|replies)\b")
        .unwrap()
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmy\s+((?:\p{L}+\s+){0,3}?\p{L}+)\s+(?:is|are)\s+(.+)").unwrap()
});

/// Clauses that end a captured value: "I love chess, but I hate golf".
static CLAUSE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:[,;:]|\s(?:but|because|although|so)\s|\sand\s+(?:i|my)\s)").unwrap()
});

/// Values that only point back at something else.
const PRONOUN_VALUES: &[&str] = &["it", "this", "that", "them", "you", "him", "her", "one"];

/// Trim, cut at the first clause break and strip trailing punctuation.
fn clean_value(raw: &str) -> Option<String> {
    let cut = match CLAUSE_BREAK.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let value = cut
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';' | ':' | '"' | '\''))
        .trim_start_matches(['"', '\''])
        .trim();
    if value.is_empty() || PRONOUN_VALUES.contains(&value.to_lowercase().as_str()) {
        None
    } else {
        Some(value.to_string())
    }
}

/// "my name is X" / "call me X".
pub fn name_rule(sentence: &str) -> Option<(String, String)> {
    let caps = NAME.captures(sentence)?;
    clean_value(caps.get(1)?.as_str()).map(|v| ("name".to_string(), v))
}

/// "I (really) love|like|enjoy|adore X".
pub fn likes_rule(sentence: &str) -> Option<(String, String)> {
    let caps = LIKES.captures(sentence)?;
    clean_value(caps.get(1)?.as_str()).map(|v| ("likes".to_string(), v))
}

/// "I (really) hate|dislike|can't stand|don't like X".
pub fn dislikes_rule(sentence: &str) -> Option<(String, String)> {
    let caps = DISLIKES.captures(sentence)?;
    clean_value(caps.get(1)?.as_str()).map(|v| ("dislikes".to_string(), v))
}

/// "I prefer X answers|responses|explanations|replies" -> "X answers".
pub fn style_rule(sentence: &str) -> Option<(String, String)> {
    let caps = STYLE.captures(sentence)?;
    let adjective = caps.get(1)?.as_str().trim().to_lowercase();
    Some(("style".to_string(), format!("{adjective} answers")))
}

/// "my K is V" with K up to four words, stored under snake_case K.
pub fn attribute_rule(sentence: &str) -> Option<(String, String)> {
    let caps = ATTRIBUTE.captures(sentence)?;
    let key = caps
        .get(1)?
        .as_str()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    let value = clean_value(caps.get(2)?.as_str())?;
    Some((key, value))
}

/// Strip a leading "remember (that|this)" and report whether it was there.
pub fn strip_remember_prefix(text: &str) -> (&str, bool) {
    match REMEMBER_PREFIX.find(text) {
        Some(m) => (text[m.end()..].trim(), true),
        None => (text.trim(), false),
    }
}

/// Split into sentences, pairing each with whether it was a question.
///
/// A `.` only ends a sentence before whitespace or the end of the text, so
/// "Node.js" and "3.5" stay whole.
fn sentences(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        let ends = match c {
            '!' | '?' | '\n' => true,
            '.' => text[idx + 1..].chars().next().is_none_or(char::is_whitespace),
            _ => false,
        };
        if ends {
            let sentence = text[start..idx].trim();
            if !sentence.is_empty() {
                out.push((sentence, c == '?'));
            }
            start = idx + c.len_utf8();
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push((tail, false));
    }
    out
}

/// Applies [`RULES`] to inbound messages.
#[derive(Debug, Clone)]
pub struct FactExtractor {
    max_value_chars: usize,
}

impl FactExtractor {
    pub fn new(max_value_chars: usize) -> Self {
        Self {
            max_value_chars: max_value_chars.max(1),
        }
    }

    /// Extract facts from `text`. No match is not an error: it yields an
    /// empty list.
    pub fn extract(&self, text: &str) -> Vec<ExtractedFact> {
        let (clause, explicit) = strip_remember_prefix(text);
        let mut seen = HashSet::new();
        let mut facts = Vec::new();

        for (sentence, is_question) in sentences(clause) {
            if is_question {
                continue;
            }
            for rule in RULES {
                if let Some((key, value)) = (rule.apply)(sentence) {
                    if seen.insert(key.clone()) {
                        facts.push(ExtractedFact {
                            key,
                            value: self.bound(&value),
                            rule: rule.name,
                        });
                    }
                }
            }
        }

        if explicit && facts.is_empty() {
            if let Some(note) = clean_value(clause) {
                facts.push(ExtractedFact {
                    key: NOTE_KEY.to_string(),
                    value: self.bound(&note),
                    rule: NOTE_KEY,
                });
            }
        }

        if !facts.is_empty() {
            debug!(count = facts.len(), explicit, "extracted facts");
        }
        facts
    }

    fn bound(&self, value: &str) -> String {
        match value.char_indices().nth(self.max_value_chars) {
            Some((idx, _)) => value[..idx].trim_end().to_string(),
            None => value.to_string(),
        }
    }
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        FactExtractor::default()
            .extract(text)
            .into_iter()
            .map(|f| (f.key, f.value))
            .collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn strip_remember_prefix_variants() {
        assert_eq!(
            strip_remember_prefix("Remember that I love science fiction"),
            ("I love science fiction", true)
        );
        assert_eq!(strip_remember_prefix("remember this: my dog is Max"), ("my dog is Max", true));
        assert_eq!(strip_remember_prefix("please remember I use vim"), ("I use vim", true));
        assert_eq!(strip_remember_prefix("my dog is Max"), ("my dog is Max", false));
        assert_eq!(strip_remember_prefix("I remember that day"), ("I remember that day", false));
    }

    #[test]
    fn remember_that_i_love_science_fiction() {
        assert_eq!(
            pairs("Remember that I love science fiction"),
            vec![pair("likes", "science fiction")]
        );
    }

    #[test]
    fn name_rule_variants() {
        assert_eq!(name_rule("My name is Ada Lovelace"), Some(pair("name", "Ada Lovelace")));
        assert_eq!(name_rule("just call me Sam and be quick"), Some(pair("name", "Sam")));
        assert_eq!(name_rule("I like names"), None);
    }

    #[test]
    fn likes_and_dislikes_do_not_cross() {
        assert_eq!(likes_rule("I really enjoy long walks"), Some(pair("likes", "long walks")));
        assert_eq!(likes_rule("I don't like olives"), None);
        assert_eq!(dislikes_rule("I don't like olives"), Some(pair("dislikes", "olives")));
        assert_eq!(dislikes_rule("I can't stand loud music!"), Some(pair("dislikes", "loud music")));
        assert_eq!(likes_rule("I'd like a summary"), None);
    }

    #[test]
    fn pronoun_values_are_ignored() {
        assert_eq!(likes_rule("I love it"), None);
        assert_eq!(dislikes_rule("I hate that."), None);
    }

    #[test]
    fn style_rule_normalizes() {
        assert_eq!(style_rule("I prefer short answers"), Some(pair("style", "short answers")));
        assert_eq!(
            style_rule("I prefer Detailed explanations please"),
            Some(pair("style", "detailed answers"))
        );
        assert_eq!(style_rule("I prefer tea"), None);
    }

    #[test]
    fn dotted_values_are_not_split() {
        assert_eq!(pairs("I love Node.js"), vec![pair("likes", "Node.js")]);
        assert_eq!(
            pairs("My python version is 3.12. I hate tabs."),
            vec![pair("python_version", "3.12"), pair("dislikes", "tabs")]
        );
    }

    #[test]
    fn attribute_rule_snake_cases_key() {
        assert_eq!(
            attribute_rule("my favorite color is blue"),
            Some(pair("favorite_color", "blue"))
        );
        assert_eq!(
            attribute_rule("My home town is Porto, it's lovely"),
            Some(pair("home_town", "Porto"))
        );
        assert_eq!(attribute_rule("the sky is blue"), None);
    }

    #[test]
    fn first_fact_per_key_wins() {
        // "my name is Ada" matches both the name and attribute rules.
        assert_eq!(pairs("My name is Ada"), vec![pair("name", "Ada")]);
        assert_eq!(
            pairs("I love chess. I also love golf."),
            vec![pair("likes", "chess")]
        );
    }

    #[test]
    fn several_facts_from_one_message() {
        assert_eq!(
            pairs("My name is Ada. I love chess, but I hate golf. My favorite color is teal."),
            vec![
                pair("name", "Ada"),
                pair("likes", "chess"),
                pair("dislikes", "golf"),
                pair("favorite_color", "teal"),
            ]
        );
    }

    #[test]
    fn questions_yield_nothing() {
        assert!(pairs("What do you know about my interests?").is_empty());
        assert!(pairs("Do I like jazz?").is_empty());
        assert!(pairs("is my name Ada?").is_empty());
    }

    #[test]
    fn explicit_note_only_without_other_facts() {
        assert_eq!(
            pairs("Remember that the meeting moved to Tuesday."),
            vec![pair("note", "the meeting moved to Tuesday")]
        );
        assert!(pairs("the meeting moved to Tuesday").is_empty());
    }

    #[test]
    fn values_are_bounded() {
        let extractor = FactExtractor::new(5);
        let facts = extractor.extract("I love extraordinarily long values");
        assert_eq!(facts[0].value, "extra");
    }

    #[test]
    fn rules_are_ordered() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["name", "likes", "dislikes", "style", "attribute"]);
    }

    proptest::proptest! {
        #[test]
        fn extraction_never_panics_and_respects_bound(text in ".{0,300}") {
            let facts = FactExtractor::new(40).extract(&text);
            for fact in facts {
                proptest::prop_assert!(!fact.value.is_empty());
                proptest::prop_assert!(fact.value.chars().count() <= 40);
            }
        }
    }
}
