// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys and unknown enum values (`backend = "postgre"`,
//! `kind = "antropic"`) get a "did you mean" hint and, when the offending
//! file is known, a label pointing at the line.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity above which a candidate is offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One problem found while loading `mythiq.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(mythiq::config::unknown_key), help("{}", hint(suggestion.as_deref(), "valid keys", valid_keys)))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Keys accepted by the enclosing section, comma-separated.
        valid_keys: String,
        #[label("not a recognized key here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("unsupported value `{value}` for `{key}`")]
    #[diagnostic(code(mythiq::config::unknown_value), help("{}", hint(suggestion.as_deref(), "supported values", valid_values)))]
    UnknownValue {
        key: String,
        value: String,
        suggestion: Option<String>,
        valid_values: String,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(mythiq::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(mythiq::config::missing_key),
        help("every [[providers]] entry needs `name`, `kind` and `model`")
    )]
    MissingKey { key: String },

    /// Semantic problem found after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(mythiq::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mythiq::config::other))]
    Other(String),
}

impl From<ConfigError> for mythiq_core::MythiqError {
    fn from(err: ConfigError) -> Self {
        mythiq_core::MythiqError::Config(err.to_string())
    }
}

fn hint(suggestion: Option<&str>, what: &str, options: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {what}: {options}"),
        None => format!("{what}: {options}"),
    }
}

/// A TOML document that may have contributed to the merged configuration.
#[derive(Debug, Clone)]
pub struct TomlSource {
    pub name: String,
    pub content: String,
}

impl TomlSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Convert every error inside a `figment::Error` into a diagnostic.
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &[TomlSource]) -> ConfigError {
    let dotted = error.path.join(".");
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = match locate(error, field, sources) {
                Some((span, src)) => (Some(span), Some(src)),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::UnknownVariant(value, expected) => ConfigError::UnknownValue {
            key: dotted,
            value: value.clone(),
            suggestion: suggest_key(value, expected),
            valid_values: expected.join(", "),
        },
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: dotted,
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Pick the source that produced `error` and find `field` inside it.
fn locate(
    error: &figment::Error,
    field: &str,
    sources: &[TomlSource],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = error.metadata.as_ref().and_then(|m| m.source.as_ref());
    let source = match origin {
        Some(figment::Source::File(path)) => {
            let path = path.display().to_string();
            sources.iter().find(|s| s.name == path)
        }
        // Inline strings carry no path; only a lone source is unambiguous.
        _ if sources.len() == 1 => sources.first(),
        _ => None,
    }?;

    let offset = find_key_offset(&source.content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(&source.name, source.content.clone()),
    ))
}

/// Byte offset of `field` at the start of a line, searched after the header
/// of the first section in `path` (`[gateway]` or `[[providers]]`).
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => section_body_start(content, section)?,
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        let is_key = rest
            .strip_prefix(field)
            .is_some_and(|after| after.starts_with([' ', '\t', '=']));
        if is_key {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

fn section_body_start(content: &str, section: &str) -> Option<usize> {
    [format!("[[{section}]]"), format!("[{section}]")]
        .iter()
        .find_map(|header| content.find(header.as_str()).map(|pos| pos + header.len()))
}

/// Closest candidate by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Print every diagnostic to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_gateway_key_for_typo() {
        let valid = &["failure_threshold", "cooldown_secs", "call_timeout_ms"];
        assert_eq!(
            suggest_key("failure_threshhold", valid),
            Some("failure_threshold".to_string())
        );
    }

    #[test]
    fn suggests_backend_for_misspelled_value() {
        assert_eq!(suggest_key("sqlit", &["sqlite", "memory"]), Some("sqlite".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level", "history_turns"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn key_offset_inside_table() {
        let content = "[agent]\nnaem = \"test\"\n";
        let o = find_key_offset(content, &["agent".to_string()], "naem").unwrap();
        assert_eq!(&content[o..o + 4], "naem");
    }

    #[test]
    fn key_offset_inside_array_of_tables() {
        let content = "[gateway]\ncooldown_secs = 5\n\n[[providers]]\nname = \"x\"\nmodle = \"m\"\n";
        let path = vec!["providers".to_string(), "0".to_string()];
        let o = find_key_offset(content, &path, "modle").unwrap();
        assert_eq!(&content[o..o + 5], "modle");
    }

    #[test]
    fn key_prefix_does_not_match_longer_key() {
        let content = "[gateway]\ncooldown_secs_extra = 1\n";
        assert_eq!(find_key_offset(content, &["gateway".to_string()], "cooldown_secs"), None);
    }

    #[test]
    fn config_error_converts_to_core_error() {
        let err: mythiq_core::MythiqError = ConfigError::Validation {
            message: "bad".into(),
        }
        .into();
        assert!(matches!(err, mythiq_core::MythiqError::Config(m) if m.contains("bad")));
    }
}
