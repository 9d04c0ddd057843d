// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mythiq conversational core.
//!
//! Only [`MythiqError::Validation`] ever reaches the presentation layer from
//! `chat()`. Every other variant is absorbed by the gateway (provider
//! failures) or by the orchestrator (storage failures).

use std::time::Duration;

use thiserror::Error;

/// Boxed error source carried by storage and provider variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Characters of an upstream response body kept in error messages.
pub const UPSTREAM_EXCERPT_CHARS: usize = 200;

/// First [`UPSTREAM_EXCERPT_CHARS`] characters of `text`, marked when cut.
/// Provider error bodies end up in logs, so they are never carried whole.
pub fn upstream_excerpt(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(UPSTREAM_EXCERPT_CHARS) {
        Some((idx, _)) => {
            let dropped = text[idx..].chars().count();
            format!("{}... ({dropped} more chars)", &text[..idx])
        }
        None => text.to_string(),
    }
}

/// The primary error type used across all Mythiq adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MythiqError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Inbound request rejected before any provider or storage work began.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A Knowledge Store write failed (disk full, lock contention, closed connection).
    #[error("storage error: {source}")]
    Storage { source: BoxError },

    /// A Knowledge Store read failed. Callers treat this as empty context.
    #[error("storage unavailable for read: {source}")]
    StorageUnavailableForRead { source: BoxError },

    /// A provider call exceeded its per-call bound.
    #[error("provider `{provider}` timed out after {duration:?}")]
    ProviderTimeout { provider: String, duration: Duration },

    /// A provider answered with a non-success status or a malformed payload.
    #[error("provider `{provider}` rejected the request: {message}")]
    ProviderRejected {
        provider: String,
        message: String,
        source: Option<BoxError>,
    },

    /// Every candidate provider failed or was skipped.
    #[error("all providers exhausted after {attempted} attempt(s)")]
    AllProvidersExhausted { attempted: usize },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MythiqError {
    /// Wraps any error as a write-side [`MythiqError::Storage`].
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Storage { source: err.into() }
    }

    /// Wraps any error as a [`MythiqError::StorageUnavailableForRead`].
    pub fn storage_read<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::StorageUnavailableForRead { source: err.into() }
    }

    /// Builds a [`MythiqError::ProviderRejected`] without an underlying source.
    pub fn rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRejected {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// True for both storage variants.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::StorageUnavailableForRead { .. }
        )
    }

    /// True for provider-side failures handled by gateway fallback.
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            Self::ProviderTimeout { .. }
                | Self::ProviderRejected { .. }
                | Self::AllProvidersExhausted { .. }
        )
    }
}
