// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mythiq conversational core.
//!
//! This crate provides the error taxonomy, the domain data model (users,
//! facts, conversation turns, emotions) and the adapter traits that provider
//! and knowledge-store implementations plug into.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{MythiqError, upstream_excerpt};
pub use types::{
    AdapterType, ConversationTurn, Emotion, Fact, HealthStatus, LOCAL_FALLBACK_SENTINEL,
    PreferenceCategory, ProviderId,
    ProviderRequest, ServedBy, StoreStats, UserId,
};

pub use traits::{KnowledgeStore, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mythiq_error_has_all_variants() {
        let _config = MythiqError::Config("test".into());
        let _validation = MythiqError::Validation("test".into());
        let _storage = MythiqError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _read = MythiqError::StorageUnavailableForRead {
            source: Box::new(std::io::Error::other("test")),
        };
        let _timeout = MythiqError::ProviderTimeout {
            provider: "groq".into(),
            duration: std::time::Duration::from_secs(30),
        };
        let _rejected = MythiqError::ProviderRejected {
            provider: "groq".into(),
            message: "HTTP 500".into(),
            source: None,
        };
        let _exhausted = MythiqError::AllProvidersExhausted { attempted: 3 };
        let _internal = MythiqError::Internal("test".into());
    }

    #[test]
    fn adapter_type_roundtrips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_knowledge_store<T: KnowledgeStore>() {}
    }
}
