// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use mythiq_core::LOCAL_FALLBACK_SENTINEL;

use crate::diagnostic::ConfigError;
use crate::model::{MythiqConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest circuit cool-down accepted from configuration.
pub const MAX_COOLDOWN_SECS: u64 = 7 * 24 * 60 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &MythiqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }
    if config.agent.max_message_chars < 1 {
        fail("agent.max_message_chars must be at least 1".to_string());
    }
    if config.agent.max_user_id_chars < 1 {
        fail("agent.max_user_id_chars must be at least 1".to_string());
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        fail("storage.database_path must not be empty for the sqlite backend".to_string());
    }

    if config.gateway.failure_threshold < 1 {
        fail("gateway.failure_threshold must be at least 1".to_string());
    }
    if config.gateway.cooldown_secs < 1 {
        fail("gateway.cooldown_secs must be at least 1".to_string());
    } else if config.gateway.cooldown_secs > MAX_COOLDOWN_SECS {
        fail(format!(
            "gateway.cooldown_secs must be at most {MAX_COOLDOWN_SECS} (one week)"
        ));
    }
    if config.gateway.call_timeout_ms < 1 {
        fail("gateway.call_timeout_ms must be at least 1".to_string());
    }
    if config.gateway.fallback_text.trim().is_empty() {
        fail("gateway.fallback_text must not be empty".to_string());
    }

    if config.learning.deferred_capacity < 1 {
        fail("learning.deferred_capacity must be at least 1".to_string());
    }
    if config.learning.max_value_chars < 1 {
        fail("learning.max_value_chars must be at least 1".to_string());
    }

    let mut seen_names = HashSet::new();
    for (i, provider) in config.providers.iter().enumerate() {
        if provider.name.trim().is_empty() {
            fail(format!("providers[{i}].name must not be empty"));
        } else if provider.name == LOCAL_FALLBACK_SENTINEL {
            fail(format!(
                "providers[{i}].name `{LOCAL_FALLBACK_SENTINEL}` is reserved for the local responder"
            ));
        } else if !seen_names.insert(provider.name.as_str()) {
            fail(format!(
                "duplicate provider name `{}` in [[providers]] array",
                provider.name
            ));
        }
        if provider.model.trim().is_empty() {
            fail(format!("providers[{i}].model must not be empty"));
        }
        if !(0.0..=2.0).contains(&provider.temperature) {
            fail(format!(
                "providers[{i}].temperature must be within [0, 2], got {}",
                provider.temperature
            ));
        }
        if provider.max_tokens < 1 {
            fail(format!("providers[{i}].max_tokens must be at least 1"));
        }
        if provider.timeout_ms == Some(0) {
            fail(format!("providers[{i}].timeout_ms must be at least 1"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &MythiqConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MythiqConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_only_for_sqlite() {
        let mut config = MythiqConfig::default();
        config.storage.database_path = "".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));

        config.storage.backend = StorageBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_threshold_and_cooldown_are_both_reported() {
        let mut config = MythiqConfig::default();
        config.gateway.failure_threshold = 0;
        config.gateway.cooldown_secs = 0;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].contains("failure_threshold"));
        assert!(msgs[1].contains("cooldown_secs"));
    }

    #[test]
    fn cooldown_longer_than_a_week_fails() {
        let mut config = MythiqConfig::default();
        config.gateway.cooldown_secs = MAX_COOLDOWN_SECS;
        assert!(validate_config(&config).is_ok());

        config.gateway.cooldown_secs = u64::MAX;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("at most 604800"), "got: {}", msgs[0]);
    }

    #[test]
    fn blank_fallback_text_fails() {
        let mut config = MythiqConfig::default();
        config.gateway.fallback_text = "  ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("fallback_text")));
    }

    #[test]
    fn duplicate_provider_names_fail() {
        let mut config = MythiqConfig::default();
        let dup = config.providers[0].clone();
        config.providers.push(dup);
        assert!(messages(&config).iter().any(|m| m.contains("duplicate provider name `groq`")));
    }

    #[test]
    fn reserved_provider_name_fails() {
        let mut config = MythiqConfig::default();
        config.providers[0].name = "local-fallback".into();
        assert!(messages(&config).iter().any(|m| m.contains("reserved for the local responder")));
    }

    #[test]
    fn temperature_out_of_range_fails() {
        let mut config = MythiqConfig::default();
        config.providers[1].temperature = 2.5;
        assert!(messages(&config).iter().any(|m| m.contains("providers[1].temperature")));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = MythiqConfig::default();
        config.agent.log_level = "verbose".into();
        assert!(messages(&config).iter().any(|m| m.contains("log_level")));
    }
}
