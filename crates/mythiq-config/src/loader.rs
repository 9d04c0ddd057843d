// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/mythiq/mythiq.toml`
//! 3. `$XDG_CONFIG_HOME/mythiq/mythiq.toml`
//! 4. `./mythiq.toml`
//! 5. `MYTHIQ_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MythiqConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/mythiq/mythiq.toml";
pub(crate) const LOCAL_CONFIG: &str = "mythiq.toml";

/// Sections that can be overridden from the environment.
///
/// `[[providers]]` is an array of tables and is only configurable from files.
const ENV_SECTIONS: &[&str] = &["agent", "storage", "gateway", "learning"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mythiq").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<MythiqConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MythiqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MythiqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MythiqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MythiqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MythiqConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that
/// `MYTHIQ_GATEWAY_FAILURE_THRESHOLD` becomes `gateway.failure_threshold`
/// and not `gateway.failure.threshold`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("MYTHIQ_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(*section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
