// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Mythiq conversational core.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use mythiq_config::load_and_validate;
//!
//! let config = match load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         mythiq_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("failure threshold: {}", config.gateway.failure_threshold);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, TomlSource, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MythiqConfig;

use std::path::Path;

/// Load from the standard hierarchy plus `MYTHIQ_*` overrides, then validate.
pub fn load_and_validate() -> Result<MythiqConfig, Vec<ConfigError>> {
    finish(loader::load_config(), hierarchy_sources)
}

/// Load from one explicit file plus `MYTHIQ_*` overrides, then validate.
pub fn load_and_validate_path(path: &Path) -> Result<MythiqConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load from a TOML string, then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<MythiqConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![TomlSource::new("<inline>", toml_content)]
    })
}

/// Validate a loaded config, or turn the figment error into diagnostics.
/// Sources are only read back from disk when there is something to point at.
fn finish(
    loaded: Result<MythiqConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<TomlSource>,
) -> Result<MythiqConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn read_source(path: &Path) -> Option<TomlSource> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(TomlSource::new(path.display().to_string(), content))
}

/// Every hierarchy file that exists, named the way figment reports it.
fn hierarchy_sources() -> Vec<TomlSource> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG.into());
    [Some(local), loader::user_config_path(), Some(loader::SYSTEM_CONFIG.into())]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}
