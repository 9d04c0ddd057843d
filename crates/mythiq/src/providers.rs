// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds provider adapters from the `[[providers]]` list.

use std::sync::Arc;
use std::time::Duration;

use mythiq_anthropic::AnthropicProvider;
use mythiq_config::MythiqConfig;
use mythiq_config::model::{ProviderConfig, ProviderKind};
use mythiq_core::{MythiqError, ProviderAdapter};
use mythiq_openai::OpenAiProvider;
use tracing::{info, warn};

/// A ready adapter and the bound applied to each of its calls.
pub struct ConfiguredProvider {
    pub adapter: Arc<dyn ProviderAdapter>,
    pub timeout: Duration,
}

/// Instantiate every enabled provider that has an API key, in priority order.
///
/// Providers without a key are skipped with a warning so a partially
/// configured install still starts.
pub fn build_providers(config: &MythiqConfig) -> Result<Vec<ConfiguredProvider>, MythiqError> {
    let default_timeout = config.gateway.call_timeout();
    let mut providers = Vec::new();

    for provider in &config.providers {
        if !provider.enabled {
            info!(provider = %provider.name, "provider disabled by configuration");
            continue;
        }
        let Some(api_key) = provider.resolve_api_key() else {
            warn!(
                provider = %provider.name,
                api_key_env = provider.api_key_env.as_deref().unwrap_or("<unset>"),
                "no API key found, skipping provider"
            );
            continue;
        };
        providers.push(ConfiguredProvider {
            adapter: instantiate(provider, &api_key)?,
            timeout: provider.timeout(default_timeout),
        });
    }

    if providers.is_empty() {
        warn!("no providers available, every reply will come from the local responder");
    }
    Ok(providers)
}

fn instantiate(provider: &ProviderConfig, api_key: &str) -> Result<Arc<dyn ProviderAdapter>, MythiqError> {
    let adapter: Arc<dyn ProviderAdapter> = match provider.kind {
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(provider, api_key)?),
        ProviderKind::Openai => Arc::new(OpenAiProvider::new(provider, api_key)?),
    };
    Ok(adapter)
}
