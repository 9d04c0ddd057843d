// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process setup shared by every subcommand.

use mythiq_agent::Orchestrator;
use mythiq_config::MythiqConfig;
use mythiq_core::{MythiqError, PluginAdapter};
use mythiq_gateway::ProviderGateway;
use tracing::info;

use crate::providers::build_providers;

/// Open the store, build the provider chain and wire the orchestrator.
pub async fn build_orchestrator(config: &MythiqConfig) -> Result<Orchestrator, MythiqError> {
    let store = mythiq_storage::open_store(&config.storage).await?;

    let mut gateway = ProviderGateway::builder(&config.gateway);
    for provider in build_providers(config)? {
        gateway = gateway.provider_with_timeout(provider.adapter, provider.timeout);
    }
    let gateway = gateway.build();

    info!(
        store = store.name(),
        providers = ?gateway.provider_ids().iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        "orchestrator ready"
    );
    Ok(Orchestrator::new(config, store, gateway))
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mythiq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
