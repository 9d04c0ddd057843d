// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered fallback across providers with per-provider circuit breaking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mythiq_config::model::GatewayConfig;
use mythiq_core::{MythiqError, ProviderAdapter, ProviderId, ProviderRequest, ServedBy};
use mythiq_resilience::{Admission, CircuitPolicy, HealthRegistry, HealthSnapshot};
use tracing::{Instrument, debug, error, warn};

use crate::fallback::LocalResponder;

/// Everything one `ask` needs. Owned so the attempt loop can outlive a
/// cancelled caller.
#[derive(Debug, Clone, Default)]
pub struct GatewayRequest {
    pub system_prompt: Option<String>,
    /// Fully assembled prompt sent to providers.
    pub prompt: String,
    /// The user's raw message, used by the local responder.
    pub message: String,
    /// Known facts, used by the local responder.
    pub facts: HashMap<String, String>,
}

/// Text produced for a request and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub text: String,
    pub served_by: ServedBy,
    /// Providers actually called (skipped circuits are not counted).
    pub attempts: usize,
}

struct ProviderSlot {
    adapter: Arc<dyn ProviderAdapter>,
    timeout: Duration,
}

struct GatewayInner {
    providers: Vec<ProviderSlot>,
    health: HealthRegistry,
    responder: LocalResponder,
}

/// Collects providers in priority order.
pub struct GatewayBuilder {
    policy: CircuitPolicy,
    default_timeout: Duration,
    responder: LocalResponder,
    providers: Vec<ProviderSlot>,
}

impl GatewayBuilder {
    pub fn new(policy: CircuitPolicy, default_timeout: Duration, fallback_text: impl Into<String>) -> Self {
        Self {
            policy,
            default_timeout,
            responder: LocalResponder::new(fallback_text),
            providers: Vec::new(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            CircuitPolicy {
                failure_threshold: config.failure_threshold,
                cooldown: config.cooldown(),
            },
            config.call_timeout(),
            config.fallback_text.clone(),
        )
    }

    /// Append a provider bounded by the default call timeout.
    pub fn provider(self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        let timeout = self.default_timeout;
        self.provider_with_timeout(adapter, timeout)
    }

    /// Append a provider with its own call timeout.
    pub fn provider_with_timeout(mut self, adapter: Arc<dyn ProviderAdapter>, timeout: Duration) -> Self {
        self.providers.push(ProviderSlot { adapter, timeout });
        self
    }

    pub fn build(self) -> ProviderGateway {
        let health = HealthRegistry::new(
            self.policy,
            self.providers.iter().map(|slot| slot.adapter.id()),
        );
        ProviderGateway {
            inner: Arc::new(GatewayInner {
                providers: self.providers,
                health,
                responder: self.responder,
            }),
        }
    }
}

/// One logical `ask` over N providers. Cheap to clone; clones share health.
#[derive(Clone)]
pub struct ProviderGateway {
    inner: Arc<GatewayInner>,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("providers", &self.provider_ids())
            .finish_non_exhaustive()
    }
}

impl ProviderGateway {
    pub fn builder(config: &GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::from_config(config)
    }

    /// Provider identifiers in priority order.
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.inner.providers.iter().map(|s| s.adapter.id()).collect()
    }

    pub fn responder(&self) -> &LocalResponder {
        &self.inner.responder
    }

    /// Circuit state and counters for every provider, in priority order.
    pub fn health_snapshot(&self) -> Vec<HealthSnapshot> {
        self.inner.health.snapshot()
    }

    /// Ask providers in priority order; never fails.
    ///
    /// The attempt loop runs on its own task, so dropping the returned future
    /// does not interrupt a call in flight and health accounting still lands.
    pub async fn ask(&self, request: GatewayRequest) -> GatewayResponse {
        let inner = Arc::clone(&self.inner);
        let fallback_text = inner.responder.fallback_text().to_string();
        let task = tokio::spawn(async move { inner.run(request).await }.in_current_span());
        match task.await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "gateway task failed, answering locally");
                GatewayResponse {
                    text: fallback_text,
                    served_by: ServedBy::LocalFallback,
                    attempts: 0,
                }
            }
        }
    }

    /// Shut down every provider adapter. Errors are logged.
    pub async fn shutdown(&self) {
        for slot in &self.inner.providers {
            if let Err(err) = slot.adapter.shutdown().await {
                warn!(provider = %slot.adapter.id(), error = %err, "provider shutdown failed");
            }
        }
    }
}

impl GatewayInner {
    async fn run(&self, request: GatewayRequest) -> GatewayResponse {
        let mut attempts = 0;

        for slot in &self.providers {
            let id = slot.adapter.id();
            match self.health.admit(&id) {
                Admission::Skipped => {
                    debug!(provider = %id, "circuit open, skipping provider");
                    continue;
                }
                Admission::Probe => debug!(provider = %id, "half-open probe"),
                Admission::Allowed => {}
            }

            attempts += 1;
            match self.call(slot, &id, &request).await {
                Ok(text) => {
                    self.health.record_success(&id);
                    return GatewayResponse {
                        text,
                        served_by: ServedBy::Provider(id),
                        attempts,
                    };
                }
                Err(err) => {
                    warn!(provider = %id, error = %err, "provider call failed");
                    self.health.record_failure(&id);
                }
            }
        }

        let exhausted = MythiqError::AllProvidersExhausted { attempted: attempts };
        warn!(error = %exhausted, "answering with the local responder");
        GatewayResponse {
            text: self.responder.respond(&request.message, &request.facts),
            served_by: ServedBy::LocalFallback,
            attempts,
        }
    }

    /// One bounded call. The adapter runs on its own task, so a panic inside
    /// it comes back as an error and is counted like any other failure.
    async fn call(
        &self,
        slot: &ProviderSlot,
        id: &ProviderId,
        request: &GatewayRequest,
    ) -> Result<String, MythiqError> {
        let provider_request = ProviderRequest {
            system_prompt: request.system_prompt.clone(),
            prompt: request.prompt.clone(),
            timeout: slot.timeout,
        };
        let adapter = Arc::clone(&slot.adapter);
        let timeout = slot.timeout;
        let call = tokio::spawn(
            async move { tokio::time::timeout(timeout, adapter.ask(&provider_request)).await }
                .in_current_span(),
        );
        let text = match call.await {
            Ok(Ok(result)) => result?,
            Ok(Err(_elapsed)) => {
                return Err(MythiqError::ProviderTimeout {
                    provider: id.to_string(),
                    duration: timeout,
                });
            }
            Err(err) if err.is_panic() => {
                return Err(MythiqError::Internal(format!("provider {id} panicked")));
            }
            Err(err) => return Err(MythiqError::Internal(format!("provider {id} call aborted: {err}"))),
        };
        if text.trim().is_empty() {
            return Err(MythiqError::rejected(id.as_str(), "empty response"));
        }
        Ok(text)
    }
}
