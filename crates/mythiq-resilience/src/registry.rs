// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injectable map from provider identifier to its health record.
//!
//! Each record sits behind its own lock so concurrent requests never lose a
//! failure-count update, while different providers never contend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mythiq_core::ProviderId;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::circuit::{Admission, CircuitPolicy, CircuitState, ProviderHealth};

/// Point-in-time view of one provider's health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub provider: ProviderId,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Remaining open window in whole seconds, rounded up.
    pub open_for_secs: Option<u64>,
    pub total_successes: u64,
    pub total_failures: u64,
}

/// Health records for a fixed set of providers, in priority order.
#[derive(Debug)]
pub struct HealthRegistry {
    policy: CircuitPolicy,
    order: Vec<ProviderId>,
    records: HashMap<ProviderId, Mutex<ProviderHealth>>,
}

impl HealthRegistry {
    /// Create closed, healthy records for `providers`. Duplicate ids share
    /// one record.
    pub fn new(policy: CircuitPolicy, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        let mut order = Vec::new();
        let mut records = HashMap::new();
        for id in providers {
            if !records.contains_key(&id) {
                records.insert(id.clone(), Mutex::new(ProviderHealth::new(id.clone())));
                order.push(id);
            }
        }
        Self {
            policy,
            order,
            records,
        }
    }

    pub fn policy(&self) -> CircuitPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn lock(&self, id: &ProviderId) -> Option<MutexGuard<'_, ProviderHealth>> {
        self.records
            .get(id)
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether `id` may be called now. Unknown providers are skipped.
    pub fn admit(&self, id: &ProviderId) -> Admission {
        match self.lock(id) {
            Some(mut health) => health.admit(Instant::now()),
            None => Admission::Skipped,
        }
    }

    pub fn record_success(&self, id: &ProviderId) {
        if let Some(mut health) = self.lock(id) {
            health.record_success();
            debug!(provider = %id, "provider call succeeded");
        }
    }

    /// Count a failure; returns whether the circuit opened.
    pub fn record_failure(&self, id: &ProviderId) -> bool {
        let Some(mut health) = self.lock(id) else {
            return false;
        };
        let opened = health.record_failure(Instant::now(), &self.policy);
        if opened {
            warn!(
                provider = %id,
                consecutive_failures = health.consecutive_failures(),
                cooldown_secs = self.policy.cooldown.as_secs(),
                "circuit opened"
            );
        } else {
            debug!(
                provider = %id,
                consecutive_failures = health.consecutive_failures(),
                "provider call failed"
            );
        }
        opened
    }

    pub fn get(&self, id: &ProviderId) -> Option<HealthSnapshot> {
        let now = Instant::now();
        self.lock(id).map(|health| snapshot(&health, now))
    }

    /// Snapshots of every provider, in priority order.
    pub fn snapshot(&self) -> Vec<HealthSnapshot> {
        let now = Instant::now();
        self.order
            .iter()
            .filter_map(|id| self.lock(id).map(|health| snapshot(&health, now)))
            .collect()
    }
}

fn snapshot(health: &ProviderHealth, now: Instant) -> HealthSnapshot {
    let open_for_secs = health
        .circuit_open_until()
        .filter(|until| *until > now)
        .map(|until| {
            let remaining = until - now;
            remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
        });
    HealthSnapshot {
        provider: health.provider_id().clone(),
        state: health.state(now),
        consecutive_failures: health.consecutive_failures(),
        last_failure_at: health.last_failure_at(),
        open_for_secs,
        total_successes: health.total_successes(),
        total_failures: health.total_failures(),
    }
}
