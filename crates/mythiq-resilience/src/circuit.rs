// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Circuit breaker state for a single provider.
//!
//! Time is read from [`tokio::time::Instant`] so that tests running on a
//! paused runtime can move through cool-down windows with
//! `tokio::time::advance`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use mythiq_core::ProviderId;
use serde::Serialize;
use strum::Display;
use tokio::time::Instant;

/// Circuit breaker state as observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are skipped until the cool-down expires.
    Open,
    /// Cool-down expired; the next call is a probe.
    HalfOpen,
}

/// Thresholds shared by every provider of one gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitPolicy {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open.
    pub cooldown: Duration,
}

/// Stand-in deadline when `now + cooldown` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

impl CircuitPolicy {
    /// End of a cool-down window starting at `now`, saturating far in the
    /// future instead of overflowing.
    pub fn open_until(&self, now: Instant) -> Instant {
        now.checked_add(self.cooldown)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }
}

impl Default for CircuitPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Outcome of asking whether a provider may be called right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed: call normally.
    Allowed,
    /// Cool-down expired: this caller carries the single half-open probe.
    Probe,
    /// Circuit open (or a probe is already in flight): do not call.
    Skipped,
}

impl Admission {
    pub fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Transient health record of one provider. Resets on process restart.
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    provider_id: ProviderId,
    consecutive_failures: u32,
    last_failure_at: Option<DateTime<Utc>>,
    circuit_open_until: Option<Instant>,
    probe_in_flight: bool,
    total_successes: u64,
    total_failures: u64,
}

impl ProviderHealth {
    /// A closed, healthy record.
    pub fn new(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            consecutive_failures: 0,
            last_failure_at: None,
            circuit_open_until: None,
            probe_in_flight: false,
            total_successes: 0,
            total_failures: 0,
        }
    }

    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_failure_at(&self) -> Option<DateTime<Utc>> {
        self.last_failure_at
    }

    pub fn circuit_open_until(&self) -> Option<Instant> {
        self.circuit_open_until
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    pub fn state(&self, now: Instant) -> CircuitState {
        match self.circuit_open_until {
            None => CircuitState::Closed,
            Some(until) if now < until => CircuitState::Open,
            Some(_) => CircuitState::HalfOpen,
        }
    }

    /// Decide whether a call may go out. Only a half-open admission mutates
    /// the record (it claims the probe slot).
    pub fn admit(&mut self, now: Instant) -> Admission {
        match self.state(now) {
            CircuitState::Closed => Admission::Allowed,
            CircuitState::Open => Admission::Skipped,
            CircuitState::HalfOpen if self.probe_in_flight => Admission::Skipped,
            CircuitState::HalfOpen => {
                self.probe_in_flight = true;
                Admission::Probe
            }
        }
    }

    /// Close the circuit and reset the failure count.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.circuit_open_until = None;
        self.probe_in_flight = false;
        self.total_successes += 1;
    }

    /// Count a failure. Returns `true` when this failure opened (or reopened)
    /// the circuit.
    pub fn record_failure(&mut self, now: Instant, policy: &CircuitPolicy) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.last_failure_at = Some(Utc::now());

        let failed_probe = std::mem::replace(&mut self.probe_in_flight, false);
        if failed_probe || self.consecutive_failures >= policy.failure_threshold {
            self.circuit_open_until = Some(policy.open_until(now));
            true
        } else {
            false
        }
    }
}
