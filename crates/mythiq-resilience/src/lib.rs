// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for the provider gateway.
//!
//! [`ProviderHealth`] is the per-provider circuit breaker record and
//! [`HealthRegistry`] is the injectable map of those records a gateway owns.
//! Nothing here is process-global: two gateways never share health.

pub mod circuit;
pub mod registry;

pub use circuit::{Admission, CircuitPolicy, CircuitState, ProviderHealth};
pub use registry::{HealthRegistry, HealthSnapshot};
