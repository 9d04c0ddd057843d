// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider gateway for the Mythiq conversational core.
//!
//! [`ProviderGateway`] presents a single `ask` operation over an ordered list
//! of [`ProviderAdapter`](mythiq_core::ProviderAdapter)s. Providers are tried
//! in priority order; open circuits are skipped without a call; every call is
//! bounded by its timeout. When nothing answers, the [`LocalResponder`]
//! produces a deterministic reply so the caller always gets text back.

pub mod fallback;
pub mod gateway;

pub use fallback::LocalResponder;
pub use gateway::{GatewayBuilder, GatewayRequest, GatewayResponse, ProviderGateway};
pub use mythiq_resilience::{CircuitPolicy, CircuitState, HealthSnapshot};
