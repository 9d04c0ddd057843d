// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for external text-generation services.

use async_trait::async_trait;

use crate::error::MythiqError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderId, ProviderRequest};

/// A single external AI backend behind the uniform `ask` capability.
///
/// Implementations report transport timeouts as
/// [`MythiqError::ProviderTimeout`] and non-success or malformed responses as
/// [`MythiqError::ProviderRejected`]. The gateway applies its own bound on top
/// of whatever the adapter does.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Identifier used for health accounting and turn records.
    fn id(&self) -> ProviderId {
        ProviderId(self.name().to_string())
    }

    /// Sends the prompt and returns the generated text.
    async fn ask(&self, request: &ProviderRequest) -> Result<String, MythiqError>;
}
