// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use mythiq_core::{MythiqError, upstream_excerpt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Bearer-authenticated chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    provider: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(provider: &str, api_key: &str, base_url: &str) -> Result<Self, MythiqError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| MythiqError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MythiqError::ProviderRejected {
                provider: provider.to_string(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            provider: provider.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn complete(
        &self,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<ChatResponse, MythiqError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;

        let status = response.status();
        debug!(provider = %self.provider, status = %status, "chat completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => {
                    let detail = upstream_excerpt(&api_err.error.message);
                    match api_err.error.type_ {
                        Some(kind) => format!("API error ({kind}): {detail}"),
                        None => format!("API error ({status}): {detail}"),
                    }
                }
                Err(_) => format!("API returned {status}: {}", upstream_excerpt(&body)),
            };
            return Err(MythiqError::rejected(&self.provider, message));
        }

        serde_json::from_str(&body).map_err(|e| MythiqError::ProviderRejected {
            provider: self.provider.clone(),
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn transport_error(&self, err: reqwest::Error, timeout: Duration) -> MythiqError {
        if err.is_timeout() {
            MythiqError::ProviderTimeout {
                provider: self.provider.clone(),
                duration: timeout,
            }
        } else {
            MythiqError::ProviderRejected {
                provider: self.provider.clone(),
                message: format!("HTTP request failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}
