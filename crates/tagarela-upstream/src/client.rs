// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the completion endpoint.
//!
//! [`UpstreamClient`] performs exactly one HTTP exchange per call. Retrying,
//! backoff, and credential bookkeeping live in the request orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tagarela_config::model::UpstreamConfig;
use tagarela_core::{
    CompletionProvider, CompletionRequest, CompletionResponse, TagarelaError, UpstreamFailure,
};
use tracing::debug;

use crate::redact::redact;
use crate::types::{WireRequest, WireResponse, error_message};

/// Environment variable consulted when `upstream.api_key` is not configured.
pub const API_KEY_ENV: &str = "TAGARELA_UPSTREAM_API_KEY";

/// HTTP client for the completion endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    api_key: SecretString,
}

impl UpstreamClient {
    /// Build a client from configuration.
    ///
    /// The access key goes in `auth_header`. For `Authorization` it is sent
    /// as a bearer token, for any other header name it is sent verbatim.
    pub fn new(config: &UpstreamConfig) -> Result<Self, TagarelaError> {
        let raw_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                TagarelaError::Config(format!(
                    "upstream.api_key is not set (config file or {API_KEY_ENV})"
                ))
            })?;
        let api_key = SecretString::from(raw_key);

        let header_name = HeaderName::from_bytes(config.auth_header.as_bytes())
            .map_err(|e| TagarelaError::Config(format!("invalid auth header name: {e}")))?;
        let header_text = if header_name == reqwest::header::AUTHORIZATION {
            format!("Bearer {}", api_key.expose_secret())
        } else {
            api_key.expose_secret().to_string()
        };
        let mut header_value = HeaderValue::from_str(&header_text)
            .map_err(|e| TagarelaError::Config(format!("invalid API key header value: {e}")))?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header_name, header_value);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TagarelaError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
            api_key,
        })
    }

    /// Secrets that must never appear in logs or alerts.
    pub fn secrets(&self) -> Vec<String> {
        vec![self.api_key.expose_secret().to_string()]
    }

    fn scrub(&self, text: &str) -> String {
        redact(text, &self.secrets())
    }

    fn transport_failure(&self, err: reqwest::Error) -> UpstreamFailure {
        if err.is_timeout() {
            UpstreamFailure::network(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            UpstreamFailure::network(self.scrub(&format!("HTTP request failed: {err}")))
        }
    }
}

#[async_trait]
impl CompletionProvider for UpstreamClient {
    fn name(&self) -> &str {
        "upstream"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, UpstreamFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&WireRequest::from(request))
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(e))?;
        let payload = serde_json::from_str::<serde_json::Value>(&body).ok();

        if !status.is_success() {
            let detail = payload
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| body.clone());
            return Err(UpstreamFailure::http(
                status.as_u16(),
                self.scrub(&format!("endpoint returned {status}: {detail}")),
                payload,
            ));
        }

        let Some(raw) = payload else {
            return Err(UpstreamFailure::http(
                status.as_u16(),
                "response body is not JSON",
                None,
            ));
        };

        let parsed: WireResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            UpstreamFailure::http(
                status.as_u16(),
                format!("unexpected response shape: {e}"),
                Some(raw.clone()),
            )
        })?;

        Ok(CompletionResponse {
            choices: parsed.into_texts(),
            raw,
        })
    }
}
