// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion endpoint access for the Tagarela conversation layer.
//!
//! [`UpstreamClient`] speaks HTTP to the endpoint and implements
//! [`CompletionProvider`](tagarela_core::CompletionProvider).
//! [`RequestOrchestrator`] wraps any provider with retry, backoff, and
//! credential tracking.

pub mod client;
pub mod orchestrator;
pub mod redact;
pub mod types;

use std::sync::Arc;

use tagarela_config::TagarelaConfig;
use tagarela_core::TagarelaError;
use tagarela_resilience::CredentialTracker;
use tokio::sync::Mutex;
use tracing::info;

pub use client::{API_KEY_ENV, UpstreamClient};
pub use orchestrator::{ModelSettings, RequestOrchestrator, RetryPolicy};
pub use redact::redact;

/// Build a request orchestrator backed by the HTTP client.
pub fn orchestrator_from_config(
    config: &TagarelaConfig,
) -> Result<RequestOrchestrator, TagarelaError> {
    let client = UpstreamClient::new(&config.upstream)?;
    let secrets = client.secrets();
    let tracker = Arc::new(Mutex::new(CredentialTracker::from_config(
        &config.resilience,
    )));

    info!(
        endpoint = %config.upstream.endpoint,
        model = %config.upstream.model,
        max_retries = config.upstream.max_retries,
        "upstream client initialized"
    );

    Ok(RequestOrchestrator::new(
        Arc::new(client),
        tracker,
        RetryPolicy::from_config(&config.upstream),
        ModelSettings::from_config(&config.upstream),
    )
    .with_secrets(secrets))
}
