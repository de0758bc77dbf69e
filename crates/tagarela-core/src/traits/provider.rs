// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for the remote language-model endpoint.

use async_trait::async_trait;

use crate::error::UpstreamFailure;
use crate::types::{CompletionRequest, CompletionResponse};

/// A single round trip to the completion endpoint.
///
/// Implementations perform exactly one call and never retry: retry policy
/// and failure classification belong to the request orchestrator.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Sends one completion request.
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, UpstreamFailure>;
}
