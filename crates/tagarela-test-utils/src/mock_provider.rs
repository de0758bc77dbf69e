// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `CompletionProvider` with a scripted queue of
//! outcomes and records every request it receives, enabling fast,
//! CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use tagarela_core::{
    CompletionProvider, CompletionRequest, CompletionResponse, UpstreamFailure,
};

/// A mock completion provider that replays scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a
/// minimal valid reply is returned.
#[derive(Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Result<String, UpstreamFailure>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with successful replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_script(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock provider pre-loaded with arbitrary outcomes.
    pub fn with_script(script: Vec<Result<String, UpstreamFailure>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::default(),
        }
    }

    /// Queue a successful reply.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub async fn push_failure(&self, failure: UpstreamFailure) {
        self.script.lock().await.push_back(Err(failure));
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_outcome(&self) -> Result<String, UpstreamFailure> {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(r#"{"resp": [{"resp": "mock response"}]}"#.to_string()))
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, UpstreamFailure> {
        self.requests.lock().await.push(request.clone());
        let text = self.next_outcome().await?;
        Ok(CompletionResponse {
            raw: json!({"data": {"choices": [{"message": {"content": text}}]}}),
            choices: vec![text],
        })
    }
}
