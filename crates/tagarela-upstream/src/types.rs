// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the completion endpoint.
//!
//! Request: `{messages:[{role,content}], model, temperature, max_tokens}`.
//! Response: `{data:{choices:[{message:{content}}]}}`. A bare top-level
//! `choices` array is accepted as well.

use serde::{Deserialize, Serialize};
use tagarela_core::{ChatMessage, CompletionRequest};

/// Request body sent to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> From<&'a CompletionRequest> for WireRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            messages: &request.messages,
            model: &request.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Successful response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub data: Option<WireChoices>,
    #[serde(default)]
    pub choices: Option<Vec<WireChoice>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireChoices {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChoice {
    #[serde(default)]
    pub message: Option<WireMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl WireResponse {
    /// Text of every choice that carries content, in order.
    pub fn into_texts(self) -> Vec<String> {
        let choices = match (self.data, self.choices) {
            (Some(data), _) if !data.choices.is_empty() => data.choices,
            (_, Some(choices)) => choices,
            _ => Vec::new(),
        };
        choices
            .into_iter()
            .filter_map(|c| c.message.and_then(|m| m.content))
            .collect()
    }
}

/// Error body shapes seen from the endpoint: `{"error": {"message": ..}}`,
/// `{"error": ".."}` or `{"message": ".."}`.
pub fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| error.and_then(|e| e.as_str()))
        .or_else(|| body.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}
