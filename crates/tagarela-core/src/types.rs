// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the conversation layer crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Composite identity of a group + sender pair.
///
/// Scopes conversation history and per-conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    pub group_id: String,
    pub sender_id: String,
}

impl ConversationKey {
    pub fn new(group_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            sender_id: sender_id.into(),
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.sender_id)
    }
}

/// Author of a chat message sent to the completion endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn stored by the history manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Display name of the human who wrote the turn, when known.
    pub speaker: Option<String>,
}

/// A `{role, content}` pair as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            role: entry.role,
            content: entry.content.clone(),
        }
    }
}

/// A single completion call, already flattened into an ordered message list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The decoded result of a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text of every returned choice, in order. May be empty on a malformed reply.
    pub choices: Vec<String>,
    /// The full response body, kept for failure classification.
    pub raw: serde_json::Value,
}

/// One outbound reply entry: `{id, resp, react}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyItem {
    /// Identifier of the inbound message this replies to.
    pub id: String,
    /// Reply text.
    pub resp: String,
    /// Reaction tag to attach to the inbound message.
    pub react: String,
}

/// Result of processing one batch of inbound messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub responses: Vec<ReplyItem>,
    /// Batch-level error description, set when processing stopped or degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
