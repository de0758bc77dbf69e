// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient decoding of the model's reply payload.
//!
//! The expected shape is `{resp: [{id, resp, react}], aprender?}` but models
//! drift: `resp` may be a single object or a bare string, `aprender` may be a
//! single instruction or a list, and ids or reactions may be missing.
//! Unusable pieces are dropped with a warning instead of failing the reply.

use serde_json::Value;
use tagarela_core::{LearningInstruction, ReplyItem};
use tracing::warn;

/// One reply entry before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    pub id: Option<String>,
    pub text: String,
    pub react: Option<String>,
}

impl ReplyDraft {
    /// Fill the missing id and reaction.
    pub fn finish(self, default_id: &str, default_react: &str) -> ReplyItem {
        ReplyItem {
            id: self.id.unwrap_or_else(|| default_id.to_string()),
            resp: self.text,
            react: self.react.unwrap_or_else(|| default_react.to_string()),
        }
    }
}

/// Decoded model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub drafts: Vec<ReplyDraft>,
    /// Learning instructions in the order the model listed them.
    pub learning: Vec<LearningInstruction>,
}

impl ModelReply {
    pub fn from_value(value: &Value) -> Self {
        let drafts = match value.get("resp") {
            Some(Value::Array(items)) => items.iter().filter_map(draft_from).collect(),
            Some(other) => draft_from(other).into_iter().collect(),
            None => Vec::new(),
        };

        let learning = match value.get("aprender") {
            Some(Value::Array(items)) => items.iter().filter_map(instruction_from).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => instruction_from(single).into_iter().collect(),
        };

        Self { drafts, learning }
    }

    /// Reply texts joined for storage as one assistant turn.
    pub fn transcript(&self) -> String {
        self.drafts
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn draft_from(value: &Value) -> Option<ReplyDraft> {
    match value {
        Value::String(text) => non_empty(text).map(|text| ReplyDraft {
            id: None,
            text,
            react: None,
        }),
        Value::Object(map) => {
            let text = map.get("resp").and_then(scalar_text).and_then(|t| non_empty(&t))?;
            Some(ReplyDraft {
                id: map.get("id").and_then(scalar_text).and_then(|t| non_empty(&t)),
                text,
                react: map.get("react").and_then(scalar_text).and_then(|t| non_empty(&t)),
            })
        }
        _ => None,
    }
}

fn instruction_from(value: &Value) -> Option<LearningInstruction> {
    match serde_json::from_value::<LearningInstruction>(value.clone()) {
        Ok(instruction) => Some(instruction),
        Err(e) => {
            warn!(error = %e, "ignoring malformed learning instruction");
            None
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
