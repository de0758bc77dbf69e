// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound chat messages and their validation.
//!
//! The chat bridge delivers each message either as a structured JSON record
//! or as a delimited positional string carrying the same fields in the same
//! order. Both encodings decode into [`InboundMessage`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TagarelaError;
use crate::lenient;
use crate::types::ConversationKey;

/// Field separator of the positional encoding.
pub const POSITIONAL_DELIMITER: char = '|';

/// Minimum number of fields a positional message must carry.
pub const MIN_POSITIONAL_FIELDS: usize = 7;

/// A validated message received from the chat bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "data_atual", default, deserialize_with = "lenient::string")]
    pub current_date: String,
    #[serde(rename = "data_mensagem", default, deserialize_with = "lenient::string")]
    pub message_date: String,
    #[serde(rename = "texto", default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(rename = "id_enviou", default, deserialize_with = "lenient::string")]
    pub sender_id: String,
    #[serde(rename = "nome_enviou", default, deserialize_with = "lenient::string")]
    pub sender_name: String,
    #[serde(rename = "id_grupo", default, deserialize_with = "lenient::string")]
    pub group_id: String,
    #[serde(rename = "nome_grupo", default, deserialize_with = "lenient::string")]
    pub group_name: String,
    #[serde(rename = "tem_midia", default, deserialize_with = "lenient::boolean")]
    pub has_media: bool,
    /// The message quotes another message.
    #[serde(rename = "marcou_mensagem", default, deserialize_with = "lenient::boolean")]
    pub quotes_message: bool,
    /// The quoted message was written by the bot itself.
    #[serde(rename = "marcou_sua_mensagem", default, deserialize_with = "lenient::boolean")]
    pub quotes_bot: bool,
    #[serde(rename = "mensagem_marcada", default, deserialize_with = "lenient::string")]
    pub quoted_text: String,
    #[serde(rename = "id_enviou_marcada", default, deserialize_with = "lenient::string")]
    pub quoted_sender_id: String,
    #[serde(rename = "tem_midia_marcada", default, deserialize_with = "lenient::boolean")]
    pub quoted_has_media: bool,
    #[serde(rename = "id_mensagem", default, deserialize_with = "lenient::string")]
    pub message_id: String,
}

impl InboundMessage {
    /// Decode and validate a message in either supported encoding.
    pub fn from_value(value: &Value) -> Result<Self, TagarelaError> {
        let message = match value {
            Value::Object(_) => serde_json::from_value::<InboundMessage>(value.clone())
                .map_err(|e| TagarelaError::Validation {
                    message: format!("malformed message record: {e}"),
                })?,
            Value::String(line) => Self::from_positional(line)?,
            other => {
                return Err(TagarelaError::Validation {
                    message: format!("unsupported message encoding: {}", type_name(other)),
                });
            }
        };
        message.validate()?;
        Ok(message)
    }

    /// Decode the delimited positional encoding. Missing trailing fields default.
    pub fn from_positional(line: &str) -> Result<Self, TagarelaError> {
        let fields: Vec<&str> = line.split(POSITIONAL_DELIMITER).collect();
        if fields.len() < MIN_POSITIONAL_FIELDS {
            return Err(TagarelaError::Validation {
                message: format!(
                    "positional message has {} fields, expected at least {MIN_POSITIONAL_FIELDS}",
                    fields.len()
                ),
            });
        }

        let text_at = |i: usize| fields.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let flag_at = |i: usize| fields.get(i).is_some_and(|s| s.trim() == "true");

        Ok(Self {
            current_date: text_at(0),
            message_date: text_at(1),
            // The body keeps its own whitespace.
            text: fields[2].to_string(),
            sender_id: text_at(3),
            sender_name: text_at(4),
            group_id: text_at(5),
            group_name: text_at(6),
            has_media: flag_at(7),
            quotes_message: flag_at(8),
            quotes_bot: flag_at(9),
            quoted_text: text_at(10),
            quoted_sender_id: text_at(11),
            quoted_has_media: flag_at(12),
            message_id: text_at(13),
        })
    }

    /// Check the fields every downstream step relies on.
    pub fn validate(&self) -> Result<(), TagarelaError> {
        if self.sender_id.trim().is_empty() {
            return Err(TagarelaError::Validation {
                message: "message has no sender id".into(),
            });
        }
        if self.text.trim().is_empty() && !self.has_media {
            return Err(TagarelaError::Validation {
                message: format!("message {} has neither text nor media", self.message_id),
            });
        }
        Ok(())
    }

    /// The conversation this message belongs to.
    ///
    /// Direct messages carry no group id; they inherit the batch's group.
    pub fn conversation_key(&self, fallback_group: &str) -> ConversationKey {
        let group = if self.group_id.trim().is_empty() {
            fallback_group
        } else {
            self.group_id.as_str()
        };
        ConversationKey::new(group, self.sender_id.clone())
    }

    /// Speaker label used in history and prompts.
    pub fn speaker(&self) -> Option<String> {
        let name = self.sender_name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
