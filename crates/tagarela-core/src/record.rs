// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term user memory documents and learning instructions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::lenient;

/// Everything remembered about one user. Persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserMemoryRecord {
    /// Last display name seen for the user.
    pub name: Option<String>,
    pub preferences: Preferences,
    pub personal_info: PersonalInfo,
    pub notes: Vec<String>,
    pub special_memories: Vec<String>,
    pub behavior_patterns: BehaviorPatterns,
    pub custom_fields: BTreeMap<String, String>,
    pub stats: InteractionStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub hobbies: Vec<String>,
    pub favorite_topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub age: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub relationship_status: Option<String>,
    pub family: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorPatterns {
    pub mood: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionStats {
    pub interaction_count: u64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// What a learning instruction does to the record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LearningAction {
    #[default]
    #[serde(alias = "adicionar")]
    Add,
    #[serde(alias = "editar")]
    Edit,
    #[serde(alias = "remover", alias = "deletar", alias = "excluir")]
    Delete,
}

/// A structured directive from the model describing a memory mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningInstruction {
    #[serde(default, alias = "acao")]
    pub action: LearningAction,
    /// Free-form category label chosen by the model, e.g. `gostos`.
    #[serde(rename = "type", alias = "tipo", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(alias = "valor", deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(
        rename = "oldValue",
        alias = "old_value",
        alias = "valor_antigo",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub old_value: Option<String>,
    #[serde(
        alias = "contexto",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<String>,
}

impl LearningInstruction {
    pub fn new(action: LearningAction, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action,
            kind: kind.into(),
            value: value.into(),
            old_value: None,
            context: None,
        }
    }

    pub fn with_old_value(mut self, old_value: impl Into<String>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }
}
