// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user long-term memory with add/edit/delete mutation.
//!
//! Every mutating call reads the full record, changes it in memory, and
//! writes it back through the [`RecordStore`] collaborator. Nothing is
//! written when a mutation finds nothing to change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tagarela_core::{
    LearningAction, LearningInstruction, RecordStore, TagarelaError, UserMemoryRecord,
};
use tracing::{debug, info};

use crate::category::{self, ListField, MemoryTarget, Preference, ScalarField};
use crate::summary;

/// Result of a mutation that needs something to already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

/// Facade over a [`RecordStore`] that owns all record mutation rules.
#[derive(Clone)]
pub struct MemoryStore {
    records: Arc<dyn RecordStore>,
}

impl MemoryStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Current record for `user_id`, or an empty one.
    pub async fn get(&self, user_id: &str) -> Result<UserMemoryRecord, TagarelaError> {
        Ok(self.records.read(user_id).await?.unwrap_or_default())
    }

    /// Every stored record.
    pub async fn all(
        &self,
    ) -> Result<std::collections::BTreeMap<String, UserMemoryRecord>, TagarelaError> {
        self.records.read_all().await
    }

    /// Append `value` to a preference list unless already present.
    pub async fn add_preference(
        &self,
        user_id: &str,
        preference: Preference,
        value: &str,
    ) -> Result<(), TagarelaError> {
        self.add_to_list(user_id, preference.into(), value).await
    }

    /// Overwrite a single-valued personal field.
    pub async fn update_personal_info(
        &self,
        user_id: &str,
        field: ScalarField,
        value: &str,
    ) -> Result<(), TagarelaError> {
        self.mutate(user_id, |record| {
            *category::scalar_mut(record, field) = Some(value.to_string());
            MutationOutcome::Applied
        })
        .await?;
        Ok(())
    }

    pub async fn add_note(&self, user_id: &str, note: &str) -> Result<(), TagarelaError> {
        self.add_to_list(user_id, ListField::Notes, note).await
    }

    pub async fn add_special_memory(
        &self,
        user_id: &str,
        memory: &str,
    ) -> Result<(), TagarelaError> {
        self.add_to_list(user_id, ListField::SpecialMemories, memory)
            .await
    }

    /// Replace an exact `old_value` with `new_value` in place.
    ///
    /// Scalars and custom fields also accept a missing `old_value`, which
    /// overwrites unconditionally.
    pub async fn update_memory(
        &self,
        user_id: &str,
        target: &MemoryTarget,
        old_value: Option<&str>,
        new_value: &str,
    ) -> Result<MutationOutcome, TagarelaError> {
        self.mutate(user_id, |record| {
            edit_in(record, target, old_value, new_value)
        })
        .await
    }

    /// Remove an exact `value`. Absent values leave the record untouched.
    pub async fn delete_memory(
        &self,
        user_id: &str,
        target: &MemoryTarget,
        value: &str,
    ) -> Result<MutationOutcome, TagarelaError> {
        self.mutate(user_id, |record| delete_in(record, target, value))
            .await
    }

    /// Route a learning instruction through the alias table and apply it.
    pub async fn apply_learning(
        &self,
        user_id: &str,
        instruction: &LearningInstruction,
    ) -> Result<MutationOutcome, TagarelaError> {
        let target = category::resolve(&instruction.kind);
        debug!(
            user_id,
            action = %instruction.action,
            kind = %instruction.kind,
            target = %target.label(),
            "applying learning instruction"
        );

        let value = instruction.value.trim();
        let outcome = match instruction.action {
            LearningAction::Add => {
                if value.is_empty() {
                    return Ok(MutationOutcome::NotFound);
                }
                self.mutate(user_id, |record| add_in(record, &target, value))
                    .await?
            }
            LearningAction::Edit => {
                let old = instruction.old_value.as_deref().map(str::trim);
                self.update_memory(user_id, &target, old, value).await?
            }
            LearningAction::Delete => self.delete_memory(user_id, &target, value).await?,
        };

        if outcome == MutationOutcome::NotFound {
            info!(user_id, target = %target.label(), "learning instruction matched nothing");
        }
        Ok(outcome)
    }

    /// Bump interaction statistics and remember the display name.
    pub async fn record_interaction(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), TagarelaError> {
        self.mutate(user_id, |record| {
            record.stats.interaction_count += 1;
            if record.stats.first_seen.is_none() {
                record.stats.first_seen = Some(now);
            }
            record.stats.last_seen = Some(now);
            if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
                record.name = Some(name.to_string());
            }
            MutationOutcome::Applied
        })
        .await?;
        Ok(())
    }

    /// Compact text rendering of the record for prompt injection.
    pub async fn context_summary(&self, user_id: &str) -> Result<String, TagarelaError> {
        let record = self.get(user_id).await?;
        Ok(summary::render(&record))
    }

    async fn add_to_list(
        &self,
        user_id: &str,
        field: ListField,
        value: &str,
    ) -> Result<(), TagarelaError> {
        self.mutate(user_id, |record| {
            add_in(record, &MemoryTarget::List(field), value)
        })
        .await?;
        Ok(())
    }

    async fn mutate<F>(&self, user_id: &str, change: F) -> Result<MutationOutcome, TagarelaError>
    where
        F: FnOnce(&mut UserMemoryRecord) -> MutationOutcome,
    {
        let mut record = self.get(user_id).await?;
        let outcome = change(&mut record);
        if outcome.is_applied() {
            self.records.write(user_id, &record).await?;
        }
        Ok(outcome)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

fn add_in(record: &mut UserMemoryRecord, target: &MemoryTarget, value: &str) -> MutationOutcome {
    match target {
        MemoryTarget::List(field) => push_unique(category::list_mut(record, *field), value),
        MemoryTarget::Scalar(field) => {
            *category::scalar_mut(record, *field) = Some(value.to_string());
        }
        MemoryTarget::Custom(key) => match record.custom_fields.get(key) {
            None => {
                record.custom_fields.insert(key.clone(), value.to_string());
            }
            Some(current) if current == value => {}
            // The field already holds another fact; keep both.
            Some(_) => add_tagged(&mut record.notes, key, value),
        },
        MemoryTarget::TaggedNote(tag) => add_tagged(&mut record.notes, tag, value),
    }
    MutationOutcome::Applied
}

fn replace_exact(list: &mut [String], old: &str, new: &str) -> MutationOutcome {
    match list.iter_mut().find(|existing| existing.as_str() == old) {
        Some(slot) => {
            *slot = new.to_string();
            MutationOutcome::Applied
        }
        None => MutationOutcome::NotFound,
    }
}

fn remove_exact(list: &mut Vec<String>, value: &str) -> MutationOutcome {
    let before = list.len();
    list.retain(|existing| existing != value);
    if list.len() < before {
        MutationOutcome::Applied
    } else {
        MutationOutcome::NotFound
    }
}

fn add_tagged(notes: &mut Vec<String>, tag: &str, value: &str) {
    if !notes.iter().any(|note| category::is_tagged(note, tag, value)) {
        notes.push(category::tagged(tag, value));
    }
}

fn edit_tagged(notes: &mut [String], tag: &str, old: &str, new: &str) -> MutationOutcome {
    match notes.iter_mut().find(|note| category::is_tagged(note, tag, old)) {
        Some(note) => {
            *note = category::tagged(tag, new);
            MutationOutcome::Applied
        }
        None => MutationOutcome::NotFound,
    }
}

fn remove_tagged(notes: &mut Vec<String>, tag: &str, value: &str) -> MutationOutcome {
    let before = notes.len();
    notes.retain(|note| !category::is_tagged(note, tag, value));
    if notes.len() < before {
        MutationOutcome::Applied
    } else {
        MutationOutcome::NotFound
    }
}

fn edit_in(
    record: &mut UserMemoryRecord,
    target: &MemoryTarget,
    old_value: Option<&str>,
    new_value: &str,
) -> MutationOutcome {
    match target {
        MemoryTarget::List(field) => match old_value {
            Some(old) => replace_exact(category::list_mut(record, *field), old, new_value),
            None => MutationOutcome::NotFound,
        },
        MemoryTarget::TaggedNote(tag) => match old_value {
            Some(old) => edit_tagged(&mut record.notes, tag, old, new_value),
            None => MutationOutcome::NotFound,
        },
        MemoryTarget::Scalar(field) => {
            let slot = category::scalar_mut(record, *field);
            if old_value.is_none() || slot.as_deref() == old_value {
                *slot = Some(new_value.to_string());
                MutationOutcome::Applied
            } else {
                MutationOutcome::NotFound
            }
        }
        MemoryTarget::Custom(key) => {
            let current = record.custom_fields.get(key).map(String::as_str);
            match old_value {
                Some(old) if current != Some(old) => {
                    edit_tagged(&mut record.notes, key, old, new_value)
                }
                _ => {
                    record.custom_fields.insert(key.clone(), new_value.to_string());
                    MutationOutcome::Applied
                }
            }
        }
    }
}

fn delete_in(record: &mut UserMemoryRecord, target: &MemoryTarget, value: &str) -> MutationOutcome {
    match target {
        MemoryTarget::List(field) => remove_exact(category::list_mut(record, *field), value),
        MemoryTarget::TaggedNote(tag) => remove_tagged(&mut record.notes, tag, value),
        MemoryTarget::Scalar(field) => {
            let slot = category::scalar_mut(record, *field);
            match slot.as_deref() {
                Some(current) if value.is_empty() || current == value => {
                    *slot = None;
                    MutationOutcome::Applied
                }
                _ => MutationOutcome::NotFound,
            }
        }
        MemoryTarget::Custom(key) => match record.custom_fields.get(key) {
            Some(current) if value.is_empty() || current == value => {
                record.custom_fields.remove(key);
                MutationOutcome::Applied
            }
            _ => remove_tagged(&mut record.notes, key, value),
        },
    }
}
