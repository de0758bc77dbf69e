// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-conversation history.
//!
//! Each [`ConversationKey`] keeps at most `max_entries` turns; appending past
//! the bound evicts the oldest. Conversations untouched for longer than the
//! idle limit are dropped by [`HistoryManager::purge_idle`].

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use tagarela_config::model::HistoryConfig;
use tagarela_core::{ChatMessage, ConversationKey, HistoryEntry};
use tracing::debug;

/// Default number of retained turns per conversation.
pub const DEFAULT_MAX_ENTRIES: usize = 6;

#[derive(Debug, Default)]
struct Conversation {
    entries: VecDeque<HistoryEntry>,
    last_activity: Option<DateTime<Utc>>,
}

/// In-process store of recent turns, keyed by conversation.
#[derive(Debug)]
pub struct HistoryManager {
    max_entries: usize,
    max_idle: TimeDelta,
    conversations: HashMap<ConversationKey, Conversation>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, TimeDelta::days(1))
    }
}

impl HistoryManager {
    pub fn new(max_entries: usize, max_idle: TimeDelta) -> Self {
        Self {
            max_entries: max_entries.max(1),
            max_idle,
            conversations: HashMap::new(),
        }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        let secs = i64::try_from(config.max_idle_secs).unwrap_or(i64::MAX);
        Self::new(
            config.max_entries,
            TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
        )
    }

    /// Append a turn, evicting the oldest beyond the bound.
    pub fn append(&mut self, key: &ConversationKey, entry: HistoryEntry) {
        let conversation = self.conversations.entry(key.clone()).or_default();
        conversation.last_activity = Some(
            conversation
                .last_activity
                .map_or(entry.timestamp, |last| last.max(entry.timestamp)),
        );
        conversation.entries.push_back(entry);
        while conversation.entries.len() > self.max_entries {
            conversation.entries.pop_front();
        }
    }

    /// Retained turns, oldest first. Unknown keys yield an empty list.
    pub fn get(&self, key: &ConversationKey) -> Vec<HistoryEntry> {
        self.conversations
            .get(key)
            .map(|c| c.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Retained turns as wire messages.
    pub fn messages(&self, key: &ConversationKey) -> Vec<ChatMessage> {
        self.conversations
            .get(key)
            .map(|c| c.entries.iter().map(ChatMessage::from).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, key: &ConversationKey) -> usize {
        self.conversations.get(key).map_or(0, |c| c.entries.len())
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    /// Forget one conversation.
    pub fn purge(&mut self, key: &ConversationKey) -> bool {
        self.conversations.remove(key).is_some()
    }

    /// Drop conversations idle for longer than the configured limit.
    ///
    /// A limit reaching past the earliest representable time purges nothing.
    pub fn purge_idle(&mut self, now: DateTime<Utc>) -> usize {
        match now.checked_sub_signed(self.max_idle) {
            Some(cutoff) => self.purge_older_than(cutoff),
            None => 0,
        }
    }

    /// Drop conversations whose last activity is before `cutoff`.
    pub fn purge_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.conversations.len();
        self.conversations
            .retain(|_, c| c.last_activity.is_some_and(|last| last >= cutoff));
        let removed = before - self.conversations.len();
        if removed > 0 {
            debug!(removed, "purged idle conversations");
        }
        removed
    }
}
