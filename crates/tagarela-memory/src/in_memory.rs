// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local [`RecordStore`] used by tests and offline runs.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tagarela_core::{RecordStore, TagarelaError, UserMemoryRecord};

/// A [`RecordStore`] backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<BTreeMap<String, UserMemoryRecord>>,
    writes: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, UserMemoryRecord>>, TagarelaError> {
        self.records
            .lock()
            .map_err(|e| TagarelaError::Internal(format!("record map lock poisoned: {e}")))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read_all(&self) -> Result<BTreeMap<String, UserMemoryRecord>, TagarelaError> {
        Ok(self.lock()?.clone())
    }

    async fn read(&self, user_id: &str) -> Result<Option<UserMemoryRecord>, TagarelaError> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    async fn write(&self, user_id: &str, record: &UserMemoryRecord) -> Result<(), TagarelaError> {
        self.lock()?.insert(user_id.to_string(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
