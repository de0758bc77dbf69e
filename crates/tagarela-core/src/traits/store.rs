// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key-value collaborator for user memory records.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::TagarelaError;
use crate::record::UserMemoryRecord;

/// Persistence for [`UserMemoryRecord`] documents keyed by user id.
///
/// Writes replace the whole document (last writer wins).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads every stored record.
    async fn read_all(&self) -> Result<BTreeMap<String, UserMemoryRecord>, TagarelaError>;

    /// Loads one record. The default implementation scans [`read_all`](Self::read_all).
    async fn read(&self, user_id: &str) -> Result<Option<UserMemoryRecord>, TagarelaError> {
        Ok(self.read_all().await?.remove(user_id))
    }

    /// Durably replaces the record for `user_id`.
    async fn write(&self, user_id: &str, record: &UserMemoryRecord) -> Result<(), TagarelaError>;
}
