// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`RecordStore`] collaborator.
//!
//! Each user's record is stored as one JSON document; a write replaces it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tagarela_config::model::StorageConfig;
use tagarela_core::{RecordStore, TagarelaError, UserMemoryRecord};
use tracing::{debug, warn};

use crate::database::{Database, map_tr_err};

fn decode_err(e: serde_json::Error) -> TagarelaError {
    TagarelaError::Storage {
        source: Box::new(e),
    }
}

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database configured in `[storage]`.
    pub async fn open(config: &StorageConfig) -> Result<Self, TagarelaError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite record store initialized");
        Ok(Self::new(db))
    }

    /// Remove a user's record entirely. Returns whether one existed.
    pub async fn remove(&self, user_id: &str) -> Result<bool, TagarelaError> {
        let user_id = user_id.to_string();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "DELETE FROM user_memories WHERE user_id = ?1",
                    params![user_id],
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(removed > 0)
    }

    pub async fn close(&self) -> Result<(), TagarelaError> {
        self.db.close().await
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn read_all(&self) -> Result<BTreeMap<String, UserMemoryRecord>, TagarelaError> {
        let rows = self
            .db
            .connection()
            .call(|conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT user_id, record FROM user_memories ORDER BY user_id")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;

        let mut records = BTreeMap::new();
        for (user_id, json) in rows {
            match serde_json::from_str::<UserMemoryRecord>(&json) {
                Ok(record) => {
                    records.insert(user_id, record);
                }
                Err(e) => warn!(user_id = %user_id, error = %e, "skipping unreadable memory record"),
            }
        }
        Ok(records)
    }

    async fn read(&self, user_id: &str) -> Result<Option<UserMemoryRecord>, TagarelaError> {
        let id = user_id.to_string();
        let json = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let result = conn.query_row(
                    "SELECT record FROM user_memories WHERE user_id = ?1",
                    params![id],
                    |row| row.get(0),
                );
                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        json.map(|j| serde_json::from_str(&j).map_err(decode_err))
            .transpose()
    }

    async fn write(&self, user_id: &str, record: &UserMemoryRecord) -> Result<(), TagarelaError> {
        let id = user_id.to_string();
        let json = serde_json::to_string(record).map_err(decode_err)?;
        let updated_at = Utc::now().to_rfc3339();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO user_memories (user_id, record, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(user_id) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at",
                    params![id, json, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
