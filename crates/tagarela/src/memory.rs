// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagarela memory` command implementation.

use std::sync::Arc;

use tagarela_config::TagarelaConfig;
use tagarela_core::TagarelaError;
use tagarela_memory::{MemoryStore, MutationOutcome, category};
use tagarela_storage::SqliteRecordStore;

async fn open_store(
    config: &TagarelaConfig,
) -> Result<(MemoryStore, Arc<SqliteRecordStore>), TagarelaError> {
    let records = Arc::new(SqliteRecordStore::open(&config.storage).await?);
    Ok((MemoryStore::new(records.clone()), records))
}

/// Print the stored record and its prompt summary.
pub async fn run_show(config: &TagarelaConfig, user_id: &str) -> Result<(), TagarelaError> {
    let (store, records) = open_store(config).await?;
    let record = store.get(user_id).await?;
    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| TagarelaError::Internal(format!("cannot encode record: {e}")))?;
    println!("{json}");

    let summary = store.context_summary(user_id).await?;
    if !summary.is_empty() {
        println!("\n{summary}");
    }
    records.close().await
}

/// Remove one value from the category the label resolves to.
pub async fn run_forget(
    config: &TagarelaConfig,
    user_id: &str,
    label: &str,
    value: &str,
) -> Result<(), TagarelaError> {
    let (store, records) = open_store(config).await?;
    let target = category::resolve(label);
    let outcome = store.delete_memory(user_id, &target, value).await?;
    println!("{}", describe(outcome, &target.label(), value));
    records.close().await
}

fn describe(outcome: MutationOutcome, target: &str, value: &str) -> String {
    match outcome {
        MutationOutcome::Applied => format!("removed \"{value}\" from {target}"),
        MutationOutcome::NotFound => format!("\"{value}\" not found in {target}"),
    }
}
