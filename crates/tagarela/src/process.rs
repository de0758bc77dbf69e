// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagarela process` command implementation.
//!
//! Runs one batch through the full stack (SQLite memory, HTTP upstream) and
//! prints the batch result as JSON on stdout. Operator alerts are written to
//! the log since no chat transport is attached.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tagarela_agent::conversation_from_config;
use tagarela_config::TagarelaConfig;
use tagarela_core::{ConversationKey, MessageSender, TagarelaError};
use tagarela_memory::MemoryStore;
use tagarela_storage::SqliteRecordStore;
use tagarela_upstream::{UpstreamClient, orchestrator_from_config};
use tracing::{info, warn};

/// Operator sender that writes alerts to the log.
struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), TagarelaError> {
        warn!(recipient_id, text, "operator notification");
        Ok(())
    }
}

/// Run the `tagarela process` command.
pub async fn run_process(
    config: &TagarelaConfig,
    input: Option<&Path>,
    group: &str,
) -> Result<(), TagarelaError> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| TagarelaError::Internal(format!("cannot read {}: {e}", path.display())))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| TagarelaError::Internal(format!("cannot read stdin: {e}")))?;
            buf
        }
    };
    let messages = parse_batch(&raw)?;

    let records = Arc::new(SqliteRecordStore::open(&config.storage).await?);
    let requests = orchestrator_from_config(config)?;
    let secrets = UpstreamClient::new(&config.upstream)?.secrets();
    let conversation = conversation_from_config(
        config,
        requests,
        MemoryStore::new(records.clone()),
        secrets,
    )?;

    info!(count = messages.len(), group, "running batch");
    let outcome = conversation
        .process_batch(
            &ConversationKey::new(group, "cli"),
            messages,
            Some(&LogSender as &dyn MessageSender),
        )
        .await;

    records.close().await?;

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| TagarelaError::Internal(format!("cannot encode result: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Accept a message array, `{"messages": [...]}`, or a single message.
fn parse_batch(raw: &str) -> Result<Vec<Value>, TagarelaError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| TagarelaError::Validation {
        message: format!("batch is not valid JSON: {e}"),
    })?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("messages") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(TagarelaError::Validation {
                message: "`messages` must be an array".into(),
            }),
            None => Ok(vec![Value::Object(map)]),
        },
        Value::String(_) => Ok(vec![value]),
        _ => Err(TagarelaError::Validation {
            message: "batch must be an array of messages".into(),
        }),
    }
}
