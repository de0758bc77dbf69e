// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Tagarela user memory records.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`.

pub mod database;
pub mod migrations;
pub mod records;

pub use database::Database;
pub use records::SqliteRecordStore;
