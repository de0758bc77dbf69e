// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term per-user memory for the Tagarela conversation layer.
//!
//! [`MemoryStore`] applies learning instructions emitted by the model to a
//! [`UserMemoryRecord`](tagarela_core::UserMemoryRecord). Free-form `type`
//! labels are routed by [`category::resolve`].

pub mod category;
pub mod in_memory;
pub mod store;
pub mod summary;

pub use category::{ListField, MemoryTarget, Preference, ScalarField};
pub use in_memory::InMemoryRecordStore;
pub use store::{MemoryStore, MutationOutcome};
