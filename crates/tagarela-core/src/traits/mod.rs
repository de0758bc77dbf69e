// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the edges of the conversation layer.
//!
//! All collaborators use `#[async_trait]` for dynamic dispatch compatibility.

pub mod provider;
pub mod sender;
pub mod store;

pub use provider::CompletionProvider;
pub use sender::MessageSender;
pub use store::RecordStore;
