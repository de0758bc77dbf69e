// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tagarela conversation layer.
//!
//! This crate provides the error type, the shared data model (conversation
//! keys, history entries, inbound messages, memory records, learning
//! instructions) and the collaborator traits implemented by the transport,
//! storage, and upstream crates.

pub mod error;
pub mod inbound;
pub mod lenient;
pub mod record;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{TagarelaError, UpstreamFailure};
pub use inbound::InboundMessage;
pub use record::{LearningAction, LearningInstruction, UserMemoryRecord};
pub use types::{
    BatchOutcome, ChatMessage, CompletionRequest, CompletionResponse, ConversationKey,
    HistoryEntry, ReplyItem, Role,
};

pub use traits::{CompletionProvider, MessageSender, RecordStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collaborator_traits_are_exported() {
        fn _assert_provider<T: CompletionProvider>() {}
        fn _assert_sender<T: MessageSender>() {}
        fn _assert_store<T: RecordStore>() {}
    }

    #[test]
    fn tagarela_error_has_all_variants() {
        let _config = TagarelaError::Config("test".into());
        let _storage = TagarelaError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _validation = TagarelaError::Validation {
            message: "test".into(),
        };
        let _credential = TagarelaError::Credential {
            message: "test".into(),
        };
        let _transient = TagarelaError::Transient {
            message: "test".into(),
        };
        let _exhausted = TagarelaError::RetriesExhausted {
            attempts: 3,
            last_error: "test".into(),
        };
        let _notification = TagarelaError::Notification {
            message: "test".into(),
        };
        let _timeout = TagarelaError::Timeout {
            duration: std::time::Duration::from_secs(120),
        };
        let _internal = TagarelaError::Internal("test".into());
    }
}
