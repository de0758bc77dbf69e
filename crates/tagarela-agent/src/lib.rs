// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation layer for the Tagarela chat assistant.
//!
//! The [`ConversationOrchestrator`] is the central coordinator that:
//! - Validates inbound messages and derives their conversation keys
//! - Feeds bounded per-conversation history to the request orchestrator
//! - Recovers structured replies from free-form model output
//! - Applies learning instructions to long-term user memory
//! - Alerts the operator when the access key is rejected

pub mod alert;
pub mod extract;
pub mod history;
pub mod markdown;
pub mod orchestrator;
pub mod prompt;
pub mod reply;

pub use alert::{AlertOutcome, OperatorAlerter};
pub use extract::extract_payload;
pub use history::HistoryManager;
pub use markdown::clean_markdown;
pub use orchestrator::{ConversationOrchestrator, ReplySettings, conversation_from_config};
pub use reply::{ModelReply, ReplyDraft};
