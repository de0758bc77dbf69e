// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging collaborator used for operator notifications.

use async_trait::async_trait;

use crate::error::TagarelaError;

/// Delivers a plain text message to a chat recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), TagarelaError>;
}
