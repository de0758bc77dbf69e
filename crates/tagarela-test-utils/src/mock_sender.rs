// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message sender for deterministic testing.
//!
//! `MockSender` implements `MessageSender` and captures every outbound
//! notification for assertion in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tagarela_core::{MessageSender, TagarelaError};

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient_id: String,
    pub text: String,
}

/// A mock sender that records what it is asked to deliver.
#[derive(Clone, Default)]
pub struct MockSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: bool,
}

impl MockSender {
    /// Create a new mock sender with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Get all messages passed to `send()`.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), TagarelaError> {
        if self.failing {
            return Err(TagarelaError::Notification {
                message: format!("mock delivery to {recipient_id} failed"),
            });
        }
        self.sent.lock().await.push(SentMessage {
            recipient_id: recipient_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_sent_messages() {
        let sender = MockSender::new();
        sender.send("op", "alerta").await.unwrap();
        assert_eq!(
            sender.sent_messages().await,
            vec![SentMessage {
                recipient_id: "op".into(),
                text: "alerta".into()
            }]
        );
    }

    #[tokio::test]
    async fn failing_sender_reports_error() {
        let sender = MockSender::failing();
        assert!(sender.send("op", "x").await.is_err());
        assert_eq!(sender.sent_count().await, 0);
    }
}
