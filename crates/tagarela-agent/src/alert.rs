// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator alerts for rejected access keys.
//!
//! An alert goes out at most once per invalid period (the tracker's
//! notification claim) and within the daily budget. Delivery problems are
//! logged and swallowed: alerting must never break batch processing.

use std::sync::Arc;

use tagarela_config::TagarelaConfig;
use tagarela_core::MessageSender;
use tagarela_resilience::{CredentialTracker, NotificationThrottler, ThrottleDecision};
use tagarela_upstream::redact;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Placeholder replaced with the upstream error in the alert template.
pub const ERROR_PLACEHOLDER: &str = "{error}";

/// What happened when an alert was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Sent,
    LimitNoticeSent,
    /// Daily budget used up.
    Throttled,
    /// This invalid period was already reported.
    AlreadyNotified,
    /// No sender or no operator configured.
    NoRecipient,
    DeliveryFailed,
}

#[derive(Debug)]
pub struct OperatorAlerter {
    operator_id: Option<String>,
    alert_template: String,
    limit_notice: String,
    throttler: Arc<Mutex<NotificationThrottler>>,
    secrets: Vec<String>,
}

impl OperatorAlerter {
    pub fn new(
        operator_id: Option<String>,
        alert_template: impl Into<String>,
        limit_notice: impl Into<String>,
        throttler: Arc<Mutex<NotificationThrottler>>,
    ) -> Self {
        Self {
            operator_id: operator_id.filter(|id| !id.trim().is_empty()),
            alert_template: alert_template.into(),
            limit_notice: limit_notice.into(),
            throttler,
            secrets: Vec::new(),
        }
    }

    pub fn from_config(config: &TagarelaConfig) -> Self {
        Self::new(
            config.agent.operator_id.clone(),
            config.messages.operator_alert.clone(),
            config.messages.operator_limit_notice.clone(),
            Arc::new(Mutex::new(NotificationThrottler::from_config(
                &config.resilience,
            ))),
        )
    }

    /// Values scrubbed from alert text in addition to the pattern redactions.
    pub fn with_secrets(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn throttler(&self) -> Arc<Mutex<NotificationThrottler>> {
        Arc::clone(&self.throttler)
    }

    pub fn render_alert(&self, error: &str) -> String {
        let error = redact(error, &self.secrets);
        if self.alert_template.contains(ERROR_PLACEHOLDER) {
            self.alert_template.replace(ERROR_PLACEHOLDER, &error)
        } else {
            format!("{}\n{error}", self.alert_template)
        }
    }

    /// Report the tracker's current credential failure to the operator.
    pub async fn notify(
        &self,
        tracker: &Mutex<CredentialTracker>,
        sender: Option<&dyn MessageSender>,
    ) -> AlertOutcome {
        let (Some(sender), Some(operator_id)) = (sender, self.operator_id.as_deref()) else {
            return AlertOutcome::NoRecipient;
        };

        let Some(error) = tracker.lock().await.claim_notification() else {
            return AlertOutcome::AlreadyNotified;
        };

        let decision = self.throttler.lock().await.decide();
        let (text, outcome) = match decision {
            ThrottleDecision::Send => (self.render_alert(&error), AlertOutcome::Sent),
            ThrottleDecision::SendLimitNotice => {
                (self.limit_notice.clone(), AlertOutcome::LimitNoticeSent)
            }
            ThrottleDecision::Suppress => return AlertOutcome::Throttled,
        };

        match sender.send(operator_id, &text).await {
            Ok(()) => {
                info!(operator_id, ?outcome, "operator alerted about credential failure");
                outcome
            }
            Err(e) => {
                warn!(operator_id, error = %e, "failed to deliver operator alert");
                AlertOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use tagarela_core::{TagarelaError, UpstreamFailure};

    #[derive(Default)]
    struct Outbox {
        sent: std::sync::Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageSender for Outbox {
        async fn send(&self, recipient_id: &str, text: &str) -> Result<(), TagarelaError> {
            if self.fail {
                return Err(TagarelaError::Notification {
                    message: "offline".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn alerter(max: u32) -> OperatorAlerter {
        OperatorAlerter::new(
            Some("op".into()),
            "chave rejeitada: {error}",
            "limite atingido",
            Arc::new(Mutex::new(NotificationThrottler::new(max))),
        )
    }

    fn invalid_tracker() -> Mutex<CredentialTracker> {
        let mut tracker = CredentialTracker::new(TimeDelta::minutes(5));
        tracker.record_failure(&UpstreamFailure::http(401, "bad key", None));
        Mutex::new(tracker)
    }

    #[tokio::test]
    async fn alert_is_sent_once_per_invalid_period() {
        let outbox = Outbox::default();
        let alerter = alerter(3);
        let tracker = invalid_tracker();

        assert_eq!(alerter.notify(&tracker, Some(&outbox)).await, AlertOutcome::Sent);
        assert_eq!(
            alerter.notify(&tracker, Some(&outbox)).await,
            AlertOutcome::AlreadyNotified
        );

        let sent = outbox.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "op");
        assert!(sent[0].1.starts_with("chave rejeitada: "));
        assert!(sent[0].1.contains("bad key"));
    }

    #[tokio::test]
    async fn recovered_key_can_alert_again_until_budget_runs_out() {
        let outbox = Outbox::default();
        let alerter = alerter(1);
        let tracker = invalid_tracker();

        assert_eq!(alerter.notify(&tracker, Some(&outbox)).await, AlertOutcome::Sent);

        for expected in [AlertOutcome::LimitNoticeSent, AlertOutcome::Throttled] {
            {
                let mut t = tracker.lock().await;
                t.record_success();
                t.record_failure(&UpstreamFailure::http(403, "forbidden", None));
            }
            assert_eq!(alerter.notify(&tracker, Some(&outbox)).await, expected);
        }

        let texts: Vec<String> = outbox.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[1], "limite atingido");
    }

    #[tokio::test]
    async fn missing_sender_or_operator_does_not_claim() {
        let tracker = invalid_tracker();
        assert_eq!(alerter(3).notify(&tracker, None).await, AlertOutcome::NoRecipient);

        let no_operator = OperatorAlerter::new(
            Some("  ".into()),
            "x",
            "y",
            Arc::new(Mutex::new(NotificationThrottler::new(3))),
        );
        let outbox = Outbox::default();
        assert_eq!(
            no_operator.notify(&tracker, Some(&outbox)).await,
            AlertOutcome::NoRecipient
        );
        assert!(tracker.lock().await.claim_notification().is_some());
    }

    #[tokio::test]
    async fn delivery_errors_are_swallowed() {
        let outbox = Outbox {
            fail: true,
            ..Outbox::default()
        };
        let tracker = invalid_tracker();
        assert_eq!(
            alerter(3).notify(&tracker, Some(&outbox)).await,
            AlertOutcome::DeliveryFailed
        );
    }

    #[test]
    fn alert_text_is_redacted() {
        let alerter = alerter(3).with_secrets(vec!["segredo-123".into()]);
        let text = alerter.render_alert("key segredo-123 rejected, Bearer abcdefghij.klmno");
        assert!(!text.contains("segredo-123"));
        assert!(!text.contains("abcdefghij.klmno"));
    }

    #[test]
    fn template_without_placeholder_appends_error() {
        let alerter = OperatorAlerter::new(
            Some("op".into()),
            "chave ruim",
            "y",
            Arc::new(Mutex::new(NotificationThrottler::new(3))),
        );
        assert_eq!(alerter.render_alert("401"), "chave ruim\n401");
    }
}
