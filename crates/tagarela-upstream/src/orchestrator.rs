// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrying request orchestration around a [`CompletionProvider`].
//!
//! One call to [`RequestOrchestrator::complete`] is one logical completion:
//! credential faults stop it immediately, anything else is retried with
//! exponential backoff until the attempt budget runs out.

use std::sync::Arc;
use std::time::Duration;

use tagarela_config::model::UpstreamConfig;
use tagarela_core::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, Role, TagarelaError,
    UpstreamFailure,
};
use tagarela_resilience::{CredentialTracker, ProbeDecision};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::redact::redact;

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after attempt `n` (1-based) is `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Sleep taken after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt.min(31)))
    }
}

/// Model parameters attached to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Runs completions with retry, backoff, and credential state bookkeeping.
pub struct RequestOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    tracker: Arc<Mutex<CredentialTracker>>,
    policy: RetryPolicy,
    settings: ModelSettings,
    secrets: Vec<String>,
}

impl RequestOrchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        tracker: Arc<Mutex<CredentialTracker>>,
        policy: RetryPolicy,
        settings: ModelSettings,
    ) -> Self {
        Self {
            provider,
            tracker,
            policy,
            settings,
            secrets: Vec::new(),
        }
    }

    /// Extra exact values to scrub from error text (the configured key).
    pub fn with_secrets(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Shared credential tracker, also read by the alerting path.
    pub fn tracker(&self) -> Arc<Mutex<CredentialTracker>> {
        Arc::clone(&self.tracker)
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Build `[system?, ...history, user]` for one call.
    pub fn build_messages(
        prompt: &str,
        system_preamble: Option<&str>,
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = system_preamble.filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::new(Role::System, system));
        }
        messages.extend_from_slice(history);
        messages.push(ChatMessage::new(Role::User, prompt));
        messages
    }

    /// Run one completion and return the text of its first choice.
    ///
    /// Errors:
    /// - `Credential` when the key is known-bad (short-circuit) or just got
    ///   rejected. No retries are made.
    /// - `RetriesExhausted` after every attempt failed for other reasons,
    ///   carrying the last failure message.
    pub async fn complete(
        &self,
        prompt: &str,
        system_preamble: Option<&str>,
        history: &[ChatMessage],
    ) -> Result<String, TagarelaError> {
        let decision = self.tracker.lock().await.check()?;
        // A rejected key gets one call per recheck, never a retry loop.
        let max_attempts = if decision == ProbeDecision::Probe {
            info!("sending credential probe");
            1
        } else {
            self.policy.max_attempts
        };

        let request = CompletionRequest {
            messages: Self::build_messages(prompt, system_preamble, history),
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            debug!(attempt, provider = self.provider.name(), "calling completion endpoint");

            let outcome = self
                .provider
                .complete(&request)
                .await
                .and_then(first_choice);

            match outcome {
                Ok(text) => {
                    self.tracker.lock().await.record_success();
                    return Ok(text);
                }
                Err(failure) => {
                    let failure = UpstreamFailure {
                        message: redact(&failure.message, &self.secrets),
                        ..failure
                    };
                    let is_credential = self.tracker.lock().await.record_failure(&failure);
                    if is_credential {
                        warn!(attempt, status = ?failure.status, error = %failure.message, "credential fault, not retrying");
                        return Err(TagarelaError::Credential {
                            message: failure.message,
                        });
                    }

                    warn!(attempt, status = ?failure.status, error = %failure.message, "transient upstream failure");
                    last_error = failure.message;

                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt);
                        debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(TagarelaError::RetriesExhausted {
            attempts: max_attempts,
            last_error,
        })
    }
}

/// A response must carry at least one choice to count as a success.
fn first_choice(response: CompletionResponse) -> Result<String, UpstreamFailure> {
    match response.choices.into_iter().next() {
        Some(text) => Ok(text),
        None => Err(UpstreamFailure {
            status: None,
            message: "response contained no choices".to_string(),
            payload: Some(response.raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    /// Provider returning a fixed script of outcomes.
    struct ScriptedProvider {
        script: StdMutex<VecDeque<Result<CompletionResponse, UpstreamFailure>>>,
        seen: StdMutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<CompletionResponse, UpstreamFailure>>) -> Arc<Self> {
            Arc::new(Self {
                script: StdMutex::new(script.into()),
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, UpstreamFailure> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamFailure::network("script exhausted")))
        }
    }

    fn ok(text: &str) -> Result<CompletionResponse, UpstreamFailure> {
        Ok(CompletionResponse {
            choices: vec![text.to_string()],
            raw: serde_json::Value::Null,
        })
    }

    fn orchestrator(provider: Arc<ScriptedProvider>) -> RequestOrchestrator {
        RequestOrchestrator::new(
            provider,
            Arc::new(Mutex::new(CredentialTracker::default())),
            RetryPolicy::default(),
            ModelSettings {
                model: "m".into(),
                temperature: 0.7,
                max_tokens: 2000,
            },
        )
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[test]
    fn messages_are_system_history_then_user() {
        let history = vec![
            ChatMessage::new(Role::User, "a"),
            ChatMessage::new(Role::Assistant, "b"),
        ];
        let messages = RequestOrchestrator::build_messages("c", Some("sys"), &history);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].content, "c");

        let without = RequestOrchestrator::build_messages("c", None, &[]);
        assert_eq!(without, vec![ChatMessage::new(Role::User, "c")]);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_retry_then_succeed() {
        let provider = ScriptedProvider::new(vec![
            Err(UpstreamFailure::http(503, "overloaded", None)),
            ok("finalmente"),
        ]);
        let orch = orchestrator(Arc::clone(&provider));
        let started = Instant::now();

        let text = orch.complete("oi", None, &[]).await.unwrap();
        assert_eq!(text, "finalmente");
        assert_eq!(provider.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts_with_last_error() {
        let provider = ScriptedProvider::new(vec![
            Err(UpstreamFailure::network("reset 1")),
            Err(UpstreamFailure::network("reset 2")),
            Err(UpstreamFailure::network("reset 3")),
        ]);
        let orch = orchestrator(Arc::clone(&provider));
        let started = Instant::now();

        let err = orch.complete("oi", None, &[]).await.unwrap_err();
        match err {
            TagarelaError::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "reset 3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls(), 3);
        // 2s after the first attempt, 4s after the second, none after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
        assert!(orch.tracker().lock().await.is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn credential_fault_fails_immediately() {
        let provider = ScriptedProvider::new(vec![
            Err(UpstreamFailure::http(401, "invalid api key", None)),
            ok("never"),
        ]);
        let orch = orchestrator(Arc::clone(&provider));

        let err = orch.complete("oi", None, &[]).await.unwrap_err();
        assert!(err.is_credential());
        assert_eq!(provider.calls(), 1);
        assert!(!orch.tracker().lock().await.is_valid());
    }

    #[tokio::test]
    async fn invalid_credential_short_circuits_next_call() {
        let provider = ScriptedProvider::new(vec![
            Err(UpstreamFailure::http(403, "forbidden", None)),
            ok("never"),
        ]);
        let orch = orchestrator(Arc::clone(&provider));

        assert!(orch.complete("1", None, &[]).await.is_err());
        let err = orch.complete("2", None, &[]).await.unwrap_err();
        assert!(err.is_credential());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn probe_success_restores_credential() {
        let provider = ScriptedProvider::new(vec![ok("voltei")]);
        let tracker = Arc::new(Mutex::new(CredentialTracker::default()));
        let past = chrono::Utc::now() - chrono::TimeDelta::minutes(10);
        tracker
            .lock()
            .await
            .record_failure_at(&UpstreamFailure::http(401, "invalid api key", None), past);

        let orch = RequestOrchestrator::new(
            provider,
            Arc::clone(&tracker),
            RetryPolicy::default(),
            ModelSettings {
                model: "m".into(),
                temperature: 0.7,
                max_tokens: 2000,
            },
        );

        assert_eq!(orch.complete("oi", None, &[]).await.unwrap(), "voltei");
        assert!(tracker.lock().await.is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn recheck_of_rejected_key_makes_a_single_attempt() {
        let provider = ScriptedProvider::new(vec![
            Err(UpstreamFailure::http(503, "overloaded", None)),
            ok("never"),
        ]);
        let tracker = Arc::new(Mutex::new(CredentialTracker::default()));
        let past = chrono::Utc::now() - chrono::TimeDelta::minutes(10);
        tracker
            .lock()
            .await
            .record_failure_at(&UpstreamFailure::http(401, "invalid api key", None), past);

        let orch = RequestOrchestrator::new(
            Arc::clone(&provider) as Arc<dyn CompletionProvider>,
            Arc::clone(&tracker),
            RetryPolicy::default(),
            ModelSettings {
                model: "m".into(),
                temperature: 0.7,
                max_tokens: 2000,
            },
        );

        let err = orch.complete("oi", None, &[]).await.unwrap_err();
        assert!(matches!(err, TagarelaError::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(provider.calls(), 1);
        assert!(!tracker.lock().await.is_valid());

        // Still inside the probe interval: short-circuited without a call.
        assert!(orch.complete("oi", None, &[]).await.unwrap_err().is_credential());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_choices_are_retried_as_transient() {
        let provider = ScriptedProvider::new(vec![
            Ok(CompletionResponse {
                choices: vec![],
                raw: serde_json::json!({"data": {"choices": []}}),
            }),
            ok("agora sim"),
        ]);
        let orch = orchestrator(Arc::clone(&provider));
        assert_eq!(orch.complete("oi", None, &[]).await.unwrap(), "agora sim");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn failure_text_is_redacted() {
        let provider = ScriptedProvider::new(vec![Err(UpstreamFailure::http(
            401,
            "key my-secret-key rejected",
            None,
        ))]);
        let orch = orchestrator(provider).with_secrets(vec!["my-secret-key".into()]);
        let err = orch.complete("oi", None, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "credential error: key [REDACTED] rejected");
    }
}
