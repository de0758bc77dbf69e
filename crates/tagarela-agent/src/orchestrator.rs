// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch processing: inbound messages in, replies and memory updates out.
//!
//! Messages in a batch are handled strictly in order because each one sees
//! the history left by the previous. A rejected access key halts the batch;
//! any other failure degrades only the message that hit it.

use chrono::Utc;
use serde_json::Value;
use tagarela_config::TagarelaConfig;
use tagarela_core::{
    BatchOutcome, ConversationKey, HistoryEntry, InboundMessage, MessageSender, ReplyItem, Role,
    TagarelaError,
};
use tagarela_memory::MemoryStore;
use tagarela_upstream::RequestOrchestrator;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::alert::{AlertOutcome, OperatorAlerter};
use crate::extract::{extract_payload, fallback};
use crate::history::HistoryManager;
use crate::prompt::{render_user_prompt, system_content};
use crate::reply::ModelReply;

/// Texts and defaults used while building replies.
#[derive(Debug, Clone)]
pub struct ReplySettings {
    pub system_preamble: Option<String>,
    pub default_react: String,
    pub credential_failure: String,
    pub transient_failure: String,
}

impl ReplySettings {
    /// Read reply settings, resolving the system preamble file if configured.
    pub fn from_config(config: &TagarelaConfig) -> Result<Self, TagarelaError> {
        let system_preamble = config.agent.system_preamble().map_err(|e| {
            TagarelaError::Config(format!("cannot read agent.system_prompt_file: {e}"))
        })?;
        Ok(Self {
            system_preamble,
            default_react: config.agent.default_react.clone(),
            credential_failure: config.messages.credential_failure.clone(),
            transient_failure: config.messages.transient_failure.clone(),
        })
    }
}

/// Outcome of one message inside a batch.
enum Step {
    Continue,
    Halt(String),
}

/// Turns batches of inbound messages into replies.
///
/// Callers must not run two batches for the same conversation at once.
pub struct ConversationOrchestrator {
    requests: RequestOrchestrator,
    memory: MemoryStore,
    history: Mutex<HistoryManager>,
    alerter: OperatorAlerter,
    settings: ReplySettings,
}

impl ConversationOrchestrator {
    pub fn new(
        requests: RequestOrchestrator,
        memory: MemoryStore,
        history: HistoryManager,
        alerter: OperatorAlerter,
        settings: ReplySettings,
    ) -> Self {
        Self {
            requests,
            memory,
            history: Mutex::new(history),
            alerter,
            settings,
        }
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn alerter(&self) -> &OperatorAlerter {
        &self.alerter
    }

    pub fn requests(&self) -> &RequestOrchestrator {
        &self.requests
    }

    /// Retained history for one conversation, oldest first.
    pub async fn history(&self, key: &ConversationKey) -> Vec<HistoryEntry> {
        self.history.lock().await.get(key)
    }

    /// Process one batch. Never fails: problems surface in the outcome.
    ///
    /// `batch_key` supplies the group for messages that carry none.
    pub async fn process_batch(
        &self,
        batch_key: &ConversationKey,
        messages: Vec<Value>,
        notifier: Option<&dyn MessageSender>,
    ) -> BatchOutcome {
        let purged = self.history.lock().await.purge_idle(Utc::now());
        if purged > 0 {
            debug!(purged, "dropped idle conversations before batch");
        }

        info!(
            group_id = %batch_key.group_id,
            sender_id = %batch_key.sender_id,
            count = messages.len(),
            "processing batch"
        );

        let mut outcome = BatchOutcome::default();
        for (index, raw) in messages.iter().enumerate() {
            let message = match InboundMessage::from_value(raw) {
                Ok(message) => message,
                Err(e) => {
                    warn!(index, error = %e, "skipping invalid message");
                    continue;
                }
            };

            match self
                .process_message(batch_key, &message, notifier, &mut outcome.responses)
                .await
            {
                Step::Continue => {}
                Step::Halt(reason) => {
                    outcome.error = Some(reason);
                    let skipped = messages.len() - index - 1;
                    if skipped > 0 {
                        warn!(skipped, "batch halted, remaining messages not processed");
                    }
                    break;
                }
            }
        }
        outcome
    }

    async fn process_message(
        &self,
        batch_key: &ConversationKey,
        message: &InboundMessage,
        notifier: Option<&dyn MessageSender>,
        responses: &mut Vec<ReplyItem>,
    ) -> Step {
        let key = message.conversation_key(&batch_key.group_id);
        let user_id = message.sender_id.as_str();
        let speaker = message.speaker();
        let now = Utc::now();

        if let Err(e) = self
            .memory
            .record_interaction(user_id, speaker.as_deref(), now)
            .await
        {
            warn!(user_id, error = %e, "failed to record interaction");
        }
        let context = match self.memory.context_summary(user_id).await {
            Ok(context) => context,
            Err(e) => {
                warn!(user_id, error = %e, "memory context unavailable");
                String::new()
            }
        };

        let prompt = render_user_prompt(message);
        // The prior turns go on the wire; the new turn is stored before the
        // call so a retry or crash never loses it.
        let prior = {
            let mut history = self.history.lock().await;
            let prior = history.messages(&key);
            history.append(
                &key,
                HistoryEntry {
                    role: Role::User,
                    content: prompt.clone(),
                    timestamp: now,
                    speaker: speaker.clone(),
                },
            );
            prior
        };

        let system = system_content(self.settings.system_preamble.as_deref(), &context);
        let result = self
            .requests
            .complete(&prompt, system.as_deref(), &prior)
            .await;

        match result {
            Ok(text) => {
                let mut reply = ModelReply::from_value(&extract_payload(&text));
                if reply.drafts.is_empty() && reply.learning.is_empty() {
                    warn!(conversation = %key, "model output has no reply entries, answering with its text");
                    reply.drafts = ModelReply::from_value(&fallback(&text)).drafts;
                }
                self.apply_learning(user_id, &reply).await;

                if !reply.drafts.is_empty() {
                    self.history.lock().await.append(
                        &key,
                        HistoryEntry {
                            role: Role::Assistant,
                            content: reply.transcript(),
                            timestamp: Utc::now(),
                            speaker: None,
                        },
                    );
                }
                responses.extend(
                    reply
                        .drafts
                        .into_iter()
                        .map(|d| d.finish(&message.message_id, &self.settings.default_react)),
                );
                Step::Continue
            }
            Err(e) if e.is_credential() => {
                error!(conversation = %key, error = %e, "access key rejected, halting batch");
                let alert = self
                    .alerter
                    .notify(&self.requests.tracker(), notifier)
                    .await;
                if alert != AlertOutcome::Sent {
                    debug!(?alert, "operator alert not sent");
                }
                responses.push(self.degraded(message, &self.settings.credential_failure));
                Step::Halt(self.settings.credential_failure.clone())
            }
            Err(e) => {
                warn!(conversation = %key, error = %e, "message degraded after upstream failure");
                responses.push(self.degraded(message, &self.settings.transient_failure));
                Step::Continue
            }
        }
    }

    async fn apply_learning(&self, user_id: &str, reply: &ModelReply) {
        for instruction in &reply.learning {
            if let Err(e) = self.memory.apply_learning(user_id, instruction).await {
                warn!(user_id, kind = %instruction.kind, error = %e, "learning instruction failed");
            }
        }
    }

    fn degraded(&self, message: &InboundMessage, text: &str) -> ReplyItem {
        ReplyItem {
            id: message.message_id.clone(),
            resp: text.to_string(),
            react: self.settings.default_react.clone(),
        }
    }
}

/// Wire a conversation orchestrator from configuration and its collaborators.
pub fn conversation_from_config(
    config: &TagarelaConfig,
    requests: RequestOrchestrator,
    memory: MemoryStore,
    secrets: Vec<String>,
) -> Result<ConversationOrchestrator, TagarelaError> {
    Ok(ConversationOrchestrator::new(
        requests,
        memory,
        HistoryManager::from_config(&config.history),
        OperatorAlerter::from_config(config).with_secrets(secrets),
        ReplySettings::from_config(config)?,
    ))
}
