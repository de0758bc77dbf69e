// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete conversation stack with a mock
//! provider, a mock operator sender, and either in-memory or temp SQLite
//! record storage. Provides `process()` to drive a whole batch in tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::Mutex;

use tagarela_agent::{ConversationOrchestrator, conversation_from_config};
use tagarela_config::TagarelaConfig;
use tagarela_config::model::StorageConfig;
use tagarela_core::{
    BatchOutcome, ConversationKey, MessageSender, RecordStore, TagarelaError, UpstreamFailure,
};
use tagarela_memory::{InMemoryRecordStore, MemoryStore};
use tagarela_resilience::CredentialTracker;
use tagarela_storage::SqliteRecordStore;
use tagarela_upstream::{ModelSettings, RequestOrchestrator, RetryPolicy};

use crate::mock_provider::MockProvider;
use crate::mock_sender::MockSender;

/// Group id used by [`TestHarness::process`] and [`message`].
pub const TEST_GROUP: &str = "grupo-teste";

/// Operator id configured by default.
pub const TEST_OPERATOR: &str = "operador";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<Result<String, UpstreamFailure>>,
    config: TagarelaConfig,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = TagarelaConfig::default();
        config.agent.system_prompt = Some("Você é um assistente de teste.".to_string());
        config.agent.operator_id = Some(TEST_OPERATOR.to_string());
        config.upstream.max_retries = 1;
        config.upstream.backoff_base_ms = 0;
        Self {
            script: Vec::new(),
            config,
            sqlite: false,
        }
    }

    /// Set successful mock provider replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.script = responses.into_iter().map(Ok).collect();
        self
    }

    /// Set the full provider script, failures included.
    pub fn with_script(mut self, script: Vec<Result<String, UpstreamFailure>>) -> Self {
        self.script = script;
        self
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.agent.system_prompt = Some(prompt.into());
        self
    }

    /// Attempts per upstream call, with the given backoff base.
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.config.upstream.max_retries = max_retries;
        self.config.upstream.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Daily operator alert budget.
    pub fn with_notification_limit(mut self, max: u32) -> Self {
        self.config.resilience.max_notifications_per_day = max;
        self
    }

    /// Persist user records in a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(mut self) -> Result<TestHarness, TagarelaError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TagarelaError::Storage { source: e.into() })?;

        let records: Arc<dyn RecordStore> = if self.sqlite {
            let storage_config = StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            };
            self.config.storage = storage_config.clone();
            Arc::new(SqliteRecordStore::open(&storage_config).await?)
        } else {
            Arc::new(InMemoryRecordStore::new())
        };

        let mock_provider = Arc::new(MockProvider::with_script(self.script));
        let tracker = Arc::new(Mutex::new(CredentialTracker::from_config(
            &self.config.resilience,
        )));
        let requests = RequestOrchestrator::new(
            mock_provider.clone(),
            tracker,
            RetryPolicy {
                max_attempts: self.config.upstream.max_retries.max(1),
                backoff_base: Duration::from_millis(self.config.upstream.backoff_base_ms),
            },
            ModelSettings::from_config(&self.config.upstream),
        );

        let conversation = conversation_from_config(
            &self.config,
            requests,
            MemoryStore::new(records.clone()),
            Vec::new(),
        )?;

        Ok(TestHarness {
            mock_provider,
            mock_sender: Arc::new(MockSender::new()),
            records,
            conversation,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators.
pub struct TestHarness {
    /// The mock completion provider.
    pub mock_provider: Arc<MockProvider>,
    /// The mock operator sender.
    pub mock_sender: Arc<MockSender>,
    /// Record storage behind the memory store.
    pub records: Arc<dyn RecordStore>,
    /// The orchestrator under test.
    pub conversation: ConversationOrchestrator,
    /// Tagarela configuration.
    pub config: TagarelaConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Process a batch for [`TEST_GROUP`] with the mock sender attached.
    pub async fn process(&self, messages: Vec<Value>) -> BatchOutcome {
        self.conversation
            .process_batch(
                &ConversationKey::new(TEST_GROUP, "lote"),
                messages,
                Some(self.mock_sender.as_ref() as &dyn MessageSender),
            )
            .await
    }

    /// Queue another provider reply.
    pub async fn add_provider_response(&self, text: impl Into<String>) {
        self.mock_provider.push_response(text).await;
    }
}

/// A structured inbound record from `sender_id` in [`TEST_GROUP`].
pub fn message(id: &str, sender_id: &str, text: &str) -> Value {
    json!({
        "data_atual": "2026-03-01 10:00",
        "data_mensagem": "2026-03-01 10:00",
        "texto": text,
        "id_enviou": sender_id,
        "nome_enviou": format!("Pessoa {sender_id}"),
        "id_grupo": TEST_GROUP,
        "nome_grupo": "Grupo de Teste",
        "tem_midia": false,
        "marcou_mensagem": false,
        "marcou_sua_mensagem": false,
        "id_mensagem": id
    })
}

/// A model reply addressed to message `id`.
pub fn reply(id: &str, text: &str) -> String {
    json!({"resp": [{"id": id, "resp": text}]}).to_string()
}
