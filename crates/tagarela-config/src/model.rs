// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tagarela conversation layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Tagarela configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TagarelaConfig {
    /// Assistant identity and prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Completion endpoint settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Credential probing and operator alert throttling.
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Per-conversation history bounds.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// User-facing and operator-facing message texts.
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Assistant identity and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system preamble. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system preamble.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Reaction attached to replies when the model omits one.
    #[serde(default = "default_react")]
    pub default_react: String,

    /// Chat id that receives credential failure alerts. `None` disables alerts.
    #[serde(default)]
    pub operator_id: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            default_react: default_react(),
            operator_id: None,
        }
    }
}

fn default_agent_name() -> String {
    "tagarela".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_react() -> String {
    "🤖".to_string()
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Full URL of the completion endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Access key. `None` requires `TAGARELA_UPSTREAM_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header carrying the access key.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Hard deadline for a single call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts made before giving up on transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in milliseconds. The delay after attempt `n` is `base * 2^n`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            auth_header: default_auth_header(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.example.com/v1/chat/completions".to_string()
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

/// Credential probing and operator alert configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResilienceConfig {
    /// Seconds to wait before letting one probe through an invalid credential.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    /// Operator alerts allowed per calendar day.
    #[serde(default = "default_max_notifications_per_day")]
    pub max_notifications_per_day: u32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
            max_notifications_per_day: default_max_notifications_per_day(),
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    300
}

fn default_max_notifications_per_day() -> u32 {
    3
}

/// Conversation history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Entries kept per conversation; older ones are evicted first.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Conversations idle longer than this are dropped.
    #[serde(default = "default_max_idle_secs")]
    pub max_idle_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_idle_secs: default_max_idle_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    6
}

fn default_max_idle_secs() -> u64 {
    86_400
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tagarela").join("tagarela.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("tagarela.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Texts sent to users and to the operator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Reply used for the whole batch when the access key is rejected.
    #[serde(default = "default_credential_failure")]
    pub credential_failure: String,

    /// Reply used for a single message whose upstream call failed.
    #[serde(default = "default_transient_failure")]
    pub transient_failure: String,

    /// Operator alert. `{error}` is replaced with the redacted upstream error.
    #[serde(default = "default_operator_alert")]
    pub operator_alert: String,

    /// Sent once per day when the alert budget is used up.
    #[serde(default = "default_operator_limit_notice")]
    pub operator_limit_notice: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            credential_failure: default_credential_failure(),
            transient_failure: default_transient_failure(),
            operator_alert: default_operator_alert(),
            operator_limit_notice: default_operator_limit_notice(),
        }
    }
}

fn default_credential_failure() -> String {
    "Estou temporariamente indisponível. O administrador já foi avisado, tente novamente mais tarde."
        .to_string()
}

fn default_transient_failure() -> String {
    "Tive um problema para responder agora. Pode tentar de novo daqui a pouco?".to_string()
}

fn default_operator_alert() -> String {
    "⚠️ A chave de acesso da API foi rejeitada: {error}".to_string()
}

fn default_operator_limit_notice() -> String {
    "⚠️ Limite diário de alertas atingido. Novos avisos só amanhã.".to_string()
}

impl AgentConfig {
    /// Resolve the system preamble. A configured file wins over the inline text.
    pub fn system_preamble(&self) -> std::io::Result<Option<String>> {
        match self.system_prompt_file {
            Some(ref path) => std::fs::read_to_string(path).map(Some),
            None => Ok(self.system_prompt.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TagarelaConfig::default();
        assert_eq!(config.agent.default_react, "🤖");
        assert_eq!(config.upstream.auth_header, "Authorization");
        assert_eq!(config.upstream.max_retries, 3);
        assert_eq!(config.upstream.timeout_secs, 120);
        assert_eq!(config.resilience.probe_interval_secs, 300);
        assert_eq!(config.resilience.max_notifications_per_day, 3);
        assert_eq!(config.history.max_entries, 6);
        assert!(config.storage.database_path.ends_with("tagarela.db"));
    }

    #[test]
    fn operator_alert_has_error_placeholder() {
        assert!(MessagesConfig::default().operator_alert.contains("{error}"));
    }

    #[test]
    fn preamble_file_wins_over_inline_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "from file").unwrap();
        let agent = AgentConfig {
            system_prompt: Some("inline".into()),
            system_prompt_file: Some(path.display().to_string()),
            ..AgentConfig::default()
        };
        assert_eq!(agent.system_preamble().unwrap().as_deref(), Some("from file"));
    }

    #[test]
    fn missing_preamble_file_is_an_error() {
        let agent = AgentConfig {
            system_prompt_file: Some("/nonexistent/tagarela/prompt.txt".into()),
            ..AgentConfig::default()
        };
        assert!(agent.system_preamble().is_err());
    }
}
