// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Tagarela configuration system.

use tagarela_config::diagnostic::{ConfigError, suggest_key};
use tagarela_config::model::TagarelaConfig;
use tagarela_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_tagarela_config() {
    let toml = r#"
[agent]
name = "papagaio"
log_level = "debug"
system_prompt = "Você é um bot de grupo."
default_react = "👍"
operator_id = "5511999999999"

[upstream]
endpoint = "https://llm.internal/v1/chat"
api_key = "sk-test-123"
auth_header = "x-api-key"
model = "small-model"
temperature = 0.2
max_tokens = 512
timeout_secs = 30
max_retries = 5
backoff_base_ms = 250

[resilience]
probe_interval_secs = 60
max_notifications_per_day = 1

[history]
max_entries = 10
max_idle_secs = 3600

[storage]
database_path = "/tmp/tagarela-test.db"
wal_mode = false

[messages]
credential_failure = "fora do ar"
transient_failure = "erro"
operator_alert = "chave ruim: {error}"
operator_limit_notice = "chega por hoje"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "papagaio");
    assert_eq!(config.agent.default_react, "👍");
    assert_eq!(config.agent.operator_id.as_deref(), Some("5511999999999"));
    assert_eq!(config.upstream.auth_header, "x-api-key");
    assert_eq!(config.upstream.api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(config.upstream.max_retries, 5);
    assert_eq!(config.upstream.backoff_base_ms, 250);
    assert_eq!(config.resilience.max_notifications_per_day, 1);
    assert_eq!(config.history.max_entries, 10);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.messages.operator_limit_notice, "chega por hoje");
}

/// Unknown field in [upstream] produces an error naming the bad key.
#[test]
fn unknown_field_in_upstream_produces_error() {
    let toml = r#"
[upstream]
modle = "x"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("modle"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown keys become diagnostics with a "did you mean" suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[resilience]
probe_intervl_secs = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion: Some(s), .. }
            if key == "probe_intervl_secs" && s == "probe_interval_secs"
    )));
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "tagarela");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.agent.operator_id.is_none());
    assert!(config.upstream.api_key.is_none());
    assert_eq!(config.upstream.max_tokens, 2000);
    assert!((config.upstream.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.history.max_idle_secs, 86_400);
    assert!(config.storage.wal_mode);
}

/// `TAGARELA_UPSTREAM_API_KEY` maps to `upstream.api_key`, not `upstream.api.key`.
#[test]
fn dotted_override_sets_upstream_api_key() {
    use figment::{Figment, providers::Serialized};

    let config: TagarelaConfig = Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(("upstream.api_key", "sk-from-env"))
        .extract()
        .expect("should set api_key via dot notation");

    assert_eq!(config.upstream.api_key.as_deref(), Some("sk-from-env"));
}

/// Later providers override earlier ones.
#[test]
fn override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: TagarelaConfig = Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(Toml::string("[history]\nmax_entries = 4\n"))
        .merge(("history.max_entries", 8))
        .extract()
        .expect("should merge override");

    assert_eq!(config.history.max_entries, 8);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: TagarelaConfig = Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(Toml::file("/nonexistent/path/tagarela.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "tagarela");
}

/// Type errors surface as InvalidType diagnostics.
#[test]
fn wrong_type_produces_invalid_type_diagnostic() {
    let toml = r#"
[upstream]
max_retries = "three"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_)))
    );
}

/// Validation runs after a successful parse.
#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[upstream]
temperature = 3.0

[history]
max_entries = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

/// Explicit config files are loaded and validated.
#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagarela.toml");
    std::fs::write(&path, "[agent]\nname = \"arquivo\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.agent.name, "arquivo");
}

#[test]
fn suggest_key_handles_section_keys() {
    let valid = &["credential_failure", "transient_failure", "operator_alert"];
    assert_eq!(
        suggest_key("operater_alert", valid),
        Some("operator_alert".to_string())
    );
}

/// A valid key in the wrong section points to the section that owns it.
#[test]
fn misplaced_key_names_its_section() {
    let toml = r#"
[agent]
max_retries = 2
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, section, suggestion: Some(s), .. }
            if key == "max_retries" && section == "agent" && s == "upstream.max_retries"
    )));
}
