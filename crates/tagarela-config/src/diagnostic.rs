// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for `tagarela.toml`.
//!
//! Figment reports unknown keys and type mismatches by dotted path only. This
//! module turns those into [`ConfigError`]s pointing at the offending line,
//! with a typo suggestion from the section's own keys or, when the key is
//! valid but misplaced, the section it belongs to.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a typo suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Label used for configuration given as a string rather than a file.
pub const INLINE_SOURCE: &str = "<inline>";

/// Every section of `tagarela.toml` and the keys it accepts.
pub const SECTION_KEYS: &[(&str, &[&str])] = &[
    (
        "agent",
        &[
            "name",
            "log_level",
            "system_prompt",
            "system_prompt_file",
            "default_react",
            "operator_id",
        ],
    ),
    (
        "upstream",
        &[
            "endpoint",
            "api_key",
            "auth_header",
            "model",
            "temperature",
            "max_tokens",
            "timeout_secs",
            "max_retries",
            "backoff_base_ms",
        ],
    ),
    (
        "resilience",
        &["probe_interval_secs", "max_notifications_per_day"],
    ),
    ("history", &["max_entries", "max_idle_secs"]),
    ("storage", &["database_path", "wal_mode"]),
    (
        "messages",
        &[
            "credential_failure",
            "transient_failure",
            "operator_alert",
            "operator_limit_notice",
        ],
    ),
];

/// A configuration problem ready for rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section))]
    #[diagnostic(
        code(tagarela::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Dotted table path, empty for the top level.
        section: String,
        /// Either a close key of the same section or `section.key` elsewhere.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a tagarela setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(tagarela::config::invalid_type), help("use {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tagarela::config::missing_key),
        help("add `{key} = <value>` to tagarela.toml")
    )]
    MissingKey { key: String },

    #[error("invalid setting: {message}")]
    #[diagnostic(code(tagarela::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(tagarela::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) if s.contains('.') => format!("this setting lives at `{s}`"),
        Some(s) => format!("did you mean `{s}`? accepted here: {valid_keys}"),
        None => format!("accepted here: {valid_keys}"),
    }
}

/// Convert a figment error chain into diagnostics.
///
/// `sources` pairs a source name (file path or [`INLINE_SOURCE`]) with its
/// TOML text and is only used to attach spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            let source = source_for(&error, sources);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = path.join(".");
                    let suggestion = suggest_key(field, expected)
                        .or_else(|| home_section(field, &section));
                    let (span, src) = source
                        .and_then(|(name, text)| {
                            locate_key(text, &path, field).map(|offset| {
                                (
                                    SourceSpan::new(offset.into(), field.len()),
                                    NamedSource::new(name, text.to_string()),
                                )
                            })
                        })
                        .unzip();
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section,
                        suggestion,
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                Kind::InvalidType(actual, expected) => {
                    let (span, src) = source
                        .and_then(|(name, text)| {
                            let (key, table) = path.split_last()?;
                            locate_value(text, table, key).map(|(offset, len)| {
                                (
                                    SourceSpan::new(offset.into(), len),
                                    NamedSource::new(name, text.to_string()),
                                )
                            })
                        })
                        .unzip();
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The TOML text the error was read from, if it is among `sources`.
fn source_for<'a>(
    error: &figment::Error,
    sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let origin = error.metadata.as_ref().and_then(|m| m.source.as_ref());
    let wanted = match origin {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => INLINE_SOURCE.to_string(),
    };
    sources
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(name, text)| (name.as_str(), text.as_str()))
}

/// `section.key` when `key` is accepted by a different section.
fn home_section(key: &str, current: &str) -> Option<String> {
    SECTION_KEYS
        .iter()
        .find(|(section, keys)| *section != current && keys.contains(&key))
        .map(|(section, _)| format!("{section}.{key}"))
}

/// Closest accepted key above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Byte offset of `key` as assigned inside table `table`.
///
/// Tracks the current `[table]` header line by line, so a key with the same
/// name in another section is not matched. Top-level dotted assignments such
/// as `upstream.model = ...` are found as well.
pub fn locate_key(content: &str, table: &[String], key: &str) -> Option<usize> {
    assignment(content, table, key).map(|(offset, _)| offset)
}

/// Byte offset and length of the value assigned to `key` in `table`.
fn locate_value(content: &str, table: &[String], key: &str) -> Option<(usize, usize)> {
    let (_, line) = assignment(content, table, key)?;
    let (eq, _) = content[line..].char_indices().find(|(_, c)| *c == '=')?;
    let rest = &content[line + eq + 1..];
    let rest = rest.lines().next().unwrap_or_default();
    let start = rest.len() - rest.trim_start().len();
    let value = rest.trim();
    let value = value
        .split_once(" #")
        .map_or(value, |(value, _)| value.trim_end());
    Some((line + eq + 1 + start, value.len().max(1)))
}

/// Offset of the key and of its line start.
fn assignment(content: &str, table: &[String], key: &str) -> Option<(usize, usize)> {
    let wanted = table.join(".");
    let dotted = if wanted.is_empty() {
        key.to_string()
    } else {
        format!("{wanted}.{key}")
    };
    let mut current = String::new();
    let mut line_start = 0usize;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();
        if let Some(header) = trimmed
            .strip_prefix('[')
            .and_then(|h| h.split(']').next())
        {
            current = header.trim().to_string();
        } else if let Some(name) = trimmed.split('=').next().map(str::trim) {
            let hit = (current == wanted && name == key) || (current.is_empty() && name == dotted);
            if hit && trimmed.contains('=') {
                let offset = line_start + indent + name.len() - key.len();
                return Some((offset, line_start));
            }
        }
        line_start += line.len();
    }
    None
}

/// Print diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
