// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tagarela conversation layer.

use thiserror::Error;

/// The primary error type used across all Tagarela crates.
#[derive(Debug, Error)]
pub enum TagarelaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A malformed inbound item. Skipped by the batch processor.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The upstream rejected the access key, or the key is known to be invalid.
    #[error("credential error: {message}")]
    Credential { message: String },

    /// A single transient upstream failure (network, 5xx, malformed body).
    #[error("transient upstream error: {message}")]
    Transient { message: String },

    /// Every retry attempt ended in a transient failure.
    #[error("upstream retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Operator notification could not be delivered.
    #[error("notification error: {message}")]
    Notification { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TagarelaError {
    /// Returns true when the error means the access key is unusable.
    pub fn is_credential(&self) -> bool {
        matches!(self, TagarelaError::Credential { .. })
    }

    /// Returns true for failures that only degrade the current message.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TagarelaError::Transient { .. }
                | TagarelaError::RetriesExhausted { .. }
                | TagarelaError::Timeout { .. }
        )
    }
}

/// A raw failure observed while talking to the completion endpoint.
///
/// This is the input of the error classifier: it carries whatever the
/// transport could learn about the failure, without any judgement about
/// whether the key is at fault.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    /// HTTP status code, when a response was received at all.
    pub status: Option<u16>,
    /// Human-readable description of the failure.
    pub message: String,
    /// Response body, when one could be decoded as JSON.
    pub payload: Option<serde_json::Value>,
}

impl UpstreamFailure {
    /// A failure with no HTTP response (connection refused, DNS, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            payload: None,
        }
    }

    /// A failure carrying an HTTP status and optional decoded body.
    pub fn http(status: u16, message: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_and_transient_predicates() {
        let cred = TagarelaError::Credential {
            message: "invalid key".into(),
        };
        assert!(cred.is_credential());
        assert!(!cred.is_transient());

        let exhausted = TagarelaError::RetriesExhausted {
            attempts: 3,
            last_error: "502 Bad Gateway".into(),
        };
        assert!(exhausted.is_transient());
        assert!(!exhausted.is_credential());

        let validation = TagarelaError::Validation {
            message: "missing texto".into(),
        };
        assert!(!validation.is_transient());
        assert!(!validation.is_credential());
    }

    #[test]
    fn retries_exhausted_message_carries_last_error() {
        let err = TagarelaError::RetriesExhausted {
            attempts: 3,
            last_error: "connection reset".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"), "got: {msg}");
        assert!(msg.contains("connection reset"), "got: {msg}");
    }

    #[test]
    fn upstream_failure_constructors() {
        let net = UpstreamFailure::network("connection refused");
        assert_eq!(net.status, None);
        assert_eq!(net.to_string(), "connection refused");

        let http = UpstreamFailure::http(503, "unavailable", None);
        assert_eq!(http.status, Some(503));
    }
}
