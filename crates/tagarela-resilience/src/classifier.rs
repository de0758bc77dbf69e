// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential fault classification.
//!
//! Pure and stateless. A failure is a credential fault when the access key is
//! invalid, expired, or out of quota. Everything else (5xx, network resets,
//! malformed bodies) is transient and worth retrying.

use tagarela_core::UpstreamFailure;

/// HTTP statuses that always mean the key itself was refused.
const CREDENTIAL_STATUSES: &[u16] = &[401, 403, 429];

/// Phrases (lowercase, contains-match) that identify key or quota problems
/// in error messages and payloads.
const CREDENTIAL_PHRASES: &[&str] = &[
    "invalid api key",
    "invalid_api_key",
    "incorrect api key",
    "api key not valid",
    "api key expired",
    "expired api key",
    "invalid token",
    "token expired",
    "unauthorized",
    "unauthenticated",
    "authentication",
    "forbidden",
    "permission denied",
    "access denied",
    "insufficient_quota",
    "insufficient quota",
    "quota exceeded",
    "exceeded your current quota",
    "billing",
    "credit balance",
    "out of credits",
    "rate limit",
    "rate_limit",
    "too many requests",
    "chave inválida",
    "chave invalida",
    "cota excedida",
    "limite excedido",
];

/// Decide whether `failure` is a credential fault.
///
/// Checks the status code first, then the message, then the serialized
/// payload, all case-insensitively.
pub fn is_credential_fault(failure: &UpstreamFailure) -> bool {
    if let Some(status) = failure.status {
        if CREDENTIAL_STATUSES.contains(&status) {
            return true;
        }
    }

    if contains_credential_phrase(&failure.message) {
        return true;
    }

    failure
        .payload
        .as_ref()
        .map(|payload| contains_credential_phrase(&payload.to_string()))
        .unwrap_or(false)
}

fn contains_credential_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    CREDENTIAL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_and_quota_statuses_are_credential_faults() {
        for status in [401, 403, 429] {
            let failure = UpstreamFailure::http(status, "request failed", None);
            assert!(is_credential_fault(&failure), "status {status}");
        }
    }

    #[test]
    fn server_errors_alone_are_transient() {
        for status in [500, 502, 503, 504] {
            let failure = UpstreamFailure::http(status, "upstream unavailable", None);
            assert!(!is_credential_fault(&failure), "status {status}");
        }
    }

    #[test]
    fn network_failures_are_transient() {
        let failure = UpstreamFailure::network("connection reset by peer");
        assert!(!is_credential_fault(&failure));
    }

    #[test]
    fn message_phrase_matches_case_insensitively() {
        let failure = UpstreamFailure::network("Error: Invalid API Key provided");
        assert!(is_credential_fault(&failure));
    }

    #[test]
    fn payload_phrase_is_detected_even_with_server_status() {
        let payload = json!({"error": {"code": "insufficient_quota", "message": "upgrade plan"}});
        let failure = UpstreamFailure::http(500, "upstream error", Some(payload));
        assert!(is_credential_fault(&failure));
    }

    #[test]
    fn portuguese_quota_message_is_detected() {
        let failure = UpstreamFailure::network("Cota excedida para esta conta");
        assert!(is_credential_fault(&failure));
    }

    #[test]
    fn unrelated_payload_is_transient() {
        let payload = json!({"error": "model overloaded"});
        let failure = UpstreamFailure::http(503, "overloaded", Some(payload));
        assert!(!is_credential_fault(&failure));
    }
}
