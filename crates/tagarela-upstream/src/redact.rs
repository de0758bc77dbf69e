// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for upstream error text.
//!
//! Upstream error bodies sometimes echo the key back. Everything that is
//! logged or forwarded to the operator passes through [`redact`] first.

use std::sync::LazyLock;

use regex::Regex;

/// Known secret patterns to redact from output.
static REDACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // sk-ant-api03-... style keys
        Regex::new(r"sk-ant-[a-zA-Z0-9_\-]{20,}").unwrap(),
        // sk-... style keys
        Regex::new(r"sk-[a-zA-Z0-9_\-]{20,}").unwrap(),
        // Bearer tokens in headers
        Regex::new(r"Bearer\s+[a-zA-Z0-9._\-]{10,}").unwrap(),
    ]
});

/// The redaction placeholder.
pub const REDACTED: &str = "[REDACTED]";

/// Redact secrets from a string using regex patterns plus exact known values.
pub fn redact(input: &str, known_secrets: &[String]) -> String {
    let mut result = input.to_string();

    // Exact values first so a configured key shorter than the regex minimum
    // is still caught.
    let mut sorted: Vec<&String> = known_secrets.iter().collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in sorted {
        if !value.is_empty() {
            result = result.replace(value.as_str(), REDACTED);
        }
    }

    for pattern in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).to_string();
    }

    result
}
