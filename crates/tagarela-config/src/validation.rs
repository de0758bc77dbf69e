// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty endpoints, positive bounds, and the temperature range.

use crate::diagnostic::ConfigError;
use crate::model::TagarelaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TagarelaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.upstream.endpoint.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "upstream.endpoint must not be empty".to_string(),
        });
    } else if !config.upstream.endpoint.starts_with("http://")
        && !config.upstream.endpoint.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "upstream.endpoint `{}` must start with http:// or https://",
                config.upstream.endpoint
            ),
        });
    }

    if config.upstream.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "upstream.model must not be empty".to_string(),
        });
    }

    if config.upstream.auth_header.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "upstream.auth_header must not be empty".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.upstream.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "upstream.temperature must be between 0.0 and 2.0, got {}",
                config.upstream.temperature
            ),
        });
    }

    if config.upstream.max_retries == 0 {
        errors.push(ConfigError::Validation {
            message: "upstream.max_retries must be at least 1".to_string(),
        });
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "upstream.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.history.max_entries == 0 {
        errors.push(ConfigError::Validation {
            message: "history.max_entries must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(ref operator) = config.agent.operator_id {
        if operator.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "agent.operator_id must not be blank when set".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
