// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tagarela.toml` > `~/.config/tagarela/tagarela.toml` > `/etc/tagarela/tagarela.toml`
//! with environment variable overrides via `TAGARELA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TagarelaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tagarela/tagarela.toml` (system-wide)
/// 3. `~/.config/tagarela/tagarela.toml` (user XDG config)
/// 4. `./tagarela.toml` (local directory)
/// 5. `TAGARELA_*` environment variables
pub fn load_config() -> Result<TagarelaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TagarelaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TagarelaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TagarelaConfig::default()))
        .merge(Toml::file("/etc/tagarela/tagarela.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tagarela/tagarela.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tagarela.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TAGARELA_UPSTREAM_API_KEY` must map to `upstream.api_key`,
/// not `upstream.api.key`.
fn env_provider() -> Env {
    Env::prefixed("TAGARELA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("upstream_", "upstream.", 1)
            .replacen("resilience_", "resilience.", 1)
            .replacen("history_", "history.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("messages_", "messages.", 1);
        mapped.into()
    })
}
