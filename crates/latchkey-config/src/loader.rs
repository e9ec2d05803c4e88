// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./latchkey.toml` > `~/.config/latchkey/latchkey.toml` > `/etc/latchkey/latchkey.toml`
//! with environment variable overrides via `LATCHKEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LatchkeyConfig;

/// Config sections addressable from the environment.
///
/// Longest names first so `rate_limit_` is not mistaken for another section.
const ENV_SECTIONS: &[&str] = &["rate_limit", "logging", "vault", "cache", "auth"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/latchkey/latchkey.toml` (system-wide)
/// 3. `~/.config/latchkey/latchkey.toml` (user XDG config)
/// 4. `./latchkey.toml` (local directory)
/// 5. `LATCHKEY_*` environment variables
pub fn load_config() -> Result<LatchkeyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::file("/etc/latchkey/latchkey.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("latchkey/latchkey.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("latchkey.toml"))
        .merge(env_provider())
}

/// Map `LATCHKEY_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses an explicit section table, not `Env::split("_")`, because both section
/// and key names contain underscores: `LATCHKEY_RATE_LIMIT_COOLDOWN_SECS` must
/// become `rate_limit.cooldown_secs`. Variables outside a known section (such
/// as `LATCHKEY_PASSPHRASE`) are ignored rather than rejected as unknown keys.
fn env_provider() -> Env {
    Env::prefixed("LATCHKEY_")
        .filter(|key| section_key(&key.as_str().to_ascii_lowercase()).is_some())
        .map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            section_key(&key)
                .map(|(section, rest)| format!("{section}.{rest}"))
                .unwrap_or_else(|| key.clone())
                .into()
        })
}

fn section_key(key: &str) -> Option<(&'static str, &str)> {
    ENV_SECTIONS.iter().find_map(|&section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| (section, rest))
    })
}
