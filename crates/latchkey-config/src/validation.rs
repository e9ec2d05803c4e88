// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Range checks that serde cannot express.

use crate::diagnostic::ConfigError;
use crate::model::{LatchkeyConfig, MIN_KDF_ITERATIONS};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &LatchkeyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        )));
    }

    let durations = [
        ("auth.request_ttl_secs", config.auth.request_ttl_secs),
        ("auth.sweep_interval_secs", config.auth.sweep_interval_secs),
        ("cache.token_ttl_secs", config.cache.token_ttl_secs),
        ("cache.sweep_interval_secs", config.cache.sweep_interval_secs),
        ("rate_limit.cooldown_secs", config.rate_limit.cooldown_secs),
    ];
    for (key, value) in durations {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be at least 1 second"
            )));
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
