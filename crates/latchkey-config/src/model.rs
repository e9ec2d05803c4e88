// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Latchkey.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum PBKDF2-HMAC-SHA256 iteration count accepted by validation.
pub const MIN_KDF_ITERATIONS: u32 = 150_000;

/// Top-level Latchkey configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LatchkeyConfig {
    /// Credential encryption settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Pending authentication request settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Decrypted credential cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-user command cool-down settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential vault configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count (default: 150000).
    ///
    /// Changing this makes every previously stored blob undecryptable, since
    /// the blob layout does not record the iteration count.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

/// Authentication correlator configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Lifetime of a pending authentication request, in seconds.
    #[serde(default = "default_five_minutes")]
    pub request_ttl_secs: u64,

    /// Interval between background sweeps of expired requests, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl AuthConfig {
    pub fn request_ttl(&self) -> Duration {
        Duration::from_secs(self.request_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            request_ttl_secs: default_five_minutes(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Token cache configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Absolute lifetime of a cached decrypted credential, in seconds.
    #[serde(default = "default_five_minutes")]
    pub token_ttl_secs: u64,

    /// Interval between background sweeps of expired entries, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_five_minutes(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Cool-down applied after a user runs a command, in seconds.
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

impl RateLimitConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_five_minutes() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_cooldown() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = LatchkeyConfig::default();
        assert_eq!(config.vault.kdf_iterations, 150_000);
        assert_eq!(config.auth.request_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.token_ttl(), Duration::from_secs(300));
        assert_eq!(config.rate_limit.cooldown(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_section_fills_remaining_defaults() {
        let config: LatchkeyConfig = toml::from_str("[auth]\nrequest_ttl_secs = 60\n").unwrap();
        assert_eq!(config.auth.request_ttl_secs, 60);
        assert_eq!(config.auth.sweep_interval_secs, 60);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = toml::from_str::<LatchkeyConfig>("[cache]\nsliding = true\n");
        assert!(result.is_err());
    }
}
