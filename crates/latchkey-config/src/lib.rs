// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Latchkey.
//!
//! Layered TOML files plus `LATCHKEY_*` environment overrides, strict
//! unknown-key rejection, and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use latchkey_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("request ttl: {:?}", config.auth.request_ttl());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AuthConfig, CacheConfig, LatchkeyConfig, LoggingConfig, RateLimitConfig, VaultConfig,
};

/// Load the layered configuration and validate it.
pub fn load_and_validate() -> Result<LatchkeyConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load a single file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<LatchkeyConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Parse an inline TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LatchkeyConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![(diagnostic::INLINE_SOURCE.to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<LatchkeyConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<LatchkeyConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read every config file in the hierarchy so errors can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("latchkey.toml"))
        .unwrap_or_else(|_| PathBuf::from("latchkey.toml"));
    let user = dirs::config_dir().map(|d| d.join("latchkey/latchkey.toml"));
    let system = Some(PathBuf::from("/etc/latchkey/latchkey.toml"));

    [Some(local), user, system]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}

fn read_source(path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}
