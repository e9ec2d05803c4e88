// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Latchkey workspace.

use thiserror::Error;

/// Message shown to users for every authentication-related failure.
///
/// Wrong passphrase, corrupted blob and unknown or expired token all render
/// identically so the completion endpoint cannot be used as an oracle.
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "authentication failed or request expired";

/// Message shown to users for infrastructure failures.
pub const UNAVAILABLE_MESSAGE: &str = "something went wrong, please try again later";

/// The primary error type used across the vault, caches and correlator.
#[derive(Debug, Error)]
pub enum LatchkeyError {
    /// Configuration errors (invalid values, unusable KDF parameters).
    #[error("configuration error: {0}")]
    Config(String),

    /// Structurally invalid input rejected before any cryptography runs,
    /// e.g. an encrypted credential shorter than salt + nonce + tag.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authenticated decryption failed. Covers both a wrong passphrase and
    /// a corrupted blob; the two are deliberately indistinguishable.
    #[error("integrity check failed")]
    Integrity,

    /// Unknown, expired or already consumed correlation token, or no stored
    /// credential for the user.
    #[error("not found")]
    NotFound,

    /// The external profile store failed or was unavailable.
    #[error("profile store error: {source}")]
    UpstreamStore {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors (RNG failure, worker pool failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl LatchkeyError {
    /// Wrap any store-side error as [`LatchkeyError::UpstreamStore`].
    pub fn upstream<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::UpstreamStore { source: err.into() }
    }

    /// True for the failure kinds that collapse into one user-facing outcome.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Integrity | Self::NotFound)
    }

    /// The user-facing rendering of this error. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        if self.is_authentication_failure() {
            AUTHENTICATION_FAILED_MESSAGE
        } else {
            UNAVAILABLE_MESSAGE
        }
    }
}
