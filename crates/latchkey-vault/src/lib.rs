// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-derived credential encryption for Latchkey.
//!
//! PBKDF2-HMAC-SHA256 (ring) derives an AES-256-GCM key from the user's
//! passphrase and a per-blob salt. Failures to authenticate never say why.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod vault;

pub use prompt::{PASSPHRASE_ENV_VAR, read_passphrase};
pub use vault::{CredentialVault, MIN_BLOB_LEN};
