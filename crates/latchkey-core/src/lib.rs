// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Latchkey credential unlock workspace.
//!
//! This crate provides the error taxonomy, identifiers, the injectable clock
//! and the profile store trait used by the vault, cache and correlator crates.

pub mod clock;
pub mod error;
pub mod secret;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::{AUTHENTICATION_FAILED_MESSAGE, LatchkeyError, UNAVAILABLE_MESSAGE};
pub use secret::{duplicate_secret, mask_secret};
pub use traits::ProfileStore;
pub use types::{EncryptedCredential, RequestToken, SecondaryId, StoredCredential, UserId};
