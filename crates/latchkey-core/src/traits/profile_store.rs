// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile store trait for persisting encrypted credentials.

use async_trait::async_trait;

use crate::error::LatchkeyError;
use crate::types::{StoredCredential, UserId};

/// Persistence for the per-user encrypted credential record.
///
/// The store treats [`StoredCredential::blob`](crate::types::StoredCredential)
/// as opaque bytes; it never sees plaintext or passphrases. Failures should
/// be reported as [`LatchkeyError::UpstreamStore`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the encrypted credential for `user`, or `None` if none is enrolled.
    async fn encrypted_credential(
        &self,
        user: UserId,
    ) -> Result<Option<StoredCredential>, LatchkeyError>;

    /// Insert or replace the encrypted credential for `user`.
    async fn set_encrypted_credential(
        &self,
        user: UserId,
        credential: StoredCredential,
    ) -> Result<(), LatchkeyError>;

    /// Delete the encrypted credential for `user`. Returns whether one existed.
    async fn remove_encrypted_credential(&self, user: UserId) -> Result<bool, LatchkeyError>;
}
