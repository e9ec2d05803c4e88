// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adding and removing a user's encrypted credential.

use std::sync::Arc;

use latchkey_cache::TokenCache;
use latchkey_core::{
    LatchkeyError, ProfileStore, SecondaryId, StoredCredential, UserId,
};
use latchkey_vault::CredentialVault;
use secrecy::SecretString;
use tracing::info;

/// Encrypts credentials into the profile store and keeps the cache honest.
#[derive(Clone)]
pub struct Enrollment {
    store: Arc<dyn ProfileStore>,
    vault: CredentialVault,
    cache: Arc<TokenCache>,
}

impl Enrollment {
    /// Enrollment that writes to `store` and invalidates `cache`.
    pub fn new(store: Arc<dyn ProfileStore>, vault: CredentialVault, cache: Arc<TokenCache>) -> Self {
        Self {
            store,
            vault,
            cache,
        }
    }

    /// Encrypt `credential` under `passphrase` and store it for `user`.
    ///
    /// Fails with `Validation("profile already exists")` if the user already
    /// has a record and `replace` is false. Any cached plaintext for the user
    /// is dropped, so the next command must unlock the new record.
    pub async fn enroll(
        &self,
        user: UserId,
        secondary_id: SecondaryId,
        credential: SecretString,
        passphrase: SecretString,
        replace: bool,
    ) -> Result<StoredCredential, LatchkeyError> {
        if !replace && self.store.encrypted_credential(user).await?.is_some() {
            return Err(LatchkeyError::Validation(
                "profile already exists".to_string(),
            ));
        }

        let blob = self.vault.encrypt_async(credential, passphrase).await?;
        let record = StoredCredential { secondary_id, blob };
        self.store
            .set_encrypted_credential(user, record.clone())
            .await?;
        self.cache.invalidate(user);

        info!(user_id = %user, secondary_id = %secondary_id, replaced = replace, "credential enrolled");
        Ok(record)
    }

    /// Delete `user`'s record and any cached plaintext. Returns whether a record existed.
    pub async fn remove(&self, user: UserId) -> Result<bool, LatchkeyError> {
        let existed = self.store.remove_encrypted_credential(user).await?;
        self.cache.invalidate(user);
        if existed {
            info!(user_id = %user, "credential removed");
        }
        Ok(existed)
    }
}

impl std::fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrollment")
            .field("vault", &self.vault)
            .finish_non_exhaustive()
    }
}
