// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory profile store with call counting and failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use latchkey_core::{LatchkeyError, ProfileStore, StoredCredential, UserId};
use tracing::debug;

/// In-memory [`ProfileStore`] for tests.
///
/// Every call increments a counter so tests can assert that a code path did
/// (or did not) reach the store. `fail_next_calls(true)` makes every call
/// return [`LatchkeyError::UpstreamStore`] until switched off.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: DashMap<UserId, StoredCredential>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a write.
    pub fn with_credential(self, user: UserId, credential: StoredCredential) -> Self {
        self.records.insert(user, credential);
        self
    }

    /// Number of `encrypted_credential` calls made so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of set/remove calls made so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make all subsequent calls fail (or succeed again).
    pub fn fail_next_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Direct read for assertions, bypassing counters.
    pub fn peek(&self, user: UserId) -> Option<StoredCredential> {
        self.records.get(&user).map(|r| r.value().clone())
    }

    fn check_available(&self) -> Result<(), LatchkeyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LatchkeyError::upstream(std::io::Error::other(
                "profile store unavailable",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn encrypted_credential(
        &self,
        user: UserId,
    ) -> Result<Option<StoredCredential>, LatchkeyError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        debug!(user_id = %user, "memory store read");
        Ok(self.records.get(&user).map(|r| r.value().clone()))
    }

    async fn set_encrypted_credential(
        &self,
        user: UserId,
        credential: StoredCredential,
    ) -> Result<(), LatchkeyError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.records.insert(user, credential);
        Ok(())
    }

    async fn remove_encrypted_credential(&self, user: UserId) -> Result<bool, LatchkeyError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.records.remove(&user).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::{EncryptedCredential, SecondaryId};

    fn record() -> StoredCredential {
        StoredCredential {
            secondary_id: SecondaryId(7),
            blob: EncryptedCredential::new("AAAA"),
        }
    }

    #[tokio::test]
    async fn counts_reads_and_writes() {
        let store = MemoryProfileStore::new();
        assert!(store.encrypted_credential(UserId(1)).await.unwrap().is_none());
        store
            .set_encrypted_credential(UserId(1), record())
            .await
            .unwrap();
        assert_eq!(store.encrypted_credential(UserId(1)).await.unwrap(), Some(record()));
        assert_eq!(store.read_count(), 2);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn failure_injection_reports_upstream_error() {
        let store = MemoryProfileStore::new().with_credential(UserId(1), record());
        store.fail_next_calls(true);
        let err = store.encrypted_credential(UserId(1)).await.unwrap_err();
        assert!(matches!(err, LatchkeyError::UpstreamStore { .. }));

        store.fail_next_calls(false);
        assert!(store.encrypted_credential(UserId(1)).await.unwrap().is_some());
    }
}
