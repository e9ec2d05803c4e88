// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived cache of decrypted credentials.
//!
//! Entries expire a fixed time after insertion; reads never extend them.
//! That bounds how long a plaintext credential stays in memory no matter
//! how often it is used.

use std::sync::Arc;
use std::time::Duration;

use latchkey_config::CacheConfig;
use latchkey_core::{Clock, SecondaryId, UserId};
use secrecy::SecretString;
use tracing::debug;

use crate::sweeper::Sweep;
use crate::ttl_map::TtlMap;

/// Default lifetime of a cached credential.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// A decrypted credential held for a user after a successful unlock.
///
/// `Debug` redacts the credential.
#[derive(Debug)]
pub struct CachedCredential {
    /// Secondary identifier stored alongside the encrypted credential.
    pub secondary_id: SecondaryId,
    /// The decrypted credential.
    pub credential: SecretString,
}

/// Per-user cache of decrypted credentials with absolute expiry.
#[derive(Debug)]
pub struct TokenCache {
    entries: TtlMap<UserId, Arc<CachedCredential>>,
    ttl: Duration,
}

impl TokenCache {
    /// A cache with the default five minute lifetime.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, DEFAULT_TOKEN_TTL)
    }

    /// A cache with a custom lifetime.
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: TtlMap::new(clock),
            ttl,
        }
    }

    /// Build a cache from the `[cache]` section.
    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, config.token_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache `credential` for `user` with the configured lifetime.
    pub fn put(&self, user: UserId, secondary_id: SecondaryId, credential: SecretString) {
        self.put_for(user, secondary_id, credential, self.ttl);
    }

    /// Cache `credential` for `user` with an explicit lifetime.
    pub fn put_for(
        &self,
        user: UserId,
        secondary_id: SecondaryId,
        credential: SecretString,
        ttl: Duration,
    ) {
        let entry = Arc::new(CachedCredential {
            secondary_id,
            credential,
        });
        self.entries.insert(user, entry, ttl);
        debug!(user_id = %user, ttl_secs = ttl.as_secs(), "credential cached");
    }

    /// The live entry for `user`, if any. Reads do not extend its lifetime.
    pub fn try_get(&self, user: UserId) -> Option<Arc<CachedCredential>> {
        self.entries.get(&user)
    }

    /// Drop any cached credential for `user`. Returns whether one was live.
    pub fn invalidate(&self, user: UserId) -> bool {
        let removed = self.entries.remove(&user).is_some();
        if removed {
            debug!(user_id = %user, "cached credential invalidated");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Sweep for TokenCache {
    fn sweep(&self) -> usize {
        self.entries.sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_test_utils::ManualClock;
    use secrecy::ExposeSecret;

    fn cache() -> (Arc<ManualClock>, TokenCache) {
        let clock = Arc::new(ManualClock::new());
        (clock.clone(), TokenCache::new(clock))
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn hit_before_ttl_miss_after() {
        let (clock, cache) = cache();
        cache.put(UserId(1), SecondaryId(10), secret("cookie"));

        clock.advance(Duration::from_secs(299));
        let hit = cache.try_get(UserId(1)).expect("still cached");
        assert_eq!(hit.secondary_id, SecondaryId(10));
        assert_eq!(hit.credential.expose_secret(), "cookie");

        clock.advance(Duration::from_secs(1));
        assert!(cache.try_get(UserId(1)).is_none());
    }

    #[test]
    fn put_replaces_and_restarts_lifetime() {
        let (clock, cache) = cache();
        cache.put(UserId(1), SecondaryId(10), secret("old"));
        clock.advance(Duration::from_secs(200));
        cache.put(UserId(1), SecondaryId(11), secret("new"));
        clock.advance(Duration::from_secs(200));

        let hit = cache.try_get(UserId(1)).expect("replacement still cached");
        assert_eq!(hit.secondary_id, SecondaryId(11));
        assert_eq!(hit.credential.expose_secret(), "new");
    }

    #[test]
    fn invalidate_removes_entry() {
        let (_, cache) = cache();
        cache.put(UserId(1), SecondaryId(10), secret("cookie"));
        assert!(cache.invalidate(UserId(1)));
        assert!(!cache.invalidate(UserId(1)));
        assert!(cache.try_get(UserId(1)).is_none());
    }

    #[test]
    fn explicit_ttl_overrides_default() {
        let (clock, cache) = cache();
        cache.put_for(UserId(2), SecondaryId(20), secret("c"), Duration::from_secs(5));
        clock.advance(Duration::from_secs(5));
        assert!(cache.try_get(UserId(2)).is_none());
    }

    #[test]
    fn debug_output_redacts_credential() {
        let (_, cache) = cache();
        cache.put(UserId(3), SecondaryId(30), secret("super-secret-cookie"));
        let hit = cache.try_get(UserId(3)).unwrap();
        assert!(!format!("{hit:?}").contains("super-secret-cookie"));
    }
}
