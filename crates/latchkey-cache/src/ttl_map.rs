// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent map with per-entry absolute expiry.
//!
//! Backed by a sharded [`DashMap`], so operations on unrelated keys do not
//! contend on one lock. Expired entries are invisible to every read even
//! before [`TtlMap::sweep`] physically removes them.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use latchkey_core::Clock;

struct Expiring<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Expiring<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A map whose entries disappear once their time-to-live has passed.
pub struct TtlMap<K, V> {
    entries: DashMap<K, Expiring<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    fn deadline(&self, ttl: Duration) -> Instant {
        let now = self.clock.now();
        // An unrepresentable deadline means "effectively never".
        now.checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX.into()))
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let expires_at = self.deadline(ttl);
        self.entries.insert(key, Expiring { value, expires_at });
    }

    /// Insert only if no live entry exists for `key`.
    ///
    /// An expired entry counts as absent and is replaced. On conflict the
    /// rejected value is handed back.
    pub fn insert_if_absent(&self, key: K, value: V, ttl: Duration) -> Result<(), V> {
        let now = self.clock.now();
        let expires_at = self.deadline(ttl);
        match self.entries.entry(key) {
            Entry::Occupied(occupied) if occupied.get().is_live(now) => Err(value),
            Entry::Occupied(mut occupied) => {
                occupied.insert(Expiring { value, expires_at });
                Ok(())
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Expiring { value, expires_at });
                Ok(())
            }
        }
    }

    /// Clone of the live value for `key`. An expired entry is evicted.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        // The read guard is released above; evict under the write lock.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Remove and return the live value for `key` in one atomic step.
    ///
    /// When several callers race on the same key, exactly one receives the
    /// value; the rest observe `None`, as does anyone arriving after expiry.
    pub fn take<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        if let Some((_, entry)) = self.entries.remove_if(key, |_, entry| entry.is_live(now)) {
            return Some(entry.value);
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    /// Remove `key` whether or not it has expired; returns the value only if it was live.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.entries
            .remove(key)
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(_, entry)| entry.value)
    }

    /// Physically drop every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Stored entry count, including expired entries not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl<K: Eq + Hash, V> fmt::Debug for TtlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlMap")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_test_utils::ManualClock;

    fn map() -> (Arc<ManualClock>, TtlMap<String, u32>) {
        let clock = Arc::new(ManualClock::new());
        let map = TtlMap::new(clock.clone() as Arc<dyn Clock>);
        (clock, map)
    }

    #[test]
    fn entry_visible_until_deadline() {
        let (clock, map) = map();
        map.insert("a".into(), 1, Duration::from_secs(10));

        clock.advance(Duration::from_secs(9));
        assert_eq!(map.get("a"), Some(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(map.get("a"), None);
        assert!(map.is_empty(), "expired read should evict");
    }

    #[test]
    fn expiry_is_absolute_not_sliding() {
        let (clock, map) = map();
        map.insert("a".into(), 1, Duration::from_secs(10));
        for _ in 0..9 {
            clock.advance(Duration::from_secs(1));
            assert_eq!(map.get("a"), Some(1));
        }
        clock.advance(Duration::from_secs(1));
        assert_eq!(map.get("a"), None);
    }

    #[test]
    fn insert_if_absent_respects_live_entry() {
        let (clock, map) = map();
        assert_eq!(map.insert_if_absent("k".into(), 1, Duration::from_secs(5)), Ok(()));
        assert_eq!(map.insert_if_absent("k".into(), 2, Duration::from_secs(5)), Err(2));
        assert_eq!(map.get("k"), Some(1));

        clock.advance(Duration::from_secs(5));
        assert_eq!(map.insert_if_absent("k".into(), 3, Duration::from_secs(5)), Ok(()));
        assert_eq!(map.get("k"), Some(3));
    }

    #[test]
    fn take_consumes_once() {
        let (_, map) = map();
        map.insert("k".into(), 7, Duration::from_secs(5));
        assert_eq!(map.take("k"), Some(7));
        assert_eq!(map.take("k"), None);
        assert!(!map.contains_key("k"));
    }

    #[test]
    fn take_after_expiry_is_none_and_evicts() {
        let (clock, map) = map();
        map.insert("k".into(), 7, Duration::from_secs(5));
        clock.advance(Duration::from_secs(6));
        assert_eq!(map.take("k"), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn remove_hides_expired_value() {
        let (clock, map) = map();
        map.insert("live".into(), 1, Duration::from_secs(5));
        map.insert("dead".into(), 2, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));
        assert_eq!(map.remove("dead"), None);
        assert_eq!(map.remove("live"), Some(1));
        assert!(map.is_empty());
    }

    #[test]
    fn sweep_counts_only_expired() {
        let (clock, map) = map();
        map.insert("short".into(), 1, Duration::from_secs(1));
        map.insert("long".into(), 2, Duration::from_secs(100));
        clock.advance(Duration::from_secs(2));

        assert_eq!(map.len(), 2);
        assert_eq!(map.sweep(), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("long"), Some(2));
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let (_, map) = map();
        map.insert("k".into(), 1, Duration::MAX);
        assert_eq!(map.get("k"), Some(1));
    }

    #[test]
    fn racing_takers_have_one_winner() {
        let (_, map) = map();
        let map = Arc::new(map);
        for round in 0..50 {
            let key = format!("k{round}");
            map.insert(key.clone(), round, Duration::from_secs(60));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let map = Arc::clone(&map);
                    let key = key.clone();
                    std::thread::spawn(move || map.take(key.as_str()).is_some())
                })
                .collect();
            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1, "round {round}");
        }
    }
}
