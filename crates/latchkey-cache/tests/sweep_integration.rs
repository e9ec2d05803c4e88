// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background sweeping of the credential cache.

use std::sync::Arc;
use std::time::Duration;

use latchkey_cache::{Sweeper, TokenCache};
use latchkey_core::{SecondaryId, UserId};
use latchkey_test_utils::ManualClock;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn sweeper_physically_removes_expired_credentials() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(TokenCache::with_ttl(clock.clone(), Duration::from_secs(30)));
    let sweeper = Sweeper::spawn(
        "token_cache",
        &cache,
        Duration::from_secs(60),
        CancellationToken::new(),
    );

    for user in 0..100 {
        cache.put(
            UserId(user),
            SecondaryId(user),
            SecretString::from(format!("credential-{user}")),
        );
    }
    assert_eq!(cache.len(), 100);

    clock.advance(Duration::from_secs(31));
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(cache.len(), 0);
    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn live_entries_survive_a_sweep() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(TokenCache::new(clock.clone()));
    let cancel = CancellationToken::new();
    let sweeper = Sweeper::spawn("token_cache", &cache, Duration::from_secs(1), cancel.child_token());

    cache.put(UserId(1), SecondaryId(1), SecretString::from("c".to_string()));
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(cache.try_get(UserId(1)).is_some());
    cancel.cancel();
    sweeper.shutdown().await;
}
