// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the caches, correlator and sweepers together from configuration.

use std::sync::Arc;

use latchkey_cache::{RateLimiter, Sweeper, TokenCache};
use latchkey_config::LatchkeyConfig;
use latchkey_core::{Clock, LatchkeyError, ProfileStore};
use latchkey_vault::CredentialVault;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::correlator::AuthenticationCorrelator;
use crate::enrollment::Enrollment;

/// The running credential-unlock subsystem.
///
/// Each TTL-backed component gets its own background sweeper. Dropping the
/// runtime without calling [`shutdown`](Self::shutdown) leaves the sweepers
/// to exit on their next tick once the components are gone.
#[derive(Debug)]
pub struct LatchkeyRuntime<C = ()> {
    correlator: Arc<AuthenticationCorrelator<C>>,
    cache: Arc<TokenCache>,
    rate_limiter: Arc<RateLimiter>,
    enrollment: Enrollment,
    cancel: CancellationToken,
    sweepers: Vec<Sweeper>,
}

impl<C: Send + 'static> LatchkeyRuntime<C> {
    /// Build every component from `config` and start the sweepers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &LatchkeyConfig,
        store: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LatchkeyError> {
        let vault = CredentialVault::from_config(&config.vault)?;
        Ok(Self::start_with_vault(config, vault, store, clock))
    }

    /// Like [`start`](Self::start) but with a caller-built vault.
    pub fn start_with_vault(
        config: &LatchkeyConfig,
        vault: CredentialVault,
        store: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(TokenCache::from_config(&config.cache, clock.clone()));
        let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit, clock.clone()));
        let correlator = Arc::new(
            AuthenticationCorrelator::new(store.clone(), vault.clone(), cache.clone(), clock)
                .with_request_ttl(config.auth.request_ttl()),
        );
        let enrollment = Enrollment::new(store, vault, cache.clone());

        let cancel = CancellationToken::new();
        let sweepers = vec![
            Sweeper::spawn(
                "auth_requests",
                &correlator,
                config.auth.sweep_interval(),
                cancel.child_token(),
            ),
            Sweeper::spawn(
                "token_cache",
                &cache,
                config.cache.sweep_interval(),
                cancel.child_token(),
            ),
            Sweeper::spawn(
                "rate_limit",
                &rate_limiter,
                config.cache.sweep_interval(),
                cancel.child_token(),
            ),
        ];

        info!(
            request_ttl_secs = config.auth.request_ttl_secs,
            token_ttl_secs = config.cache.token_ttl_secs,
            cooldown_secs = config.rate_limit.cooldown_secs,
            "latchkey runtime started"
        );

        Self {
            correlator,
            cache,
            rate_limiter,
            enrollment,
            cancel,
            sweepers,
        }
    }

    pub fn correlator(&self) -> &Arc<AuthenticationCorrelator<C>> {
        &self.correlator
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn enrollment(&self) -> &Enrollment {
        &self.enrollment
    }

    /// Stop every sweeper and wait for them to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for sweeper in self.sweepers {
            sweeper.shutdown().await;
        }
        info!("latchkey runtime stopped");
    }
}
