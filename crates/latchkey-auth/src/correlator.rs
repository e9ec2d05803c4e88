// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending authentication requests and their one-time completion.
//!
//! A command that needs the user's credential registers a request and hands
//! the returned token to the UI. A later, unrelated request completes it with
//! the passphrase. Each token resolves at most once: the first
//! [`complete`](AuthenticationCorrelator::complete) removes the entry in the
//! same atomic step that finds it, so a racing or late caller sees
//! [`CompletionOutcome::NotFound`], exactly as for a token that never existed.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use latchkey_cache::{Sweep, TokenCache, TtlMap};
use latchkey_core::{
    AUTHENTICATION_FAILED_MESSAGE, Clock, LatchkeyError, ProfileStore, RequestToken, SecondaryId,
    UserId, duplicate_secret,
};
use latchkey_vault::CredentialVault;
use ring::rand::SystemRandom;
use secrecy::SecretString;
use tracing::{Instrument, debug, error, info, warn};

use crate::continuation::{AuthenticationResult, Continuation, FailureKind};
use crate::token::generate_token;

/// Default lifetime of a pending request.
pub const DEFAULT_REQUEST_TTL: Duration = Duration::from_secs(5 * 60);

/// Token draws before registration gives up on finding an unused one.
const MAX_TOKEN_ATTEMPTS: usize = 4;

type TokenSource = Box<dyn Fn() -> Result<RequestToken, LatchkeyError> + Send + Sync>;

/// What [`AuthenticationCorrelator::complete`] did with a token.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The passphrase unlocked the credential; the continuation got it.
    Authenticated,
    /// Wrong passphrase, corrupt blob or no enrolled credential. The
    /// continuation got [`FailureKind::AuthenticationFailed`].
    Rejected,
    /// The profile store or worker pool failed. The continuation got
    /// [`FailureKind::Unavailable`].
    Unavailable,
    /// Unknown, expired, cancelled or already completed token. Nothing ran.
    NotFound,
}

struct PendingRequest<C> {
    owner: UserId,
    continuation: Continuation<C>,
    created_at: Instant,
}

/// Registers pending authentication requests and resolves each exactly once.
///
/// `C` is the invocation context passed to [`complete`](Self::complete) and
/// forwarded to the continuation.
pub struct AuthenticationCorrelator<C = ()> {
    pending: TtlMap<RequestToken, PendingRequest<C>>,
    store: Arc<dyn ProfileStore>,
    vault: CredentialVault,
    cache: Arc<TokenCache>,
    next_token: TokenSource,
    request_ttl: Duration,
}

impl<C: Send + 'static> AuthenticationCorrelator<C> {
    /// Create a correlator with the default request lifetime.
    ///
    /// Successful unlocks are written to `cache`; `clock` drives request
    /// expiry.
    pub fn new(
        store: Arc<dyn ProfileStore>,
        vault: CredentialVault,
        cache: Arc<TokenCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rng = SystemRandom::new();
        Self {
            pending: TtlMap::new(clock),
            store,
            vault,
            cache,
            next_token: Box::new(move || generate_token(&rng)),
            request_ttl: DEFAULT_REQUEST_TTL,
        }
    }

    /// Override how long a registered request stays completable.
    pub fn with_request_ttl(mut self, ttl: Duration) -> Self {
        self.request_ttl = ttl;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_token_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Result<RequestToken, LatchkeyError> + Send + Sync + 'static,
    {
        self.next_token = Box::new(source);
        self
    }

    pub fn request_ttl(&self) -> Duration {
        self.request_ttl
    }

    /// Register a request on behalf of `owner` and return its token.
    ///
    /// A freshly drawn token that collides with a live one is discarded and
    /// redrawn, never overwritten.
    pub fn register_request(
        &self,
        owner: UserId,
        continuation: Continuation<C>,
    ) -> Result<RequestToken, LatchkeyError> {
        let mut request = PendingRequest {
            owner,
            continuation,
            created_at: self.pending.clock().now(),
        };

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = (self.next_token)()?;
            match self
                .pending
                .insert_if_absent(token.clone(), request, self.request_ttl)
            {
                Ok(()) => {
                    debug!(user_id = %owner, token = token.fingerprint(), "authentication request registered");
                    return Ok(token);
                }
                Err(rejected) => {
                    warn!(user_id = %owner, attempt, "request token collision, redrawing");
                    request = rejected;
                }
            }
        }

        Err(LatchkeyError::Internal(
            "could not allocate a unique request token".to_string(),
        ))
    }

    /// Resolve `token` with `passphrase`.
    ///
    /// Returns [`CompletionOutcome::NotFound`] without touching the store or
    /// the vault unless this call is the one that consumed a live token. The
    /// winner's continuation runs on its own task; a panic there is logged and
    /// does not affect the returned outcome.
    ///
    /// Unknown tokens, wrong passphrases and missing enrollments all log the
    /// same warning, so the log cannot tell them apart either.
    pub async fn complete(
        &self,
        token: &RequestToken,
        passphrase: SecretString,
        ctx: C,
    ) -> CompletionOutcome {
        let Some(request) = self.pending.take(token) else {
            warn!(token = token.fingerprint(), "{}", AUTHENTICATION_FAILED_MESSAGE);
            return CompletionOutcome::NotFound;
        };

        let owner = request.owner;
        let waited = self.pending.clock().now().saturating_duration_since(request.created_at);
        debug!(
            user_id = %owner,
            token = token.fingerprint(),
            waited_ms = waited.as_millis() as u64,
            "authentication request consumed"
        );

        let (result, outcome) = match self.unlock(owner, passphrase).await {
            Ok((secondary_id, credential)) => {
                info!(user_id = %owner, token = token.fingerprint(), "authentication completed");
                let result = AuthenticationResult::Success {
                    user_id: owner,
                    secondary_id,
                    credential,
                };
                (result, CompletionOutcome::Authenticated)
            }
            Err(e) => {
                let kind = FailureKind::from(&e);
                let outcome = match kind {
                    FailureKind::AuthenticationFailed => {
                        warn!(user_id = %owner, token = token.fingerprint(), "{}", AUTHENTICATION_FAILED_MESSAGE);
                        CompletionOutcome::Rejected
                    }
                    FailureKind::Unavailable => {
                        error!(user_id = %owner, token = token.fingerprint(), error = %e, "authentication unavailable");
                        CompletionOutcome::Unavailable
                    }
                };
                let result = AuthenticationResult::Failure {
                    user_id: owner,
                    kind,
                };
                (result, outcome)
            }
        };

        dispatch(owner, request.continuation, result, ctx);
        outcome
    }

    async fn unlock(
        &self,
        owner: UserId,
        passphrase: SecretString,
    ) -> Result<(SecondaryId, SecretString), LatchkeyError> {
        let stored = self
            .store
            .encrypted_credential(owner)
            .await?
            .ok_or(LatchkeyError::NotFound)?;
        let credential = self.vault.decrypt_async(stored.blob, passphrase).await?;
        self.cache
            .put(owner, stored.secondary_id, duplicate_secret(&credential));
        Ok((stored.secondary_id, credential))
    }

    /// Drop a pending request early. Its continuation is never run.
    pub fn cancel(&self, token: &RequestToken) -> bool {
        let cancelled = self.pending.remove(token).is_some();
        if cancelled {
            debug!(token = token.fingerprint(), "authentication request cancelled");
        }
        cancelled
    }

    /// Whether `token` is registered and not yet expired or consumed.
    pub fn is_pending(&self, token: &RequestToken) -> bool {
        self.pending.contains_key(token)
    }

    /// Stored requests, including expired ones not yet swept.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The cache successful unlocks are written to.
    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }
}

fn dispatch<C: Send + 'static>(
    owner: UserId,
    continuation: Continuation<C>,
    result: AuthenticationResult,
    ctx: C,
) {
    let run = async move { continuation.invoke(result, ctx).await };
    tokio::spawn(
        async move {
            if AssertUnwindSafe(run).catch_unwind().await.is_err() {
                error!(user_id = %owner, "continuation panicked");
            }
        }
        .in_current_span(),
    );
}

impl<C: Send + 'static> Sweep for AuthenticationCorrelator<C> {
    fn sweep(&self) -> usize {
        let removed = self.pending.sweep();
        if removed > 0 {
            debug!(removed, "expired authentication requests dropped");
        }
        removed
    }
}

impl<C> std::fmt::Debug for AuthenticationCorrelator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationCorrelator")
            .field("pending", &self.pending)
            .field("request_ttl", &self.request_ttl)
            .finish_non_exhaustive()
    }
}
