// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! What happens once a pending authentication resolves.
//!
//! A [`Continuation`] is registered with the correlator and invoked at most
//! once, with the unlock result and the context of the request that supplied
//! the passphrase. Expired or cancelled registrations drop it unrun.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use latchkey_core::{
    AUTHENTICATION_FAILED_MESSAGE, LatchkeyError, SecondaryId, UNAVAILABLE_MESSAGE, UserId,
};
use secrecy::SecretString;
use tokio::sync::oneshot;

/// Why an authentication did not succeed, as far as callers may know.
///
/// Wrong passphrase, corrupt blob and missing enrollment all collapse into
/// [`AuthenticationFailed`](Self::AuthenticationFailed). Store and worker
/// faults collapse into [`Unavailable`](Self::Unavailable); their detail only
/// reaches the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AuthenticationFailed,
    Unavailable,
}

impl FailureKind {
    /// The user-facing message for this kind.
    pub fn public_message(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => AUTHENTICATION_FAILED_MESSAGE,
            Self::Unavailable => UNAVAILABLE_MESSAGE,
        }
    }
}

impl From<&LatchkeyError> for FailureKind {
    fn from(error: &LatchkeyError) -> Self {
        if error.is_authentication_failure() {
            Self::AuthenticationFailed
        } else {
            Self::Unavailable
        }
    }
}

/// Result handed to a continuation.
#[derive(Debug)]
pub enum AuthenticationResult {
    Success {
        user_id: UserId,
        secondary_id: SecondaryId,
        credential: SecretString,
    },
    Failure {
        user_id: UserId,
        kind: FailureKind,
    },
}

impl AuthenticationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Self::Success { user_id, .. } | Self::Failure { user_id, .. } => *user_id,
        }
    }

    /// User-facing message for a failure; `None` on success.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(kind.public_message()),
        }
    }
}

type Callback<C> = Box<dyn FnOnce(AuthenticationResult, C) -> BoxFuture<'static, ()> + Send + Sync>;

/// A one-shot callback resumed with the authentication result.
pub struct Continuation<C = ()> {
    callback: Callback<C>,
}

impl<C: Send + 'static> Continuation<C> {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(AuthenticationResult, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            callback: Box::new(move |result, ctx| Box::pin(f(result, ctx))),
        }
    }

    /// A continuation that forwards its result to the returned receiver.
    pub fn channel() -> (Self, PendingAuthentication<C>) {
        let (tx, rx) = oneshot::channel();
        let continuation = Self::new(move |result, ctx| async move {
            // The waiter may have given up; nothing else to do then.
            let _ = tx.send((result, ctx));
        });
        (continuation, PendingAuthentication { rx })
    }

    pub(crate) fn invoke(self, result: AuthenticationResult, ctx: C) -> BoxFuture<'static, ()> {
        (self.callback)(result, ctx)
    }
}

impl<C> fmt::Debug for Continuation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation").finish_non_exhaustive()
    }
}

/// How a wait on a [`PendingAuthentication`] ended.
#[derive(Debug)]
pub enum WaitOutcome<C> {
    Completed(AuthenticationResult, C),
    /// The registration expired or was cancelled, or the ceiling passed first.
    Expired,
}

/// Receiving half of [`Continuation::channel`].
#[derive(Debug)]
pub struct PendingAuthentication<C = ()> {
    rx: oneshot::Receiver<(AuthenticationResult, C)>,
}

impl<C> PendingAuthentication<C> {
    /// Wait for the result, giving up after `ceiling`.
    ///
    /// Returns early with [`WaitOutcome::Expired`] as soon as the correlator
    /// drops the registration.
    pub async fn wait(self, ceiling: Duration) -> WaitOutcome<C> {
        match tokio::time::timeout(ceiling, self.rx).await {
            Ok(Ok((result, ctx))) => WaitOutcome::Completed(result, ctx),
            Ok(Err(_)) | Err(_) => WaitOutcome::Expired,
        }
    }
}
