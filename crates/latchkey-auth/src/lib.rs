// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication correlation for Latchkey.
//!
//! A command handler that finds no cached credential registers a pending
//! request with the [`AuthenticationCorrelator`] and hands the token to its
//! UI. When the user answers with a passphrase, the correlator decrypts the
//! stored credential, caches it, and resumes the registered
//! [`Continuation`]. [`LatchkeyRuntime`] builds and sweeps all the pieces.

pub mod continuation;
pub mod correlator;
pub mod enrollment;
pub mod runtime;
pub mod token;

pub use continuation::{
    AuthenticationResult, Continuation, FailureKind, PendingAuthentication, WaitOutcome,
};
pub use correlator::{AuthenticationCorrelator, CompletionOutcome, DEFAULT_REQUEST_TTL};
pub use enrollment::Enrollment;
pub use runtime::LatchkeyRuntime;
