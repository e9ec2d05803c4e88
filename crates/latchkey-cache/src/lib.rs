// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiring maps for Latchkey.
//!
//! [`TtlMap`] is the single expiring-map implementation; [`TokenCache`] and
//! [`RateLimiter`] are thin specializations of it, and the correlator in
//! `latchkey-auth` keys its pending requests with one too.

pub mod rate_limit;
pub mod sweeper;
pub mod token_cache;
pub mod ttl_map;

pub use rate_limit::{DEFAULT_COOLDOWN, RateLimiter};
pub use sweeper::{Sweep, Sweeper};
pub use token_cache::{CachedCredential, DEFAULT_TOKEN_TTL, TokenCache};
pub use ttl_map::TtlMap;
