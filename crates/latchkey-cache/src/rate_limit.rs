// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user command cool-down.

use std::sync::Arc;
use std::time::Duration;

use latchkey_config::RateLimitConfig;
use latchkey_core::{Clock, UserId};

use crate::sweeper::Sweep;
use crate::ttl_map::TtlMap;

/// Default cool-down after a user runs a command.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Tracks which users are inside their post-command cool-down.
#[derive(Debug)]
pub struct RateLimiter {
    marks: TtlMap<UserId, ()>,
    cooldown: Duration,
}

impl RateLimiter {
    /// A limiter with the default 10 second cool-down.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_cooldown(clock, DEFAULT_COOLDOWN)
    }

    /// A limiter with a custom cool-down.
    pub fn with_cooldown(clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        Self {
            marks: TtlMap::new(clock),
            cooldown,
        }
    }

    /// Build a limiter from the `[rate_limit]` section.
    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_cooldown(clock, config.cooldown())
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether `user` is still cooling down.
    pub fn is_limited(&self, user: UserId) -> bool {
        self.marks.contains_key(&user)
    }

    /// Start (or restart) the cool-down for `user`.
    pub fn mark_used(&self, user: UserId) {
        self.marks.insert(user, (), self.cooldown);
    }

    /// Check and mark in one step. Returns `true` if the caller may proceed.
    ///
    /// Concurrent callers for the same user get exactly one `true` per
    /// cool-down window.
    pub fn try_acquire(&self, user: UserId) -> bool {
        self.marks
            .insert_if_absent(user, (), self.cooldown)
            .is_ok()
    }
}

impl Sweep for RateLimiter {
    fn sweep(&self) -> usize {
        self.marks.sweep()
    }
}
