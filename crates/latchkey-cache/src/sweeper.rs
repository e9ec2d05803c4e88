// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background task that periodically purges expired entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Something with expired entries to drop.
pub trait Sweep: Send + Sync + 'static {
    /// Drop expired entries and return how many went away.
    fn sweep(&self) -> usize;
}

impl<K, V> Sweep for crate::TtlMap<K, V>
where
    K: Eq + std::hash::Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        crate::TtlMap::sweep(self)
    }
}

/// Handle to a running sweep loop.
///
/// The loop holds only a weak reference to its target and exits on its own
/// once the target is dropped.
#[derive(Debug)]
pub struct Sweeper {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping `target` every `interval`, stopping when `cancel` fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T: Sweep>(
        name: &'static str,
        target: &Arc<T>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let weak = Arc::downgrade(target);
        let handle = tokio::spawn(run(name, weak, interval, cancel.clone()));
        debug!(component = name, interval_secs = interval.as_secs(), "sweeper started");
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(component = self.name, error = %e, "sweeper task ended abnormally");
        }
    }
}

async fn run<T: Sweep>(
    name: &'static str,
    target: Weak<T>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing can have expired yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(component = name, "sweeper cancelled");
                break;
            }
            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else {
                    debug!(component = name, "sweep target dropped, sweeper exiting");
                    break;
                };
                let removed = target.sweep();
                if removed > 0 {
                    debug!(component = name, removed, "swept expired entries");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl Sweep for Counting {
        fn sweep(&self) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_every_interval() {
        let target = Arc::new(Counting::default());
        let sweeper = Sweeper::spawn(
            "test",
            &target,
            Duration::from_secs(60),
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_secs(181)).await;
        assert_eq!(target.0.load(Ordering::SeqCst), 3);

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_cancelled() {
        let target = Arc::new(Counting::default());
        let cancel = CancellationToken::new();
        let sweeper = Sweeper::spawn("test", &target, Duration::from_secs(1), cancel.clone());

        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(sweeper.is_finished());
        assert_eq!(target.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_target_dropped() {
        let target = Arc::new(Counting::default());
        let sweeper = Sweeper::spawn(
            "test",
            &target,
            Duration::from_secs(1),
            CancellationToken::new(),
        );

        drop(target);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(sweeper.is_finished());
    }
}
