//! One-shot timer that simulates delivering offline drafts.
//!
//! The scheduler re-evaluates whenever the observed `(online, pending)` pair
//! changes. Any armed timer is dropped first, so only the most recent
//! observation can ever fire. This is a stand-in for a real upload: there is
//! no per-invoice acknowledgment, retry or failure path.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Sleep};

/// What a call to [`SyncScheduler::observe`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncChange {
    /// A previously armed timer was dropped.
    pub cancelled: bool,
    /// A new timer was armed for this many pending drafts.
    pub armed: Option<usize>,
}

#[derive(Debug)]
pub struct SyncScheduler {
    latency: Duration,
    observed: Option<(bool, usize)>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl SyncScheduler {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            observed: None,
            timer: None,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Record the current connectivity and pending count.
    ///
    /// Repeating the last observation changes nothing.
    pub fn observe(&mut self, online: bool, pending: usize) -> SyncChange {
        if self.observed == Some((online, pending)) {
            return SyncChange::default();
        }
        self.observed = Some((online, pending));

        let cancelled = self.timer.take().is_some();
        let armed = if online && pending > 0 {
            self.timer = Some(Box::pin(time::sleep(self.latency)));
            Some(pending)
        } else {
            None
        };
        SyncChange { cancelled, armed }
    }

    /// Drop any armed timer without firing it.
    pub fn cancel(&mut self) -> bool {
        self.timer.take().is_some()
    }

    /// Resolves when the armed timer elapses, disarming it.
    ///
    /// Pends forever while nothing is armed. Cancel safe: dropping the
    /// future leaves the timer armed.
    pub async fn fired(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.timer = None;
            }
            None => future::pending().await,
        }
    }
}
