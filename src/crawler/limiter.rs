//! Global request pacing
//!
//! A single periodic gate shared by the whole worker pool. Each worker takes
//! one tick before it starts a request, so request starts are at least one
//! interval apart no matter how many workers run or how slow responses are.
//! Ticks missed while the pool is idle are not saved up for a burst.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

/// Shared tick source for all workers
#[derive(Debug)]
pub struct RateLimiter {
    ticks: Mutex<Interval>,
    period: Duration,
}

impl RateLimiter {
    /// Creates a gate that opens once per `period`
    ///
    /// The first tick is available immediately. Must be called from within a
    /// Tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticks: Mutex::new(interval),
            period,
        }
    }

    /// Waits for the next tick
    ///
    /// Waiters are served in arrival order; the lock is released as soon as
    /// the tick is taken, before any request is sent.
    pub async fn acquire(&self) {
        let mut ticks = self.ticks.lock().await;
        ticks.tick().await;
    }

    /// Interval between two request starts
    pub fn period(&self) -> Duration {
        self.period
    }
}
