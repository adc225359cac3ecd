//! Scheduled tick source
//!
//! A [`Ticker`] is owned by whoever drives a run. It produces one tick per
//! period until it is stopped, and it stops itself when dropped so no tick
//! can outlive the run it was driving.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodic tick source with guaranteed shutdown
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    shutdown: CancellationToken,
    ticks: u64,
}

impl Ticker {
    /// Start ticking every `period`; the first tick arrives one period from now
    ///
    /// Cancelling `shutdown` (or any parent it was derived from) stops the
    /// ticker just like [`Ticker::stop`].
    pub fn start(period: Duration, shutdown: CancellationToken) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::trace!(period_ms = period.as_millis() as u64, "Ticker started");
        Self {
            interval,
            shutdown,
            ticks: 0,
        }
    }

    /// Wait for the next tick
    ///
    /// Returns the tick count, or `None` once the ticker has been stopped.
    pub async fn next(&mut self) -> Option<u64> {
        if self.shutdown.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            _ = self.interval.tick() => {
                self.ticks += 1;
                Some(self.ticks)
            }
        }
    }

    /// Stop the ticker; idempotent
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::trace!(ticks = self.ticks, "Ticker stopped");
            self.shutdown.cancel();
        }
    }

    /// Whether the ticker has been stopped
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Ticks delivered so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Token observed by this ticker
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
