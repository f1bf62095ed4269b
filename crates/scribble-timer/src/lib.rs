//! Turn timers for Scribble rooms.
//!
//! Two primitives, both owned by a room actor and polled from its
//! `tokio::select!` loop:
//!
//! - [`Countdown`]: counts a turn down one unit at a time, yielding the
//!   remaining time on every tick and flagging the tick that reaches zero.
//! - [`Delay`]: a one-shot pause between turns.
//!
//! Neither spawns a task. When inactive their `wait` futures pend forever,
//! so the `select!` branch simply never fires. Dropping the owner drops the
//! timer, which is how a room teardown cancels everything at once.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = inbox.recv() => { /* guesses, strokes, membership */ }
//!         tick = countdown.wait() => {
//!             broadcast(TimerUpdate { time: tick.remaining });
//!             if tick.expired { /* time's up */ }
//!         }
//!         () = pause.wait() => { /* next turn */ }
//!     }
//! }
//! ```
//!
//! # Cancel safety
//!
//! Both `wait` futures only touch their state after the sleep completes, so
//! losing a `select!` race never consumes a tick.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// One tick of a running [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// Units left after this tick.
    pub remaining: u32,
    /// `true` on the single tick that brought the countdown to zero.
    pub expired: bool,
}

/// A restartable countdown measured in fixed-length units.
///
/// Ticks are anchored to the schedule set by [`start`](Self::start): the
/// n-th tick is due at `start + n * interval` no matter how late the
/// previous wake-up was, so a 60-unit turn lasts 60 units of wall time.
#[derive(Debug)]
pub struct Countdown {
    interval: Duration,
    max_jitter: Duration,
    remaining: u32,
    next: Option<Instant>,
    overruns: u64,
}

impl Countdown {
    /// Creates an inactive countdown that ticks every `interval`.
    ///
    /// A zero interval is bumped to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            max_jitter: Duration::ZERO,
            remaining: 0,
            next: None,
            overruns: 0,
        }
    }

    /// Delays the first tick of every run by a random amount up to `max`,
    /// in whole milliseconds.
    ///
    /// Rooms started in the same instant otherwise tick in lockstep.
    pub fn with_jitter(mut self, max: Duration) -> Self {
        self.max_jitter = max;
        self
    }

    /// Starts counting down from `ticks`, replacing any run in progress.
    ///
    /// A zero-length countdown is treated as one tick so that it still
    /// expires exactly once.
    pub fn start(&mut self, ticks: u32) {
        let ticks = ticks.max(1);
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=millis(self.max_jitter)))
        };

        if self.is_active() {
            debug!(left = self.remaining, "countdown restarted before expiry");
        }
        self.remaining = ticks;
        self.next = Some(Instant::now() + self.interval + jitter);
        debug!(ticks, interval_ms = millis(self.interval), "countdown started");
    }

    /// Stops the countdown. Calling it on an inactive countdown is a no-op.
    pub fn cancel(&mut self) {
        if self.next.take().is_some() {
            debug!(left = self.remaining, "countdown cancelled");
        }
    }

    /// Whether a run is in progress.
    pub fn is_active(&self) -> bool {
        self.next.is_some()
    }

    /// Units left in the current run (0 when inactive after expiry).
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Length of one unit.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks that woke up more than a tenth of an interval late.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Waits for the next tick.
    ///
    /// Pends forever while the countdown is inactive. After the expiring
    /// tick is returned the countdown deactivates, so expiry is reported
    /// exactly once per [`start`](Self::start).
    pub async fn wait(&mut self) -> CountdownTick {
        let Some(due) = self.next else {
            std::future::pending::<()>().await;
            unreachable!("pending never resolves")
        };

        time::sleep_until(due).await;

        let late_by = Instant::now().saturating_duration_since(due);
        if late_by > self.interval / 10 {
            self.overruns += 1;
            warn!(
                late_ms = late_by.as_secs_f64() * 1000.0,
                left = self.remaining,
                "countdown tick fired late"
            );
        }

        self.remaining = self.remaining.saturating_sub(1);
        let expired = self.remaining == 0;
        self.next = if expired { None } else { Some(due + self.interval) };

        trace!(remaining = self.remaining, expired, "countdown tick");
        CountdownTick {
            remaining: self.remaining,
            expired,
        }
    }
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// A one-shot timer, used for the pause between two turns.
#[derive(Debug, Default)]
pub struct Delay {
    deadline: Option<Instant>,
}

impl Delay {
    /// Creates a disarmed delay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires once after `after`, replacing any pending deadline.
    pub fn arm(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }

    /// Forgets the pending deadline, if any.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves when the deadline passes, then disarms.
    ///
    /// Pends forever while disarmed.
    pub async fn wait(&mut self) {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!("pending never resolves")
        };
        time::sleep_until(deadline).await;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
