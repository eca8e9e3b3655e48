//! Fixed-period tick source with an explicit cancel handle.
//!
//! The scheduler does not own a thread. Drivers either block in
//! [`Scheduler::wait`] or compute their own wake-up from
//! [`Scheduler::time_until_next`] and call [`Scheduler::poll`], which lets
//! an event loop interleave ticks with input on a single thread.
//!
//! Deadlines are absolute (`start + n * period`) so pacing does not drift
//! with per-tick processing time. A tick that fires a whole period late
//! counts as an overrun and re-anchors the schedule instead of bursting
//! through the missed ticks.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::{TickStats, Timer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("tick period must be greater than zero")]
    ZeroPeriod,
}

/// Shared cancellation flag. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Zero-based firing index.
    pub index: u64,
    /// Timer reading when the tick fired.
    pub at_ns: u64,
}

#[derive(Debug)]
pub struct Scheduler<T: Timer> {
    timer: T,
    period_ns: u64,
    next_due_ns: u64,
    fired: u64,
    last_fired_ns: Option<u64>,
    cancel: CancelHandle,
    stats: TickStats,
}

impl<T: Timer> Scheduler<T> {
    /// Starts the schedule now; the first tick is due one period later.
    pub fn start(timer: T, period: Duration) -> Result<Self, SchedulerError> {
        let period_ns = period.as_nanos() as u64;
        if period_ns == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        let now = timer.now();
        debug!(period_ms = period.as_secs_f64() * 1e3, "scheduler started");
        Ok(Self {
            timer,
            period_ns,
            next_due_ns: now + period_ns,
            fired: 0,
            last_fired_ns: None,
            cancel: CancelHandle::default(),
            stats: TickStats::default(),
        })
    }

    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period_ns)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn ticks_fired(&self) -> u64 {
        self.fired
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Absolute due time of the next tick; `None` once cancelled.
    pub fn next_due_ns(&self) -> Option<u64> {
        (!self.is_cancelled()).then_some(self.next_due_ns)
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_due_ns()
            .map(|due| Duration::from_nanos(due.saturating_sub(self.timer.now())))
    }

    /// Fires the next tick if it is due. Never fires after cancellation.
    pub fn poll(&mut self) -> Option<Tick> {
        if self.is_cancelled() {
            return None;
        }
        let now = self.timer.now();
        if now < self.next_due_ns {
            return None;
        }

        if let Some(last) = self.last_fired_ns {
            self.stats.record(now - last);
        }
        if now >= self.next_due_ns + self.period_ns {
            self.stats.record_overrun();
            debug!(
                late_ns = now - self.next_due_ns,
                tick = self.fired,
                "tick overrun, re-anchoring schedule"
            );
            self.next_due_ns = now + self.period_ns;
        } else {
            self.next_due_ns += self.period_ns;
        }

        let tick = Tick {
            index: self.fired,
            at_ns: now,
        };
        self.fired += 1;
        self.last_fired_ns = Some(now);
        Some(tick)
    }

    /// Sleeps until the next tick and fires it; `None` once cancelled.
    pub fn wait(&mut self) -> Option<Tick> {
        loop {
            let remaining = self.time_until_next()?;
            if !remaining.is_zero() {
                self.timer.sleep(remaining);
            }
            if let Some(tick) = self.poll() {
                return Some(tick);
            }
        }
    }

    /// Calls `on_tick` for every tick until it breaks or the handle is
    /// cancelled. Breaking cancels the schedule.
    pub fn run<F>(&mut self, mut on_tick: F)
    where
        F: FnMut(Tick) -> ControlFlow<()>,
    {
        while let Some(tick) = self.wait() {
            if on_tick(tick).is_break() {
                self.cancel();
            }
        }
    }
}
