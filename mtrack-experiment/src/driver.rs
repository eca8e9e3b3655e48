//! Loops that feed ticks and key presses into a started controller.
//!
//! Both drivers run on the calling thread: keys and ticks are delivered
//! one at a time, in time order, into the same `&mut TrialController`.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use mtrack_core::{KeyEvent, RenderSink, TrialResult, TrialState};
use mtrack_timing::{Scheduler, Timer};
use thiserror::Error;
use tracing::{debug, info};

use crate::controller::{StepOutcome, TrialController};
use crate::script::KeyScript;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("trial is not running")]
    NotRunning,
    #[error("tick schedule was cancelled before the marker left the bounds")]
    Interrupted,
}

/// Plays `script` against the trial. A key due at or before a tick's due
/// time is handled before that tick.
///
/// With a `ManualTimer` this runs instantly and is fully deterministic;
/// with a wall-clock timer it sleeps until each key and tick.
pub fn replay<T, S>(
    controller: &mut TrialController<T>,
    scheduler: &mut Scheduler<T>,
    sink: &mut S,
    script: &KeyScript,
) -> Result<TrialResult, SessionError>
where
    T: Timer,
    S: RenderSink + ?Sized,
{
    let start = controller
        .started_at_ns()
        .ok_or(SessionError::NotRunning)?;
    let timer = controller.timer().clone();
    let mut keys = script.keys().iter().peekable();

    loop {
        let due = scheduler.next_due_ns().ok_or(SessionError::Interrupted)?;
        while let Some(key) = keys.next_if(|k| start.saturating_add(k.at_ns()) <= due) {
            let at = start.saturating_add(key.at_ns());
            let now = timer.now();
            if at > now {
                timer.sleep(Duration::from_nanos(at - now));
            }
            controller.handle_key(key.event());
        }

        if scheduler.wait().is_none() {
            return Err(SessionError::Interrupted);
        }
        if let StepOutcome::Terminated(result) = controller.step(sink) {
            log_pacing(scheduler);
            return Ok(result);
        }
    }
}

/// Drives the trial in real time with key presses arriving on `keys`.
///
/// Keys are handled as soon as they arrive; while the channel is empty the
/// thread waits no longer than the next tick's deadline. A closed channel
/// just means no more input. Intended for wall-clock timers.
pub fn run_live<T, S>(
    controller: &mut TrialController<T>,
    scheduler: &mut Scheduler<T>,
    sink: &mut S,
    keys: &Receiver<KeyEvent>,
) -> Result<TrialResult, SessionError>
where
    T: Timer,
    S: RenderSink + ?Sized,
{
    if controller.state() != TrialState::Running {
        return Err(SessionError::NotRunning);
    }
    let mut input_open = true;

    loop {
        let wait = scheduler
            .time_until_next()
            .ok_or(SessionError::Interrupted)?;

        if input_open {
            match keys.recv_timeout(wait) {
                Ok(event) => {
                    controller.handle_key(event);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("key input closed");
                    input_open = false;
                    continue;
                }
            }
        }

        let tick = if input_open {
            scheduler.poll()
        } else {
            scheduler.wait()
        };
        if tick.is_none() {
            continue;
        }
        if let StepOutcome::Terminated(result) = controller.step(sink) {
            log_pacing(scheduler);
            return Ok(result);
        }
    }
}

pub fn log_pacing<T: Timer>(scheduler: &Scheduler<T>) {
    let stats = scheduler.stats();
    info!(
        ticks = scheduler.ticks_fired(),
        mean_ms = stats.average_ns() / 1e6,
        jitter_ms = stats.jitter_ns() / 1e6,
        min_ms = stats.min_ns as f64 / 1e6,
        max_ms = stats.max_ns as f64 / 1e6,
        overruns = stats.overruns,
        "tick pacing"
    );
}
