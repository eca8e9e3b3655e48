//! Trial state machine: `Idle → Running → Terminated`.
//!
//! The controller owns every piece of mutable trial state. Ticks arrive
//! through [`TrialController::step`] and key presses through
//! [`TrialController::handle_key`]; both take `&mut self`, so they can
//! interleave on one thread but never overlap. The pending-direction slot
//! is the only state both paths touch.

use mtrack_core::{
    Direction, Frame, KeyEvent, RenderSink, StimulusId, TrialError, TrialResult, TrialState,
};
use mtrack_timing::{CancelHandle, Scheduler, Timer};
use tracing::{info, trace};

use crate::boundary::{BoundaryMonitor, Side};
use crate::config::TrialConfig;
use crate::input::{InputChannel, PendingInput};
use crate::motion::{MotionModel, MotionState};
use crate::recorder::EventRecorder;

/// Mutable state that exists only while the trial runs.
#[derive(Debug)]
struct TrialRuntime {
    motion: MotionModel,
    pending: PendingInput,
    recorder: EventRecorder,
    shown: Option<StimulusId>,
    started_ns: u64,
}

#[derive(Debug)]
enum Lifecycle {
    Idle,
    Running(TrialRuntime),
    Terminated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The frame was drawn and logged; the trial continues.
    Rendered,
    Terminated(TrialResult),
}

pub struct TrialController<T: Timer> {
    config: TrialConfig,
    timer: T,
    boundary: BoundaryMonitor,
    input: InputChannel,
    lifecycle: Lifecycle,
    cancel: Option<CancelHandle>,
}

impl<T: Timer> TrialController<T> {
    pub fn new(config: TrialConfig, timer: T) -> Self {
        Self {
            boundary: BoundaryMonitor::new(config.boundary_left, config.boundary_right),
            input: InputChannel::new(config.control_keys),
            config,
            timer,
            lifecycle: Lifecycle::Idle,
            cancel: None,
        }
    }

    /// Validates the configuration, enters `Running` and returns the tick
    /// schedule the caller must drive. On error the trial stays `Idle`.
    pub fn start(&mut self) -> Result<Scheduler<T>, TrialError> {
        if !matches!(self.lifecycle, Lifecycle::Idle) {
            return Err(TrialError::AlreadyStarted);
        }
        self.config.validate()?;

        let scheduler = Scheduler::start(self.timer.clone(), self.config.tick_period())
            .map_err(|e| TrialError::InvalidConfiguration(e.to_string()))?;

        let runtime = TrialRuntime {
            motion: MotionModel::new(
                self.config.speed,
                self.config.initial_direction,
                self.config.start_position,
            ),
            pending: PendingInput::default(),
            recorder: EventRecorder::default(),
            shown: None,
            started_ns: self.timer.now(),
        };

        self.cancel = Some(scheduler.cancel_handle());
        self.input.attach();
        self.lifecycle = Lifecycle::Running(runtime);

        info!(
            stimulus = %self.config.stimulus,
            period_ms = self.config.tick_period().as_millis() as u64,
            start = self.config.start_position,
            left = self.config.boundary_left,
            right = self.config.boundary_right,
            repetitions = self.config.repetitions,
            "trial started"
        );
        Ok(scheduler)
    }

    /// Input channel entry point. Returns whether the event was accepted;
    /// events outside `Running` are dropped without effect.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let Lifecycle::Running(rt) = &mut self.lifecycle else {
            trace!(key = %event.code, "key dropped, trial not running");
            return false;
        };
        self.input
            .handle(event, rt.shown.as_ref(), &mut rt.recorder, &mut rt.pending)
    }

    /// One tick. Boundary check first; an out-of-bounds marker ends the
    /// trial without drawing.
    ///
    /// # Panics
    ///
    /// If the trial is not `Running`. Drivers stop ticking on termination,
    /// so reaching this is a logic error in the caller.
    pub fn step<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> StepOutcome {
        let state = self.state();
        let Lifecycle::Running(rt) = &mut self.lifecycle else {
            panic!("step() called on a {state:?} trial");
        };

        sink.clear();

        let position = rt.motion.position();
        if let Some(side) = self.boundary.crossed(position) {
            return StepOutcome::Terminated(self.terminate(side, position));
        }

        sink.draw(&Frame {
            stimulus: &self.config.stimulus,
            position,
            boundary_left: self.boundary.left,
            boundary_right: self.boundary.right,
            prompt: self.config.prompt.as_deref(),
        });

        let elapsed_ms = self.timer.elapsed(rt.started_ns).as_nanos() as f64 / 1e6;
        rt.recorder.record_frame(self.config.stimulus.clone(), elapsed_ms);
        rt.shown = Some(self.config.stimulus.clone());

        rt.motion.advance(&mut rt.pending);
        trace!(
            frame = rt.recorder.frame_count(),
            position,
            next = rt.motion.position(),
            "frame"
        );
        StepOutcome::Rendered
    }

    fn terminate(&mut self, side: Side, position: f64) -> TrialResult {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        self.input.detach();

        let Lifecycle::Running(rt) = std::mem::replace(&mut self.lifecycle, Lifecycle::Terminated)
        else {
            unreachable!("terminate() is only reached from a running step");
        };
        let result = rt.recorder.finalize();
        info!(
            ?side,
            position,
            frames = result.frame_count(),
            responses = result.response_count(),
            "trial terminated"
        );
        result
    }

    pub fn state(&self) -> TrialState {
        match self.lifecycle {
            Lifecycle::Idle => TrialState::Idle,
            Lifecycle::Running(_) => TrialState::Running,
            Lifecycle::Terminated => TrialState::Terminated,
        }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn motion(&self) -> Option<&MotionState> {
        match &self.lifecycle {
            Lifecycle::Running(rt) => Some(rt.motion.state()),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<Direction> {
        match &self.lifecycle {
            Lifecycle::Running(rt) => rt.pending.peek(),
            _ => None,
        }
    }

    pub fn started_at_ns(&self) -> Option<u64> {
        match &self.lifecycle {
            Lifecycle::Running(rt) => Some(rt.started_ns),
            _ => None,
        }
    }

    /// Milliseconds since trial start on the trial's own clock.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.started_at_ns()
            .map(|start| self.timer.elapsed(start).as_nanos() as f64 / 1e6)
    }
}
