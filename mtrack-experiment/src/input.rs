use mtrack_core::{ControlKeys, Direction, KeyEvent, StimulusId};

use crate::recorder::EventRecorder;

/// Single-slot mailbox between key input and the next tick.
///
/// Staging overwrites; `take` empties. Nothing queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingInput(Option<Direction>);

impl PendingInput {
    pub fn stage(&mut self, d: Direction) {
        self.0 = Some(d);
    }

    pub fn take(&mut self) -> Option<Direction> {
        self.0.take()
    }

    pub fn peek(&self) -> Option<Direction> {
        self.0
    }
}

/// Logs every accepted key and stages steering requests.
#[derive(Debug, Clone)]
pub struct InputChannel {
    controls: ControlKeys,
    attached: bool,
}

impl InputChannel {
    pub fn new(controls: ControlKeys) -> Self {
        Self {
            controls,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Returns false when detached; the event then has no effect at all.
    pub fn handle(
        &self,
        event: KeyEvent,
        shown: Option<&StimulusId>,
        recorder: &mut EventRecorder,
        pending: &mut PendingInput,
    ) -> bool {
        if !self.attached {
            return false;
        }
        recorder.record_response(event.code, event.rt_ms, shown.cloned());
        if let Some(d) = self.controls.direction_for(event.code) {
            pending.stage(d);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtrack_core::KeyCode;

    fn key(code: u32, rt_ms: f64) -> KeyEvent {
        KeyEvent {
            code: KeyCode(code),
            rt_ms,
        }
    }

    fn attached() -> InputChannel {
        let mut ch = InputChannel::new(ControlKeys::default());
        ch.attach();
        ch
    }

    #[test]
    fn last_staged_direction_wins() {
        let mut p = PendingInput::default();
        p.stage(Direction::Decrease);
        p.stage(Direction::Increase);
        assert_eq!(p.take(), Some(Direction::Increase));
        assert_eq!(p.take(), None);
    }

    #[test]
    fn control_keys_stage_and_log() {
        let ch = attached();
        let mut rec = EventRecorder::default();
        let mut p = PendingInput::default();

        assert!(ch.handle(key(70, 12.0), None, &mut rec, &mut p));
        assert_eq!(p.peek(), Some(Direction::Decrease));
        assert!(ch.handle(key(74, 14.0), None, &mut rec, &mut p));
        assert_eq!(p.peek(), Some(Direction::Increase));

        let result = rec.finalize();
        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.responses[0].key, KeyCode(70));
        assert_eq!(result.responses[1].rt_ms, 14.0);
    }

    #[test]
    fn other_keys_are_logged_without_steering() {
        let ch = attached();
        let mut rec = EventRecorder::default();
        let mut p = PendingInput::default();
        let dot = StimulusId::new("dot");

        ch.handle(key(32, 5.0), Some(&dot), &mut rec, &mut p);
        assert_eq!(p.peek(), None);

        let result = rec.finalize();
        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.responses[0].stimulus_at_response, Some(dot));
    }

    #[test]
    fn detached_channel_ignores_everything() {
        let mut ch = attached();
        ch.detach();
        let mut rec = EventRecorder::default();
        let mut p = PendingInput::default();

        assert!(!ch.handle(key(70, 1.0), None, &mut rec, &mut p));
        assert_eq!(p.peek(), None);
        assert!(rec.finalize().responses.is_empty());
    }
}
