use mtrack_core::{AnimationEvent, KeyCode, ResponseEvent, StimulusId, TrialResult};

/// Append-only frame and response logs.
///
/// `finalize` consumes the recorder, so nothing can be appended once the
/// result has been handed out.
#[derive(Debug, Default)]
pub struct EventRecorder {
    frames: Vec<AnimationEvent>,
    responses: Vec<ResponseEvent>,
}

impl EventRecorder {
    pub fn record_frame(&mut self, stimulus: StimulusId, elapsed_ms: f64) {
        self.frames.push(AnimationEvent {
            stimulus,
            time_ms: elapsed_ms,
        });
    }

    pub fn record_response(
        &mut self,
        key: KeyCode,
        rt_ms: f64,
        stimulus_at_response: Option<StimulusId>,
    ) {
        self.responses.push(ResponseEvent {
            key,
            rt_ms,
            stimulus_at_response,
        });
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    pub fn finalize(self) -> TrialResult {
        TrialResult {
            animation_sequence: self.frames,
            responses: self.responses,
        }
    }
}
