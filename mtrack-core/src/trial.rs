use serde::{Deserialize, Serialize};

use crate::{KeyCode, StimulusId};

/// Trial lifecycle. `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    #[default]
    Idle,
    Running,
    Terminated,
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub stimulus: StimulusId,
    #[serde(rename = "time")]
    pub time_ms: f64,
}

/// One accepted key press.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    #[serde(rename = "key_press")]
    pub key: KeyCode,
    #[serde(rename = "rt")]
    pub rt_ms: f64,
    /// Stimulus on screen when the key arrived; `None` before the first frame.
    #[serde(rename = "stimulus")]
    pub stimulus_at_response: Option<StimulusId>,
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialResult {
    pub animation_sequence: Vec<AnimationEvent>,
    pub responses: Vec<ResponseEvent>,
}

/// Trial record in the shape experiment pipelines expect: both
/// sequences pre-encoded as JSON strings. A response that came before the
/// first frame carries an empty `stimulus` string here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialData {
    pub animation_sequence: String,
    pub responses: String,
}

impl TrialResult {
    pub fn frame_count(&self) -> usize {
        self.animation_sequence.len()
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Latest timestamp across both logs, in milliseconds.
    pub fn last_timestamp_ms(&self) -> Option<f64> {
        let frames = self.animation_sequence.iter().map(|e| e.time_ms);
        let responses = self.responses.iter().map(|r| r.rt_ms);
        frames.chain(responses).reduce(f64::max)
    }

    pub fn to_trial_data(&self) -> serde_json::Result<TrialData> {
        let responses: Vec<LegacyResponse<'_>> = self
            .responses
            .iter()
            .map(|r| LegacyResponse {
                key_press: r.key,
                rt: r.rt_ms,
                stimulus: r
                    .stimulus_at_response
                    .as_ref()
                    .map_or("", StimulusId::as_str),
            })
            .collect();
        Ok(TrialData {
            animation_sequence: serde_json::to_string(&self.animation_sequence)?,
            responses: serde_json::to_string(&responses)?,
        })
    }
}

#[derive(Serialize)]
struct LegacyResponse<'a> {
    key_press: KeyCode,
    rt: f64,
    stimulus: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TrialResult {
        let dot = StimulusId::new("dot.png");
        TrialResult {
            animation_sequence: vec![
                AnimationEvent {
                    stimulus: dot.clone(),
                    time_ms: 10.0,
                },
                AnimationEvent {
                    stimulus: dot.clone(),
                    time_ms: 20.0,
                },
            ],
            responses: vec![
                ResponseEvent {
                    key: KeyCode(32),
                    rt_ms: 4.5,
                    stimulus_at_response: None,
                },
                ResponseEvent {
                    key: KeyCode::J,
                    rt_ms: 25.0,
                    stimulus_at_response: Some(dot),
                },
            ],
        }
    }

    fn parse(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn trial_data_uses_legacy_field_names() {
        let data = sample().to_trial_data().unwrap();
        assert_eq!(
            parse(&data.animation_sequence),
            json!([
                { "stimulus": "dot.png", "time": 10.0 },
                { "stimulus": "dot.png", "time": 20.0 },
            ])
        );
        assert_eq!(
            parse(&data.responses),
            json!([
                { "key_press": 32, "rt": 4.5, "stimulus": "" },
                { "key_press": 74, "rt": 25.0, "stimulus": "dot.png" },
            ])
        );
    }

    #[test]
    fn structured_result_keeps_null_before_first_frame() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["responses"][0]["stimulus"], serde_json::Value::Null);
        assert_eq!(value["responses"][1]["stimulus"], "dot.png");
    }

    #[test]
    fn last_timestamp_spans_both_logs() {
        assert_eq!(sample().last_timestamp_ms(), Some(25.0));
        assert_eq!(TrialResult::default().last_timestamp_ms(), None);
    }
}
