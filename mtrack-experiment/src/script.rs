use std::path::Path;

use mtrack_core::{KeyCode, KeyEvent, KeyFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("key script parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A key press injected at a fixed offset from trial start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedKey {
    pub at_ms: f64,
    pub code: KeyCode,
}

impl ScriptedKey {
    pub fn new(at_ms: f64, code: KeyCode) -> Self {
        Self { at_ms, code }
    }

    /// Offset in nanoseconds; negative offsets clamp to trial start.
    pub fn at_ns(&self) -> u64 {
        (self.at_ms * 1e6).max(0.0) as u64
    }

    pub fn event(&self) -> KeyEvent {
        KeyEvent {
            code: self.code,
            rt_ms: self.at_ms,
        }
    }
}

/// Key presses ordered by arrival time. Presses sharing a timestamp keep
/// their listed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ScriptedKey>", into = "Vec<ScriptedKey>")]
pub struct KeyScript(Vec<ScriptedKey>);

impl From<Vec<ScriptedKey>> for KeyScript {
    fn from(mut keys: Vec<ScriptedKey>) -> Self {
        keys.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self(keys)
    }
}

impl From<KeyScript> for Vec<ScriptedKey> {
    fn from(script: KeyScript) -> Self {
        script.0
    }
}

impl KeyScript {
    pub fn keys(&self) -> &[ScriptedKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops keys the capture service would never have delivered.
    pub fn filtered(&self, filter: &KeyFilter) -> Self {
        Self(
            self.0
                .iter()
                .filter(|k| filter.accepts(k.code))
                .copied()
                .collect(),
        )
    }

    pub fn from_json_str(s: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_by_time() {
        let script = KeyScript::from_json_str(
            r#"[
                {"at_ms": 30.0, "code": 74},
                {"at_ms": 5.5, "code": 70},
                {"at_ms": 30.0, "code": 32}
            ]"#,
        )
        .unwrap();
        let order: Vec<(f64, u32)> = script.keys().iter().map(|k| (k.at_ms, k.code.0)).collect();
        assert_eq!(order, vec![(5.5, 70), (30.0, 74), (30.0, 32)]);
    }

    #[test]
    fn filter_matches_capture_semantics() {
        let script = KeyScript::from(vec![
            ScriptedKey::new(1.0, KeyCode::F),
            ScriptedKey::new(2.0, KeyCode(32)),
        ]);
        let only_f = script.filtered(&KeyFilter::only([KeyCode::F]));
        assert_eq!(only_f.len(), 1);
        assert_eq!(script.filtered(&KeyFilter::all()), script);
    }

    #[test]
    fn event_carries_offset_as_reaction_time() {
        let k = ScriptedKey::new(12.25, KeyCode::J);
        assert_eq!(k.at_ns(), 12_250_000);
        assert_eq!(
            k.event(),
            KeyEvent {
                code: KeyCode::J,
                rt_ms: 12.25
            }
        );
        assert_eq!(ScriptedKey::new(-3.0, KeyCode::J).at_ns(), 0);
    }

    #[test]
    fn malformed_script_is_a_parse_error() {
        assert!(matches!(
            KeyScript::from_json_str("{\"at_ms\": 1}"),
            Err(ScriptError::Parse(_))
        ));
    }
}
