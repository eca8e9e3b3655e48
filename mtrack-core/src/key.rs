use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Legacy DOM keycode (`F` = 70, `J` = 74, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const F: KeyCode = KeyCode(70);
    pub const J: KeyCode = KeyCode(74);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key press as delivered by the key-capture service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    /// Milliseconds since trial start.
    pub rt_ms: f64,
}

/// Upstream filter applied by key capture. `None` accepts every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFilter(pub Option<BTreeSet<KeyCode>>);

impl KeyFilter {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self(Some(keys.into_iter().collect()))
    }

    pub fn accepts(&self, key: KeyCode) -> bool {
        self.0.as_ref().is_none_or(|set| set.contains(&key))
    }
}

/// The two keys that steer the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlKeys {
    pub decrease: KeyCode,
    pub increase: KeyCode,
}

impl Default for ControlKeys {
    fn default() -> Self {
        Self {
            decrease: KeyCode::F,
            increase: KeyCode::J,
        }
    }
}

impl ControlKeys {
    pub fn direction_for(&self, key: KeyCode) -> Option<Direction> {
        if key == self.decrease {
            Some(Direction::Decrease)
        } else if key == self.increase {
            Some(Direction::Increase)
        } else {
            None
        }
    }
}
