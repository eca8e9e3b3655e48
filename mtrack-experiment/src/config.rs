//! Trial configuration: TOML loading, defaults, validation.

use std::path::Path;
use std::time::Duration;

use mtrack_core::{ControlKeys, Direction, KeyFilter, StimulusId, TrialError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SPEED: f64 = 0.001;
pub const DEFAULT_BOUNDARY_LEFT: f64 = 0.1;
pub const DEFAULT_BOUNDARY_RIGHT: f64 = 0.9;
pub const DEFAULT_START_POSITION: f64 = 0.5;
pub const DEFAULT_FRAME_TIME_MS: u64 = 10;
pub const DEFAULT_FRAME_GAP_MS: u64 = 0;
pub const DEFAULT_REPETITIONS: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] TrialError),
}

/// Immutable trial parameters.
///
/// Positions and speed share one unit; with the defaults that unit is the
/// viewport width (0.0 = left edge, 1.0 = right edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    pub stimulus: StimulusId,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub initial_direction: Direction,
    #[serde(default = "default_boundary_left")]
    pub boundary_left: f64,
    #[serde(default = "default_boundary_right")]
    pub boundary_right: f64,
    #[serde(default = "default_start_position")]
    pub start_position: f64,
    #[serde(default = "default_frame_time_ms")]
    pub frame_time_ms: u64,
    #[serde(default = "default_frame_gap_ms")]
    pub frame_gap_ms: u64,
    /// Carried through untouched; the trial itself runs once.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    #[serde(default)]
    pub accepted_keys: KeyFilter,
    #[serde(default)]
    pub control_keys: ControlKeys,
    #[serde(default)]
    pub prompt: Option<String>,
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}
fn default_boundary_left() -> f64 {
    DEFAULT_BOUNDARY_LEFT
}
fn default_boundary_right() -> f64 {
    DEFAULT_BOUNDARY_RIGHT
}
fn default_start_position() -> f64 {
    DEFAULT_START_POSITION
}
fn default_frame_time_ms() -> u64 {
    DEFAULT_FRAME_TIME_MS
}
fn default_frame_gap_ms() -> u64 {
    DEFAULT_FRAME_GAP_MS
}
fn default_repetitions() -> u32 {
    DEFAULT_REPETITIONS
}

impl TrialConfig {
    /// Defaults for everything except the stimulus.
    pub fn new(stimulus: impl Into<StimulusId>) -> Self {
        Self {
            stimulus: stimulus.into(),
            speed: DEFAULT_SPEED,
            initial_direction: Direction::Increase,
            boundary_left: DEFAULT_BOUNDARY_LEFT,
            boundary_right: DEFAULT_BOUNDARY_RIGHT,
            start_position: DEFAULT_START_POSITION,
            frame_time_ms: DEFAULT_FRAME_TIME_MS,
            frame_gap_ms: DEFAULT_FRAME_GAP_MS,
            repetitions: DEFAULT_REPETITIONS,
            accepted_keys: KeyFilter::all(),
            control_keys: ControlKeys::default(),
            prompt: None,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.frame_time_ms.saturating_add(self.frame_gap_ms))
    }

    pub fn validate(&self) -> Result<(), TrialError> {
        let invalid = |msg: String| Err(TrialError::InvalidConfiguration(msg));

        if self.tick_period().is_zero() {
            return invalid("frame_time_ms + frame_gap_ms must be greater than zero".into());
        }
        if !self.boundary_left.is_finite() || !self.boundary_right.is_finite() {
            return invalid("boundaries must be finite".into());
        }
        if self.boundary_left >= self.boundary_right {
            return invalid(format!(
                "boundary_left ({}) must be less than boundary_right ({})",
                self.boundary_left, self.boundary_right
            ));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return invalid(format!("speed must be positive, got {}", self.speed));
        }
        if !self.start_position.is_finite() {
            return invalid("start_position must be finite".into());
        }
        if self.control_keys.decrease == self.control_keys.increase {
            return invalid(format!(
                "decrease and increase keys must differ (both {})",
                self.control_keys.decrease
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: TrialConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
