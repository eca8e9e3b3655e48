pub mod boundary;
pub mod config;
pub mod controller;
pub mod driver;
pub mod input;
pub mod motion;
pub mod recorder;
pub mod script;

pub use boundary::{BoundaryMonitor, Side};
pub use config::{ConfigError, TrialConfig};
pub use controller::{StepOutcome, TrialController};
pub use driver::{SessionError, log_pacing, replay, run_live};
pub use input::{InputChannel, PendingInput};
pub use motion::{MotionModel, MotionState};
pub use recorder::EventRecorder;
pub use script::{KeyScript, ScriptError, ScriptedKey};
