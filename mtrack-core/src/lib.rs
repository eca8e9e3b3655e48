pub mod direction;
pub mod error;
pub mod key;
pub mod sink;
pub mod stimulus;
pub mod trial;

pub use direction::Direction;
pub use error::TrialError;
pub use key::{ControlKeys, KeyCode, KeyEvent, KeyFilter};
pub use sink::{DrawLog, Frame, NullSink, RenderSink};
pub use stimulus::StimulusId;
pub use trial::{AnimationEvent, ResponseEvent, TrialData, TrialResult, TrialState};
