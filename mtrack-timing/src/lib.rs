pub mod scheduler;
pub mod stats;
pub mod timer;

pub use scheduler::{CancelHandle, Scheduler, SchedulerError, Tick};
pub use stats::TickStats;
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
