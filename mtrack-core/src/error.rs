use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialError {
    /// Rejected before the trial enters `Running`; no state is created.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("trial has already been started")]
    AlreadyStarted,
}
