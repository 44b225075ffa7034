/// Result alias that carries the custom [`TrainerError`] type.
pub type Result<T> = std::result::Result<T, TrainerError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    /// Construction or preparation was attempted with values the timing
    /// engine cannot operate on. Never clamped silently.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The scheduler was polled before `prepare` seeded its deadlines.
    #[error("scheduler polled before prepare")]
    NotReady,
    /// A staff cell was requested outside the configured grid.
    #[error("position ({measure}, {beat}) is outside the configured staff")]
    OutOfRange { measure: u32, beat: u32 },
    /// Failure reported by the terminal surface collaborator. Not
    /// recoverable by the core; the control loop tears down and exits.
    #[error("terminal surface failure: {0}")]
    Surface(#[from] std::io::Error),
}
