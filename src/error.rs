//! Error types for the macro engine.

use thiserror::Error;

/// Result type alias for remio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, calibrating, or replaying.
#[derive(Debug, Error)]
pub enum Error {
    /// The persisted calibration record is missing or corrupt.
    ///
    /// Recoverable: callers fall back to an auto-detected default transform.
    #[error("failed to load calibration config: {0}")]
    ConfigLoad(String),

    /// Two calibration points with a non-positive span.
    ///
    /// Persisting such a pair would yield a zero or negative scale and make
    /// every replayed position invalid, so it is rejected up front.
    #[error(
        "degenerate calibration: bottom-right ({br_x}, {br_y}) does not extend past top-left ({tl_x}, {tl_y})"
    )]
    CalibrationDegenerate {
        /// Top-left reference point, x.
        tl_x: f64,
        /// Top-left reference point, y.
        tl_y: f64,
        /// Bottom-right reference point, x.
        br_x: f64,
        /// Bottom-right reference point, y.
        br_y: f64,
    },

    /// The action log is owned by an active recording or replay pass.
    #[error("action log is busy (recording or replay in progress)")]
    LogBusy,

    /// A macro file could not be parsed into a valid action log.
    #[error("malformed macro file: {0}")]
    MalformedLog(String),

    /// Replay was started with zero recorded actions.
    #[error("no actions recorded yet")]
    EmptyLog,

    /// Replay was started while a pass is already active.
    #[error("replay is already running")]
    ReplayAlready,

    /// A log edit referenced an index past the end of the log.
    #[error("no action at index {0}")]
    InvalidIndex(usize),

    /// An edit tried to set a negative inter-action delay.
    #[error("action delay must be non-negative, got {0}")]
    InvalidDelay(f64),

    /// Replay speed factor must be positive.
    #[error("replay speed must be positive, got {0}")]
    InvalidSpeed(f64),

    /// The injection collaborator failed to emit a synthetic event.
    ///
    /// The replay scheduler logs this and skips the event; it never aborts
    /// a pass.
    #[error("failed to inject event: {0}")]
    Inject(String),

    /// Filesystem error while persisting or loading state.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),
}
