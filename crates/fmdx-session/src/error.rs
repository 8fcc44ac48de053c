/// Failure taxonomy of the session layer.
///
/// None of these are fatal to the process.  Connect failures and session loss
/// leave the session cleanly `Disconnected`; the soft variants are only ever
/// logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Malformed or blank input, rejected before any I/O.
    #[error("{0}")]
    InvalidInput(String),

    /// Network or info-fetch failure while connecting.
    #[error("connection failed: {0}")]
    ConnectFailure(String),

    /// The control connection closed underneath an active session.
    #[error("connection to tuner lost")]
    SessionLost,

    /// A scan produced no usable result before its deadline.
    #[error("spectrum scan timed out")]
    ScanTimeout,

    /// An outbound command was evicted from the full command queue.
    #[error("command dropped")]
    CommandDropped,

    /// Swapping the audio pipeline failed; the old one stays active.
    #[error("audio reconfiguration failed: {0}")]
    ReconfigFailure(String),

    /// The session event loop is gone.
    #[error("session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
