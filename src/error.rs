use thiserror::Error;

/// Result type for mixer operations
pub type Result<T> = std::result::Result<T, UiError>;

/// Errors that can occur when interacting with a Ui mixer
#[derive(Error, Debug)]
pub enum UiError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Transport error from a non-WebSocket transport implementation
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection was closed
    #[error("connection closed")]
    ConnectionClosed,

    /// A parameter address (not a value) was outside its valid range,
    /// e.g. an FX parameter slot above 6. Out-of-range *values* are
    /// clamped silently instead.
    #[error("{what} out of range: {value} (valid: {min}..={max})")]
    OutOfRange {
        /// What was out of range
        what: &'static str,
        /// The rejected input
        value: i64,
        /// Lower bound (inclusive)
        min: i64,
        /// Upper bound (inclusive)
        max: i64,
    },

    /// Channel receive error
    #[error("channel error: {0}")]
    ChannelError(String),
}
