//! Error types for imatch-core

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol layer errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Envelope (de)serialization failed
    #[error("Envelope error: {0}")]
    Envelope(#[from] serde_json::Error),

    /// Binary payload was not valid base64
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Inbound envelope named a device outside the protocol
    #[error("Unknown device selector: {0:?}")]
    UnknownDevice(String),

    /// Method-specific payload had the wrong JSON shape
    #[error("Malformed {method} payload: expected {expected}")]
    Payload {
        method: String,
        expected: &'static str,
    },

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}
