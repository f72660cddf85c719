//! Error types for high-level device operations

/// Result type for device operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during device operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Protocol-level error
    #[error("Protocol error: {0}")]
    Core(#[from] imatch_core::Error),

    /// Transport-level error
    #[error("Transport error: {0}")]
    Transport(#[from] imatch_transport::Error),

    /// MRZ parsing error
    #[error("MRZ error: {0}")]
    Mrz(#[from] imatch_mrz::Error),

    /// Operation attempted without an open connection
    #[error("Device not connected")]
    NotConnected,

    /// The device did not answer within the configured window
    #[error("Timed out after {seconds}s waiting for the device")]
    Timeout { seconds: u64 },

    /// Basic Access Control was refused by the document
    #[error("Access control failed, device reported {0:?}")]
    BacFailed(String),

    /// A firmware chunk was not acknowledged
    #[error("Flash chunk at offset {offset} rejected: {response}")]
    FlashRejected { offset: usize, response: String },

    /// The device answered with something the operation cannot use
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// DG1 payload shorter than its fixed header
    #[error("DG1 too short: {actual} bytes")]
    Dg1TooShort { actual: usize },
}
