use thiserror::Error;

/// Errors that can occur during device enumeration, capture, and encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The host audio subsystem could not be queried.
    #[error("device enumeration failed: {0}")]
    Enumeration(String),

    /// The host refused to grant a capture stream.
    #[error("failed to open capture device: {0}")]
    Open(String),

    /// The destination could not be written.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// The negotiated stream format cannot be represented as PCM WAV.
    #[error("invalid stream format: {0}")]
    Format(String),

    #[error("device index {index} out of range ({count} devices)")]
    InvalidDeviceIndex { index: usize, count: usize },

    #[error("no active capture session")]
    NoActiveSession,

    #[error("storage error: {0}")]
    Storage(String),
}
