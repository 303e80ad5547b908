/// Core error types for Voxprep
use thiserror::Error;

/// Result type alias using `PrepError`
pub type Result<T> = std::result::Result<T, PrepError>;

/// Core error type for the preparation pipeline
///
/// Validation failures are not errors; they are reported as
/// [`ValidationResult`](crate::ValidationResult) data.
#[derive(Error, Debug)]
pub enum PrepError {
    /// The decoder could not read the container or its codec
    #[error("Decode error: {0}")]
    Decode(String),

    /// No decoder is available for the container or codec
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding succeeded but yielded zero samples
    #[error("Decoded audio contains no samples")]
    EmptyBuffer,

    /// The encoded container failed its own header check
    #[error("Encoding invariant violated: {0}")]
    EncodingInvariant(String),

    /// A sample buffer is not acceptable for the requested operation
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// A target, knee or policy value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrepError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the error originated in the decode backend
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::UnsupportedFormat(_))
    }
}
