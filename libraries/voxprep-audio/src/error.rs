/// Audio-specific errors
use thiserror::Error;
use voxprep_core::PrepError;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// Unsupported container or codec
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;
        match err {
            Error::Unsupported(what) => Self::UnsupportedFormat(what.to_string()),
            Error::IoError(e) => Self::DecodeError(format!("truncated or unreadable stream: {}", e)),
            other => Self::Symphonia(other.to_string()),
        }
    }
}

impl From<AudioError> for PrepError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::UnsupportedFormat(what) => PrepError::UnsupportedFormat(what),
            other => PrepError::decode(other.to_string()),
        }
    }
}
