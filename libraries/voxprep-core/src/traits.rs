/// Core traits for Voxprep
use crate::error::Result;
use crate::types::SampleBuffer;

/// Audio decoder trait
///
/// Implementers turn a compressed blob into interleaved `f32` samples with
/// the source sample rate and channel count. Any demuxer or codec context an
/// implementation acquires must be released before `decode` returns, on the
/// success path and on every error path.
pub trait AudioDecoder: Send {
    /// Decode a complete in-memory blob
    ///
    /// `media_type` is the declared MIME type of the blob (for example
    /// `audio/webm` or `audio/mpeg`), used as a probing hint only.
    ///
    /// # Errors
    /// Returns [`PrepError::Decode`](crate::PrepError::Decode) for corrupt
    /// containers and [`PrepError::UnsupportedFormat`](crate::PrepError::UnsupportedFormat)
    /// when no codec is available.
    fn decode(&mut self, data: &[u8], media_type: Option<&str>) -> Result<SampleBuffer>;

    /// Check if the decoder recognises the given media type
    fn supports_media_type(&self, media_type: &str) -> bool;
}
