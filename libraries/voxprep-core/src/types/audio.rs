/// Audio-related types
use serde::{Deserialize, Serialize};

/// Media type declared for every encoded container
pub const WAV_MEDIA_TYPE: &str = "audio/wav";

/// Decoded audio samples
///
/// Samples are stored as f32, nominally in the range [-1.0, 1.0].
/// Interleaved format: [L, R, L, R, ...] for stereo.
///
/// Each pipeline stage takes a buffer by value and hands back a new one, so a
/// buffer is never shared between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Create a new buffer of interleaved samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Create a single-channel buffer
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Take ownership of the interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Whether the buffer holds a single channel
    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            n => self.samples.len() / n as usize,
        }
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A raw recording handed to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInput {
    /// Undecoded container bytes
    pub data: Vec<u8>,
    /// Declared MIME type, if the capture layer supplied one
    pub media_type: Option<String>,
}

impl AudioInput {
    /// Wrap a blob with its declared media type
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: Some(media_type.into()),
        }
    }

    /// Wrap a blob whose media type is unknown
    pub fn untyped(data: Vec<u8>) -> Self {
        Self {
            data,
            media_type: None,
        }
    }

    /// Size of the blob in bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// An encoded container and its media type
///
/// Produced once by the encoder and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    bytes: Vec<u8>,
    media_type: &'static str,
}

impl EncodedAudio {
    /// Create an encoded blob
    pub fn new(bytes: Vec<u8>, media_type: &'static str) -> Self {
        Self { bytes, media_type }
    }

    /// Encoded bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Declared media type
    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the blob is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
