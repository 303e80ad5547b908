//! Canonical PCM WAV encoding
//!
//! Output layout is fixed: a 44-byte RIFF/WAVE header followed by 16-bit
//! signed little-endian mono samples.

use voxprep_core::{EncodedAudio, PrepError, Result, SampleBuffer, WAV_MEDIA_TYPE};

/// Size of the RIFF + fmt + data chunk headers
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);

/// Convert a sample to 16-bit PCM
///
/// Clamps to [-1.0, 1.0] first. Negative values scale by 32768 and
/// non-negative values by 32767, truncating toward zero.
pub fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Mono 16-bit PCM WAV encoder
pub struct WavEncoder;

impl WavEncoder {
    /// Encode a mono buffer at its own sample rate
    pub fn encode(buffer: &SampleBuffer) -> Result<EncodedAudio> {
        if !buffer.is_mono() {
            return Err(PrepError::invalid_buffer(format!(
                "WAV encoder expects mono input, got {} channels",
                buffer.channels()
            )));
        }
        Self::encode_samples(buffer.samples(), buffer.sample_rate())
    }

    /// Encode raw mono samples
    pub fn encode_samples(samples: &[f32], sample_rate: u32) -> Result<EncodedAudio> {
        if sample_rate == 0 {
            return Err(PrepError::invalid_buffer("sample rate must be positive"));
        }

        let data_size = samples
            .len()
            .checked_mul(usize::from(BLOCK_ALIGN))
            .and_then(|size| u32::try_from(size).ok())
            .filter(|size| size.checked_add(36).is_some())
            .ok_or_else(|| {
                PrepError::invalid_buffer(format!(
                    "{} samples do not fit in a 32-bit RIFF container",
                    samples.len()
                ))
            })?;
        let byte_rate = sample_rate
            .checked_mul(u32::from(BLOCK_ALIGN))
            .ok_or_else(|| {
                PrepError::invalid_buffer(format!("sample rate {} is too high", sample_rate))
            })?;

        let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

        // RIFF header
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_size).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        // fmt chunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        bytes.extend_from_slice(&CHANNELS.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
        bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data chunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_size.to_le_bytes());
        for &sample in samples {
            bytes.extend_from_slice(&quantize(sample).to_le_bytes());
        }

        Self::verify_header(&bytes)?;

        tracing::debug!(
            sample_rate,
            samples = samples.len(),
            bytes = bytes.len(),
            "Encoded PCM WAV"
        );

        Ok(EncodedAudio::new(bytes, WAV_MEDIA_TYPE))
    }

    /// Read back the container magic
    ///
    /// Failure here is an encoder bug, not a runtime condition.
    fn verify_header(bytes: &[u8]) -> Result<()> {
        if bytes.get(0..4) != Some(b"RIFF".as_slice()) || bytes.get(8..12) != Some(b"WAVE".as_slice())
        {
            return Err(PrepError::EncodingInvariant(
                "encoded header is missing RIFF/WAVE magic".to_string(),
            ));
        }
        Ok(())
    }
}
