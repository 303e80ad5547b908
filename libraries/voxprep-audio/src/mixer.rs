//! Mono downmix
//!
//! Every frame becomes the arithmetic mean of its channels. Unlike playback
//! downmixing there are no per-channel weights; a voice model wants one
//! evenly weighted channel.

use voxprep_core::SampleBuffer;

/// Downmixes any channel layout to mono
pub struct ChannelMixer;

impl ChannelMixer {
    /// Mix an interleaved buffer to a single channel
    ///
    /// Mono input is returned as-is. A trailing partial frame is dropped. A
    /// buffer that declares zero channels yields an empty mono buffer.
    pub fn mix(buffer: SampleBuffer) -> SampleBuffer {
        let channels = buffer.channels();
        let sample_rate = buffer.sample_rate();

        match channels {
            1 => buffer,
            0 => SampleBuffer::mono(Vec::new(), sample_rate),
            n => {
                let n = usize::from(n);
                let mono = buffer
                    .samples()
                    .chunks_exact(n)
                    .map(|frame| frame.iter().sum::<f32>() / n as f32)
                    .collect();
                SampleBuffer::mono(mono, sample_rate)
            }
        }
    }

    /// Mix planar channels (one `Vec` per channel) to a single channel
    ///
    /// Channels of unequal length are mixed up to the shortest one.
    pub fn mix_planar(planes: &[Vec<f32>], sample_rate: u32) -> SampleBuffer {
        let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
        let count = planes.len() as f32;

        let mono = (0..frames)
            .map(|i| planes.iter().map(|plane| plane[i]).sum::<f32>() / count)
            .collect();
        SampleBuffer::mono(mono, sample_rate)
    }
}
