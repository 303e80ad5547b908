//! RMS-target normalization with a peak ceiling
//!
//! Gain is chosen to hit the target RMS unless that would push the peak past
//! the limit, in which case the peak limit decides the gain. The gained signal
//! then runs through an exponential soft knee and a hard clamp at the limit.

use crate::analyzer::{linear_from_db, LoudnessAnalyzer, LoudnessStats};
use crate::SILENCE_RMS_THRESHOLD;
use voxprep_core::{NormalizationTarget, SampleBuffer, SoftKnee};

/// Peak-limited RMS normalizer
///
/// # Example
///
/// ```rust
/// use voxprep_core::{NormalizationTarget, SampleBuffer, SoftKnee};
/// use voxprep_loudness::Normalizer;
///
/// let target = NormalizationTarget::new(-18.0, -1.0).unwrap();
/// let normalizer = Normalizer::with_knee(target, SoftKnee::new(0.8, 3.0).unwrap());
///
/// let buffer = SampleBuffer::mono(vec![0.2, -0.4, 0.3], 22_050);
/// let normalized = normalizer.normalize(buffer);
/// assert_eq!(normalized.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    target: NormalizationTarget,
    knee: SoftKnee,
}

impl Normalizer {
    /// Create a normalizer with the default knee (0.85 x limit, ratio 4)
    pub fn new(target: NormalizationTarget) -> Self {
        Self::with_knee(target, SoftKnee::default())
    }

    /// Create a normalizer with a custom knee
    pub fn with_knee(target: NormalizationTarget, knee: SoftKnee) -> Self {
        Self { target, knee }
    }

    /// Loudness target
    pub fn target(&self) -> NormalizationTarget {
        self.target
    }

    /// Knee shape
    pub fn knee(&self) -> SoftKnee {
        self.knee
    }

    /// Linear gain the normalizer would apply for the given measurements
    ///
    /// Returns `None` when the RMS is below [`SILENCE_RMS_THRESHOLD`]; such
    /// buffers are passed through untouched.
    pub fn gain_for(&self, stats: &LoudnessStats) -> Option<f32> {
        if stats.rms < SILENCE_RMS_THRESHOLD {
            return None;
        }

        let target_rms = linear_from_db(self.target.target_rms_db());
        let peak_limit = linear_from_db(self.target.peak_limit_db());

        let mut gain = target_rms / stats.rms;
        if stats.peak * gain > peak_limit {
            gain = peak_limit / stats.peak;
        }
        Some(gain)
    }

    /// Normalize a buffer, keeping its length, rate and channel count
    pub fn normalize(&self, buffer: SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let channels = buffer.channels();
        SampleBuffer::new(
            self.normalize_samples(buffer.into_samples()),
            sample_rate,
            channels,
        )
    }

    /// Normalize raw samples
    pub fn normalize_samples(&self, mut samples: Vec<f32>) -> Vec<f32> {
        let stats = LoudnessAnalyzer::analyze(&samples);
        let Some(gain) = self.gain_for(&stats) else {
            tracing::debug!(rms = stats.rms, "Silence guard hit, leaving samples unchanged");
            return samples;
        };

        let peak_limit = linear_from_db(self.target.peak_limit_db());
        let knee_start = peak_limit * self.knee.threshold();
        let knee_range = peak_limit - knee_start;
        let ratio = self.knee.ratio();

        for sample in &mut samples {
            let gained = *sample * gain;
            let abs = gained.abs();

            let shaped = if abs > knee_start {
                let excess = abs - knee_start;
                let compressed = knee_range * (1.0 - (-excess / knee_range * ratio).exp());
                (knee_start + compressed).copysign(gained)
            } else {
                gained
            };

            *sample = shaped.clamp(-peak_limit, peak_limit);
        }

        tracing::debug!(
            input_rms_db = stats.rms_db(),
            input_peak_db = stats.peak_db(),
            gain_db = 20.0 * gain.log10(),
            "Normalized samples"
        );

        samples
    }
}
