//! EBU R128 integrated loudness metering
//!
//! Used for reporting only; normalization itself targets RMS. Measures:
//! - Integrated loudness (LUFS) - the gated, K-weighted loudness of the take
//! - Sample peak (dBFS) - the maximum sample value

use crate::error::{LoudnessError, Result};
use ebur128::{EbuR128, Mode};

/// EBU R128 loudness meter
///
/// # Example
///
/// ```ignore
/// use voxprep_loudness::IntegratedLoudnessMeter;
///
/// let mut meter = IntegratedLoudnessMeter::new(48000, 1)?;
/// meter.add_frames(&samples)?;
/// if let Some(lufs) = meter.integrated_lufs()? {
///     println!("Integrated loudness: {:.1} LUFS", lufs);
/// }
/// ```
pub struct IntegratedLoudnessMeter {
    ebur128: EbuR128,
    channels: u32,
    samples_processed: usize,
}

impl IntegratedLoudnessMeter {
    /// Create a new meter
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz (8000-384000)
    /// * `channels` - Number of interleaved channels
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        if !(8000..=384000).contains(&sample_rate) {
            return Err(LoudnessError::InvalidSampleRate(sample_rate));
        }

        let ebur128 = EbuR128::new(channels, sample_rate, Mode::I | Mode::SAMPLE_PEAK)?;

        Ok(Self {
            ebur128,
            channels,
            samples_processed: 0,
        })
    }

    /// Measure a whole buffer in one call
    ///
    /// Returns `Ok(None)` when the gate rejects every block (silence, or a
    /// take shorter than one 400 ms block).
    pub fn measure(samples: &[f32], sample_rate: u32, channels: u32) -> Result<Option<f64>> {
        let mut meter = Self::new(sample_rate, channels)?;
        meter.add_frames(samples)?;
        meter.integrated_lufs()
    }

    /// Add interleaved f32 frames
    pub fn add_frames(&mut self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        if samples.len() % self.channels as usize != 0 {
            return Err(LoudnessError::AnalysisError(format!(
                "Sample count {} is not divisible by channel count {}",
                samples.len(),
                self.channels
            )));
        }

        self.ebur128.add_frames_f32(samples)?;
        self.samples_processed += samples.len();

        Ok(())
    }

    /// Integrated loudness in LUFS, or `None` if nothing passed the gate
    pub fn integrated_lufs(&self) -> Result<Option<f64>> {
        if self.samples_processed == 0 {
            return Err(LoudnessError::NoSamples);
        }

        let lufs = self.ebur128.loudness_global()?;
        Ok(lufs.is_finite().then_some(lufs))
    }

    /// Highest sample peak across channels, in dBFS
    pub fn sample_peak_dbfs(&self) -> Result<f64> {
        let mut peak = 0.0_f64;
        for ch in 0..self.channels {
            peak = peak.max(self.ebur128.sample_peak(ch)?);
        }

        Ok(if peak > 0.0 {
            20.0 * peak.log10()
        } else {
            -f64::INFINITY
        })
    }

    /// Get the number of samples processed
    pub fn samples_processed(&self) -> usize {
        self.samples_processed
    }
}
