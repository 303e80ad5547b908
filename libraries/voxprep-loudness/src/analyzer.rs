//! RMS and sample-peak measurement
//!
//! Both values are plain linear amplitudes. Use [`db_from_linear`] to express
//! them in dBFS.

use crate::SILENCE_FLOOR_DB;
use serde::Serialize;
use std::fmt;

/// Convert a dB value to linear amplitude
pub fn linear_from_db(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude to dB
///
/// Zero and negative amplitudes map to [`SILENCE_FLOOR_DB`] rather than
/// `-inf`/`NaN`.
pub fn db_from_linear(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        SILENCE_FLOOR_DB
    }
}

/// Loudness measurements of a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LoudnessStats {
    /// Root-mean-square amplitude (linear)
    pub rms: f32,
    /// Maximum absolute sample value (linear)
    pub peak: f32,
}

impl LoudnessStats {
    /// RMS level in dBFS
    pub fn rms_db(&self) -> f32 {
        db_from_linear(self.rms)
    }

    /// Peak level in dBFS
    pub fn peak_db(&self) -> f32 {
        db_from_linear(self.peak)
    }

    /// Peak-to-RMS ratio in dB
    pub fn crest_factor_db(&self) -> f32 {
        self.peak_db() - self.rms_db()
    }
}

impl fmt::Display for LoudnessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMS: {:.1} dBFS, Peak: {:.1} dBFS",
            self.rms_db(),
            self.peak_db()
        )
    }
}

/// Single-pass RMS/peak analyzer
pub struct LoudnessAnalyzer;

impl LoudnessAnalyzer {
    /// Measure RMS and peak over every sample
    ///
    /// An empty slice measures as silence (both values 0.0). The sum of
    /// squares accumulates in f64 so long recordings keep their precision.
    pub fn analyze(samples: &[f32]) -> LoudnessStats {
        if samples.is_empty() {
            return LoudnessStats::default();
        }

        let mut sum_squares = 0.0_f64;
        let mut peak = 0.0_f32;
        for &sample in samples {
            sum_squares += f64::from(sample) * f64::from(sample);
            peak = peak.max(sample.abs());
        }

        LoudnessStats {
            rms: (sum_squares / samples.len() as f64).sqrt() as f32,
            peak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert!((linear_from_db(0.0) - 1.0).abs() < 1e-6);
        assert!((linear_from_db(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_from_linear(0.5) - (-6.0206)).abs() < 1e-3);
        assert!((db_from_linear(linear_from_db(-13.5)) - (-13.5)).abs() < 1e-4);
    }

    #[test]
    fn non_positive_amplitudes_hit_the_floor() {
        assert_eq!(db_from_linear(0.0), SILENCE_FLOOR_DB);
        assert_eq!(db_from_linear(-0.5), SILENCE_FLOOR_DB);
    }

    #[test]
    fn constant_signal() {
        let stats = LoudnessAnalyzer::analyze(&[0.5, -0.5, 0.5, -0.5]);
        assert!((stats.rms - 0.5).abs() < 1e-6);
        assert_eq!(stats.peak, 0.5);
        assert!(stats.crest_factor_db().abs() < 1e-4);
    }

    #[test]
    fn sine_rms_is_peak_over_root_two() {
        let samples: Vec<f32> = (0..48_000)
            .map(|i| 0.8 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48_000.0).sin())
            .collect();
        let stats = LoudnessAnalyzer::analyze(&samples);

        assert!((stats.rms - 0.8 / 2.0_f32.sqrt()).abs() < 1e-3);
        assert!((stats.peak - 0.8).abs() < 1e-3);
        assert!((stats.crest_factor_db() - 3.01).abs() < 0.05);
    }

    #[test]
    fn empty_is_silence() {
        let stats = LoudnessAnalyzer::analyze(&[]);
        assert_eq!(stats, LoudnessStats::default());
        assert_eq!(stats.rms_db(), SILENCE_FLOOR_DB);
    }

    #[test]
    fn display() {
        let stats = LoudnessStats { rms: 0.1, peak: 1.0 };
        assert_eq!(stats.to_string(), "RMS: -20.0 dBFS, Peak: 0.0 dBFS");
    }
}
