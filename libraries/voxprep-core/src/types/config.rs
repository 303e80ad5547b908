/// Caller-supplied processing targets and acceptance bounds
use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};

/// Fraction of the peak limit where the soft knee begins
pub const DEFAULT_KNEE_THRESHOLD: f32 = 0.85;

/// Steepness of the exponential knee curve
pub const DEFAULT_KNEE_RATIO: f32 = 4.0;

/// Loudness goal for normalization, in dBFS
///
/// `peak_limit_db` should sit at or above `target_rms_db` for the RMS target to
/// be reachable; when it is not, peak safety wins and the RMS lands below
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationTarget {
    target_rms_db: f32,
    peak_limit_db: f32,
}

impl NormalizationTarget {
    /// Create a validated target
    pub fn new(target_rms_db: f32, peak_limit_db: f32) -> Result<Self> {
        let target = Self {
            target_rms_db,
            peak_limit_db,
        };
        target.validate()?;
        Ok(target)
    }

    /// Target RMS level in dBFS
    pub fn target_rms_db(&self) -> f32 {
        self.target_rms_db
    }

    /// Peak ceiling in dBFS
    pub fn peak_limit_db(&self) -> f32 {
        self.peak_limit_db
    }

    /// Validate a target (needed after deserializing)
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("target_rms_db", self.target_rms_db),
            ("peak_limit_db", self.peak_limit_db),
        ] {
            if !value.is_finite() || value > 0.0 {
                return Err(PrepError::invalid_config(format!(
                    "{name} must be a finite value <= 0 dB, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Shape of the soft-knee compression curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftKnee {
    #[serde(default = "default_threshold")]
    threshold: f32,
    #[serde(default = "default_ratio")]
    ratio: f32,
}

impl SoftKnee {
    /// Create a validated knee
    ///
    /// # Arguments
    /// * `threshold` - Knee start as a fraction of the peak limit (0.0-1.0, exclusive)
    /// * `ratio` - Exponential steepness of the curve above the knee
    pub fn new(threshold: f32, ratio: f32) -> Result<Self> {
        let knee = Self { threshold, ratio };
        knee.validate()?;
        Ok(knee)
    }

    /// Knee start as a fraction of the peak limit
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Exponential steepness
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Validate a knee (needed after deserializing)
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(PrepError::invalid_config(format!(
                "knee threshold must be between 0 and 1 (exclusive), got {}",
                self.threshold
            )));
        }
        if !self.ratio.is_finite() || self.ratio <= 0.0 {
            return Err(PrepError::invalid_config(format!(
                "knee ratio must be a positive finite value, got {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

impl Default for SoftKnee {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_KNEE_THRESHOLD,
            ratio: DEFAULT_KNEE_RATIO,
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_KNEE_THRESHOLD
}

fn default_ratio() -> f32 {
    DEFAULT_KNEE_RATIO
}

/// Size and duration bounds a sample must satisfy
///
/// These vary per downstream cloning provider and are always supplied by the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    min_duration_seconds: f64,
    max_duration_seconds: f64,
    min_size_bytes: u64,
}

impl ValidationPolicy {
    /// Create a validated policy
    pub fn new(
        min_duration_seconds: f64,
        max_duration_seconds: f64,
        min_size_bytes: u64,
    ) -> Result<Self> {
        let policy = Self {
            min_duration_seconds,
            max_duration_seconds,
            min_size_bytes,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Shortest accepted duration in seconds
    pub fn min_duration_seconds(&self) -> f64 {
        self.min_duration_seconds
    }

    /// Longest accepted duration in seconds
    pub fn max_duration_seconds(&self) -> f64 {
        self.max_duration_seconds
    }

    /// Smallest accepted blob size in bytes
    pub fn min_size_bytes(&self) -> u64 {
        self.min_size_bytes
    }

    /// Validate a policy (needed after deserializing)
    pub fn validate(&self) -> Result<()> {
        if !self.min_duration_seconds.is_finite() || self.min_duration_seconds < 0.0 {
            return Err(PrepError::invalid_config(format!(
                "min_duration_seconds must be a finite value >= 0, got {}",
                self.min_duration_seconds
            )));
        }
        if !self.max_duration_seconds.is_finite() {
            return Err(PrepError::invalid_config(
                "max_duration_seconds must be finite",
            ));
        }
        if self.min_duration_seconds > self.max_duration_seconds {
            return Err(PrepError::invalid_config(format!(
                "min_duration_seconds ({}) exceeds max_duration_seconds ({})",
                self.min_duration_seconds, self.max_duration_seconds
            )));
        }
        Ok(())
    }
}
