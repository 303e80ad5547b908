//! Loudness analysis and normalization for Voxprep
//!
//! This crate provides:
//! - RMS and sample-peak measurement of a buffer
//! - dB / linear amplitude conversions
//! - RMS-target normalization with a peak ceiling and soft-knee compression
//! - EBU R128 integrated loudness metering for reports
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Mono Buffer │ ──► │  Analyzer    │ ──► │ LoudnessStats │
//! └─────────────┘     └──────────────┘     └───────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐     ┌───────────────┐
//!                     │ Gain + Clamp │ ──► │  Soft Knee    │
//!                     └──────────────┘     └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use voxprep_core::{NormalizationTarget, SampleBuffer};
//! use voxprep_loudness::{linear_from_db, Normalizer};
//!
//! let target = NormalizationTarget::new(-20.0, -1.0).unwrap();
//! let normalizer = Normalizer::new(target);
//!
//! let quiet = SampleBuffer::mono(vec![0.01, -0.02, 0.015, -0.01], 16_000);
//! let loud = normalizer.normalize(quiet);
//!
//! let ceiling = linear_from_db(-1.0);
//! assert!(loud.samples().iter().all(|s| s.abs() <= ceiling));
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod error;
mod meter;
mod normalizer;

pub use analyzer::{db_from_linear, linear_from_db, LoudnessAnalyzer, LoudnessStats};
pub use error::{LoudnessError, Result};
pub use meter::IntegratedLoudnessMeter;
pub use normalizer::Normalizer;

/// Level reported for zero or negative amplitudes, in dB
pub const SILENCE_FLOOR_DB: f32 = -100.0;

/// RMS below which a buffer is treated as silence and left untouched
pub const SILENCE_RMS_THRESHOLD: f32 = 1e-4;
