//! Voxprep Core
//!
//! Platform-agnostic types, traits, and error handling shared by every stage
//! of the voice-sample preparation pipeline.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `SampleBuffer`, `NormalizationTarget`, `SoftKnee`,
//!   `ValidationPolicy`, `EncodedAudio`, `AudioInput`
//! - **Core Traits**: `AudioDecoder`, the swappable decode backend
//! - **Validation**: `DurationValidator` and its `ValidationResult`
//! - **Error Handling**: Unified `PrepError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use voxprep_core::{DurationValidator, ValidationPolicy};
//!
//! let policy = ValidationPolicy::new(10.0, 120.0, 20_000).unwrap();
//! let blob = vec![0_u8; 48_000];
//!
//! let result = DurationValidator::validate(&blob, 30.0, &policy);
//! assert!(result.valid);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{PrepError, Result};
pub use traits::AudioDecoder;
pub use types::{
    AudioInput, EncodedAudio, NormalizationTarget, SampleBuffer, SoftKnee, ValidationPolicy,
    DEFAULT_KNEE_RATIO, DEFAULT_KNEE_THRESHOLD, WAV_MEDIA_TYPE,
};
pub use validation::{DurationValidator, ValidationResult};
