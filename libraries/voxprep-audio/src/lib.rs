//! Voxprep Audio
//!
//! Turns an arbitrary recorded sample into a normalized, mono, 16-bit PCM WAV
//! ready for a voice-cloning backend.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, AAC/M4A, FLAC, OGG/Vorbis, WAV, MKV)
//! - Mono downmix by per-frame channel averaging
//! - Canonical 44-byte-header WAV encoding
//! - The `Pipeline` orchestrator that validates, decodes, mixes, normalizes
//!   and encodes
//!
//! # Example
//!
//! ```rust,no_run
//! use voxprep_audio::{Pipeline, ProcessOutcome};
//! use voxprep_core::{AudioInput, NormalizationTarget, ValidationPolicy};
//!
//! # fn example(recording: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = Pipeline::with_symphonia();
//! let target = NormalizationTarget::new(-20.0, -1.0)?;
//! let policy = ValidationPolicy::new(10.0, 300.0, 20_000)?;
//!
//! match pipeline.process(&AudioInput::new(recording, "audio/mpeg"), &target, &policy)? {
//!     ProcessOutcome::Ready(sample) => {
//!         std::fs::write("voice.wav", sample.audio.bytes())?;
//!     }
//!     ProcessOutcome::Rejected(result) => {
//!         println!("{}", result);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod decoder;
mod encoder;
mod error;
mod mixer;
mod pipeline;

pub use decoder::SymphoniaDecoder;
pub use encoder::{quantize, WavEncoder, WAV_HEADER_LEN};
pub use error::{AudioError, Result};
pub use mixer::ChannelMixer;
pub use pipeline::{AnalysisReport, Pipeline, PreparedSample, ProcessOutcome, ProcessingReport};
