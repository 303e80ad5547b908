//! Domain types for Voxprep

mod audio;
mod config;

pub use audio::{AudioInput, EncodedAudio, SampleBuffer, WAV_MEDIA_TYPE};
pub use config::{
    NormalizationTarget, SoftKnee, ValidationPolicy, DEFAULT_KNEE_RATIO, DEFAULT_KNEE_THRESHOLD,
};
