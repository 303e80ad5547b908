//! Preparation pipeline
//!
//! ```text
//! blob ─► size check ─► decode ─► mix ─► empty check ─► duration check
//!                                                            │
//!                         EncodedAudio ◄─ encode ◄─ normalize ◄┘
//! ```
//!
//! A failed size or duration check ends the run with
//! [`ProcessOutcome::Rejected`]; decode failures, empty decodes and encoder
//! invariant violations are errors.

use crate::decoder::SymphoniaDecoder;
use crate::encoder::WavEncoder;
use crate::mixer::ChannelMixer;
use serde::Serialize;
use tracing::Dispatch;
use voxprep_core::{
    AudioDecoder, AudioInput, DurationValidator, EncodedAudio, NormalizationTarget, PrepError,
    Result, SampleBuffer, SoftKnee, ValidationPolicy, ValidationResult,
};
use voxprep_loudness::{IntegratedLoudnessMeter, LoudnessAnalyzer, LoudnessStats, Normalizer};

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The sample passed validation and was encoded
    Ready(PreparedSample),
    /// The sample was turned away by the validation policy
    Rejected(ValidationResult),
}

impl ProcessOutcome {
    /// The validation result, whichever way the run ended
    pub fn validation(&self) -> &ValidationResult {
        match self {
            Self::Ready(sample) => &sample.validation,
            Self::Rejected(result) => result,
        }
    }

    /// The prepared sample, if any
    pub fn into_prepared(self) -> Option<PreparedSample> {
        match self {
            Self::Ready(sample) => Some(sample),
            Self::Rejected(_) => None,
        }
    }
}

/// An encoded sample with its validation result and measurements
#[derive(Debug, Clone)]
pub struct PreparedSample {
    /// Mono 16-bit PCM WAV
    pub audio: EncodedAudio,
    /// The passing validation result
    pub validation: ValidationResult,
    /// What the pipeline measured and applied
    pub report: ProcessingReport,
}

/// Measurements taken while preparing a sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingReport {
    /// Channel count of the decoded source
    pub source_channels: u16,
    /// Sample rate of the source and of the output
    pub sample_rate: u32,
    /// Duration of the mono signal in seconds
    pub duration_seconds: f64,
    /// Loudness of the mono mix before normalization
    pub input: LoudnessStats,
    /// Loudness after normalization
    pub output: LoudnessStats,
    /// Applied gain in dB, `None` when the silence guard left the signal alone
    pub gain_db: Option<f32>,
    /// EBU R128 integrated loudness of the output, when measurable
    pub integrated_lufs: Option<f64>,
}

impl ProcessingReport {
    /// Whether normalization was skipped because the input was near silent
    pub fn silence_guarded(&self) -> bool {
        self.gain_db.is_none()
    }
}

/// Loudness of a decoded sample, without any processing applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Channel count of the decoded source
    pub source_channels: u16,
    /// Sample rate of the source
    pub sample_rate: u32,
    /// Duration of the mono signal in seconds
    pub duration_seconds: f64,
    /// RMS and peak of the mono mix
    pub stats: LoudnessStats,
    /// EBU R128 integrated loudness of the mono mix, when measurable
    pub integrated_lufs: Option<f64>,
}

/// Decode → mix → normalize → encode orchestrator
///
/// Targets and policies are passed per call; the pipeline itself only holds
/// the decode backend, the knee shape and logging setup. Each call works on
/// its own buffers, so separate pipelines can run on separate threads.
pub struct Pipeline<D: AudioDecoder> {
    decoder: D,
    knee: SoftKnee,
    measure_integrated: bool,
    dispatch: Option<Dispatch>,
}

impl Pipeline<SymphoniaDecoder> {
    /// Pipeline backed by the Symphonia decoder
    pub fn with_symphonia() -> Self {
        Self::new(SymphoniaDecoder::new())
    }
}

impl<D: AudioDecoder> Pipeline<D> {
    /// Create a pipeline around a decode backend
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            knee: SoftKnee::default(),
            measure_integrated: true,
            dispatch: None,
        }
    }

    /// Override the soft-knee shape
    pub fn with_knee(mut self, knee: SoftKnee) -> Self {
        self.knee = knee;
        self
    }

    /// Enable or disable EBU R128 measurement in reports
    pub fn with_integrated_loudness(mut self, enabled: bool) -> Self {
        self.measure_integrated = enabled;
        self
    }

    /// Route this pipeline's diagnostics to `dispatch` instead of the
    /// caller's current subscriber
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// The decode backend
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Knee shape used for normalization
    pub fn knee(&self) -> SoftKnee {
        self.knee
    }

    /// Validate, decode, downmix, normalize and encode a recording
    pub fn process(
        &mut self,
        input: &AudioInput,
        target: &NormalizationTarget,
        policy: &ValidationPolicy,
    ) -> Result<ProcessOutcome> {
        self.scoped(|pipeline| pipeline.run_process(input, target, policy))
    }

    /// Size- and duration-check a recording without encoding it
    pub fn validate(
        &mut self,
        input: &AudioInput,
        policy: &ValidationPolicy,
    ) -> Result<ValidationResult> {
        self.scoped(|pipeline| {
            if let Some(rejection) = DurationValidator::check_size(&input.data, policy) {
                return Ok(rejection);
            }
            let (mono, _) = pipeline.decode_mono(input)?;
            Ok(DurationValidator::validate(
                &input.data,
                mono.duration_secs(),
                policy,
            ))
        })
    }

    /// Decode and downmix a recording, then measure it
    pub fn analyze(&mut self, input: &AudioInput) -> Result<AnalysisReport> {
        self.scoped(|pipeline| {
            let (mono, source_channels) = pipeline.decode_mono(input)?;
            Ok(AnalysisReport {
                source_channels,
                sample_rate: mono.sample_rate(),
                duration_seconds: mono.duration_secs(),
                stats: LoudnessAnalyzer::analyze(mono.samples()),
                integrated_lufs: pipeline.integrated_lufs(&mono),
            })
        })
    }

    fn run_process(
        &mut self,
        input: &AudioInput,
        target: &NormalizationTarget,
        policy: &ValidationPolicy,
    ) -> Result<ProcessOutcome> {
        if let Some(rejection) = DurationValidator::check_size(&input.data, policy) {
            tracing::info!(bytes = input.byte_len(), "Sample rejected before decode");
            return Ok(ProcessOutcome::Rejected(rejection));
        }

        let (mono, source_channels) = self.decode_mono(input)?;
        let duration_seconds = mono.duration_secs();

        let validation = DurationValidator::validate(&input.data, duration_seconds, policy);
        if !validation.valid {
            tracing::info!(duration_seconds, "Sample rejected by duration policy");
            return Ok(ProcessOutcome::Rejected(validation));
        }

        let normalizer = Normalizer::with_knee(*target, self.knee);
        let input_stats = LoudnessAnalyzer::analyze(mono.samples());
        let gain_db = normalizer
            .gain_for(&input_stats)
            .map(|gain| 20.0 * gain.log10());

        let normalized = normalizer.normalize(mono);
        let output_stats = LoudnessAnalyzer::analyze(normalized.samples());
        let integrated_lufs = self.integrated_lufs(&normalized);

        let audio = WavEncoder::encode(&normalized)?;

        tracing::info!(
            sample_rate = normalized.sample_rate(),
            duration_seconds,
            output_rms_db = output_stats.rms_db(),
            output_peak_db = output_stats.peak_db(),
            bytes = audio.len(),
            "Sample prepared"
        );

        Ok(ProcessOutcome::Ready(PreparedSample {
            audio,
            validation,
            report: ProcessingReport {
                source_channels,
                sample_rate: normalized.sample_rate(),
                duration_seconds,
                input: input_stats,
                output: output_stats,
                gain_db,
                integrated_lufs,
            },
        }))
    }

    /// Decode and downmix, returning the mono buffer and source channel count
    fn decode_mono(&mut self, input: &AudioInput) -> Result<(SampleBuffer, u16)> {
        if let Some(media_type) = input.media_type.as_deref() {
            if !self.decoder.supports_media_type(media_type) {
                tracing::warn!(media_type, "Declared media type is not decodable, probing anyway");
            }
        }

        let decoded = self
            .decoder
            .decode(&input.data, input.media_type.as_deref())?;
        let source_channels = decoded.channels();

        if decoded.sample_rate() == 0 {
            return Err(PrepError::decode("decoder reported a zero sample rate"));
        }

        let mono = ChannelMixer::mix(decoded);
        if mono.is_empty() {
            return Err(PrepError::EmptyBuffer);
        }

        tracing::debug!(
            source_channels,
            sample_rate = mono.sample_rate(),
            frames = mono.len(),
            "Decoded and downmixed sample"
        );

        Ok((mono, source_channels))
    }

    fn integrated_lufs(&self, mono: &SampleBuffer) -> Option<f64> {
        if !self.measure_integrated {
            return None;
        }
        match IntegratedLoudnessMeter::measure(mono.samples(), mono.sample_rate(), 1) {
            Ok(lufs) => lufs,
            Err(e) => {
                tracing::debug!("Skipping integrated loudness: {}", e);
                None
            }
        }
    }

    /// Run `f` with this pipeline's dispatcher as the default, if one was set
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        match self.dispatch.clone() {
            Some(dispatch) => tracing::dispatcher::with_default(&dispatch, || f(self)),
            None => f(self),
        }
    }
}

impl Default for Pipeline<SymphoniaDecoder> {
    fn default() -> Self {
        Self::with_symphonia()
    }
}
