//! End-to-end tests for the preparation pipeline with the Symphonia decoder
//!
//! Inputs are WAV files written in memory with hound, so the decoder, mixer,
//! normalizer and encoder all run for real.

use std::io::Cursor;
use voxprep_audio::{Pipeline, ProcessOutcome};
use voxprep_core::{AudioInput, NormalizationTarget, ValidationPolicy};
use voxprep_loudness::{db_from_linear, linear_from_db};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Write a 16-bit WAV with the same sine on every channel
fn sine_wav(sample_rate: u32, channels: u16, seconds: f32, amplitude: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let value = amplitude * (2.0 * std::f32::consts::PI * 220.0 * t).sin();
            let pcm = (value * 32767.0) as i16;
            for _ in 0..channels {
                writer.write_sample(pcm).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn read_output(bytes: &[u8]) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .map(|s| f32::from(s.unwrap()) / 32768.0)
        .collect();
    (spec, samples)
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

fn target() -> NormalizationTarget {
    NormalizationTarget::new(-20.0, -1.0).unwrap()
}

fn lenient_policy() -> ValidationPolicy {
    ValidationPolicy::new(1.0, 30.0, 1_000).unwrap()
}

// ============================================================================
// PROCESS
// ============================================================================

#[test]
fn stereo_recording_becomes_normalized_mono_wav() {
    let input = AudioInput::new(sine_wav(44_100, 2, 2.0, 0.05), "audio/wav");
    let mut pipeline = Pipeline::with_symphonia();

    let outcome = pipeline
        .process(&input, &target(), &lenient_policy())
        .unwrap();
    let prepared = outcome.into_prepared().expect("sample should pass validation");

    assert_eq!(prepared.audio.media_type(), "audio/wav");
    assert!(prepared.validation.valid);
    assert!((prepared.validation.duration_seconds - 2.0).abs() < 0.01);

    let report = &prepared.report;
    assert_eq!(report.source_channels, 2);
    assert_eq!(report.sample_rate, 44_100);
    assert!(!report.silence_guarded());
    assert!((report.output.rms_db() - (-20.0)).abs() < 0.1);

    let (spec, samples) = read_output(prepared.audio.bytes());
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples.len(), 88_200);
    assert!((db_from_linear(rms(&samples)) - (-20.0)).abs() < 0.1);
}

#[test]
fn sample_rate_is_never_changed() {
    for rate in [8_000, 16_000, 22_050, 48_000] {
        let input = AudioInput::new(sine_wav(rate, 1, 1.5, 0.3), "audio/wav");
        let outcome = Pipeline::with_symphonia()
            .process(&input, &target(), &lenient_policy())
            .unwrap();
        let prepared = outcome.into_prepared().unwrap();

        let (spec, _) = read_output(prepared.audio.bytes());
        assert_eq!(spec.sample_rate, rate);
    }
}

#[test]
fn hot_recording_stays_under_peak_limit() {
    let input = AudioInput::new(sine_wav(16_000, 1, 2.0, 0.99), "audio/wav");
    let target = NormalizationTarget::new(-3.0, -1.0).unwrap();

    let prepared = Pipeline::with_symphonia()
        .process(&input, &target, &lenient_policy())
        .unwrap()
        .into_prepared()
        .unwrap();

    let ceiling = linear_from_db(-1.0) + 1.0 / 32768.0;
    let (_, samples) = read_output(prepared.audio.bytes());
    assert!(samples.iter().all(|s| s.abs() <= ceiling));
    assert!(prepared.report.output.peak <= linear_from_db(-1.0));
}

#[test]
fn silent_recording_is_left_alone() {
    let input = AudioInput::new(sine_wav(16_000, 1, 2.0, 0.0), "audio/wav");
    let prepared = Pipeline::with_symphonia()
        .process(&input, &target(), &lenient_policy())
        .unwrap()
        .into_prepared()
        .unwrap();

    assert!(prepared.report.silence_guarded());
    assert_eq!(prepared.report.integrated_lufs, None);
    let (_, samples) = read_output(prepared.audio.bytes());
    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
fn integrated_loudness_is_reported() {
    let input = AudioInput::new(sine_wav(48_000, 1, 3.0, 0.2), "audio/wav");
    let prepared = Pipeline::with_symphonia()
        .process(&input, &target(), &lenient_policy())
        .unwrap()
        .into_prepared()
        .unwrap();

    let lufs = prepared.report.integrated_lufs.expect("3 s of tone is measurable");
    assert!(lufs > -30.0 && lufs < -15.0, "got {lufs:.1} LUFS");

    let unmeasured = Pipeline::with_symphonia()
        .with_integrated_loudness(false)
        .process(&input, &target(), &lenient_policy())
        .unwrap()
        .into_prepared()
        .unwrap();
    assert_eq!(unmeasured.report.integrated_lufs, None);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn short_recording_is_rejected_after_decode() {
    let input = AudioInput::new(sine_wav(16_000, 1, 2.0, 0.3), "audio/wav");
    let policy = ValidationPolicy::new(60.0, 600.0, 1_000).unwrap();

    let outcome = Pipeline::with_symphonia()
        .process(&input, &target(), &policy)
        .unwrap();

    let ProcessOutcome::Rejected(result) = outcome else {
        panic!("expected rejection");
    };
    assert!((result.duration_seconds - 2.0).abs() < 0.01);
    assert!(result.message.unwrap().contains("60"));
}

#[test]
fn long_recording_is_rejected() {
    let input = AudioInput::new(sine_wav(8_000, 1, 4.0, 0.3), "audio/wav");
    let policy = ValidationPolicy::new(0.5, 3.0, 0).unwrap();

    let result = Pipeline::with_symphonia()
        .validate(&input, &policy)
        .unwrap();
    assert!(!result.valid);
    assert!(result.message.unwrap().contains("too long"));
}

#[test]
fn validate_accepts_in_range_recording() {
    let input = AudioInput::new(sine_wav(16_000, 2, 5.0, 0.3), "audio/wav");
    let result = Pipeline::with_symphonia()
        .validate(&input, &lenient_policy())
        .unwrap();

    assert!(result.valid);
    assert!((result.duration_seconds - 5.0).abs() < 0.01);
}

// ============================================================================
// ANALYZE
// ============================================================================

#[test]
fn analyze_reports_source_levels() {
    let input = AudioInput::new(sine_wav(22_050, 2, 1.0, 0.5), "audio/wav");
    let report = Pipeline::with_symphonia().analyze(&input).unwrap();

    assert_eq!(report.source_channels, 2);
    assert_eq!(report.sample_rate, 22_050);
    assert!((report.stats.peak - 0.5).abs() < 0.01);
    assert!((report.stats.crest_factor_db() - 3.01).abs() < 0.1);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn corrupt_blob_is_a_decode_error() {
    let input = AudioInput::new(vec![0xA5; 4_096], "audio/mpeg");
    let err = Pipeline::with_symphonia()
        .process(&input, &target(), &lenient_policy())
        .unwrap_err();
    assert!(err.is_decode_failure(), "unexpected error: {err}");
}
