//! End-to-end tests for the `voxprep` binary
//!
//! Each test runs in its own temp directory with its own config file, so a
//! `voxprep.toml` in the working tree never leaks in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG: &str = r#"
integrated_loudness = true

[profiles.test.target]
target_rms_db = -20.0
peak_limit_db = -1.0

[profiles.test.policy]
min_duration_seconds = 1.0
max_duration_seconds = 10.0
min_size_bytes = 1000
"#;

// ========== Helper Functions ==========

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("test.toml");
    std::fs::write(&config, CONFIG).unwrap();
    (dir, config)
}

/// Write a stereo 16-bit sine recording
fn write_recording(path: &Path, seconds: f32, amplitude: f32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (seconds * 16_000.0) as usize;
    for i in 0..frames {
        let t = i as f32 / 16_000.0;
        let value = (amplitude * (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 32767.0) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

fn voxprep(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_voxprep"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ========== Subcommands ==========

#[test]
fn profiles_lists_configured_profiles() {
    let (dir, config) = workspace();
    let output = voxprep(dir.path(), &["--config", config.to_str().unwrap(), "profiles"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("test - target -20.0 dBFS RMS"));
}

#[test]
fn process_writes_normalized_mono_wav() {
    let (dir, config) = workspace();
    let input = dir.path().join("take.wav");
    let out = dir.path().join("prepared.wav");
    write_recording(&input, 2.0, 0.05);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--json",
            "process",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-p",
            "test",
        ],
    );
    assert!(output.status.success(), "{:?}", output);

    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(summary["validation"]["valid"], true);
    assert_eq!(summary["report"]["source_channels"], 2);
    let rms = summary["report"]["output"]["rms"].as_f64().unwrap();
    assert!((rms - 0.1).abs() < 0.002, "output rms {rms}");

    let reader = hound::WavReader::open(&out).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 32_000);
}

#[test]
fn process_rejects_short_recording() {
    let (dir, config) = workspace();
    let input = dir.path().join("short.wav");
    let out = dir.path().join("prepared.wav");
    write_recording(&input, 0.5, 0.1);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "process",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-p",
            "test",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("too short"));
    assert!(!out.exists());
}

#[test]
fn validate_accepts_recording_in_bounds() {
    let (dir, config) = workspace();
    let input = dir.path().join("take.wav");
    write_recording(&input, 3.0, 0.1);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "validate",
            input.to_str().unwrap(),
            "-p",
            "test",
        ],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("accepted (3.0s)"));
}

#[test]
fn analyze_reports_levels_as_json() {
    let (dir, config) = workspace();
    let input = dir.path().join("take.wav");
    write_recording(&input, 1.0, 0.5);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--json",
            "analyze",
            input.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let peak = report["stats"]["peak"].as_f64().unwrap();
    assert!((peak - 0.5).abs() < 0.01, "peak {peak}");
    assert_eq!(report["sample_rate"], 16_000);
}

// ========== Failures ==========

#[test]
fn unknown_profile_fails() {
    let (dir, config) = workspace();
    let input = dir.path().join("take.wav");
    write_recording(&input, 2.0, 0.1);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "validate",
            input.to_str().unwrap(),
            "-p",
            "missing",
        ],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown profile 'missing'"));
}

#[test]
fn undecodable_input_fails() {
    let (dir, config) = workspace();
    let input = dir.path().join("noise.wav");
    std::fs::write(&input, vec![0x5a; 4096]).unwrap();

    let output = voxprep(
        dir.path(),
        &["--config", config.to_str().unwrap(), "analyze", input.to_str().unwrap()],
    );

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn profile_lookup_ignores_case() {
    let (dir, config) = workspace();
    let input = dir.path().join("take.wav");
    write_recording(&input, 2.0, 0.1);

    let output = voxprep(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "validate",
            input.to_str().unwrap(),
            "-p",
            "TEST",
        ],
    );

    assert!(output.status.success(), "{:?}", output);
}
