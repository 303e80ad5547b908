/// Voxprep - voice-sample preparation CLI
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxprep_audio::{AnalysisReport, Pipeline, ProcessOutcome, ProcessingReport, SymphoniaDecoder};
use voxprep_core::{AudioInput, ValidationResult};

mod config;

use crate::config::VoxprepConfig;

/// Exit status for a recording turned away by its profile's policy
const EXIT_REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "voxprep")]
#[command(about = "Prepare voice recordings for cloning and transcription", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./voxprep.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, normalize and encode a recording to mono 16-bit WAV
    Process {
        /// Recording to prepare
        input: PathBuf,
        /// Where to write the WAV file
        #[arg(short, long)]
        output: PathBuf,
        /// Profile supplying the loudness target and validation policy
        #[arg(short, long)]
        profile: String,
        /// Media type of the input (guessed from the extension otherwise)
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Check a recording against a profile's size and duration bounds
    Validate {
        /// Recording to check
        input: PathBuf,
        /// Profile supplying the validation policy
        #[arg(short, long)]
        profile: String,
        /// Media type of the input (guessed from the extension otherwise)
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Measure the loudness of a recording without changing it
    Analyze {
        /// Recording to measure
        input: PathBuf,
        /// Media type of the input (guessed from the extension otherwise)
        #[arg(long)]
        media_type: Option<String>,
    },
    /// List configured profiles
    Profiles,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = VoxprepConfig::load(cli.config.as_deref())?;
    let mut pipeline = Pipeline::with_symphonia()
        .with_knee(config.knee())
        .with_integrated_loudness(config.integrated_loudness);

    match cli.command {
        Commands::Process {
            input,
            output,
            profile,
            media_type,
        } => process(
            &mut pipeline,
            &config,
            &input,
            &output,
            &profile,
            media_type,
            cli.json,
        ),
        Commands::Validate {
            input,
            profile,
            media_type,
        } => validate(&mut pipeline, &config, &input, &profile, media_type, cli.json),
        Commands::Analyze { input, media_type } => {
            analyze(&mut pipeline, &input, media_type, cli.json)
        }
        Commands::Profiles => profiles(&config, cli.json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => Some("voxprep=error"),
        (false, 0) => None,
        (false, 1) => Some("voxprep=debug"),
        (false, _) => Some("voxprep=trace"),
    };

    // Explicit flags win over RUST_LOG
    let filter = match filter {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "voxprep=info".into()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read a recording, taking its media type from the flag or the file extension
fn read_input(path: &Path, media_type: Option<String>) -> anyhow::Result<AudioInput> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let media_type = media_type.or_else(|| {
        mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    });

    tracing::debug!(
        path = %path.display(),
        bytes = data.len(),
        media_type = media_type.as_deref().unwrap_or("unknown"),
        "Read input"
    );

    Ok(AudioInput { data, media_type })
}

#[derive(Serialize)]
struct ProcessSummary<'a> {
    output: Option<&'a Path>,
    validation: &'a ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ProcessingReport>,
}

fn process(
    pipeline: &mut Pipeline<SymphoniaDecoder>,
    config: &VoxprepConfig,
    input: &Path,
    output: &Path,
    profile: &str,
    media_type: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let profile = config.profile(profile)?;
    let audio_input = read_input(input, media_type)?;

    let outcome = pipeline
        .process(&audio_input, &profile.target, &profile.policy)
        .with_context(|| format!("Failed to prepare {}", input.display()))?;

    match outcome {
        ProcessOutcome::Ready(prepared) => {
            fs::write(output, prepared.audio.bytes())
                .with_context(|| format!("Failed to write {}", output.display()))?;

            if json {
                print_json(&ProcessSummary {
                    output: Some(output),
                    validation: &prepared.validation,
                    report: Some(&prepared.report),
                })?;
            } else {
                println!("Prepared {} -> {}", input.display(), output.display());
                print_processing_report(&prepared.report);
            }
            Ok(ExitCode::SUCCESS)
        }
        ProcessOutcome::Rejected(validation) => {
            if json {
                print_json(&ProcessSummary {
                    output: None,
                    validation: &validation,
                    report: None,
                })?;
            } else {
                println!("{}: {}", input.display(), validation);
            }
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}

fn validate(
    pipeline: &mut Pipeline<SymphoniaDecoder>,
    config: &VoxprepConfig,
    input: &Path,
    profile: &str,
    media_type: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let profile = config.profile(profile)?;
    let audio_input = read_input(input, media_type)?;

    let result = pipeline
        .validate(&audio_input, &profile.policy)
        .with_context(|| format!("Failed to validate {}", input.display()))?;

    if json {
        print_json(&result)?;
    } else {
        println!("{}: {}", input.display(), result);
    }

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    })
}

fn analyze(
    pipeline: &mut Pipeline<SymphoniaDecoder>,
    input: &Path,
    media_type: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let audio_input = read_input(input, media_type)?;
    let report = pipeline
        .analyze(&audio_input)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    if json {
        print_json(&report)?;
    } else {
        print_analysis_report(input, &report);
    }

    Ok(ExitCode::SUCCESS)
}

fn profiles(config: &VoxprepConfig, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        print_json(&config.profiles)?;
        return Ok(ExitCode::SUCCESS);
    }

    if config.profiles.is_empty() {
        println!("No profiles configured (see voxprep.example.toml)");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Profiles:");
    for (name, profile) in &config.profiles {
        println!(
            "  {} - target {:.1} dBFS RMS, peak {:.1} dBFS, {}-{}s, >= {} bytes",
            name,
            profile.target.target_rms_db(),
            profile.target.peak_limit_db(),
            profile.policy.min_duration_seconds(),
            profile.policy.max_duration_seconds(),
            profile.policy.min_size_bytes(),
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_processing_report(report: &ProcessingReport) {
    println!(
        "  Duration:   {:.1}s ({} ch @ {} Hz)",
        report.duration_seconds, report.source_channels, report.sample_rate
    );
    println!("  Input:      {}", report.input);
    println!("  Output:     {}", report.output);
    match report.gain_db {
        Some(gain_db) => println!("  Gain:       {:+.1} dB", gain_db),
        None => println!("  Gain:       none (near-silent input)"),
    }
    if let Some(lufs) = report.integrated_lufs {
        println!("  Integrated: {:.1} LUFS", lufs);
    }
}

fn print_analysis_report(input: &Path, report: &AnalysisReport) {
    println!("{}", input.display());
    println!(
        "  Duration:   {:.1}s ({} ch @ {} Hz)",
        report.duration_seconds, report.source_channels, report.sample_rate
    );
    println!("  Level:      {}", report.stats);
    println!("  Crest:      {:.1} dB", report.stats.crest_factor_db());
    if let Some(lufs) = report.integrated_lufs {
        println!("  Integrated: {:.1} LUFS", lufs);
    }
}
