//! Resynth CLI - FFT round-trip harness
//!
//! Streams a WAV file through a cascade of forward/inverse FFT stages
//! and writes the resynthesized signal as raw little-endian f32 samples.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use serde::Serialize;

use resynth::audio::verification::{compare_streams, linear_to_db};
use resynth::audio::{load_raw, load_wav, RawSink, ReconstructionReport, WavSource};
use resynth::{
    Pipeline, PipelineConfig, Result, RunStats, StageChain, TailPolicy, WindowFunction,
    DEFAULT_WINDOW_SIZE,
};

/// Reconstruction error allowed per cascaded stage when verifying
const VERIFY_TOLERANCE_PER_STAGE: f32 = 1e-5;

/// Resynthesize a WAV file through cascaded FFT/IFFT round trips
#[derive(Parser, Debug)]
#[command(name = "resynth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input WAV file
    input: PathBuf,

    /// Output file for raw little-endian f32 samples
    output: PathBuf,

    /// Number of round-trip stages to cascade
    #[arg(long, default_value_t = 1)]
    fft_count: usize,

    /// Samples per transform block
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Window applied before each forward transform
    #[arg(long, value_enum, default_value = "rectangular")]
    window: WindowFunction,

    /// What to do with a final short block
    #[arg(long, value_enum, default_value = "pad-with-zero")]
    tail: TailPolicy,

    /// Abort if any inverse transform leaves more imaginary residue than this
    #[arg(long)]
    imag_tolerance: Option<f32>,

    /// Re-read both files afterwards and check the reconstruction error bound
    #[arg(long)]
    verify: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of the post-run reconstruction check
#[derive(Debug, Serialize)]
struct Verification {
    tolerance: f32,
    passed: bool,
    report: ReconstructionReport,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    input: String,
    output: String,
    config: PipelineConfig,
    stats: RunStats,
    verification: Option<Verification>,
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    info!("resynth v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e} ({})", e.kind());
            let mut cause = std::error::Error::source(&e);
            while let Some(c) = cause {
                error!("  caused by: {c}");
                cause = c.source();
            }
            if e.is_usage_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = PipelineConfig {
        window_size: cli.window_size,
        fft_count: cli.fft_count,
        window: cli.window,
        tail: cli.tail,
        imag_tolerance: cli.imag_tolerance,
    };

    // The chain validates the config, so bad parameters are rejected
    // before the output file is even created.
    let chain = StageChain::new(&config)?;
    let source = WavSource::open(&cli.input)?;
    let sink = RawSink::create(&cli.output)?;

    let stats = Pipeline::new(source, chain, sink).run()?;

    let verification = if cli.verify {
        Some(verify(cli, &config)?)
    } else {
        None
    };
    let passed = verification.as_ref().map_or(true, |v| v.passed);

    let summary = RunSummary {
        input: cli.input.display().to_string(),
        output: cli.output.display().to_string(),
        config,
        stats,
        verification,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Re-read both files and measure how far the output strayed from the input
fn verify(cli: &Cli, config: &PipelineConfig) -> Result<Verification> {
    let reference = load_wav(&cli.input)?.downmix_mono();
    let produced = load_raw(&cli.output)?;
    let report = compare_streams(&reference, &produced);

    // The bound scales with cascade depth: each stage contributes its
    // own rounding, so a deep chain is allowed proportionally more.
    let tolerance = VERIFY_TOLERANCE_PER_STAGE * config.fft_count as f32;
    let passed = report.max_abs_error <= tolerance;

    info!(
        "verify: {} samples compared, max abs error {:.3e}, tolerance {:.3e}",
        report.samples_compared, report.max_abs_error, tolerance
    );

    Ok(Verification {
        tolerance,
        passed,
        report,
    })
}

fn print_summary(summary: &RunSummary) {
    println!("Processed {} -> {}", summary.input, summary.output);
    println!(
        "  {} frames in, {} samples out, {} block(s), max imag residue {:.3e}",
        summary.stats.frames_in,
        summary.stats.samples_out,
        summary.stats.blocks,
        summary.stats.max_imag_residue
    );

    if let Some(v) = &summary.verification {
        let verdict = if v.passed { "PASS" } else { "FAIL" };
        println!(
            "  verify: max abs error {:.3e} ({:.1} dB) at sample {}, rms {:.3e}, tolerance {:.3e} [{}]",
            v.report.max_abs_error,
            linear_to_db(v.report.max_abs_error),
            v.report.worst_index,
            v.report.rms_error,
            v.tolerance,
            verdict
        );
    }
}
