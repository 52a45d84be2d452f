//! Sweep stimulus generation.

use clap::{Args, ValueEnum};
use sonora_analysis::{SweepParams, synthesize_sweep};
use sonora_io::{SampleDepth, write_mono};
use std::path::PathBuf;

use super::common::with_hint;

/// Bit depth choices for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliDepth {
    /// 16-bit PCM
    #[value(name = "16")]
    Int16,
    /// 24-bit PCM
    #[value(name = "24")]
    Int24,
    /// 32-bit float
    #[default]
    #[value(name = "32f")]
    Float32,
}

impl From<CliDepth> for SampleDepth {
    fn from(d: CliDepth) -> Self {
        match d {
            CliDepth::Int16 => SampleDepth::Int16,
            CliDepth::Int24 => SampleDepth::Int24,
            CliDepth::Float32 => SampleDepth::Float32,
        }
    }
}

#[derive(Args)]
pub struct SweepArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "3.5")]
    duration: f32,

    /// Start frequency in Hz
    #[arg(long, default_value = "80.0")]
    start: f32,

    /// End frequency in Hz
    #[arg(long, default_value = "16000.0")]
    end: f32,

    /// Fade-in/out length in seconds
    #[arg(long, default_value = "0.03")]
    fade: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Amplitude (0-1)
    #[arg(long, default_value = "0.8")]
    amplitude: f32,

    /// Sample encoding
    #[arg(long, value_enum, default_value = "32f")]
    depth: CliDepth,
}

impl SweepArgs {
    fn params(&self) -> SweepParams {
        SweepParams {
            duration_secs: self.duration,
            start_hz: self.start,
            end_hz: self.end,
            fade_secs: self.fade,
            sample_rate: self.sample_rate as f32,
        }
    }
}

pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    let params = args.params();
    if !(0.0..=1.0).contains(&args.amplitude) {
        anyhow::bail!("amplitude must be within 0..=1, got {}", args.amplitude);
    }

    println!(
        "Generating {:.1}s sweep {}-{} Hz at {} Hz...",
        args.duration, args.start, args.end, args.sample_rate
    );

    let sweep: Vec<f32> = synthesize_sweep(&params)
        .map_err(with_hint)?
        .into_iter()
        .map(|s| s * args.amplitude)
        .collect();

    let clipped = write_mono(&args.output, &sweep, args.sample_rate, args.depth.into())?;
    if clipped > 0 {
        tracing::warn!(clipped, "sweep samples clipped while writing");
    }

    println!("Saved to {}", args.output.display());
    Ok(())
}
