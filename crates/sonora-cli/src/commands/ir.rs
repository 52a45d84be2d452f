//! Per-octave reverberation from an impulse capture.

use anyhow::Context;
use clap::Args;
use sonora_analysis::{
    BandSpec, OCTAVE_BANDS, SweepParams, analyze_impulse_response, analyze_sweep_response,
    deconvolve_sweep,
};
use sonora_io::read_recording;
use std::path::PathBuf;

use super::common::{confidence_line, load_recording, with_hint, write_json};

#[derive(Args)]
pub struct IrArgs {
    /// Impulse recording, or a recorded sweep response with --sweep (WAV)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Stimulus the recording was made with; deconvolve before analysis
    #[arg(long, value_name = "SWEEP")]
    sweep: Option<PathBuf>,

    /// Sweep start frequency in Hz (with --sweep)
    #[arg(long, default_value = "80.0")]
    start: f32,

    /// Sweep end frequency in Hz (with --sweep)
    #[arg(long, default_value = "16000.0")]
    end: f32,

    /// Sweep fade length in seconds (with --sweep)
    #[arg(long, default_value = "0.03")]
    fade: f32,

    /// Write the full result as JSON ("-" for stdout)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

pub fn run(args: IrArgs) -> anyhow::Result<()> {
    println!("Analyzing impulse response {}...", args.input.display());
    let rec = load_recording(&args.input)?;
    let sr = rec.sample_rate_hz();

    // bands above Nyquist cannot be analysed at low sample rates
    let bands: Vec<BandSpec> = OCTAVE_BANDS
        .iter()
        .copied()
        .filter(|b| b.validate(sr).is_ok())
        .collect();
    if bands.len() < OCTAVE_BANDS.len() {
        tracing::warn!(
            kept = bands.len(),
            "some octave bands are not realisable at {sr} Hz"
        );
    }

    let analysis = match &args.sweep {
        Some(path) => {
            let stimulus =
                read_recording(path).with_context(|| format!("reading {}", path.display()))?;
            if stimulus.sample_rate != rec.sample_rate {
                anyhow::bail!(
                    "sweep is {} Hz but the recording is {} Hz",
                    stimulus.sample_rate,
                    rec.sample_rate
                );
            }
            let params = SweepParams {
                duration_secs: stimulus.duration_secs(),
                start_hz: args.start,
                end_hz: args.end,
                fade_secs: args.fade,
                sample_rate: sr,
            };
            println!("  deconvolving against {}", path.display());
            let impulse = deconvolve_sweep(&rec.samples, &params).map_err(with_hint)?;
            analyze_sweep_response(&impulse, &rec.samples, sr, &bands).map_err(with_hint)?
        }
        None => analyze_impulse_response(&rec.samples, sr, &bands).map_err(with_hint)?,
    };

    println!();
    println!("  {:>6}  {:>6}  {:>5}", "Hz", "RT (s)", "R²");
    for band in &analysis.bands {
        match (band.rt, band.r2) {
            (Some(rt), Some(r2)) => println!("  {:>6.0}  {:>6.2}  {:>5.2}", band.hz, rt, r2),
            _ => println!("  {:>6.0}  {:>6}  {:>5}", band.hz, "-", "-"),
        }
    }
    println!();
    if analysis.clip_suspected {
        println!(
            "Warning: capture peak at {:.2} FS, the recording may be clipped",
            analysis.capture_peak.amplitude
        );
    }
    println!("{}", confidence_line(&analysis.confidence));

    if let Some(path) = &args.json {
        write_json(path, &analysis)?;
    }

    Ok(())
}
