//! Band spectrum snapshot and EQ suggestions.

use clap::{Args, ValueEnum};
use serde::Serialize;
use sonora_analysis::{
    EqSuggestion, RtaConfig, SpectrumSnapshot, Window, snapshot_spectrum, suggest_eq_cuts,
};
use std::path::PathBuf;

use super::common::{load_recording, with_hint, write_json};

/// Analysis window choices for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWindow {
    #[default]
    Hann,
    Hamming,
    Blackman,
    #[value(alias = "rect", alias = "none")]
    Rectangular,
}

impl From<CliWindow> for Window {
    fn from(w: CliWindow) -> Self {
        match w {
            CliWindow::Hann => Window::Hann,
            CliWindow::Hamming => Window::Hamming,
            CliWindow::Blackman => Window::Blackman,
            CliWindow::Rectangular => Window::Rectangular,
        }
    }
}

#[derive(Args)]
pub struct RtaArgs {
    /// Pink-noise capture (WAV)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// FFT size (power of two)
    #[arg(long, default_value = "2048")]
    fft_size: usize,

    /// Window function
    #[arg(long, value_enum, default_value = "hann")]
    window: CliWindow,

    /// Write bands and suggestions as JSON ("-" for stdout)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct RtaReport {
    snapshot: SpectrumSnapshot,
    suggestions: Vec<EqSuggestion>,
}

/// Crude horizontal bar for a level in -30..0 dB.
fn bar(relative_db: f32) -> String {
    let len = ((relative_db + 30.0).clamp(0.0, 30.0) / 1.5).round() as usize;
    "#".repeat(len)
}

pub fn run(args: RtaArgs) -> anyhow::Result<()> {
    println!("Analyzing spectrum of {}...", args.input.display());
    let rec = load_recording(&args.input)?;

    let config = RtaConfig {
        fft_size: args.fft_size,
        window: args.window.into(),
        ..RtaConfig::default()
    };
    let snapshot = snapshot_spectrum(&rec.samples, rec.sample_rate_hz(), &config).map_err(with_hint)?;
    let suggestions = suggest_eq_cuts(&snapshot.bands);

    println!("  {} frames of {}", snapshot.frames, config.fft_size);
    println!();
    for band in snapshot.bands.iter().filter(|b| b.bins > 0) {
        println!("  {:>7.0} Hz  {:>6.1} dB  {}", band.hz, band.relative_db, bar(band.relative_db));
    }

    println!();
    if suggestions.is_empty() {
        println!("No EQ cuts suggested.");
    } else {
        println!("Suggested cuts:");
        for s in &suggestions {
            println!("  {:>7.0} Hz  {:+.0} dB", s.hz, s.gain_db());
        }
    }

    if let Some(path) = &args.json {
        write_json(path, &RtaReport { snapshot, suggestions })?;
    }

    Ok(())
}
