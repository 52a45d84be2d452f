//! Broadband reverberation time.

use clap::Args;
use serde::Serialize;
use sonora_analysis::{
    BandRtEstimate, BroadbandRt, Confidence, ConfidenceMetrics, LevelEstimate, compute_confidence,
    estimate_broadband_rt, estimate_levels, extrapolate_band_rts,
};
use std::path::PathBuf;

use super::common::{confidence_line, load_recording, with_hint, write_json};

#[derive(Args)]
pub struct RtArgs {
    /// Recorded sweep response (WAV)
    #[arg(value_name = "RESPONSE")]
    input: PathBuf,

    /// Leading noise-only window used for the SNR estimate, in seconds
    #[arg(long, default_value = "0.3")]
    noise_window: f32,

    /// Write the full result as JSON ("-" for stdout)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct RtReport {
    broadband: BroadbandRt,
    levels: Option<LevelEstimate>,
    confidence: Option<Confidence>,
    bands: Vec<BandRtEstimate>,
}

pub fn run(args: RtArgs) -> anyhow::Result<()> {
    println!("Estimating RT of {}...", args.input.display());
    let rec = load_recording(&args.input)?;
    let sr = rec.sample_rate_hz();

    let broadband = estimate_broadband_rt(&rec.samples, sr).map_err(with_hint)?;

    let levels = match estimate_levels(&rec.samples, sr, args.noise_window) {
        Ok(levels) => Some(levels),
        Err(e) => {
            tracing::warn!("skipping confidence: {e}");
            None
        }
    };
    let confidence = levels.map(|l| {
        compute_confidence(&ConfidenceMetrics::Broadband {
            signal_db: l.signal_db,
            noise_db: l.noise_db,
            duration_secs: rec.duration_secs(),
            rt60: broadband.rt60,
        })
    });
    let bands = extrapolate_band_rts(broadband.rt60);

    println!();
    println!("RT60: {:.2} s", broadband.rt60);
    println!("RT30: {:.2} s", broadband.rt30);
    println!("Fit R²: {:.3}", broadband.fit_r2);
    if !broadband.is_plausible() {
        println!("  (outside the usual range for rooms; check the recording)");
    }
    if let Some(l) = levels {
        println!("SNR: {:.1} dB", l.snr_db());
    }
    if let Some(c) = &confidence {
        println!("{}", confidence_line(c));
    }

    println!();
    println!("Indicative band RT:");
    println!("  {:>6}  {:>6}", "Hz", "RT (s)");
    for band in &bands {
        println!("  {:>6.0}  {:>6.2}", band.hz, band.rt);
    }

    if let Some(path) = &args.json {
        write_json(
            path,
            &RtReport {
                broadband,
                levels,
                confidence,
                bands,
            },
        )?;
    }

    Ok(())
}
