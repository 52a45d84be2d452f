//! Level measurement: RMS, peak, moving-RMS envelope, and SNR estimation

use crate::error::{AnalysisError, Result, ensure_sample_rate};
use serde::Serialize;
use sonora_core::linear_to_db;

/// Length of the moving-RMS window used for envelopes (seconds).
pub const ENVELOPE_WINDOW_SECS: f32 = 0.02;

/// Shortest envelope window regardless of sample rate.
const MIN_ENVELOPE_WINDOW: usize = 64;

/// Compute RMS (root mean square) of a signal
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = signal.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum_sq / signal.len() as f64).sqrt() as f32
}

/// Find the absolute peak value
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().map(|&x| x.abs()).fold(0.0, f32::max)
}

/// Envelope window length in samples for a sample rate (~20 ms, at least 64).
pub fn envelope_window(sample_rate: f32) -> usize {
    ((sample_rate * ENVELOPE_WINDOW_SECS) as usize).max(MIN_ENVELOPE_WINDOW)
}

/// Trailing moving-RMS envelope.
///
/// Output has the same length as the input. The first `window - 1` values
/// average over the samples seen so far, so the envelope is defined from
/// sample 0.
pub fn moving_rms(signal: &[f32], window: usize) -> Vec<f32> {
    let window = window.max(1);
    let mut env = Vec::with_capacity(signal.len());
    let mut acc = 0.0f64;

    for (i, &x) in signal.iter().enumerate() {
        acc += f64::from(x) * f64::from(x);
        if i >= window {
            let old = f64::from(signal[i - window]);
            acc -= old * old;
        }
        // running subtraction can drift slightly negative
        let mean = acc.max(0.0) / window.min(i + 1) as f64;
        env.push(mean.sqrt() as f32);
    }

    env
}

/// Signal and noise levels of a capture, in dBFS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelEstimate {
    /// Peak of the moving-RMS envelope.
    pub signal_db: f32,
    /// RMS of the leading noise-only window.
    pub noise_db: f32,
}

impl LevelEstimate {
    /// Signal-to-noise ratio in dB.
    pub fn snr_db(&self) -> f32 {
        self.signal_db - self.noise_db
    }
}

/// Estimate signal and noise levels of a capture.
///
/// The first `noise_window_secs` of the buffer are assumed to hold only
/// background noise (the pre-roll before the stimulus starts).
pub fn estimate_levels(
    samples: &[f32],
    sample_rate: f32,
    noise_window_secs: f32,
) -> Result<LevelEstimate> {
    ensure_sample_rate(sample_rate)?;
    let noise_len = (noise_window_secs.max(0.0) * sample_rate) as usize;
    if noise_len == 0 || noise_len >= samples.len() {
        return Err(AnalysisError::invalid(format!(
            "noise window of {noise_len} samples does not fit a {}-sample buffer",
            samples.len()
        )));
    }

    let env = moving_rms(samples, envelope_window(sample_rate));
    let signal = env.iter().copied().fold(0.0, f32::max);

    Ok(LevelEstimate {
        signal_db: linear_to_db(signal),
        noise_db: linear_to_db(rms(&samples[..noise_len])),
    })
}
