//! Exponential sine sweep stimulus and sweep deconvolution.
//!
//! The sweep is the Farina log sweep: instantaneous frequency rises
//! exponentially from `start_hz` to `end_hz`, so each octave gets the same
//! time. The inverse filter (time-reversed sweep with a -6 dB/octave
//! envelope) turns a recorded response back into an impulse response.

use crate::error::{AnalysisError, Result, ensure_sample_rate};
use rustfft::{FftPlanner, num_complex::Complex};
use std::f64::consts::PI;

/// Output gain applied to the synthesized sweep.
pub const SWEEP_HEADROOM: f32 = 0.75;

/// Shortest fade ramp in samples.
const MIN_FADE_SAMPLES: usize = 16;

/// Sweep stimulus parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepParams {
    /// Sweep length in seconds.
    pub duration_secs: f32,
    /// Start frequency in Hz.
    pub start_hz: f32,
    /// End frequency in Hz.
    pub end_hz: f32,
    /// Fade-in and fade-out ramp length in seconds.
    pub fade_secs: f32,
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            duration_secs: 3.5,
            start_hz: 80.0,
            end_hz: 16000.0,
            fade_secs: 0.03,
            sample_rate: 48000.0,
        }
    }
}

impl SweepParams {
    /// Check that the sweep is well formed.
    pub fn validate(&self) -> Result<()> {
        ensure_sample_rate(self.sample_rate)?;
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "sweep duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if !(self.start_hz.is_finite() && self.start_hz > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "sweep start frequency must be positive, got {}",
                self.start_hz
            )));
        }
        if !(self.end_hz.is_finite() && self.end_hz > self.start_hz) {
            return Err(AnalysisError::invalid(format!(
                "sweep end frequency {} must exceed start frequency {}",
                self.end_hz, self.start_hz
            )));
        }
        if self.end_hz > self.sample_rate / 2.0 {
            return Err(AnalysisError::invalid(format!(
                "sweep end frequency {} is above Nyquist ({})",
                self.end_hz,
                self.sample_rate / 2.0
            )));
        }
        if !(self.fade_secs.is_finite() && self.fade_secs >= 0.0) {
            return Err(AnalysisError::invalid(format!(
                "fade time must be non-negative, got {}",
                self.fade_secs
            )));
        }
        if self.num_samples() < 2 * MIN_FADE_SAMPLES {
            return Err(AnalysisError::invalid("sweep is too short to fade in and out"));
        }
        Ok(())
    }

    /// Number of samples in the sweep buffer, `round(duration * sample_rate)`.
    pub fn num_samples(&self) -> usize {
        (f64::from(self.duration_secs) * f64::from(self.sample_rate)).round() as usize
    }

    /// Length of each fade ramp in samples.
    pub fn fade_samples(&self) -> usize {
        let requested = (f64::from(self.fade_secs) * f64::from(self.sample_rate)).round() as usize;
        requested.max(MIN_FADE_SAMPLES).min(self.num_samples() / 2)
    }

    /// `ln(end_hz / start_hz)`, the sweep rate constant.
    fn rate(&self) -> f64 {
        (f64::from(self.end_hz) / f64::from(self.start_hz)).ln()
    }
}

/// Half-Hann ramp gain for distance `j` (samples) from the buffer edge.
#[inline]
fn edge_gain(j: usize, fade: usize) -> f32 {
    if j >= fade {
        1.0
    } else {
        (0.5 * (1.0 - (PI * j as f64 / fade as f64).cos())) as f32
    }
}

/// Generate the exponential sine sweep.
///
/// `phase(t) = K·(e^(t·R/T) − 1)` with `R = ln(f2/f1)` and
/// `K = 2π·f1·T/R`. Both ends are faded with a raised-cosine ramp and the
/// whole buffer is scaled by [`SWEEP_HEADROOM`].
///
/// # Example
///
/// ```rust
/// use sonora_analysis::sweep::{SweepParams, synthesize_sweep};
///
/// let sweep = synthesize_sweep(&SweepParams::default()).unwrap();
/// assert_eq!(sweep.len(), 168_000);
/// ```
pub fn synthesize_sweep(params: &SweepParams) -> Result<Vec<f32>> {
    params.validate()?;

    let n = params.num_samples();
    let fade = params.fade_samples();
    let sample_rate = f64::from(params.sample_rate);
    let duration = f64::from(params.duration_secs);
    let rate = params.rate();
    let k = 2.0 * PI * f64::from(params.start_hz) * duration / rate;

    let sweep = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let phase = k * ((t * rate / duration).exp() - 1.0);
            let gain = edge_gain(i, fade) * edge_gain(n - 1 - i, fade);
            phase.sin() as f32 * gain * SWEEP_HEADROOM
        })
        .collect();

    Ok(sweep)
}

/// Generate the inverse filter for deconvolution.
///
/// Time-reversed sweep with an exponentially falling envelope that cancels
/// the pink energy distribution of the log sweep.
pub fn inverse_filter(params: &SweepParams) -> Result<Vec<f32>> {
    let sweep = synthesize_sweep(params)?;
    let n = sweep.len() as f64;
    let rate = params.rate();

    Ok(sweep
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, sample)| sample * (-rate * i as f64 / n).exp() as f32)
        .collect())
}

/// Recover an impulse response from a recorded sweep response.
///
/// Convolves `response` with the inverse filter through the FFT and returns
/// the causal part, aligned so that a response delayed by `d` samples puts
/// the impulse at index `d`. The result is scaled so that deconvolving the
/// sweep itself yields a unit peak. Output length equals `response.len()`.
pub fn deconvolve_sweep(response: &[f32], params: &SweepParams) -> Result<Vec<f32>> {
    if response.is_empty() {
        return Err(AnalysisError::invalid("response buffer is empty"));
    }

    let sweep = synthesize_sweep(params)?;
    let inverse = inverse_filter(params)?;

    // inverse[n-1-m] lines up with sweep[m] at zero lag
    let norm: f64 = sweep
        .iter()
        .zip(inverse.iter().rev())
        .map(|(&s, &i)| f64::from(s) * f64::from(i))
        .sum();
    if norm.abs() < 1e-12 {
        return Err(AnalysisError::invalid("sweep has no energy"));
    }

    let fft_size = (response.len() + inverse.len() - 1).next_power_of_two();
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let backward = planner.plan_fft_inverse(fft_size);

    let mut response_spec: Vec<Complex<f32>> =
        response.iter().map(|&x| Complex::new(x, 0.0)).collect();
    response_spec.resize(fft_size, Complex::new(0.0, 0.0));

    let mut inverse_spec: Vec<Complex<f32>> =
        inverse.iter().map(|&x| Complex::new(x, 0.0)).collect();
    inverse_spec.resize(fft_size, Complex::new(0.0, 0.0));

    forward.process(&mut response_spec);
    forward.process(&mut inverse_spec);

    for (r, i) in response_spec.iter_mut().zip(inverse_spec.iter()) {
        *r *= *i;
    }

    backward.process(&mut response_spec);

    // rustfft leaves the inverse unnormalized
    let scale = 1.0 / (fft_size as f64 * norm);
    let offset = sweep.len() - 1;

    Ok(response_spec[offset..offset + response.len()]
        .iter()
        .map(|c| (f64::from(c.re) * scale) as f32)
        .collect())
}
