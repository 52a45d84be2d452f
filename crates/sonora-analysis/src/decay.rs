//! Energy decay curves and decay-rate regression.
//!
//! One routine serves both the broadband estimator (T30-style window, no
//! clamping) and the per-band impulse analyzer (T20-style window, RT clamped
//! to a displayable range). Both build the Schroeder curve with
//! [`schroeder_db`] and regress it with [`fit_decay`].
//!
//! # Example
//!
//! ```rust
//! use sonora_analysis::decay::{DecayFitParams, fit_decay, schroeder_db};
//!
//! // 1 s of decay at 60 dB/s
//! let sample_rate = 8000.0;
//! let ir: Vec<f32> = (0..8000)
//!     .map(|i| (-6.9078 * i as f32 / sample_rate).exp())
//!     .collect();
//!
//! let curve = schroeder_db(&ir);
//! let fit = fit_decay(&curve, sample_rate, &DecayFitParams::T30).unwrap();
//! assert!((fit.rt - 1.0).abs() < 0.02);
//! ```

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use sonora_core::{SILENCE_DB, power_to_db, unit_clamp};

/// Shortest regression window (samples) accepted as a decay.
pub const MIN_DECAY_SPAN: usize = 10;

/// Range band RTs are clamped to.
pub const BAND_RT_RANGE: (f32, f32) = (0.2, 6.0);

/// Regression window and post-processing for a decay fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayFitParams {
    /// Level (dB, ≤ 0) where the regression window starts.
    pub start_db: f32,
    /// Level (dB, < `start_db`) where the regression window ends.
    pub end_db: f32,
    /// Minimum number of samples between the two crossings.
    pub min_span: usize,
    /// Optional `(min, max)` clamp applied to the RT60 result.
    pub clamp: Option<(f32, f32)>,
}

impl DecayFitParams {
    /// -5 dB to -35 dB, unclamped. Used for broadband estimates.
    pub const T30: Self = Self {
        start_db: -5.0,
        end_db: -35.0,
        min_span: MIN_DECAY_SPAN,
        clamp: None,
    };

    /// -5 dB to -25 dB, clamped to [`BAND_RT_RANGE`]. Used per octave band.
    pub const T20_BAND: Self = Self {
        start_db: -5.0,
        end_db: -25.0,
        min_span: MIN_DECAY_SPAN,
        clamp: Some(BAND_RT_RANGE),
    };
}

impl Default for DecayFitParams {
    fn default() -> Self {
        Self::T30
    }
}

/// Result of regressing a decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayFit {
    /// RT60 in seconds, extrapolated from the slope (clamped if requested).
    pub rt: f32,
    /// Decay slope in dB/second (negative for a decaying curve).
    pub slope: f32,
    /// Coefficient of determination of the linear fit, in [0, 1].
    pub r2: f32,
    /// First curve index inside the regression window.
    pub start_index: usize,
    /// Last curve index inside the regression window.
    pub end_index: usize,
}

impl DecayFit {
    /// Time to decay by `db` decibels at the fitted slope.
    pub fn decay_time(&self, db: f32) -> f32 {
        db / self.slope.abs().max(SLOPE_EPSILON)
    }
}

const SLOPE_EPSILON: f32 = 1e-6;

/// Compute the Energy Decay Curve (Schroeder backward integration) in dB.
///
/// Squares the amplitude signal, integrates it backward from the end, and
/// normalizes to the value at index 0 so the curve starts at 0 dB. The
/// curve is monotonically non-increasing and floored at -120 dB. An
/// all-zero input yields a flat -120 dB curve.
pub fn schroeder_db(signal: &[f32]) -> Vec<f32> {
    let mut edc = vec![0.0f64; signal.len()];
    let mut acc = 0.0f64;
    for (e, &x) in edc.iter_mut().zip(signal.iter()).rev() {
        acc += f64::from(x) * f64::from(x);
        *e = acc;
    }

    let reference = edc.first().copied().unwrap_or(0.0);
    if reference <= 0.0 {
        return vec![SILENCE_DB; signal.len()];
    }

    edc.iter()
        .map(|&e| power_to_db((e / reference) as f32))
        .collect()
}

/// Fit a straight line to the decay curve between two dB crossings.
///
/// The window starts at the first index whose level is at or below
/// `params.start_db` and ends at the first later index at or below
/// `params.end_db`. Fails with [`AnalysisError::InsufficientDecay`] when a
/// crossing is missing or the window spans fewer than `params.min_span`
/// samples.
pub fn fit_decay(curve_db: &[f32], sample_rate: f32, params: &DecayFitParams) -> Result<DecayFit> {
    let start = curve_db.iter().position(|&v| v <= params.start_db);
    let end = start.and_then(|s| {
        curve_db[s..]
            .iter()
            .position(|&v| v <= params.end_db)
            .map(|offset| s + offset)
    });

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(AnalysisError::InsufficientDecay { span: 0 }),
    };

    let span = end - start;
    if span < params.min_span {
        #[cfg(feature = "tracing")]
        tracing::debug!("decay fit rejected: span {span} < {}", params.min_span);
        return Err(AnalysisError::InsufficientDecay { span });
    }

    let (slope, r2) = linear_regression(&curve_db[start..=end], f64::from(sample_rate));

    let mut rt = 60.0 / slope.abs().max(SLOPE_EPSILON);
    if let Some((lo, hi)) = params.clamp {
        rt = rt.clamp(lo, hi);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "decay fit: window {start}..={end}, slope {slope:.2} dB/s, rt {rt:.3} s, r2 {r2:.3}"
    );

    Ok(DecayFit {
        rt,
        slope,
        r2,
        start_index: start,
        end_index: end,
    })
}

/// Least-squares line through `(i / sample_rate, y[i])`.
///
/// Returns `(slope, r2)` with the slope in dB/second.
fn linear_regression(y: &[f32], sample_rate: f64) -> (f32, f32) {
    let n = y.len() as f64;
    let mut sum_t = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut sum_tt = 0.0f64;
    let mut sum_ty = 0.0f64;

    for (i, &val) in y.iter().enumerate() {
        let t = i as f64 / sample_rate;
        let v = f64::from(val);
        sum_t += t;
        sum_y += v;
        sum_tt += t * t;
        sum_ty += t * v;
    }

    let mut denom = n * sum_tt - sum_t * sum_t;
    if denom.abs() < 1e-12 {
        denom = 1e-12;
    }
    let slope = (n * sum_ty - sum_t * sum_y) / denom;
    let intercept = (sum_y - slope * sum_t) / n;

    let mean = sum_y / n;
    let mut ss_tot = 0.0f64;
    let mut ss_res = 0.0f64;
    for (i, &val) in y.iter().enumerate() {
        let t = i as f64 / sample_rate;
        let v = f64::from(val);
        let fitted = intercept + slope * t;
        ss_tot += (v - mean) * (v - mean);
        ss_res += (v - fitted) * (v - fitted);
    }
    let r2 = if ss_tot > 1e-9 { 1.0 - ss_res / ss_tot } else { 0.0 };

    (slope as f32, unit_clamp(r2 as f32))
}
