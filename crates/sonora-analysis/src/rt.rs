//! Broadband reverberation time from a sweep (or any stimulus) response.
//!
//! The recording is reduced to a 20 ms moving-RMS envelope; everything after
//! the envelope peak is treated as the room's decay and fed to the shared
//! Schroeder fit with a T30 window. The result is deliberately not clamped:
//! implausible values are reported as measured and penalised later by the
//! confidence heuristic.

use crate::decay::{DecayFit, DecayFitParams, fit_decay, schroeder_db};
use crate::error::{AnalysisError, Result, ensure_sample_rate};
use crate::levels::{envelope_window, moving_rms};
use serde::Serialize;
use sonora_core::db_to_linear;

/// Leading time ignored when searching for the envelope peak (seconds).
pub const ONSET_GUARD_SECS: f32 = 0.2;

/// Envelope peaks below this amplitude are treated as silence.
pub const NOISE_FLOOR: f32 = 1e-6;

/// Minimum fall of the envelope below its peak for a recording to count as
/// a decay (dB).
pub const MIN_ENVELOPE_FALL_DB: f32 = 20.0;

/// Range of RT60 values considered plausible for a room (seconds).
pub const PLAUSIBLE_RT_RANGE: (f32, f32) = (0.2, 6.0);

/// Result of a broadband RT estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadbandRt {
    /// Extrapolated 60 dB decay time in seconds.
    pub rt60: f32,
    /// Extrapolated 30 dB decay time in seconds.
    pub rt30: f32,
    /// R² of the regression over the -5..-35 dB window.
    pub fit_r2: f32,
    /// Schroeder decay curve from the envelope peak onward, in dB.
    pub decay_curve_db: Vec<f32>,
    /// Sample index of the envelope peak in the input buffer.
    pub peak_index: usize,
    /// Envelope level at the peak (linear RMS).
    pub peak_level: f32,
    /// The underlying regression.
    pub fit: DecayFit,
}

impl BroadbandRt {
    /// Whether the RT60 falls inside [`PLAUSIBLE_RT_RANGE`].
    pub fn is_plausible(&self) -> bool {
        (PLAUSIBLE_RT_RANGE.0..=PLAUSIBLE_RT_RANGE.1).contains(&self.rt60)
    }
}

/// Estimate RT60/RT30 from a recorded response.
///
/// # Errors
///
/// - [`AnalysisError::InvalidInput`] when the buffer does not extend past
///   the onset guard or the sample rate is invalid.
/// - [`AnalysisError::SignalTooLow`] when the envelope peak is below
///   [`NOISE_FLOOR`].
/// - [`AnalysisError::InsufficientDecay`] when the envelope never falls
///   [`MIN_ENVELOPE_FALL_DB`] below its peak or the -5..-35 dB window is too
///   short to regress.
///
/// # Example
///
/// ```rust
/// use sonora_analysis::rt::estimate_broadband_rt;
///
/// let sr = 8000.0;
/// // 250 ms of silence, then a 500 Hz tone decaying at 60 dB/s
/// let mut samples = vec![0.0f32; 2000];
/// samples.extend((0..16000).map(|i| {
///     let t = i as f32 / sr;
///     (-6.9078 * t).exp() * (2.0 * std::f32::consts::PI * 500.0 * t).sin()
/// }));
///
/// let rt = estimate_broadband_rt(&samples, sr).unwrap();
/// assert!((rt.rt60 - 1.0).abs() < 0.05);
/// ```
pub fn estimate_broadband_rt(samples: &[f32], sample_rate: f32) -> Result<BroadbandRt> {
    ensure_sample_rate(sample_rate)?;

    let guard = (sample_rate * ONSET_GUARD_SECS) as usize;
    if samples.len() <= guard {
        return Err(AnalysisError::invalid(format!(
            "recording of {} samples ends inside the {guard}-sample onset guard",
            samples.len()
        )));
    }

    let env = moving_rms(samples, envelope_window(sample_rate));

    // first maximum after the guard
    let (peak_index, peak_level) = env
        .iter()
        .enumerate()
        .skip(guard)
        .fold((guard, 0.0f32), |best, (i, &v)| if v > best.1 { (i, v) } else { best });

    if peak_level < NOISE_FLOOR {
        #[cfg(feature = "tracing")]
        tracing::debug!("broadband rt: envelope peak {peak_level:.2e} below floor");
        return Err(AnalysisError::SignalTooLow { peak: peak_level });
    }

    let tail = &env[peak_index..];
    let lowest = tail.iter().copied().fold(f32::INFINITY, f32::min);
    if lowest > peak_level * db_to_linear(-MIN_ENVELOPE_FALL_DB) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "broadband rt: envelope only falls to {lowest:.2e} from {peak_level:.2e}"
        );
        return Err(AnalysisError::InsufficientDecay { span: 0 });
    }

    let decay_curve_db = schroeder_db(tail);
    let fit = fit_decay(&decay_curve_db, sample_rate, &DecayFitParams::T30)?;

    Ok(BroadbandRt {
        rt60: fit.rt,
        rt30: fit.decay_time(30.0),
        fit_r2: fit.r2,
        decay_curve_db,
        peak_index,
        peak_level,
        fit,
    })
}

/// Indicative per-octave RT derived from a broadband value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandRtEstimate {
    /// Octave center in Hz.
    pub hz: f32,
    /// Extrapolated RT60 in seconds.
    pub rt: f32,
}

/// Octave centers and the factors applied to the broadband RT.
const BAND_RT_FACTORS: [(f32, f32); 6] = [
    (125.0, 1.15),
    (250.0, 1.10),
    (500.0, 1.00),
    (1000.0, 0.95),
    (2000.0, 0.90),
    (4000.0, 0.85),
];

/// Range extrapolated band RTs are clamped to.
pub const EXTRAPOLATED_RT_RANGE: (f32, f32) = (0.2, 4.5);

/// Derive per-octave RTs from a single broadband RT60.
///
/// Rooms usually ring longer at low frequencies; the fixed factors encode a
/// typical tilt. Use only when no impulse capture is available.
pub fn extrapolate_band_rts(rt60: f32) -> Vec<BandRtEstimate> {
    BAND_RT_FACTORS
        .iter()
        .map(|&(hz, factor)| BandRtEstimate {
            hz,
            rt: (rt60 * factor).clamp(EXTRAPOLATED_RT_RANGE.0, EXTRAPOLATED_RT_RANGE.1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn decaying_tone(rt60: f32, sample_rate: f32, pre_roll: f32, seconds: f32) -> Vec<f32> {
        let k = 6.9078 / rt60;
        let mut samples = vec![0.0; (pre_roll * sample_rate) as usize];
        samples.extend((0..(seconds * sample_rate) as usize).map(|i| {
            let t = i as f32 / sample_rate;
            0.5 * (-k * t).exp() * (2.0 * PI * 1000.0 * t).sin()
        }));
        samples
    }

    #[test]
    fn test_recovers_rt60() {
        let sr = 48000.0;
        for rt60 in [0.4, 1.0, 2.0] {
            let samples = decaying_tone(rt60, sr, 0.3, 3.0);
            let rt = estimate_broadband_rt(&samples, sr).unwrap();
            assert!(
                (rt.rt60 - rt60).abs() / rt60 < 0.05,
                "expected {rt60}, got {}",
                rt.rt60
            );
            assert!((rt.rt30 - rt.rt60 / 2.0).abs() < 1e-4);
            assert!(rt.fit_r2 > 0.95);
            assert!(rt.is_plausible());
        }
    }

    #[test]
    fn test_decay_curve_starts_at_peak() {
        let sr = 16000.0;
        let samples = decaying_tone(0.8, sr, 0.3, 2.0);
        let rt = estimate_broadband_rt(&samples, sr).unwrap();
        assert_eq!(rt.decay_curve_db.len(), samples.len() - rt.peak_index);
        assert!(rt.decay_curve_db[0].abs() < 1e-3);
        assert!(rt.peak_index >= (0.3 * sr) as usize);
    }

    #[test]
    fn test_unclamped_result() {
        // 0.1 s is below the plausible range but must still be reported
        let sr = 48000.0;
        let samples = decaying_tone(0.1, sr, 0.3, 1.0);
        let rt = estimate_broadband_rt(&samples, sr).unwrap();
        assert!(rt.rt60 < 0.15);
        assert!(!rt.is_plausible());
    }

    #[test]
    fn test_silence_is_too_low() {
        let err = estimate_broadband_rt(&vec![0.0; 48000], 48000.0).unwrap_err();
        assert!(matches!(err, AnalysisError::SignalTooLow { .. }));
    }

    #[test]
    fn test_steady_tone_has_no_decay() {
        let sr = 16000.0;
        let samples: Vec<f32> = (0..32000)
            .map(|i| 0.3 * (2.0 * PI * 440.0 * i as f32 / sr).sin())
            .collect();
        let err = estimate_broadband_rt(&samples, sr).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientDecay { .. }));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = estimate_broadband_rt(&[0.1; 100], 48000.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_extrapolate_band_rts() {
        let bands = extrapolate_band_rts(1.0);
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0].hz, 125.0);
        assert!((bands[0].rt - 1.15).abs() < 1e-6);
        assert!((bands[2].rt - 1.0).abs() < 1e-6);
        assert!((bands[5].rt - 0.85).abs() < 1e-6);

        let long = extrapolate_band_rts(5.0);
        assert!(long.iter().all(|b| b.rt <= EXTRAPOLATED_RT_RANGE.1));
        let short = extrapolate_band_rts(0.1);
        assert!(short.iter().all(|b| b.rt >= EXTRAPOLATED_RT_RANGE.0));
    }
}
