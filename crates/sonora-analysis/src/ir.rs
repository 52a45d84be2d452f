//! Octave-band reverberation from an impulse recording (clap, balloon pop,
//! or a deconvolved sweep).

use crate::confidence::{Confidence, ConfidenceMetrics, compute_confidence};
use crate::decay::{DecayFitParams, fit_decay, schroeder_db};
use crate::error::{AnalysisError, Result, ensure_sample_rate};
use crate::filterbank::{BandSpec, OctaveFilterBank};
use serde::Serialize;
use sonora_core::ms_to_samples;

/// Window kept before the impulse peak (milliseconds).
pub const PRE_IMPULSE_MS: f32 = 30.0;

/// Window kept after the impulse peak (milliseconds).
pub const POST_IMPULSE_MS: f32 = 2500.0;

/// Peak magnitude at which clipping is suspected (fraction of full scale).
pub const CLIP_THRESHOLD: f32 = 0.98;

/// Peaks below this amplitude are treated as silence.
pub const IMPULSE_FLOOR: f32 = 1e-6;

/// Location and magnitude of the strongest sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpulsePeak {
    /// Sample index of the peak.
    pub index: usize,
    /// Absolute amplitude at the peak.
    pub amplitude: f32,
}

impl ImpulsePeak {
    /// Whether the peak is close enough to full scale to suspect clipping.
    pub fn clip_suspected(&self) -> bool {
        self.amplitude >= CLIP_THRESHOLD
    }
}

/// Find the sample of maximum absolute amplitude.
///
/// Ties resolve to the earliest index. Returns `None` for an empty buffer.
pub fn find_impulse_peak(samples: &[f32]) -> Option<ImpulsePeak> {
    let mut iter = samples.iter().enumerate();
    let (_, &first) = iter.next()?;
    let (index, amplitude) = iter.fold((0, first.abs()), |best, (i, &x)| {
        if x.abs() > best.1 { (i, x.abs()) } else { best }
    });
    Some(ImpulsePeak { index, amplitude })
}

/// Sample range `[start, end)` analysed around an impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImpulseWindow {
    /// First sample (inclusive).
    pub start: usize,
    /// Last sample (exclusive).
    pub end: usize,
}

impl ImpulseWindow {
    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Borrow the window out of the buffer it was computed for.
    pub fn slice<'a>(&self, samples: &'a [f32]) -> &'a [f32] {
        &samples[self.start..self.end]
    }
}

/// Window from [`PRE_IMPULSE_MS`] before the peak to [`POST_IMPULSE_MS`]
/// after it, clamped to the buffer bounds.
pub fn slice_around_impulse(len: usize, sample_rate: f32, peak_index: usize) -> ImpulseWindow {
    let pre = ms_to_samples(PRE_IMPULSE_MS, sample_rate);
    let post = ms_to_samples(POST_IMPULSE_MS, sample_rate);
    ImpulseWindow {
        start: peak_index.saturating_sub(pre).min(len),
        end: peak_index.saturating_add(post).min(len),
    }
}

/// Decay measurement for one band.
///
/// `rt` and `r2` are `None` when the band did not decay far enough to
/// regress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandDecay {
    /// Band center in Hz.
    pub hz: f32,
    /// RT60 in seconds, clamped to the band display range.
    pub rt: Option<f32>,
    /// Fit quality in [0, 1].
    pub r2: Option<f32>,
    /// Fitted decay slope in dB/second (negative).
    pub slope: Option<f32>,
}

/// Result of an impulse analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseAnalysis {
    /// Per-band decay, in the order the bands were requested.
    pub bands: Vec<BandDecay>,
    /// Strongest sample in the analysed impulse.
    pub peak: ImpulsePeak,
    /// Strongest sample of the capture; equals `peak` unless the impulse
    /// was deconvolved from a sweep.
    pub capture_peak: ImpulsePeak,
    /// Range of the recording that was analysed.
    pub window: ImpulseWindow,
    /// Capture peak at or above [`CLIP_THRESHOLD`].
    pub clip_suspected: bool,
    /// Heuristic confidence in the band values.
    pub confidence: Confidence,
}

impl ImpulseAnalysis {
    /// Mean R² over bands with a valid fit, 0 when none are valid.
    pub fn mean_r2(&self) -> f32 {
        mean_r2(&self.bands)
    }

    /// Bands that produced an RT.
    pub fn valid_bands(&self) -> impl Iterator<Item = &BandDecay> {
        self.bands.iter().filter(|b| b.rt.is_some())
    }
}

fn mean_r2(bands: &[BandDecay]) -> f32 {
    let (sum, count) = bands
        .iter()
        .filter_map(|b| b.r2)
        .fold((0.0f32, 0usize), |(s, c), r2| (s + r2, c + 1));
    if count == 0 { 0.0 } else { sum / count as f32 }
}

/// Per-band RT60 from an impulse recording.
///
/// Finds the peak, windows [`PRE_IMPULSE_MS`]..[`POST_IMPULSE_MS`] around
/// it, filters the window through one band-pass per entry of `bands` and
/// fits a T20 decay to each output. Bands whose decay cannot be regressed
/// are reported with `rt: None` rather than failing the whole analysis.
///
/// # Errors
///
/// - [`AnalysisError::InvalidInput`] for an empty buffer, a bad sample rate
///   or a band that cannot be realised at `sample_rate`.
/// - [`AnalysisError::SignalTooLow`] when the peak is below
///   [`IMPULSE_FLOOR`].
pub fn analyze_impulse_response(
    samples: &[f32],
    sample_rate: f32,
    bands: &[BandSpec],
) -> Result<ImpulseAnalysis> {
    analyze_with_level(samples, None, sample_rate, bands)
}

/// Per-band RT60 from a deconvolved sweep measurement.
///
/// `impulse` is the output of [`deconvolve_sweep`](crate::deconvolve_sweep)
/// and is analysed as in [`analyze_impulse_response`]. Its peak says
/// nothing about the capture level (the deconvolution normalises a
/// unity-gain sweep to a unit peak), so the clip flag and the peak term of
/// the confidence come from `capture`, the recorded sweep response.
///
/// # Errors
///
/// As [`analyze_impulse_response`], plus [`AnalysisError::InvalidInput`]
/// for an empty capture.
pub fn analyze_sweep_response(
    impulse: &[f32],
    capture: &[f32],
    sample_rate: f32,
    bands: &[BandSpec],
) -> Result<ImpulseAnalysis> {
    let level = find_impulse_peak(capture)
        .ok_or_else(|| AnalysisError::invalid("sweep capture is empty"))?;
    analyze_with_level(impulse, Some(level), sample_rate, bands)
}

fn analyze_with_level(
    samples: &[f32],
    capture_peak: Option<ImpulsePeak>,
    sample_rate: f32,
    bands: &[BandSpec],
) -> Result<ImpulseAnalysis> {
    ensure_sample_rate(sample_rate)?;
    let peak = find_impulse_peak(samples)
        .ok_or_else(|| AnalysisError::invalid("impulse recording is empty"))?;
    if peak.amplitude < IMPULSE_FLOOR {
        return Err(AnalysisError::SignalTooLow {
            peak: peak.amplitude,
        });
    }

    let mut bank = OctaveFilterBank::new(sample_rate, bands)?;
    let window = slice_around_impulse(samples.len(), sample_rate, peak.index);
    let filtered = bank.extract(window.slice(samples));

    let band_results: Vec<BandDecay> = bands
        .iter()
        .zip(filtered.iter())
        .map(|(band, signal)| {
            let curve = schroeder_db(signal);
            match fit_decay(&curve, sample_rate, &DecayFitParams::T20_BAND) {
                Ok(fit) => BandDecay {
                    hz: band.center_hz,
                    rt: Some(fit.rt),
                    r2: Some(fit.r2),
                    slope: Some(fit.slope),
                },
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("band {} Hz has no usable decay: {_err}", band.center_hz);
                    BandDecay {
                        hz: band.center_hz,
                        rt: None,
                        r2: None,
                        slope: None,
                    }
                }
            }
        })
        .collect();

    let capture_peak = capture_peak.unwrap_or(peak);
    let clip_suspected = capture_peak.clip_suspected();
    let confidence = compute_confidence(&ConfidenceMetrics::Impulse {
        peak: capture_peak.amplitude,
        mean_r2: mean_r2(&band_results),
        clip: clip_suspected,
    });

    Ok(ImpulseAnalysis {
        bands: band_results,
        peak,
        capture_peak,
        window,
        clip_suspected,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filterbank::OCTAVE_BANDS;

    /// Deterministic white noise in [-1, 1].
    fn noise(len: usize, mut state: u32) -> Vec<f32> {
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    fn synthetic_ir(rt60: f32, sample_rate: f32, lead_secs: f32, gain: f32) -> Vec<f32> {
        let k = 6.9078 / rt60;
        let lead = (lead_secs * sample_rate) as usize;
        let body = noise((2.0 * sample_rate) as usize, 0x1234_5678);
        let mut ir = vec![0.0; lead];
        ir.push(gain);
        ir.extend(
            body.iter()
                .enumerate()
                .map(|(i, &n)| gain * 0.5 * n * (-k * i as f32 / sample_rate).exp()),
        );
        ir
    }

    #[test]
    fn test_find_peak() {
        let peak = find_impulse_peak(&[0.1, -0.9, 0.5, 0.9]).unwrap();
        assert_eq!(peak.index, 1);
        assert_eq!(peak.amplitude, 0.9);
        assert!(find_impulse_peak(&[]).is_none());
    }

    #[test]
    fn test_clip_flag() {
        assert!(ImpulsePeak { index: 0, amplitude: 0.99 }.clip_suspected());
        assert!(ImpulsePeak { index: 0, amplitude: 0.98 }.clip_suspected());
        assert!(!ImpulsePeak { index: 0, amplitude: 0.97 }.clip_suspected());
    }

    #[test]
    fn test_slice_window() {
        let window = slice_around_impulse(200_000, 48000.0, 10_000);
        assert_eq!(window.start, 10_000 - 1440);
        assert_eq!(window.end, 10_000 + 120_000);
        assert_eq!(window.len(), 121_440);
    }

    #[test]
    fn test_slice_window_clamps() {
        let window = slice_around_impulse(5000, 48000.0, 100);
        assert_eq!(window.start, 0);
        assert_eq!(window.end, 5000);

        let samples = vec![0.0; 5000];
        assert_eq!(window.slice(&samples).len(), 5000);
    }

    #[test]
    fn test_band_rts_follow_decay() {
        let sr = 48000.0;
        let ir = synthetic_ir(0.9, sr, 0.1, 0.8);
        let analysis = analyze_impulse_response(&ir, sr, &OCTAVE_BANDS).unwrap();

        assert_eq!(analysis.bands.len(), 6);
        assert_eq!(analysis.peak.index, (0.1 * sr) as usize);
        assert!(!analysis.clip_suspected);
        for band in &analysis.bands {
            let rt = band.rt.unwrap();
            assert!((rt - 0.9).abs() / 0.9 < 0.15, "{} Hz: {rt}", band.hz);
            assert!(band.r2.unwrap() > 0.9);
        }
        assert!(analysis.mean_r2() > 0.9);
        assert_eq!(analysis.valid_bands().count(), 6);
    }

    #[test]
    fn test_band_rt_is_clamped() {
        let sr = 48000.0;
        let ir = synthetic_ir(0.08, sr, 0.05, 0.8);
        let analysis = analyze_impulse_response(&ir, sr, &OCTAVE_BANDS).unwrap();
        for band in analysis.valid_bands() {
            let rt = band.rt.unwrap();
            assert!((0.2..=6.0).contains(&rt), "{} Hz: {rt}", band.hz);
        }
    }

    #[test]
    fn test_confidence_tracks_quality() {
        let sr = 48000.0;
        let clean = analyze_impulse_response(&synthetic_ir(0.9, sr, 0.1, 0.7), sr, &OCTAVE_BANDS)
            .unwrap();
        let clipped = analyze_impulse_response(&synthetic_ir(0.9, sr, 0.1, 1.0), sr, &OCTAVE_BANDS)
            .unwrap();
        assert!(clipped.clip_suspected);
        assert!(clean.confidence.overall > clipped.confidence.overall);
    }

    #[test]
    fn test_band_slope_matches_rt() {
        let sr = 48000.0;
        let analysis =
            analyze_impulse_response(&synthetic_ir(0.9, sr, 0.1, 0.7), sr, &OCTAVE_BANDS).unwrap();
        for band in analysis.valid_bands() {
            let slope = band.slope.unwrap();
            assert!(slope < 0.0);
            assert!((60.0 / -slope - band.rt.unwrap()).abs() < 1e-3, "{} Hz", band.hz);
        }
    }

    #[test]
    fn test_sweep_response_judges_clipping_on_capture() {
        // a deconvolved unity-gain sweep peaks near 1.0 even though the
        // capture itself stayed well below full scale
        let sr = 48000.0;
        let impulse = synthetic_ir(0.9, sr, 0.1, 1.0);
        let capture = vec![0.5, -0.6, 0.4];

        let plain = analyze_impulse_response(&impulse, sr, &OCTAVE_BANDS).unwrap();
        assert!(plain.clip_suspected);

        let swept = analyze_sweep_response(&impulse, &capture, sr, &OCTAVE_BANDS).unwrap();
        assert!(!swept.clip_suspected);
        assert_eq!(swept.capture_peak, ImpulsePeak { index: 1, amplitude: 0.6 });
        assert_eq!(swept.peak, plain.peak);
        assert_eq!(swept.bands, plain.bands);
        assert!(swept.confidence.overall > plain.confidence.overall);

        let clipped = analyze_sweep_response(&impulse, &[0.2, 0.99], sr, &OCTAVE_BANDS).unwrap();
        assert!(clipped.clip_suspected);
    }

    #[test]
    fn test_sweep_response_rejects_empty_capture() {
        let impulse = synthetic_ir(0.9, 48000.0, 0.1, 0.7);
        let err = analyze_sweep_response(&impulse, &[], 48000.0, &OCTAVE_BANDS).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_silence_is_too_low() {
        let err = analyze_impulse_response(&[0.0; 4800], 48000.0, &OCTAVE_BANDS).unwrap_err();
        assert!(matches!(err, AnalysisError::SignalTooLow { .. }));
    }

    #[test]
    fn test_empty_rejected() {
        let err = analyze_impulse_response(&[], 48000.0, &OCTAVE_BANDS).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_flat_band_reports_none() {
        // 64 samples are too short for the low bands to fall 25 dB
        let mut samples = vec![0.0; 64];
        samples[10] = 0.5;
        let analysis = analyze_impulse_response(&samples, 48000.0, &OCTAVE_BANDS).unwrap();
        assert!(analysis.bands.iter().any(|b| b.rt.is_none()));
        assert_eq!(analysis.bands.len(), 6);
    }
}
