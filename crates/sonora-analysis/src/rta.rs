//! Real-time-analyzer style spectrum snapshot and corrective EQ suggestions.
//!
//! Frames are windowed, transformed with [`fft_radix2`], and every bin in
//! the analysis band is credited to the nearest of [`RTA_CENTERS`] by
//! log-frequency distance. Band magnitudes are averaged, converted to dB and
//! normalized so the loudest band reads 0 dB.

use crate::error::{AnalysisError, Result, ensure_sample_rate};
use crate::fft::{Window, ensure_power_of_two, fft_radix2};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use sonora_core::{SILENCE_DB, linear_to_db};

/// Third-octave-like band centers reported by the RTA (Hz).
pub const RTA_CENTERS: [f32; 28] = [
    31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0, 500.0, 630.0,
    800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0, 8000.0, 10000.0,
    12500.0, 16000.0,
];

/// RTA analysis settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtaConfig {
    /// Frame length; must be a power of two.
    pub fft_size: usize,
    /// Window applied to each frame.
    pub window: Window,
    /// Lowest bin frequency credited to a band (Hz).
    pub min_hz: f32,
    /// Highest bin frequency credited to a band (Hz).
    pub max_hz: f32,
}

impl Default for RtaConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            window: Window::Hann,
            min_hz: 25.0,
            max_hz: 17000.0,
        }
    }
}

impl RtaConfig {
    /// Default settings with a different frame length.
    pub fn with_fft_size(fft_size: usize) -> Self {
        Self {
            fft_size,
            ..Self::default()
        }
    }

    /// Check the frame length and analysis band.
    pub fn validate(&self) -> Result<()> {
        ensure_power_of_two(self.fft_size)?;
        if self.fft_size < 2 {
            return Err(AnalysisError::invalid("fft size must be at least 2"));
        }
        if !(self.min_hz.is_finite() && self.max_hz.is_finite() && self.min_hz < self.max_hz) {
            return Err(AnalysisError::invalid(format!(
                "analysis band {}..{} Hz is empty",
                self.min_hz, self.max_hz
            )));
        }
        Ok(())
    }
}

/// Level of one RTA band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandLevel {
    /// Band center in Hz.
    pub hz: f32,
    /// Level relative to the loudest band (dB, ≤ 0).
    pub relative_db: f32,
    /// Number of FFT bins (over all frames) averaged into the band.
    pub bins: usize,
}

/// Normalized band spectrum of a recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumSnapshot {
    /// One entry per [`RTA_CENTERS`] value, ascending.
    pub bands: Vec<BandLevel>,
    /// Number of frames analysed.
    pub frames: usize,
}

impl SpectrumSnapshot {
    /// The band reading 0 dB (the first one on ties).
    pub fn loudest(&self) -> Option<&BandLevel> {
        self.bands
            .iter()
            .reduce(|best, b| if b.relative_db > best.relative_db { b } else { best })
    }
}

/// Index of the center nearest to `hz` in log-frequency.
pub fn nearest_center(hz: f32) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, &center) in RTA_CENTERS.iter().enumerate() {
        let distance = (hz / center).log2().abs();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

/// Band spectrum of `samples` (ambient noise, pink noise, program material).
///
/// Frames of `config.fft_size` samples advance by half a frame; trailing
/// samples that do not fill a frame are ignored. Bands that receive no bins
/// report [`SILENCE_DB`] relative level.
///
/// # Errors
///
/// [`AnalysisError::InvalidInput`] when the FFT size is not a power of two,
/// the band is empty, or the buffer is shorter than one frame.
pub fn snapshot_spectrum(
    samples: &[f32],
    sample_rate: f32,
    config: &RtaConfig,
) -> Result<SpectrumSnapshot> {
    ensure_sample_rate(sample_rate)?;
    config.validate()?;

    let size = config.fft_size;
    if samples.len() < size {
        return Err(AnalysisError::invalid(format!(
            "need at least {size} samples for one frame, got {}",
            samples.len()
        )));
    }

    // precompute bin -> band mapping for the analysis band
    let bin_hz = sample_rate / size as f32;
    let bin_bands: Vec<(usize, usize)> = (1..size / 2)
        .filter_map(|k| {
            let hz = k as f32 * bin_hz;
            (hz >= config.min_hz && hz <= config.max_hz).then(|| (k, nearest_center(hz)))
        })
        .collect();

    let window = config.window.coefficients(size);
    let hop = size / 2;
    let mut sums = [0.0f64; RTA_CENTERS.len()];
    let mut counts = [0usize; RTA_CENTERS.len()];
    let mut frame = vec![Complex::new(0.0f32, 0.0); size];
    let mut frames = 0;

    let mut start = 0;
    while start + size <= samples.len() {
        for ((slot, &x), &w) in frame
            .iter_mut()
            .zip(&samples[start..start + size])
            .zip(window.iter())
        {
            *slot = Complex::new(x * w, 0.0);
        }
        fft_radix2(&mut frame)?;

        for &(k, band) in &bin_bands {
            sums[band] += f64::from(frame[k].norm());
            counts[band] += 1;
        }
        frames += 1;
        start += hop;
    }

    let absolute: Vec<f32> = sums
        .iter()
        .zip(counts.iter())
        .map(|(&sum, &count)| {
            if count == 0 {
                SILENCE_DB
            } else {
                linear_to_db((sum / count as f64) as f32)
            }
        })
        .collect();

    let max_db = absolute
        .iter()
        .zip(counts.iter())
        .filter(|(_, c)| **c > 0)
        .map(|(&db, _)| db)
        .fold(f32::NEG_INFINITY, f32::max);

    let bands = RTA_CENTERS
        .iter()
        .zip(absolute.iter().zip(counts.iter()))
        .map(|(&hz, (&db, &bins))| BandLevel {
            hz,
            relative_db: if bins == 0 || !max_db.is_finite() {
                SILENCE_DB
            } else {
                (db - max_db).max(SILENCE_DB)
            },
            bins,
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!("rta snapshot: {frames} frames of {size}, {} bins per frame", bin_bands.len());

    Ok(SpectrumSnapshot { bands, frames })
}

/// Bands above this relative level are candidates for a cut (dB).
pub const EQ_THRESHOLD_DB: f32 = -6.0;

/// Band range in which cuts are suggested (Hz).
pub const EQ_RANGE_HZ: (f32, f32) = (80.0, 8000.0);

/// Smallest and largest proposed cut (dB).
pub const EQ_CUT_RANGE_DB: (f32, f32) = (2.0, 6.0);

/// Most suggestions returned.
pub const MAX_EQ_SUGGESTIONS: usize = 6;

/// A proposed corrective cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EqSuggestion {
    /// Band center in Hz.
    pub hz: f32,
    /// Cut depth in whole dB (positive number).
    pub cut_db: f32,
}

impl EqSuggestion {
    /// Filter gain for the cut (negative dB).
    pub fn gain_db(&self) -> f32 {
        -self.cut_db
    }
}

/// Propose cuts for prominent bands.
///
/// A band between 80 Hz and 8 kHz reading above -6 dB gets a cut of
/// `clamp(relative + 6, 2, 6)` dB, rounded. At most six bands are kept,
/// chosen by prominence and returned in ascending frequency.
pub fn suggest_eq_cuts(bands: &[BandLevel]) -> Vec<EqSuggestion> {
    let mut candidates: Vec<&BandLevel> = bands
        .iter()
        .filter(|b| {
            b.relative_db > EQ_THRESHOLD_DB && b.hz >= EQ_RANGE_HZ.0 && b.hz <= EQ_RANGE_HZ.1
        })
        .collect();

    candidates.sort_by(|a, b| b.relative_db.total_cmp(&a.relative_db));
    candidates.truncate(MAX_EQ_SUGGESTIONS);
    candidates.sort_by(|a, b| a.hz.total_cmp(&b.hz));

    candidates
        .into_iter()
        .map(|b| EqSuggestion {
            hz: b.hz,
            cut_db: (b.relative_db - EQ_THRESHOLD_DB)
                .clamp(EQ_CUT_RANGE_DB.0, EQ_CUT_RANGE_DB.1)
                .round(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(hz: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate).sin())
            .collect()
    }

    fn level(hz: f32, relative_db: f32) -> BandLevel {
        BandLevel {
            hz,
            relative_db,
            bins: 1,
        }
    }

    #[test]
    fn test_nearest_center() {
        assert_eq!(RTA_CENTERS[nearest_center(1000.0)], 1000.0);
        assert_eq!(RTA_CENTERS[nearest_center(1100.0)], 1000.0);
        assert_eq!(RTA_CENTERS[nearest_center(1150.0)], 1250.0);
        assert_eq!(RTA_CENTERS[nearest_center(5.0)], 31.5);
        assert_eq!(RTA_CENTERS[nearest_center(20000.0)], 16000.0);
    }

    #[test]
    fn test_tone_peaks_at_nearest_center() {
        let sr = 48000.0;
        for hz in [100.0, 440.0, 1000.0, 3000.0, 7000.0] {
            let snapshot = snapshot_spectrum(&tone(hz, sr, 48000), sr, &RtaConfig::default()).unwrap();
            let loudest = snapshot.loudest().unwrap();
            assert_eq!(loudest.hz, RTA_CENTERS[nearest_center(hz)], "tone {hz}");
            assert_eq!(loudest.relative_db, 0.0);
            assert!(snapshot.bands.iter().all(|b| b.relative_db <= 0.0));
        }
    }

    #[test]
    fn test_frame_count() {
        let snapshot = snapshot_spectrum(&vec![0.1; 4096], 48000.0, &RtaConfig::with_fft_size(1024)).unwrap();
        // starts at 0, 512, ..., 3072
        assert_eq!(snapshot.frames, 7);
        assert_eq!(snapshot.bands.len(), 28);
    }

    #[test]
    fn test_empty_bands_report_floor() {
        // 2048 points at 48 kHz: 23.4 Hz bins, nothing lands near 31.5 Hz
        let snapshot = snapshot_spectrum(&tone(1000.0, 48000.0, 4096), 48000.0, &RtaConfig::default()).unwrap();
        let low = snapshot.bands[0];
        assert_eq!(low.hz, 31.5);
        assert_eq!(low.bins, 0);
        assert_eq!(low.relative_db, SILENCE_DB);
    }

    #[test]
    fn test_rejects_bad_config() {
        let samples = vec![0.0; 4096];
        assert!(snapshot_spectrum(&samples, 48000.0, &RtaConfig::with_fft_size(1000)).is_err());
        assert!(snapshot_spectrum(&samples[..100], 48000.0, &RtaConfig::default()).is_err());
        let inverted = RtaConfig {
            min_hz: 1000.0,
            max_hz: 100.0,
            ..RtaConfig::default()
        };
        assert!(snapshot_spectrum(&samples, 48000.0, &inverted).is_err());
    }

    #[test]
    fn test_other_windows_still_find_tone() {
        let sr = 48000.0;
        for window in [Window::Rectangular, Window::Hamming, Window::Blackman] {
            let config = RtaConfig {
                window,
                ..RtaConfig::default()
            };
            let snapshot = snapshot_spectrum(&tone(1000.0, sr, 16384), sr, &config).unwrap();
            assert_eq!(snapshot.loudest().unwrap().hz, 1000.0, "{window:?}");
        }
    }

    #[test]
    fn test_eq_cut_depths() {
        let bands = [level(100.0, 0.0), level(200.0, -3.4), level(400.0, -5.0), level(800.0, -8.0)];
        let cuts = suggest_eq_cuts(&bands);
        assert_eq!(
            cuts,
            vec![
                EqSuggestion { hz: 100.0, cut_db: 6.0 },
                EqSuggestion { hz: 200.0, cut_db: 3.0 },
                EqSuggestion { hz: 400.0, cut_db: 2.0 },
            ]
        );
        assert_eq!(cuts[0].gain_db(), -6.0);
    }

    #[test]
    fn test_eq_ignores_out_of_range_bands() {
        let bands = [level(63.0, 0.0), level(10000.0, 0.0), level(1000.0, -6.0)];
        assert!(suggest_eq_cuts(&bands).is_empty());
    }

    #[test]
    fn test_eq_keeps_most_prominent_six() {
        let bands: Vec<BandLevel> = RTA_CENTERS
            .iter()
            .enumerate()
            .map(|(i, &hz)| level(hz, -((i % 5) as f32)))
            .collect();
        let cuts = suggest_eq_cuts(&bands);
        assert_eq!(cuts.len(), MAX_EQ_SUGGESTIONS);
        assert!(cuts.windows(2).all(|w| w[0].hz < w[1].hz));
        // the four 0 dB bands in range, then the first two -1 dB bands
        let hz: Vec<f32> = cuts.iter().map(|c| c.hz).collect();
        assert_eq!(hz, vec![100.0, 125.0, 315.0, 400.0, 1000.0, 3150.0]);
        assert_eq!(cuts[0].cut_db, 6.0);
        assert_eq!(cuts[1].cut_db, 5.0);
    }
}
