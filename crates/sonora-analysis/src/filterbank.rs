//! Octave band-pass filter bank for per-band decay analysis.
//!
//! Each band is a single constant-skirt-gain RBJ band-pass section. The
//! skirts are wide (Q ≈ 1.4 is roughly one octave) but the decay fit only
//! cares about the slope of the band energy, not about flat passbands.
//!
//! # Example
//!
//! ```rust
//! use sonora_analysis::filterbank::{OCTAVE_BANDS, OctaveFilterBank};
//!
//! let mut bank = OctaveFilterBank::new(48000.0, &OCTAVE_BANDS).unwrap();
//!
//! let signal = vec![0.0; 4800];
//! let extracted = bank.extract(&signal);
//! assert_eq!(extracted.len(), 6);
//! ```

use crate::error::{AnalysisError, Result, ensure_sample_rate};
use serde::Serialize;
use sonora_core::{Biquad, bandpass_skirt_coefficients};

/// Q used for octave-wide analysis bands.
pub const OCTAVE_Q: f32 = 1.4;

/// A band-pass analysis band: center frequency and Q.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandSpec {
    /// Center frequency in Hz.
    pub center_hz: f32,
    /// Q factor (bandwidth = center / Q).
    pub q: f32,
}

impl BandSpec {
    /// Create a band with an explicit Q.
    pub const fn new(center_hz: f32, q: f32) -> Self {
        Self { center_hz, q }
    }

    /// Create an octave-wide band ([`OCTAVE_Q`]).
    pub const fn octave(center_hz: f32) -> Self {
        Self::new(center_hz, OCTAVE_Q)
    }

    /// Check the band can be realised at `sample_rate`.
    pub fn validate(&self, sample_rate: f32) -> Result<()> {
        if !(self.center_hz.is_finite() && self.center_hz > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "band center must be positive, got {}",
                self.center_hz
            )));
        }
        if self.center_hz >= sample_rate / 2.0 {
            return Err(AnalysisError::invalid(format!(
                "band center {} Hz is at or above Nyquist ({} Hz)",
                self.center_hz,
                sample_rate / 2.0
            )));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return Err(AnalysisError::invalid(format!("band Q must be positive, got {}", self.q)));
        }
        Ok(())
    }
}

/// The six octave bands reported by impulse analysis (125 Hz to 4 kHz).
pub const OCTAVE_BANDS: [BandSpec; 6] = [
    BandSpec::octave(125.0),
    BandSpec::octave(250.0),
    BandSpec::octave(500.0),
    BandSpec::octave(1000.0),
    BandSpec::octave(2000.0),
    BandSpec::octave(4000.0),
];

/// A bank of band-pass filters, one biquad per band.
#[derive(Debug, Clone)]
pub struct OctaveFilterBank {
    filters: Vec<(BandSpec, Biquad)>,
    sample_rate: f32,
}

impl OctaveFilterBank {
    /// Create a filter bank for the given bands.
    ///
    /// Fails with [`AnalysisError::InvalidInput`] when any band is malformed
    /// or not representable at `sample_rate`.
    pub fn new(sample_rate: f32, bands: &[BandSpec]) -> Result<Self> {
        ensure_sample_rate(sample_rate)?;
        let filters = bands
            .iter()
            .map(|&band| {
                band.validate(sample_rate)?;
                let coeffs = bandpass_skirt_coefficients(band.center_hz, band.q, sample_rate);
                Ok((band, Biquad::from_coefficients(coeffs)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            filters,
            sample_rate,
        })
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.filters.len()
    }

    /// Band specifications in construction order.
    pub fn bands(&self) -> Vec<BandSpec> {
        self.filters.iter().map(|(band, _)| *band).collect()
    }

    /// Sample rate the filters were designed for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Filter `signal` through every band, starting from cleared state.
    ///
    /// Returns one output vector per band, in construction order.
    pub fn extract(&mut self, signal: &[f32]) -> Vec<Vec<f32>> {
        self.filters
            .iter_mut()
            .map(|(_, filter)| {
                filter.clear();
                let mut out = vec![0.0; signal.len()];
                filter.process_block(signal, &mut out);
                out
            })
            .collect()
    }

    /// Filter `signal` through a single band.
    ///
    /// Returns `None` when `band_index` is out of range.
    pub fn extract_band(&mut self, signal: &[f32], band_index: usize) -> Option<Vec<f32>> {
        let (_, filter) = self.filters.get_mut(band_index)?;
        filter.clear();
        let mut out = vec![0.0; signal.len()];
        filter.process_block(signal, &mut out);
        Some(out)
    }
}
