//! Sonora Analysis - indicative room acoustics from captured audio
//!
//! Pure functions over sample buffers; capture and playback live elsewhere.
//!
//! - [`sweep`] - Exponential sine sweep stimulus and sweep deconvolution
//! - [`levels`] - RMS, peak, moving-RMS envelope, signal/noise estimate
//! - [`decay`] - Schroeder decay curve and the shared decay-rate fit
//! - [`rt`] - Broadband RT60/RT30 from a sweep response
//! - [`filterbank`] - Octave band-pass filter bank
//! - [`ir`] - Per-octave RT from an impulse recording
//! - [`fft`] - Analysis windows and a radix-2 FFT
//! - [`rta`] - Band spectrum snapshot and EQ cut suggestions
//! - [`confidence`] - Heuristic 0-100 measurement confidence
//!
//! Failures are recoverable and typed ([`AnalysisError`]); each carries a
//! hint the person measuring can act on.
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use sonora_analysis::{SweepParams, synthesize_sweep, estimate_broadband_rt};
//!
//! // 1. Generate the stimulus and play it (external)
//! let sweep = synthesize_sweep(&SweepParams::default())?;
//!
//! // 2. Record the room (external)
//!
//! // 3. Estimate reverberation
//! let rt = estimate_broadband_rt(&recording, 48000.0)?;
//! println!("RT60 {:.2} s (R² {:.2})", rt.rt60, rt.fit_r2);
//! ```
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, fit windows and rejected bands are
//! reported as `debug` events.

pub mod confidence;
pub mod decay;
pub mod error;
pub mod fft;
pub mod filterbank;
pub mod ir;
pub mod levels;
pub mod rt;
pub mod rta;
pub mod sweep;

pub use confidence::{Confidence, ConfidenceLevel, ConfidenceMetrics, compute_confidence};
pub use decay::{DecayFit, DecayFitParams, fit_decay, schroeder_db};
pub use error::{AnalysisError, Result};
pub use fft::{Window, fft_radix2};
pub use filterbank::{BandSpec, OCTAVE_BANDS, OctaveFilterBank};
pub use ir::{
    BandDecay, ImpulseAnalysis, ImpulsePeak, ImpulseWindow, analyze_impulse_response,
    analyze_sweep_response, find_impulse_peak, slice_around_impulse,
};
pub use levels::{LevelEstimate, estimate_levels, moving_rms, peak, rms};
pub use rt::{BandRtEstimate, BroadbandRt, estimate_broadband_rt, extrapolate_band_rts};
pub use rta::{
    BandLevel, EqSuggestion, RTA_CENTERS, RtaConfig, SpectrumSnapshot, snapshot_spectrum,
    suggest_eq_cuts,
};
pub use sweep::{SweepParams, deconvolve_sweep, inverse_filter, synthesize_sweep};
