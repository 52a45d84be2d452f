//! Heuristic confidence scores for measurements.
//!
//! These are weighted sums of clamped quality terms. They carry no physical
//! meaning; they only rank captures so a UI can say "measure again".

use serde::Serialize;
use sonora_core::unit_clamp;
use std::fmt;

/// Reference RT the broadband score considers typical for a room (seconds).
pub const REFERENCE_RT: f32 = 1.2;

/// Coarse confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ConfidenceLevel {
    /// 45 or below.
    Low,
    /// Above 45, up to 75.
    Medium,
    /// Above 75.
    High,
}

impl ConfidenceLevel {
    /// Label for a 0-100 score.
    pub fn from_score(overall: u8) -> Self {
        match overall {
            76.. => ConfidenceLevel::High,
            46..=75 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        };
        f.write_str(label)
    }
}

/// A 0-100 score with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Confidence {
    /// Score in 0..=100.
    pub overall: u8,
    /// Label derived from `overall`.
    pub level: ConfidenceLevel,
}

impl Confidence {
    fn from_raw(score: f32) -> Self {
        let overall = score.clamp(0.0, 100.0).round() as u8;
        Self {
            overall,
            level: ConfidenceLevel::from_score(overall),
        }
    }
}

/// Quality signals for the two measurement kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidenceMetrics {
    /// Sweep capture analysed by the broadband estimator.
    Broadband {
        /// Signal level in dBFS.
        signal_db: f32,
        /// Noise level in dBFS.
        noise_db: f32,
        /// Capture length in seconds.
        duration_secs: f32,
        /// Estimated RT60 in seconds.
        rt60: f32,
    },
    /// Impulse capture analysed per band.
    Impulse {
        /// Peak amplitude (0..1 full scale).
        peak: f32,
        /// Mean R² of the band fits.
        mean_r2: f32,
        /// Whether clipping is suspected.
        clip: bool,
    },
}

/// Score a measurement.
///
/// Broadband: `40·clamp((snr − 10)/30) + 20·clamp(duration/3) +
/// 40·clamp(1 − |rt − 1.2|/2.5)`.
///
/// Impulse: `45·clamp((peak − 0.15)/0.6) + 45·clamp(r²)`, plus 10 without
/// clipping or minus 20 with it.
///
/// ```rust
/// use sonora_analysis::confidence::{ConfidenceLevel, ConfidenceMetrics, compute_confidence};
///
/// let c = compute_confidence(&ConfidenceMetrics::Broadband {
///     signal_db: -10.0,
///     noise_db: -60.0,
///     duration_secs: 4.0,
///     rt60: 1.2,
/// });
/// assert_eq!(c.overall, 100);
/// assert_eq!(c.level, ConfidenceLevel::High);
/// ```
pub fn compute_confidence(metrics: &ConfidenceMetrics) -> Confidence {
    let score = match *metrics {
        ConfidenceMetrics::Broadband {
            signal_db,
            noise_db,
            duration_secs,
            rt60,
        } => {
            let snr = signal_db - noise_db;
            unit_clamp((snr - 10.0) / 30.0) * 40.0
                + unit_clamp(duration_secs / 3.0) * 20.0
                + unit_clamp(1.0 - (rt60 - REFERENCE_RT).abs() / 2.5) * 40.0
        }
        ConfidenceMetrics::Impulse {
            peak,
            mean_r2,
            clip,
        } => {
            unit_clamp((peak - 0.15) / 0.6) * 45.0
                + unit_clamp(mean_r2) * 45.0
                + if clip { -20.0 } else { 10.0 }
        }
    };
    Confidence::from_raw(score)
}
