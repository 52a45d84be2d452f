//! Error types for analysis operations.

use thiserror::Error;

/// Recoverable analysis failures.
///
/// None of these are fatal: a measurement UI is expected to show
/// [`AnalysisError::hint`] and let the user capture again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// The envelope peak never rose above the noise floor.
    #[error("signal too low (peak {peak:.2e})")]
    SignalTooLow {
        /// Peak level that was found (linear amplitude).
        peak: f32,
    },

    /// The decay window was too short or too noisy to regress.
    #[error("insufficient decay (window of {span} samples)")]
    InsufficientDecay {
        /// Samples between the start and end crossings (0 when a crossing is missing).
        span: usize,
    },

    /// A parameter or buffer was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    /// Create an invalid input error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(reason.into())
    }

    /// Corrective hint for the person holding the microphone.
    pub fn hint(&self) -> &'static str {
        match self {
            AnalysisError::SignalTooLow { .. } => {
                "Increase the stimulus volume and reduce background noise."
            }
            AnalysisError::InsufficientDecay { .. } => {
                "Leave more silence after the stimulus so the room can decay."
            }
            AnalysisError::InvalidInput(_) => "Check the capture settings and try again.",
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Reject non-finite or non-positive sample rates.
pub(crate) fn ensure_sample_rate(sample_rate: f32) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid(format!(
            "sample rate must be positive, got {sample_rate}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_too_low_display() {
        let err = AnalysisError::SignalTooLow { peak: 1e-7 };
        assert!(err.to_string().starts_with("signal too low"), "got: {err}");
    }

    #[test]
    fn insufficient_decay_display() {
        let err = AnalysisError::InsufficientDecay { span: 4 };
        assert_eq!(err.to_string(), "insufficient decay (window of 4 samples)");
    }

    #[test]
    fn invalid_factory() {
        let err = AnalysisError::invalid("fft size 1000 is not a power of two");
        assert_eq!(
            err,
            AnalysisError::InvalidInput("fft size 1000 is not a power of two".to_string())
        );
    }

    #[test]
    fn sample_rate_check() {
        assert!(ensure_sample_rate(48000.0).is_ok());
        assert!(ensure_sample_rate(0.0).is_err());
        assert!(ensure_sample_rate(f32::NAN).is_err());
        assert!(ensure_sample_rate(f32::INFINITY).is_err());
    }

    #[test]
    fn hints_are_specific() {
        let low = AnalysisError::SignalTooLow { peak: 0.0 }.hint();
        let decay = AnalysisError::InsufficientDecay { span: 0 }.hint();
        assert_ne!(low, decay);
        assert!(low.contains("volume"));
        assert!(decay.contains("silence"));
    }
}
