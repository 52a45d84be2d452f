//! Analysis windows and an in-place radix-2 FFT.
//!
//! The RTA runs many small frames of one size; a plain iterative
//! Cooley-Tukey transform over `rustfft`'s complex type keeps frame handling
//! allocation-free and needs no planner. Sweep deconvolution, which works on
//! large arbitrary buffers, uses `rustfft` directly.

use crate::error::{AnalysisError, Result};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Window function applied to each analysis frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// No tapering.
    Rectangular,
    /// Raised cosine, zero at both ends.
    #[default]
    Hann,
    /// Raised cosine on a 0.08 pedestal.
    Hamming,
    /// Three-term Blackman.
    Blackman,
}

impl Window {
    /// Coefficient `n` of a symmetric window of length `len`.
    pub fn coefficient(self, n: usize, len: usize) -> f32 {
        if len <= 1 {
            return 1.0;
        }
        let phase = 2.0 * PI * n as f32 / (len - 1) as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 * (1.0 - phase.cos()),
            Window::Hamming => 0.54 - 0.46 * phase.cos(),
            Window::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        }
    }

    /// All coefficients for a frame of `len` samples.
    pub fn coefficients(self, len: usize) -> Vec<f32> {
        (0..len).map(|n| self.coefficient(n, len)).collect()
    }
}

/// Reject sizes that are zero or not a power of two.
pub fn ensure_power_of_two(size: usize) -> Result<()> {
    if size.is_power_of_two() {
        Ok(())
    } else {
        Err(AnalysisError::invalid(format!(
            "fft size {size} is not a power of two"
        )))
    }
}

/// In-place forward FFT (unnormalized, `e^{-i...}` kernel).
///
/// Bit-reversal permutation followed by iterative butterfly passes.
pub fn fft_radix2(buffer: &mut [Complex<f32>]) -> Result<()> {
    let n = buffer.len();
    ensure_power_of_two(n)?;

    let mut j = 0;
    for i in 0..n {
        if i < j {
            buffer.swap(i, j);
        }
        let mut m = n >> 1;
        while m >= 1 && j >= m {
            j -= m;
            m >>= 1;
        }
        j += m;
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = -2.0 * PI / len as f32;
        let step = Complex::new(angle.cos(), angle.sin());
        for chunk in buffer.chunks_exact_mut(len) {
            let mut w = Complex::new(1.0f32, 0.0);
            let (lo, hi) = chunk.split_at_mut(half);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let v = *b * w;
                *b = *a - v;
                *a += v;
                w *= step;
            }
        }
        len <<= 1;
    }

    Ok(())
}
