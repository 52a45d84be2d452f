//! Level and angle helpers shared by the analysis and coverage crates.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - amplitude ratios (20·log10)
//! - [`db_to_power`] / [`power_to_db`] - power/energy ratios (10·log10)
//!
//! # Utilities
//!
//! - [`unit_clamp`] - Clamp to [0, 1], mapping NaN to 0
//! - [`wrap_angle`] - Wrap radians into (-π, π]
//! - [`ms_to_samples`] - Time conversion

use libm::{expf, logf, remainderf};

/// Smallest power/energy ratio considered distinct from silence.
pub const POWER_FLOOR: f32 = 1e-12;

/// Level reported for silence or cells outside an analysed area.
pub const SILENCE_DB: f32 = -120.0;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use sonora_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels, floored at [`SILENCE_DB`].
///
/// NaN input also maps to the floor.
///
/// # Example
/// ```rust
/// use sonora_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// assert_eq!(linear_to_db(0.0), -120.0);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    // 1e-6 amplitude is -120 dB
    if linear.is_nan() || linear <= 1e-6 {
        return SILENCE_DB;
    }
    logf(linear) * FACTOR
}

/// Convert a power level in dB to a linear power ratio (`10^(db/10)`).
#[inline]
pub fn db_to_power(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 10.0;
    expf(db * FACTOR)
}

/// Convert a linear power ratio to dB (`10·log10`).
///
/// Ratios at or below [`POWER_FLOOR`] (and NaN) map to [`SILENCE_DB`].
///
/// # Example
/// ```rust
/// use sonora_core::power_to_db;
///
/// assert!((power_to_db(0.5) - (-3.01)).abs() < 0.01);
/// assert_eq!(power_to_db(0.0), -120.0);
/// ```
#[inline]
pub fn power_to_db(power: f32) -> f32 {
    const FACTOR: f32 = 10.0 / core::f32::consts::LN_10;
    if power.is_nan() || power <= POWER_FLOOR {
        return SILENCE_DB;
    }
    logf(power) * FACTOR
}

/// Clamp to [0, 1]. NaN maps to 0.
#[inline]
pub fn unit_clamp(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Wrap an angle in radians into the range (-π, π].
///
/// Constant time for any finite input; infinities and NaN give NaN.
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    use core::f32::consts::{PI, TAU};
    // remainderf lands in [-π, π]
    let wrapped = remainderf(radians, TAU);
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Convert milliseconds to a whole number of samples (floored).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    (ms * sample_rate / 1000.0) as usize
}
