//! Sonora Core - filter and level primitives for room analysis
//!
//! The small numeric layer the analysis and coverage crates share:
//!
//! - [`Biquad`] - Second-order IIR section (transposed Direct Form II) with
//!   RBJ cookbook band-pass coefficients
//! - Level math: [`db_to_linear`], [`linear_to_db`], [`db_to_power`], [`power_to_db`]
//! - Small helpers: [`unit_clamp`], [`wrap_angle`], [`ms_to_samples`]
//!
//! # no_std Support
//!
//! Everything here is allocation-free and builds without `std`:
//!
//! ```toml
//! [dependencies]
//! sonora-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod math;

pub use biquad::{Biquad, bandpass_skirt_coefficients};
pub use math::{
    POWER_FLOOR, SILENCE_DB, db_to_linear, db_to_power, linear_to_db, ms_to_samples, power_to_db,
    unit_clamp, wrap_angle,
};
