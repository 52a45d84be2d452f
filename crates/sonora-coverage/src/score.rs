//! Coverage scoring of an SPL field against a target level.

use crate::error::{Result, SimulationError};
use serde::Serialize;
use sonora_core::{SILENCE_DB, unit_clamp};

/// Fewest audience cells a score is computed from.
pub const MIN_SCORED_CELLS: usize = 10;

/// Tolerance around the target counted as covered (dB).
pub const TARGET_WINDOW_DB: f32 = 6.0;

/// Standard deviation at which uniformity reaches zero (dB).
const UNIFORMITY_SPAN_DB: f32 = 10.0;

const COVERAGE_WEIGHT: f32 = 0.45;
const UNIFORMITY_WEIGHT: f32 = 0.45;
const BALANCE_WEIGHT: f32 = 0.10;

/// Summary of how well a field meets its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageScore {
    /// Weighted overall score, 0..=100.
    pub overall: u8,
    /// Mean SPL over audience cells (dB).
    pub mean_db: f32,
    /// Standard deviation of SPL over audience cells (dB).
    pub std_db: f32,
    /// Share of cells within ±6 dB of target, 0..=100.
    pub coverage_pct: u8,
    /// `1 − std/10`, as a percentage.
    pub uniformity_pct: u8,
    /// How evenly misses split between too quiet and too loud, 0..=100.
    pub balance_pct: u8,
    /// Number of cells scored.
    pub cells: usize,
}

impl CoverageScore {
    /// Score reported when there are too few cells to judge.
    pub fn degenerate() -> Self {
        Self {
            overall: 0,
            mean_db: SILENCE_DB,
            std_db: 0.0,
            coverage_pct: 0,
            uniformity_pct: 0,
            balance_pct: 0,
            cells: 0,
        }
    }

    /// Whether this is the [`degenerate`](Self::degenerate) score.
    pub fn is_degenerate(&self) -> bool {
        self.cells == 0
    }
}

fn percent(fraction: f32) -> u8 {
    (unit_clamp(fraction) * 100.0).round() as u8
}

/// Score audience-cell levels against `target_db`.
///
/// - coverage: fraction of cells within ±6 dB of target
/// - uniformity: `clamp(1 − std/10)`
/// - balance: `1 − |under − over| / n` where under/over count cells more
///   than 6 dB below/above target
///
/// `overall = round(100·(0.45·coverage + 0.45·uniformity + 0.10·balance))`.
///
/// # Errors
///
/// [`SimulationError::DegenerateScore`] when fewer than
/// [`MIN_SCORED_CELLS`] levels are given.
pub fn score_levels(levels: &[f32], target_db: f32) -> Result<CoverageScore> {
    let n = levels.len();
    if n < MIN_SCORED_CELLS {
        #[cfg(feature = "tracing")]
        tracing::debug!("coverage score skipped: {n} cells");
        return Err(SimulationError::DegenerateScore { cells: n });
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut under = 0usize;
    let mut over = 0usize;
    for &level in levels {
        let v = f64::from(level);
        sum += v;
        sum_sq += v * v;
        let diff = level - target_db;
        if diff < -TARGET_WINDOW_DB {
            under += 1;
        } else if diff > TARGET_WINDOW_DB {
            over += 1;
        }
    }

    let count = n as f64;
    let mean = sum / count;
    let std = (sum_sq / count - mean * mean).max(0.0).sqrt();

    let coverage = 1.0 - (under + over) as f32 / n as f32;
    let uniformity = unit_clamp(1.0 - std as f32 / UNIFORMITY_SPAN_DB);
    let balance = 1.0 - under.abs_diff(over) as f32 / n as f32;

    let overall = (100.0
        * (COVERAGE_WEIGHT * unit_clamp(coverage)
            + UNIFORMITY_WEIGHT * uniformity
            + BALANCE_WEIGHT * unit_clamp(balance)))
    .round() as u8;

    Ok(CoverageScore {
        overall,
        mean_db: mean as f32,
        std_db: std as f32,
        coverage_pct: percent(coverage),
        uniformity_pct: percent(uniformity),
        balance_pct: percent(balance),
        cells: n,
    })
}
