//! SPL field computation.
//!
//! Each cell sums the power of every emitter. Tops lose level with distance
//! (inverse square, no gain inside 1 m), with off-axis angle
//! (`directivity · 18 dB · (angle/85°)²`), and with a linear high-frequency
//! term. Subs only lose level with distance and are weighted by
//! [`SUB_POWER_WEIGHT`]. The configured reverberation penalty is subtracted
//! from the total.

use crate::config::{AudienceBounds, Emitter, SimulationConfig, SimulationOptions};
use crate::error::Result;
use crate::score::{CoverageScore, score_levels};
use serde::Serialize;
use sonora_core::{SILENCE_DB, db_to_power, power_to_db, unit_clamp, wrap_angle};

/// Weight of sub power in the total.
pub const SUB_POWER_WEIGHT: f64 = 0.35;

/// Off-axis angle at which directivity loss reaches its maximum (degrees).
pub const DIRECTIVITY_ANGLE_DEG: f32 = 85.0;

/// Directivity loss at [`DIRECTIVITY_ANGLE_DEG`] for directivity 1 (dB).
pub const DIRECTIVITY_MAX_LOSS_DB: f32 = 18.0;

/// Distance from an emitter, with the near field clamped to 1 m.
fn spreading_loss_db(distance: f32) -> f32 {
    20.0 * distance.max(1.0).log10()
}

/// Level of an omni emitter at `(x, y)`.
pub fn sub_spl(sub: &Emitter, x: f32, y: f32) -> f32 {
    let distance = (x - sub.x).hypot(y - sub.y);
    sub.spl_1m - spreading_loss_db(distance)
}

/// Level of a directional emitter at `(x, y)`.
pub fn top_spl(top: &Emitter, x: f32, y: f32, options: &SimulationOptions) -> f32 {
    let dx = x - top.x;
    let dy = y - top.y;
    let distance = dx.hypot(dy);

    // rotation is toe-in from the +y centerline
    let forward = (90.0 - top.rotation_deg).to_radians();
    let off_axis = wrap_angle(dy.atan2(dx) - forward).abs();
    let normalized = unit_clamp(off_axis / DIRECTIVITY_ANGLE_DEG.to_radians());
    let directivity_loss = options.directivity * DIRECTIVITY_MAX_LOSS_DB * normalized * normalized;

    let hf_loss = distance / 10.0 * options.hf_loss_per_10m;

    top.spl_1m - spreading_loss_db(distance) - directivity_loss - hf_loss
}

/// Validated view of a configuration that evaluates SPL anywhere.
#[derive(Debug, Clone, Copy)]
pub struct CoverageModel<'a> {
    config: &'a SimulationConfig,
}

impl<'a> CoverageModel<'a> {
    /// Validate `config` and wrap it.
    pub fn new(config: &'a SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The wrapped configuration.
    pub fn config(&self) -> &SimulationConfig {
        self.config
    }

    /// Predicted SPL at `(x, y)` with the reverberation penalty applied.
    ///
    /// Evaluates any point, inside the audience area or not.
    pub fn spl_at(&self, x: f32, y: f32) -> f32 {
        let options = &self.config.options;
        // accumulate in f64; each term can reach 1e13 or more
        let mut power = 0.0f64;
        for top in &self.config.tops {
            power += f64::from(db_to_power(top_spl(top, x, y, options)));
        }
        if options.use_subs {
            for sub in &self.config.subs {
                power += f64::from(db_to_power(sub_spl(sub, x, y))) * SUB_POWER_WEIGHT;
            }
        }
        power_to_db(power as f32) - options.rt_penalty_db
    }

    /// Compute the field over the room grid.
    pub fn field(&self) -> SplField {
        let grid = self.config.options.grid_size();
        let audience = self.config.audience();
        let room = &self.config.room;

        let mut values = Vec::with_capacity(grid * grid);
        let mut in_audience = Vec::with_capacity(grid * grid);
        for yi in 0..grid {
            let y = room.length * yi as f32 / (grid - 1) as f32;
            for xi in 0..grid {
                let x = room.width * xi as f32 / (grid - 1) as f32;
                if audience.contains(x, y) {
                    values.push(self.spl_at(x, y));
                    in_audience.push(true);
                } else {
                    values.push(SILENCE_DB);
                    in_audience.push(false);
                }
            }
        }

        let (min, max) = values
            .iter()
            .zip(in_audience.iter())
            .filter(|&(_, &inside)| inside)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (&v, _)| {
                (lo.min(v), hi.max(v))
            });
        let (min, max) = if min.is_finite() {
            (min, max)
        } else {
            (SILENCE_DB, SILENCE_DB)
        };

        SplField {
            grid,
            width: room.width,
            length: room.length,
            values,
            in_audience,
            min,
            max,
        }
    }
}

/// SPL over a square grid spanning the room.
///
/// Row-major from the stage side: index `yi * grid + xi`. Cells outside the
/// audience area hold [`SILENCE_DB`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplField {
    /// Cells per side.
    pub grid: usize,
    /// Room width the grid spans (m).
    pub width: f32,
    /// Room length the grid spans (m).
    pub length: f32,
    /// Levels in dB, `grid * grid` entries.
    pub values: Vec<f32>,
    /// Whether each cell lies in the audience area.
    #[serde(skip)]
    pub in_audience: Vec<bool>,
    /// Lowest audience level (dB).
    pub min: f32,
    /// Highest audience level (dB).
    pub max: f32,
}

impl SplField {
    /// Level of cell `(xi, yi)`.
    pub fn value(&self, xi: usize, yi: usize) -> Option<f32> {
        if xi < self.grid && yi < self.grid {
            self.values.get(yi * self.grid + xi).copied()
        } else {
            None
        }
    }

    /// Room coordinates of cell `(xi, yi)`.
    pub fn cell_position(&self, xi: usize, yi: usize) -> (f32, f32) {
        let step = (self.grid.max(2) - 1) as f32;
        (
            self.width * xi as f32 / step,
            self.length * yi as f32 / step,
        )
    }

    /// Levels of the cells inside the audience area.
    pub fn audience_levels(&self) -> Vec<f32> {
        self.values
            .iter()
            .zip(self.in_audience.iter())
            .filter(|&(_, &inside)| inside)
            .map(|(&v, _)| v)
            .collect()
    }
}

/// Score a field's audience cells against `target_db`.
pub fn score_field(field: &SplField, target_db: f32) -> Result<CoverageScore> {
    score_levels(&field.audience_levels(), target_db)
}

/// Output of a coverage simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// SPL grid.
    pub field: SplField,
    /// Audience rectangle that was scored.
    pub bounds: AudienceBounds,
    /// Score of the audience cells.
    pub score: CoverageScore,
}

/// Run a full coverage simulation.
///
/// Fails only on invalid geometry or options. When the audience area holds
/// too few grid cells the score is [`CoverageScore::degenerate`].
///
/// ```rust
/// use sonora_coverage::{SimulationConfig, simulate_coverage};
///
/// let sim = simulate_coverage(&SimulationConfig::default()).unwrap();
/// assert_eq!(sim.field.values.len(), 48 * 48);
/// assert!(sim.score.overall > 0);
/// ```
pub fn simulate_coverage(config: &SimulationConfig) -> Result<Simulation> {
    let model = CoverageModel::new(config)?;
    let field = model.field();
    let score = score_field(&field, config.options.target_db)
        .unwrap_or_else(|_| CoverageScore::degenerate());

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "coverage: grid {}, {} audience cells, score {}",
        field.grid,
        score.cells,
        score.overall
    );

    Ok(Simulation {
        field,
        bounds: config.audience(),
        score,
    })
}
