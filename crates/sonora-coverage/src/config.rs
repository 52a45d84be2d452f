//! Room, stage, loudspeaker and option description of a simulation.
//!
//! Coordinates are meters with the origin in the stage-side left corner:
//! `x` runs across the room (0..width), `y` runs from the stage toward the
//! back wall (0..length).
//!
//! # TOML Format
//!
//! ```toml
//! [room]
//! width = 14.0
//! length = 18.0
//! height = 4.2
//!
//! [stage]
//! x = 7.0
//! y = 2.2
//! width = 8.0
//! depth = 3.0
//!
//! [[tops]]
//! label = "L"
//! x = 4.2
//! y = 2.2
//! spl_1m = 112.0
//! rotation_deg = 18.0
//!
//! [[subs]]
//! label = "S1"
//! x = 6.2
//! y = 2.2
//! spl_1m = 108.0
//!
//! [options]
//! target_db = 96.0
//! grid = 48
//! ```

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest grid resolution (cells per side).
pub const MIN_GRID: usize = 24;

/// Largest grid resolution (cells per side).
pub const MAX_GRID: usize = 96;

/// Largest accepted emitter rotation magnitude (degrees).
pub const MAX_ROTATION_DEG: f32 = 360.0;

/// Rectangular room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Extent along x (m).
    pub width: f32,
    /// Extent along y (m).
    pub length: f32,
    /// Ceiling height (m).
    pub height: f32,
}

impl Room {
    /// Whether `(x, y)` lies on or inside the room rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.length).contains(&y)
    }
}

/// Stage footprint, centered at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Center x (m).
    pub x: f32,
    /// Front edge y (m).
    pub y: f32,
    /// Extent along x (m).
    pub width: f32,
    /// Extent along y (m).
    pub depth: f32,
}

/// A loudspeaker: directional top or omni sub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    /// Display label ("L", "R", "S1", ...).
    pub label: String,
    /// Position x (m).
    pub x: f32,
    /// Position y (m).
    pub y: f32,
    /// On-axis SPL at 1 m (dB).
    pub spl_1m: f32,
    /// Toe-in from the stage centerline in degrees. Positive turns the
    /// axis toward +x. Ignored for subs.
    #[serde(default)]
    pub rotation_deg: f32,
}

impl Emitter {
    /// Create a directional emitter.
    pub fn top(label: impl Into<String>, x: f32, y: f32, spl_1m: f32, rotation_deg: f32) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            spl_1m,
            rotation_deg,
        }
    }

    /// Create an omni emitter.
    pub fn sub(label: impl Into<String>, x: f32, y: f32, spl_1m: f32) -> Self {
        Self::top(label, x, y, spl_1m, 0.0)
    }
}

/// Simulation options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Include sub contributions.
    pub use_subs: bool,
    /// Target SPL in the audience (dB).
    pub target_db: f32,
    /// Audience area front edge (m).
    pub audience_start_y: f32,
    /// Audience area back edge (m).
    pub audience_end_y: f32,
    /// Side aisle width excluded from the audience (m).
    pub audience_padding_x: f32,
    /// Grid cells per side; clamped to [`MIN_GRID`]..=[`MAX_GRID`].
    pub grid: usize,
    /// Off-axis attenuation strength, 0 (omni) to 1 (narrow).
    pub directivity: f32,
    /// High-frequency loss per 10 m of distance (dB).
    pub hf_loss_per_10m: f32,
    /// Flat reverberation penalty subtracted from every cell (dB).
    pub rt_penalty_db: f32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            use_subs: true,
            target_db: 96.0,
            audience_start_y: 4.0,
            audience_end_y: 17.2,
            audience_padding_x: 1.0,
            grid: 48,
            directivity: 0.65,
            hf_loss_per_10m: 1.5,
            rt_penalty_db: 0.0,
        }
    }
}

impl SimulationOptions {
    /// Grid resolution after clamping.
    pub fn grid_size(&self) -> usize {
        self.grid.clamp(MIN_GRID, MAX_GRID)
    }
}

/// Audience rectangle in room coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudienceBounds {
    /// Left edge (m).
    pub x0: f32,
    /// Right edge (m).
    pub x1: f32,
    /// Front edge (m).
    pub y0: f32,
    /// Back edge (m).
    pub y1: f32,
}

impl AudienceBounds {
    /// Whether `(x, y)` is inside the rectangle (edges included).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Complete description of a coverage simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Room rectangle.
    pub room: Room,
    /// Stage footprint.
    pub stage: Stage,
    /// Directional emitters.
    #[serde(default)]
    pub tops: Vec<Emitter>,
    /// Omni emitters.
    #[serde(default)]
    pub subs: Vec<Emitter>,
    /// Target, audience and model options.
    #[serde(default)]
    pub options: SimulationOptions,
}

impl Default for SimulationConfig {
    /// The standard preset: a 14 x 18 m room with a stereo pair toed in by
    /// 18 degrees and two subs at the stage lip.
    fn default() -> Self {
        Self {
            room: Room {
                width: 14.0,
                length: 18.0,
                height: 4.2,
            },
            stage: Stage {
                x: 7.0,
                y: 2.2,
                width: 8.0,
                depth: 3.0,
            },
            tops: vec![
                Emitter::top("L", 4.2, 2.2, 112.0, 18.0),
                Emitter::top("R", 9.8, 2.2, 112.0, -18.0),
            ],
            subs: vec![
                Emitter::sub("S1", 6.2, 2.2, 108.0),
                Emitter::sub("S2", 7.8, 2.2, 108.0),
            ],
            options: SimulationOptions::default(),
        }
    }
}

fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn ensure_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid(format!("{name} must be finite")))
    }
}

impl SimulationConfig {
    /// Audience rectangle derived from the options.
    pub fn audience(&self) -> AudienceBounds {
        AudienceBounds {
            x0: self.options.audience_padding_x,
            x1: self.room.width - self.options.audience_padding_x,
            y0: self.options.audience_start_y,
            y1: self.options.audience_end_y,
        }
    }

    /// Check geometry and options.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("room width", self.room.width)?;
        ensure_positive("room length", self.room.length)?;
        ensure_positive("room height", self.room.height)?;
        ensure_positive("stage width", self.stage.width)?;
        ensure_positive("stage depth", self.stage.depth)?;

        let opts = &self.options;
        ensure_finite("target", opts.target_db)?;
        ensure_finite("rt penalty", opts.rt_penalty_db)?;
        if !(0.0..=1.0).contains(&opts.directivity) {
            return Err(SimulationError::invalid(format!(
                "directivity must be in [0, 1], got {}",
                opts.directivity
            )));
        }
        if !(opts.hf_loss_per_10m.is_finite() && opts.hf_loss_per_10m >= 0.0) {
            return Err(SimulationError::invalid(format!(
                "hf loss must be non-negative, got {}",
                opts.hf_loss_per_10m
            )));
        }

        let audience = self.audience();
        let inside = audience.x0 >= 0.0
            && audience.x0 < audience.x1
            && audience.y0 >= 0.0
            && audience.y0 < audience.y1
            && audience.y1 <= self.room.length;
        if !inside {
            return Err(SimulationError::invalid(format!(
                "audience area x {}..{} y {}..{} is empty or outside the room",
                audience.x0, audience.x1, audience.y0, audience.y1
            )));
        }

        for emitter in self.tops.iter().chain(self.subs.iter()) {
            ensure_finite("emitter spl", emitter.spl_1m)?;
            let rotation = emitter.rotation_deg;
            if !(rotation.is_finite() && rotation.abs() <= MAX_ROTATION_DEG) {
                return Err(SimulationError::invalid(format!(
                    "emitter '{}' rotation {rotation} is outside ±{MAX_ROTATION_DEG} degrees",
                    emitter.label
                )));
            }
            if !self.room.contains(emitter.x, emitter.y) {
                return Err(SimulationError::invalid(format!(
                    "emitter '{}' at ({}, {}) is outside the room",
                    emitter.label, emitter.x, emitter.y
                )));
            }
        }
        Ok(())
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SimulationError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| SimulationError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Map an average RT60 to the reverberation penalty.
///
/// Rooms up to 1.2 s cost nothing; every further second costs 3 dB, up to
/// 6 dB.
pub fn rt_penalty_db(rt_avg: f32) -> f32 {
    if rt_avg.is_finite() {
        ((rt_avg - 1.2) * 3.0).clamp(0.0, 6.0)
    } else {
        0.0
    }
}
