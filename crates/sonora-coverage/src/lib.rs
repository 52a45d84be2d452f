//! Sonora Coverage - indicative loudspeaker coverage over an audience area
//!
//! A planning model, not an acoustic solver: every emitter is a point
//! source with inverse-square spreading, tops add a quadratic off-axis loss
//! and a linear high-frequency loss, subs are omni and weighted down.
//! Contributions are summed as power per grid cell and the audience cells
//! are scored against a target level.
//!
//! - [`config`] - Room, stage, emitters and options (TOML via `serde`)
//! - [`engine`] - SPL evaluation and grid field
//! - [`score`] - Coverage, uniformity and balance scoring
//!
//! ## Example
//!
//! ```rust
//! use sonora_coverage::{SimulationConfig, rt_penalty_db, simulate_coverage};
//!
//! let mut config = SimulationConfig::default();
//! config.options.rt_penalty_db = rt_penalty_db(1.8);
//!
//! let sim = simulate_coverage(&config).unwrap();
//! println!("score {} (mean {:.1} dB)", sim.score.overall, sim.score.mean_db);
//! ```
//!
//! Every call recomputes the full grid; there is no incremental state, so
//! callers may move emitters freely between calls.

pub mod config;
pub mod engine;
pub mod error;
pub mod score;

pub use config::{
    AudienceBounds, Emitter, MAX_GRID, MAX_ROTATION_DEG, MIN_GRID, Room, SimulationConfig,
    SimulationOptions, Stage, rt_penalty_db,
};
pub use engine::{CoverageModel, Simulation, SplField, score_field, simulate_coverage, sub_spl, top_spl};
pub use error::{Result, SimulationError};
pub use score::{CoverageScore, score_levels};
