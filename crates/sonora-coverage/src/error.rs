//! Error types for coverage simulation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or scoring a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Geometry or options are out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few audience cells to score.
    #[error("degenerate score: only {cells} audience cells")]
    DegenerateScore {
        /// Number of cells that were inside the audience area.
        cells: usize,
    },

    /// Failed to read a configuration file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a configuration file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SimulationError {
    /// Create an invalid input error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput(reason.into())
    }

    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimulationError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimulationError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
