//! WAV files in and out of Sonora measurements.
//!
//! Recordings are read as mono `f32` buffers (multi-channel files are
//! averaged) together with their sample rate, ready for the analysis
//! functions. Stimuli are written as mono files.
//!
//! ```rust,ignore
//! use sonora_io::{SampleDepth, read_recording, write_mono};
//!
//! let rec = read_recording("room.wav")?;
//! println!("{:.1} s at {} Hz", rec.duration_secs(), rec.sample_rate);
//!
//! write_mono("sweep.wav", &sweep, 48000, SampleDepth::Float32)?;
//! ```

mod wav;

pub use wav::{Recording, SampleDepth, WavInfo, read_recording, read_wav_info, write_mono};

use std::path::PathBuf;

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV decode or encode error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file decoded but holds no sample frames.
    #[error("no audio in '{0}'")]
    Empty(PathBuf),

    /// The bit depth or sample format cannot be converted to `f32`.
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV I/O.
pub type Result<T> = std::result::Result<T, Error>;
