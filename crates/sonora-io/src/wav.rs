//! Mono WAV reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Header details of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Channel count in the file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Sample frames (samples per channel).
    pub num_frames: u64,
    /// Whether samples are IEEE floats.
    pub is_float: bool,
}

impl WavInfo {
    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames as f64 / f64::from(self.sample_rate)
    }
}

impl From<hound::WavSpec> for WavInfo {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            num_frames: 0,
            is_float: spec.sample_format == SampleFormat::Float,
        }
    }
}

/// Read the header without decoding samples.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let mut info = WavInfo::from(reader.spec());
    info.num_frames = u64::from(reader.len()) / u64::from(info.channels.max(1));
    Ok(info)
}

/// A decoded capture, mixed down to mono.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Mono samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source file.
    pub source_channels: u16,
}

impl Recording {
    /// Sample rate as the `f32` the analysis functions take.
    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate as f32
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Read a WAV file as a mono recording.
///
/// Integer samples are scaled by `2^(bits-1)`; channels are averaged.
///
/// # Errors
///
/// [`Error::Empty`] for a file without sample frames, [`Error::Wav`] for
/// anything `hound` cannot decode.
pub fn read_recording<P: AsRef<Path>>(path: P) -> Result<Recording> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(Error::UnsupportedFormat(format!(
                    "{}-bit integer PCM",
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let samples: Vec<f32> = if channels > 1 {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        interleaved
    };

    if samples.is_empty() {
        return Err(Error::Empty(path.to_path_buf()));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        path = %path.display(),
        frames = samples.len(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        "read recording"
    );

    Ok(Recording {
        samples,
        sample_rate: spec.sample_rate,
        source_channels: spec.channels,
    })
}

/// Sample encoding for written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleDepth {
    /// 16-bit integer PCM.
    Int16,
    /// 24-bit integer PCM.
    Int24,
    /// 32-bit IEEE float.
    #[default]
    Float32,
}

impl SampleDepth {
    fn bits(self) -> u16 {
        match self {
            SampleDepth::Int16 => 16,
            SampleDepth::Int24 => 24,
            SampleDepth::Float32 => 32,
        }
    }
}

/// Write a mono buffer.
///
/// Integer depths clamp to full scale; the number of clamped samples is
/// returned so callers can warn about a clipped stimulus.
pub fn write_mono<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    depth: SampleDepth,
) -> Result<usize> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: depth.bits(),
        sample_format: match depth {
            SampleDepth::Float32 => SampleFormat::Float,
            SampleDepth::Int16 | SampleDepth::Int24 => SampleFormat::Int,
        },
    };
    let mut writer = WavWriter::create(path, spec)?;
    let mut clipped = 0;

    match depth {
        SampleDepth::Float32 => {
            for &sample in samples {
                if sample.abs() > 1.0 {
                    clipped += 1;
                }
                writer.write_sample(sample)?;
            }
        }
        SampleDepth::Int16 | SampleDepth::Int24 => {
            let full_scale = (1i32 << (depth.bits() - 1)) as f32;
            for &sample in samples {
                let scaled = sample * full_scale;
                if scaled < -full_scale || scaled > full_scale - 1.0 {
                    clipped += 1;
                }
                writer.write_sample(scaled.clamp(-full_scale, full_scale - 1.0) as i32)?;
            }
        }
    }

    writer.finalize()?;

    #[cfg(feature = "tracing")]
    if clipped > 0 {
        tracing::debug!(clipped, "samples exceeded full scale");
    }

    Ok(clipped)
}
