//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use serde::Serialize;
use sonora_analysis::{AnalysisError, Confidence};
use sonora_io::{Recording, read_recording};
use std::path::Path;

/// Attach the measurement hint to an analysis failure.
pub fn with_hint(err: AnalysisError) -> anyhow::Error {
    let hint = err.hint();
    anyhow::Error::new(err).context(hint)
}

/// Read a recording and report its basic shape.
pub fn load_recording(path: &Path) -> anyhow::Result<Recording> {
    let rec = read_recording(path).with_context(|| format!("reading {}", path.display()))?;
    println!(
        "  {} samples, {} Hz, {:.2}s{}",
        rec.samples.len(),
        rec.sample_rate,
        rec.duration_secs(),
        if rec.source_channels > 1 {
            format!(" (mixed down from {} channels)", rec.source_channels)
        } else {
            String::new()
        }
    );
    Ok(rec)
}

/// Write `value` as pretty JSON to `path`, or to stdout when `path` is `-`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if path == Path::new("-") {
        println!("{json}");
    } else {
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Saved JSON to {}", path.display());
    }
    Ok(())
}

/// One-line confidence summary.
pub fn confidence_line(confidence: &Confidence) -> String {
    format!("Confidence: {} ({}/100)", confidence.level, confidence.overall)
}
