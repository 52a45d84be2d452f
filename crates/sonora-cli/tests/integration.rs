//! Integration tests for sonora-cli.
//!
//! Run the `sonora` binary end to end against synthetic WAV files and
//! TOML configs in a temporary directory.

use sonora_io::{SampleDepth, read_recording, write_mono};
use std::path::Path;
use std::process::{Command, Output};

/// Helper to get the path to the `sonora` binary built by cargo.
fn sonora_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sonora"))
}

fn run(args: &[&str]) -> Output {
    let output = sonora_bin().args(args).output().expect("failed to run sonora");
    assert!(
        output.status.success(),
        "sonora {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Silence, then a 1 kHz tone decaying by 60 dB per second.
fn write_decay(path: &Path) {
    let sr = 48000;
    let mut samples = vec![0.0f32; 14400];
    samples.extend((0..sr * 2).map(|i| {
        let t = i as f32 / sr as f32;
        0.5 * 10f32.powf(-3.0 * t) * (2.0 * std::f32::consts::PI * 1000.0 * t).sin()
    }));
    write_mono(path, &samples, sr as u32, SampleDepth::Float32).unwrap();
}

// ---------------------------------------------------------------------------
// sweep
// ---------------------------------------------------------------------------

#[test]
fn cli_sweep_writes_stimulus() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sweep.wav");
    run(&["sweep", out.to_str().unwrap(), "--duration", "1.0", "--sample-rate", "44100"]);

    let rec = read_recording(&out).unwrap();
    assert_eq!(rec.sample_rate, 44100);
    assert_eq!(rec.samples.len(), 44100);
    let peak = rec.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    // 0.8 amplitude on top of the synthesizer's headroom
    let expected = 0.8 * sonora_analysis::sweep::SWEEP_HEADROOM;
    assert!(peak <= expected + 1e-6 && peak > expected - 0.05, "peak {peak}");
}

#[test]
fn cli_sweep_rejects_end_above_nyquist() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sweep.wav");
    let output = sonora_bin()
        .args(["sweep", out.to_str().unwrap(), "--sample-rate", "16000", "--end", "12000"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!out.exists());
}

// ---------------------------------------------------------------------------
// rt
// ---------------------------------------------------------------------------

#[test]
fn cli_rt_reports_decay() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("decay.wav");
    let json = dir.path().join("rt.json");
    write_decay(&wav);

    let output = run(&["rt", wav.to_str().unwrap(), "--json", json.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RT60"), "{stdout}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    let rt60 = report["broadband"]["rt60"].as_f64().unwrap();
    assert!((rt60 - 1.0).abs() < 0.05, "rt60 {rt60}");
    assert_eq!(report["bands"].as_array().unwrap().len(), 6);
}

#[test]
fn cli_rt_fails_on_silence_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("silence.wav");
    write_mono(&wav, &vec![0.0; 48000], 48000, SampleDepth::Int16).unwrap();

    let output = sonora_bin().args(["rt", wav.to_str().unwrap()]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("volume"), "{stderr}");
}

// ---------------------------------------------------------------------------
// ir
// ---------------------------------------------------------------------------

#[test]
fn cli_ir_deconvolved_sweep_is_not_flagged_as_clipped() {
    let dir = tempfile::tempdir().unwrap();
    let sweep_path = dir.path().join("sweep.wav");
    let capture_path = dir.path().join("capture.wav");
    let json = dir.path().join("ir.json");
    run(&[
        "sweep",
        sweep_path.to_str().unwrap(),
        "--duration",
        "1.0",
        "--start",
        "80",
        "--end",
        "7000",
        "--sample-rate",
        "16000",
        "--amplitude",
        "1.0",
    ]);

    // unity-gain capture: direct sound plus one reflection
    let sweep = read_recording(&sweep_path).unwrap().samples;
    let delay = 800;
    let echo = 400;
    let mut capture = vec![0.0f32; delay + echo + sweep.len() + 4000];
    for (i, &s) in sweep.iter().enumerate() {
        capture[delay + i] += s;
        capture[delay + echo + i] += 0.2 * s;
    }
    write_mono(&capture_path, &capture, 16000, SampleDepth::Float32).unwrap();

    let output = run(&[
        "ir",
        capture_path.to_str().unwrap(),
        "--sweep",
        sweep_path.to_str().unwrap(),
        "--start",
        "80",
        "--end",
        "7000",
        "--json",
        json.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("clipped"), "{stdout}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["clip_suspected"], false);
    assert!(report["peak"]["amplitude"].as_f64().unwrap() > 0.9);
    assert!(report["capture_peak"]["amplitude"].as_f64().unwrap() < 0.98);
}

// ---------------------------------------------------------------------------
// rta
// ---------------------------------------------------------------------------

#[test]
fn cli_rta_lists_bands() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    let tone: Vec<f32> = (0..48000)
        .map(|i| 0.3 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
        .collect();
    write_mono(&wav, &tone, 48000, SampleDepth::Float32).unwrap();

    let output = run(&["rta", wav.to_str().unwrap(), "--window", "blackman", "--json", "-"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1000 Hz"), "{stdout}");
    assert!(stdout.contains("\"suggestions\""));
}

// ---------------------------------------------------------------------------
// preset / sim
// ---------------------------------------------------------------------------

#[test]
fn cli_preset_then_sim() {
    let dir = tempfile::tempdir().unwrap();
    let preset = dir.path().join("room.toml");
    let json = dir.path().join("sim.json");
    run(&["preset", preset.to_str().unwrap()]);

    let text = std::fs::read_to_string(&preset).unwrap();
    let parsed: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(parsed["tops"].as_array().unwrap().len(), 2);

    let output = run(&[
        "sim",
        preset.to_str().unwrap(),
        "--rt",
        "1.8",
        "--at",
        "7,10",
        "--json",
        json.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Score:"), "{stdout}");
    assert!(stdout.contains("(7.0, 10.0) m"), "{stdout}");

    let sim: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(sim["field"]["grid"], 48);
    assert!(sim["score"]["overall"].as_u64().unwrap() <= 100);
}

#[test]
fn cli_sim_default_preset_with_grid_override() {
    let output = run(&["sim", "--grid", "24", "--json", "-"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"grid\": 24"), "{stdout}");
}

#[test]
fn cli_sim_rejects_missing_config() {
    let output = sonora_bin().args(["sim", "/nonexistent/room.toml"]).output().unwrap();
    assert!(!output.status.success());
}
