//! Integration tests for sonora-coverage.
//!
//! Exercise whole simulations through the public API: symmetric layouts,
//! presets loaded from disk, and JSON export of results.

use sonora_coverage::{
    CoverageModel, Emitter, Room, SimulationConfig, SimulationError, SimulationOptions, Stage,
    rt_penalty_db, score_field, simulate_coverage,
};

/// Two mirrored tops aimed straight ahead, tuned so the room center reads
/// ~96 dB, no subs, no directivity or HF loss.
fn symmetric_pair() -> SimulationConfig {
    SimulationConfig {
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
            Emitter::top("L", 4.2, 2.2, 114.7, 0.0),
            Emitter::top("R", 9.8, 2.2, 114.7, 0.0),
        ],
        subs: vec![],
        options: SimulationOptions {
            use_subs: false,
            target_db: 96.0,
            audience_start_y: 13.0,
            audience_end_y: 15.0,
            audience_padding_x: 6.0,
            grid: 48,
            directivity: 0.0,
            hf_loss_per_10m: 0.0,
            rt_penalty_db: 0.0,
        },
    }
}

#[test]
fn symmetric_pair_covers_center_area() {
    let config = symmetric_pair();
    let model = CoverageModel::new(&config).unwrap();
    assert!((model.spl_at(7.0, 14.0) - 96.0).abs() < 1.0);

    let sim = simulate_coverage(&config).unwrap();
    assert!(sim.score.cells >= 10, "cells {}", sim.score.cells);
    assert!(sim.score.uniformity_pct >= 90, "{:?}", sim.score);
    assert!(sim.score.coverage_pct >= 90, "{:?}", sim.score);
    assert!((sim.score.mean_db - 96.0).abs() < 1.5);
}

#[test]
fn default_preset_is_left_right_symmetric() {
    let config = SimulationConfig::default();
    let sim = simulate_coverage(&config).unwrap();
    let g = sim.field.grid;
    for yi in 0..g {
        for xi in 0..g / 2 {
            let left = sim.field.value(xi, yi).unwrap();
            let right = sim.field.value(g - 1 - xi, yi).unwrap();
            assert!((left - right).abs() < 1e-2, "row {yi}, col {xi}: {left} vs {right}");
        }
    }
    assert_eq!(sim.bounds, config.audience());
    assert!(sim.score.overall > 0 && sim.score.overall <= 100);
}

#[test]
fn turning_off_subs_lowers_the_field() {
    let mut config = SimulationConfig::default();
    let with_subs = simulate_coverage(&config).unwrap();
    config.options.use_subs = false;
    let without = simulate_coverage(&config).unwrap();
    assert!(without.score.mean_db < with_subs.score.mean_db);
}

#[test]
fn reverberant_room_is_penalised() {
    let mut config = symmetric_pair();
    let dry = simulate_coverage(&config).unwrap();
    config.options.rt_penalty_db = rt_penalty_db(3.2);
    let wet = simulate_coverage(&config).unwrap();
    assert!((dry.score.mean_db - wet.score.mean_db - 6.0).abs() < 1e-3);
    assert!((dry.field.max - wet.field.max - 6.0).abs() < 1e-3);
}

#[test]
fn moving_an_emitter_recomputes_everything() {
    let mut config = symmetric_pair();
    let before = simulate_coverage(&config).unwrap();
    config.tops[0].x = 1.0;
    let after = simulate_coverage(&config).unwrap();
    assert_ne!(before.field.values, after.field.values);
    assert!(after.score.mean_db < before.score.mean_db);
}

#[test]
fn grid_resolution_is_clamped() {
    let mut config = SimulationConfig::default();
    config.options.grid = 1000;
    assert_eq!(simulate_coverage(&config).unwrap().field.grid, 96);
    config.options.grid = 2;
    assert_eq!(simulate_coverage(&config).unwrap().field.grid, 24);
}

#[test]
fn score_field_reports_degenerate_audience() {
    let mut config = symmetric_pair();
    config.options.audience_start_y = 14.0;
    config.options.audience_end_y = 14.2;
    let sim = simulate_coverage(&config).unwrap();
    assert!(sim.score.is_degenerate());
    let err = score_field(&sim.field, 96.0).unwrap_err();
    assert!(matches!(err, SimulationError::DegenerateScore { .. }));
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.toml");

    let config = symmetric_pair();
    config.save(&path).unwrap();
    let loaded = SimulationConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let missing = SimulationConfig::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, SimulationError::ReadFile { .. }));
}

#[test]
fn simulation_serializes_to_json() {
    let sim = simulate_coverage(&SimulationConfig::default()).unwrap();
    let json = serde_json::to_value(&sim).unwrap();
    assert_eq!(json["field"]["grid"], 48);
    assert_eq!(json["field"]["values"].as_array().unwrap().len(), 48 * 48);
    assert!(json["score"]["overall"].is_number());
    assert!(json["bounds"]["y1"].is_number());
}
