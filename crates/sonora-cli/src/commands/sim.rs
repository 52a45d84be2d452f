//! Coverage simulation.

use anyhow::Context;
use clap::Args;
use sonora_coverage::{CoverageModel, SimulationConfig, rt_penalty_db, simulate_coverage};
use std::path::PathBuf;

use super::common::write_json;

#[derive(Args)]
pub struct SimArgs {
    /// Simulation config (TOML); the default preset when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Measured average RT in seconds; applies the reverberation penalty
    #[arg(long)]
    rt: Option<f32>,

    /// Override the grid resolution (cells per side, 24-96)
    #[arg(long)]
    grid: Option<usize>,

    /// Print the SPL at these points, as x,y in meters
    #[arg(long = "at", value_name = "X,Y", value_parser = parse_point)]
    points: Vec<(f32, f32)>,

    /// Write the field and score as JSON ("-" for stdout)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

/// Parse an `x,y` pair for clap's `value_parser`.
fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid point '{s}' (expected x,y)"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("Invalid coordinate '{v}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

pub fn run(args: SimArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(rt) = args.rt {
        config.options.rt_penalty_db = rt_penalty_db(rt);
        tracing::debug!(rt, penalty = config.options.rt_penalty_db, "reverberation penalty");
    }
    if let Some(grid) = args.grid {
        config.options.grid = grid;
    }

    println!(
        "Simulating {} tops, {} subs in a {} x {} m room...",
        config.tops.len(),
        if config.options.use_subs { config.subs.len() } else { 0 },
        config.room.width,
        config.room.length
    );

    let sim = simulate_coverage(&config)?;
    let score = &sim.score;

    println!();
    if score.is_degenerate() {
        println!("Audience area is too small to score.");
    } else {
        println!("Score: {}/100", score.overall);
        println!("  mean {:.1} dB, std {:.1} dB (target {:.0} dB)", score.mean_db, score.std_db, config.options.target_db);
        println!("  coverage {}%, uniformity {}%, balance {}%", score.coverage_pct, score.uniformity_pct, score.balance_pct);
        println!("  field {:.1}..{:.1} dB over {} cells", sim.field.min, sim.field.max, score.cells);
    }

    if !args.points.is_empty() {
        let model = CoverageModel::new(&config)?;
        println!();
        for &(x, y) in &args.points {
            println!("  ({x:.1}, {y:.1}) m: {:.1} dB", model.spl_at(x, y));
        }
    }

    if let Some(path) = &args.json {
        write_json(path, &sim)?;
    }

    Ok(())
}
