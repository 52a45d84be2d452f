//! Default simulation config export.

use anyhow::Context;
use clap::Args;
use sonora_coverage::SimulationConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetArgs {
    /// Output TOML file; printed to stdout when omitted
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    let config = SimulationConfig::default();
    match &args.output {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Saved default preset to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
