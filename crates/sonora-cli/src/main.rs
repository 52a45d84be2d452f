//! Sonora CLI - indicative room measurement and coverage planning.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sonora")]
#[command(author, version, about = "Sonora room acoustics CLI", long_about = None)]
struct Cli {
    /// Log analysis details (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an exponential sine sweep stimulus
    Sweep(commands::sweep::SweepArgs),

    /// Estimate broadband RT60 from a recorded sweep response
    Rt(commands::rt::RtArgs),

    /// Per-octave RT from an impulse (or sweep) recording
    Ir(commands::ir::IrArgs),

    /// Band spectrum of a pink-noise capture with EQ cut suggestions
    Rta(commands::rta::RtaArgs),

    /// Simulate loudspeaker coverage over the audience area
    Sim(commands::sim::SimArgs),

    /// Write the default simulation config as TOML
    Preset(commands::preset::PresetArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sweep(args) => commands::sweep::run(args),
        Commands::Rt(args) => commands::rt::run(args),
        Commands::Ir(args) => commands::ir::run(args),
        Commands::Rta(args) => commands::rta::run(args),
        Commands::Sim(args) => commands::sim::run(args),
        Commands::Preset(args) => commands::preset::run(args),
    }
}
