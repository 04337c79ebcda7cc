// crates/tan-cli/src/main.rs
//
// CLI entrypoint for the TAN farm operator tools.
//
// Provides subcommands for projecting the emission schedule and for
// running a deterministic farm simulation from a TOML configuration.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::schedule::ScheduleCmd;
use commands::simulate::SimulateCmd;
use tracing_subscriber::EnvFilter;

/// TAN farm CLI.
#[derive(Parser, Debug)]
#[command(
    name = "tan",
    version = "0.1.0",
    about = "TAN farm tools: emission schedule projection and staking simulation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Project the emission schedule epoch by epoch.
    Schedule(ScheduleCmd),

    /// Run the Craftsman over simulated farmers and report rewards.
    Simulate(SimulateCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Schedule(cmd) => commands::schedule::run(cmd)?,
        Commands::Simulate(cmd) => commands::simulate::run(cmd)?,
    }

    Ok(())
}
