//! gridroute CLI - Packet routing on grid networks
//!
//! This CLI provides a unified interface for:
//! - Planning routing policies with value and policy iteration
//! - Simulating traffic through Q-routing, SARSA or planned routers
//! - Exporting observations, hop ratios and rendered policies

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gridroute")]
#[command(version, about = "Packet routing on grid networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a routing policy with dynamic programming
    Plan(gridroute::cli::commands::plan::PlanArgs),

    /// Simulate random traffic through a router
    Simulate(Box<gridroute::cli::commands::simulate::SimulateArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan(args) => gridroute::cli::commands::plan::execute(args),
        Commands::Simulate(args) => gridroute::cli::commands::simulate::execute(*args),
    }
}
