use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skygraph_lib::load_network;

mod commands;
mod output;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flight-network pathfinding and analysis tools")]
struct Cli {
    /// Path to the flight snapshot database.
    #[arg(long, global = true, default_value = "flights.db")]
    data: PathBuf,

    /// Output rendering.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find a single optimized route between two airports.
    Route(commands::route::RouteArgs),
    /// Enumerate every route within the stop bound, with a mode comparison.
    Routes(commands::route::RoutesArgs),
    /// Extract the Pareto front over enumerated candidates.
    Pareto(commands::route::ParetoArgs),
    /// Simulate a spanning-tree build with a step-by-step trace.
    Mst(commands::mst::MstArgs),
    /// Simulate a search and emit its decision trace.
    Simulate(commands::simulate::SimulateArgs),
    /// Network statistics: vertices, edges, density, degrees.
    Stats,
    /// Weakly connected components.
    Components,
    /// Adjacency-list view of the network.
    Adjacency,
    /// Minimum-price adjacency matrix.
    Matrix,
    /// Route-local subgraph analysis.
    Analyze(commands::analyze::AnalyzeArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let network = load_network(&cli.data)
        .with_context(|| format!("failed to load flight snapshot from {}", cli.data.display()))?;

    match cli.command {
        Command::Route(args) => commands::route::run(&network, &args, cli.format),
        Command::Routes(args) => commands::route::run_all(&network, &args, cli.format),
        Command::Pareto(args) => commands::route::run_pareto(&network, &args, cli.format),
        Command::Mst(args) => commands::mst::run(&network, &args, cli.format),
        Command::Simulate(args) => commands::simulate::run(&network, &args, cli.format),
        Command::Stats => commands::analyze::stats(&network, cli.format),
        Command::Components => commands::analyze::components(&network, cli.format),
        Command::Adjacency => commands::analyze::adjacency(&network, cli.format),
        Command::Matrix => commands::analyze::matrix(&network, cli.format),
        Command::Analyze(args) => commands::analyze::run(&network, &args, cli.format),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
