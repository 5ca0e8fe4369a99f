//! Analytics command handlers: network statistics, components, the adjacency
//! matrix, and route-local subgraph analysis.

use anyhow::Result;
use clap::Args;

use skygraph_lib::analysis::{adjacency_list, adjacency_matrix, connected_components, graph_stats};
use skygraph_lib::{analyze_route, FlightNetwork};

use crate::output::{self, OutputFormat};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Source airport code.
    #[arg(long = "from")]
    pub from: String,
    /// Destination airport code.
    #[arg(long = "to")]
    pub to: String,
    /// Hop bound for the local subgraph sweep.
    #[arg(long, default_value_t = 3)]
    pub max_hops: usize,
}

pub fn stats(network: &FlightNetwork, format: OutputFormat) -> Result<()> {
    let stats = graph_stats(network);
    output::emit(format, &stats, || output::render_stats(&stats))
}

pub fn components(network: &FlightNetwork, format: OutputFormat) -> Result<()> {
    let components = connected_components(network);
    output::emit(format, &components, || {
        output::render_components(&components)
    })
}

pub fn adjacency(network: &FlightNetwork, format: OutputFormat) -> Result<()> {
    let list = adjacency_list(network);
    output::emit(format, &list, || output::render_adjacency(&list))
}

pub fn matrix(network: &FlightNetwork, format: OutputFormat) -> Result<()> {
    let view = adjacency_matrix(network);
    output::emit(format, &view, || output::render_matrix(&view))
}

pub fn run(network: &FlightNetwork, args: &AnalyzeArgs, format: OutputFormat) -> Result<()> {
    let analysis = analyze_route(network, &args.from, &args.to, args.max_hops)?;
    output::emit(format, &analysis, || output::render_analysis(&analysis))
}
