//! Simulate command handler: search trace for step-by-step animation.

use anyhow::Result;
use clap::Args;

use skygraph_lib::trace::DEFAULT_SEARCH_STATES;
use skygraph_lib::{simulate_search, FlightNetwork, RouteQuery, SearchMode};

use crate::output::{self, OutputFormat};

/// Arguments for the `simulate` command.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Source airport code.
    #[arg(long = "from")]
    pub from: String,
    /// Destination airport code.
    #[arg(long = "to")]
    pub to: String,
    /// Weight mode to simulate: cheapest or fastest.
    #[arg(long, default_value = "cheapest")]
    pub mode: String,
    /// Cap on recorded trace states.
    #[arg(long, default_value_t = DEFAULT_SEARCH_STATES)]
    pub max_states: usize,
}

pub fn run(network: &FlightNetwork, args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    let mode: SearchMode = args.mode.parse()?;
    let mut query = RouteQuery::new(args.from.as_str(), args.to.as_str(), mode);
    query.max_states = args.max_states;

    let trace = simulate_search(network, &query)?;
    output::emit(format, &trace, || output::render_trace(&trace))
}
