//! MST command handler: spanning-tree simulation with a decision trace.

use anyhow::Result;
use clap::{Args, ValueEnum};

use skygraph_lib::mst::DEFAULT_MST_STATES;
use skygraph_lib::{minimum_spanning_tree, FlightNetwork, MstAlgorithm, MstQuery};

use crate::output::{self, OutputFormat};

/// Spanning-tree algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Prim,
    Kruskal,
}

impl From<Algorithm> for MstAlgorithm {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Prim => MstAlgorithm::Prim,
            Algorithm::Kruskal => MstAlgorithm::Kruskal,
        }
    }
}

/// Arguments for the `mst` command.
#[derive(Args, Debug)]
pub struct MstArgs {
    /// Scope the subgraph to airports reachable from this source.
    #[arg(long = "from", requires = "to")]
    pub from: Option<String>,
    /// Destination, always included in the scoped subgraph.
    #[arg(long = "to", requires = "from")]
    pub to: Option<String>,
    /// Spanning-tree algorithm.
    #[arg(long, value_enum, default_value = "prim")]
    pub algorithm: Algorithm,
    /// Cap on recorded trace states.
    #[arg(long, default_value_t = DEFAULT_MST_STATES)]
    pub max_states: usize,
}

pub fn run(network: &FlightNetwork, args: &MstArgs, format: OutputFormat) -> Result<()> {
    let mut query = MstQuery::new(args.algorithm.into());
    query.source = args.from.clone();
    query.dest = args.to.clone();
    query.max_states = args.max_states;

    let result = minimum_spanning_tree(network, &query)?;
    output::emit(format, &result, || output::render_mst(&result))
}
