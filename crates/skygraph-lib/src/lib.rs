//! skygraph library entry points.
//!
//! This crate loads a flight-network snapshot, builds graph representations,
//! and runs the pathfinding and analysis algorithms: single- and
//! multi-criteria shortest path, exhaustive bounded enumeration, Pareto-front
//! extraction, spanning-tree simulation, and network analytics. Higher-level
//! consumers (the CLI, services) should only depend on the functions exported
//! here instead of reimplementing behavior.

#![deny(warnings)]

pub mod analysis;
pub mod composite;
pub mod db;
pub mod error;
pub mod graph;
pub mod mst;
pub mod pareto;
pub mod path;
pub mod route;
pub mod routing;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use composite::CriteriaWeights;
pub use db::{load_network, Airport, Coordinates, FlightLeg, FlightNetwork};
pub use error::{Error, Result};
pub use graph::{EdgeId, Graph};
pub use mst::{MstAlgorithm, MstResult};
pub use pareto::ParetoResult;
pub use route::{Route, RouteStats};
pub use analysis::{GraphStats, RouteAnalysis};
pub use routing::{
    analyze_route, compare_modes, execute, minimum_spanning_tree, simulate_search, ModeComparison,
    MstQuery, RouteQuery, SearchMode, SearchOutcome,
};
pub use trace::SearchTrace;
