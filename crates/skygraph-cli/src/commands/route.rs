//! Route command handlers: single-route search, exhaustive enumeration, and
//! Pareto extraction.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt::Write;

use skygraph_lib::{
    compare_modes, execute, CriteriaWeights, FlightNetwork, ModeComparison, Route, RouteQuery,
    SearchMode, SearchOutcome,
};

use crate::output::{self, OutputFormat};

/// Arguments for the `route` command.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Source airport code.
    #[arg(long = "from")]
    pub from: String,
    /// Destination airport code.
    #[arg(long = "to")]
    pub to: String,
    /// Search mode: cheapest, fastest, shortest, best_overall, pareto, or all.
    #[arg(long, default_value = "cheapest")]
    pub mode: String,
    /// Maximum intermediate stops (0-4) for enumerating modes.
    #[arg(long, default_value_t = 2)]
    pub max_stops: usize,
    /// Price weight override for best_overall.
    #[arg(long)]
    pub price_weight: Option<f64>,
    /// Time weight override for best_overall.
    #[arg(long)]
    pub time_weight: Option<f64>,
    /// Distance weight override for best_overall.
    #[arg(long)]
    pub distance_weight: Option<f64>,
}

impl RouteArgs {
    /// Convert CLI args to a library query.
    fn to_query(&self) -> Result<RouteQuery> {
        let mode: SearchMode = self.mode.parse()?;
        let mut query = RouteQuery::new(self.from.as_str(), self.to.as_str(), mode);
        query.max_stops = self.max_stops;

        if self.price_weight.is_some()
            || self.time_weight.is_some()
            || self.distance_weight.is_some()
        {
            let defaults = CriteriaWeights::default();
            query.weights = Some(CriteriaWeights {
                price: self.price_weight.unwrap_or(defaults.price),
                time: self.time_weight.unwrap_or(defaults.time),
                distance: self.distance_weight.unwrap_or(defaults.distance),
            });
        }

        Ok(query)
    }
}

pub fn run(network: &FlightNetwork, args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let query = args.to_query()?;
    match execute(network, &query)? {
        SearchOutcome::Route(Some(route)) => {
            output::emit(format, &route, || output::render_route(&route))
        }
        SearchOutcome::Route(None) => output::emit(format, &None::<Route>, || {
            output::render_no_route(&args.from, &args.to)
        }),
        SearchOutcome::Routes(routes) => {
            output::emit(format, &routes, || output::render_route_list(&routes))
        }
        SearchOutcome::Pareto(result) => {
            output::emit(format, &result, || output::render_pareto(&result))
        }
    }
}

/// Arguments for the `routes` command.
#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Source airport code.
    #[arg(long = "from")]
    pub from: String,
    /// Destination airport code.
    #[arg(long = "to")]
    pub to: String,
    /// Maximum intermediate stops (0-4).
    #[arg(long, default_value_t = 2)]
    pub max_stops: usize,
}

/// Enumeration plus the per-mode comparison, mirroring what the search modes
/// would each have picked.
#[derive(Debug, Serialize)]
struct RoutesReport {
    total_routes: usize,
    routes: Vec<Route>,
    comparison: ModeComparison,
}

pub fn run_all(network: &FlightNetwork, args: &RoutesArgs, format: OutputFormat) -> Result<()> {
    let mut query = RouteQuery::new(args.from.as_str(), args.to.as_str(), SearchMode::All);
    query.max_stops = args.max_stops;

    let routes = match execute(network, &query)? {
        SearchOutcome::Routes(routes) => routes,
        _ => Vec::new(),
    };
    let comparison = compare_modes(network, &args.from, &args.to)?;

    let report = RoutesReport {
        total_routes: routes.len(),
        routes,
        comparison,
    };

    output::emit(format, &report, || {
        let mut buffer = output::render_route_list(&report.routes);
        match report.comparison.winning_mode {
            Some(mode) => {
                let _ = writeln!(buffer, "best overall: {mode}");
            }
            None => {
                let _ = writeln!(buffer, "best overall: none");
            }
        }
        buffer
    })
}

/// Arguments for the `pareto` command.
#[derive(Args, Debug)]
pub struct ParetoArgs {
    /// Source airport code.
    #[arg(long = "from")]
    pub from: String,
    /// Destination airport code.
    #[arg(long = "to")]
    pub to: String,
}

pub fn run_pareto(network: &FlightNetwork, args: &ParetoArgs, format: OutputFormat) -> Result<()> {
    let query = RouteQuery::new(args.from.as_str(), args.to.as_str(), SearchMode::Pareto);
    match execute(network, &query)? {
        SearchOutcome::Pareto(result) => {
            output::emit(format, &result, || output::render_pareto(&result))
        }
        // Pareto mode always yields a Pareto outcome.
        _ => Ok(()),
    }
}
