//! Query orchestration for the pathfinding engine.
//!
//! This module provides:
//! - [`SearchMode`] - the supported search modes
//! - [`RouteQuery`] / [`MstQuery`] - validated request types
//! - [`execute`] - main entry point dispatching to the search strategies
//! - [`compare_modes`] - side-by-side run of the single-route searches
//! - [`simulate_search`] / [`minimum_spanning_tree`] - trace-producing runs
//!
//! Every entry point validates its inputs before any computation, builds a
//! fresh [`Graph`] from the supplied snapshot, runs one algorithm to
//! completion (or to its state cap), and returns. Nothing is cached between
//! calls.

mod planner;

pub use planner::{
    select_planner, BestOverallPlanner, CheapestPlanner, FastestPlanner, RoutePlanner,
    ShortestPlanner,
};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::composite::CriteriaWeights;
use crate::db::{normalize_code, FlightNetwork};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::mst::{kruskal_mst, prim_mst, MstAlgorithm, MstResult, DEFAULT_MST_STATES};
use crate::pareto::{pareto_front, ParetoResult};
use crate::path::{a_star, dijkstra, enumerate_routes, MAX_ENUMERATION_STOPS};
use crate::route::Route;
use crate::trace::{simulate_dijkstra, SearchTrace, DEFAULT_SEARCH_STATES};

/// Number of fuzzy suggestions offered for an unknown airport code.
const SUGGESTION_LIMIT: usize = 3;

/// Supported search modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Price-weighted Dijkstra.
    #[default]
    Cheapest,
    /// Duration-weighted Dijkstra.
    Fastest,
    /// Geodesic A*.
    Shortest,
    /// Composite-weight Dijkstra.
    BestOverall,
    /// Pareto front over enumerated candidates.
    Pareto,
    /// Exhaustive bounded enumeration.
    All,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchMode::Cheapest => "cheapest",
            SearchMode::Fastest => "fastest",
            SearchMode::Shortest => "shortest",
            SearchMode::BestOverall => "best_overall",
            SearchMode::Pareto => "pareto",
            SearchMode::All => "all",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cheapest" => Ok(SearchMode::Cheapest),
            "fastest" => Ok(SearchMode::Fastest),
            "shortest" => Ok(SearchMode::Shortest),
            "best_overall" => Ok(SearchMode::BestOverall),
            "pareto" => Ok(SearchMode::Pareto),
            "all" => Ok(SearchMode::All),
            other => Err(Error::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// A validated-on-execution search request.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub source: String,
    pub dest: String,
    pub mode: SearchMode,
    /// Maximum intermediate stops for enumerating modes, `0..=4`.
    pub max_stops: usize,
    /// Trace cap for simulated runs; clamped to a safe ceiling.
    pub max_states: usize,
    /// Criterion weights for `best_overall`; defaults apply when `None`.
    pub weights: Option<CriteriaWeights>,
}

impl RouteQuery {
    /// Query with the conventional defaults: two stops, default trace cap,
    /// default weights.
    pub fn new(source: impl Into<String>, dest: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            mode,
            max_stops: 2,
            max_states: DEFAULT_SEARCH_STATES,
            weights: None,
        }
    }
}

/// A validated-on-execution MST request. Source and destination must be
/// supplied together; with neither, the whole network is spanned.
#[derive(Debug, Clone)]
pub struct MstQuery {
    pub source: Option<String>,
    pub dest: Option<String>,
    pub algorithm: MstAlgorithm,
    pub max_states: usize,
}

impl MstQuery {
    pub fn new(algorithm: MstAlgorithm) -> Self {
        Self {
            source: None,
            dest: None,
            algorithm,
            max_states: DEFAULT_MST_STATES,
        }
    }

    pub fn scoped(
        algorithm: MstAlgorithm,
        source: impl Into<String>,
        dest: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            dest: Some(dest.into()),
            algorithm,
            max_states: DEFAULT_MST_STATES,
        }
    }
}

/// What a search produced, shaped by the requested mode.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Single-route modes; `None` means no route exists.
    Route(Option<Route>),
    /// Exhaustive enumeration (`all` mode).
    Routes(Vec<Route>),
    /// Pareto mode.
    Pareto(ParetoResult),
}

/// Results of running every single-route search side by side, with the
/// winner under the default normalized scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ModeComparison {
    pub cheapest: Option<Route>,
    pub fastest: Option<Route>,
    pub shortest: Option<Route>,
    pub best_overall: Option<Route>,
    pub winning_mode: Option<SearchMode>,
}

/// Execute a search query against a freshly built graph.
pub fn execute(network: &FlightNetwork, query: &RouteQuery) -> Result<SearchOutcome> {
    let source = resolve_airport(network, &query.source, Error::MissingSource)?;
    let dest = resolve_airport(network, &query.dest, Error::MissingDestination)?;
    if query.max_stops > MAX_ENUMERATION_STOPS {
        return Err(Error::InvalidMaxStops {
            value: query.max_stops,
        });
    }
    let weights = query.weights.unwrap_or_default().validated()?;

    let graph = Graph::build(network);
    debug!(%source, %dest, mode = %query.mode, "executing search");

    match query.mode {
        SearchMode::Pareto => Ok(SearchOutcome::Pareto(pareto_front(
            &graph, network, &source, &dest,
        ))),
        SearchMode::All => Ok(SearchOutcome::Routes(enumerate_routes(
            &graph,
            network,
            &source,
            &dest,
            query.max_stops,
        ))),
        mode => match select_planner(mode, weights) {
            Some(planner) => Ok(SearchOutcome::Route(
                planner.find_route(&graph, network, &source, &dest),
            )),
            None => Err(Error::UnknownMode {
                mode: mode.to_string(),
            }),
        },
    }
}

/// Run cheapest, fastest, and shortest side by side and score the finds with
/// the default 0.40/0.35/0.25 normalized blend; degenerate metrics score the
/// fixed midpoint.
pub fn compare_modes(network: &FlightNetwork, source: &str, dest: &str) -> Result<ModeComparison> {
    let source = resolve_airport(network, source, Error::MissingSource)?;
    let dest = resolve_airport(network, dest, Error::MissingDestination)?;
    let graph = Graph::build(network);

    let cheapest = dijkstra(&graph, network, &source, &dest, |_, leg| {
        Some(leg.price_usd)
    });
    let fastest = dijkstra(&graph, network, &source, &dest, |_, leg| {
        Some(leg.duration_min as f64)
    });
    let shortest = a_star(&graph, network, &source, &dest);

    let candidates: Vec<(SearchMode, &Route)> = [
        (SearchMode::Cheapest, &cheapest),
        (SearchMode::Fastest, &fastest),
        (SearchMode::Shortest, &shortest),
    ]
    .into_iter()
    .filter_map(|(mode, route)| route.as_ref().map(|route| (mode, route)))
    .collect();

    let (winning_mode, best_overall) = match score_candidates(&candidates) {
        Some((mode, route)) => (Some(mode), Some(route.clone())),
        None => (None, None),
    };

    Ok(ModeComparison {
        cheapest,
        fastest,
        shortest,
        best_overall,
        winning_mode,
    })
}

fn score_candidates<'a>(
    candidates: &[(SearchMode, &'a Route)],
) -> Option<(SearchMode, &'a Route)> {
    if candidates.is_empty() {
        return None;
    }

    let weights = CriteriaWeights::default();
    let bounds = |values: Vec<f64>| {
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    };
    let normalize = |value: f64, (min, max): (f64, f64)| {
        if max > min {
            (value - min) / (max - min)
        } else {
            0.5
        }
    };

    let price_bounds = bounds(
        candidates
            .iter()
            .map(|(_, route)| route.total_price_usd)
            .collect(),
    );
    let time_bounds = bounds(
        candidates
            .iter()
            .map(|(_, route)| route.total_duration_min as f64)
            .collect(),
    );
    let distance_bounds = bounds(
        candidates
            .iter()
            .map(|(_, route)| route.total_distance_km)
            .collect(),
    );

    candidates
        .iter()
        .map(|&(mode, route)| {
            let score = weights.price * normalize(route.total_price_usd, price_bounds)
                + weights.time * normalize(route.total_duration_min as f64, time_bounds)
                + weights.distance * normalize(route.total_distance_km, distance_bounds);
            (mode, route, score)
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(mode, route, _)| (mode, route))
}

/// Run a simulated Dijkstra and return the snapshot trace. Only the
/// weight-based modes (`cheapest`, `fastest`) can be simulated.
pub fn simulate_search(network: &FlightNetwork, query: &RouteQuery) -> Result<SearchTrace> {
    let source = resolve_airport(network, &query.source, Error::MissingSource)?;
    let dest = resolve_airport(network, &query.dest, Error::MissingDestination)?;
    let graph = Graph::build(network);
    debug!(%source, %dest, mode = %query.mode, max_states = query.max_states, "simulating search");

    match query.mode {
        SearchMode::Cheapest => Ok(simulate_dijkstra(
            &graph,
            network,
            &source,
            &dest,
            |_, leg| Some(leg.price_usd),
            query.max_states,
        )),
        SearchMode::Fastest => Ok(simulate_dijkstra(
            &graph,
            network,
            &source,
            &dest,
            |_, leg| Some(leg.duration_min as f64),
            query.max_states,
        )),
        other => Err(Error::UnknownMode {
            mode: format!("{other} (not simulatable)"),
        }),
    }
}

/// Build an MST over the scoped (or whole) network, returning the accepted
/// edges plus the decision trace.
pub fn minimum_spanning_tree(network: &FlightNetwork, query: &MstQuery) -> Result<MstResult> {
    let scope = match (&query.source, &query.dest) {
        (Some(source), Some(dest)) => Some((
            resolve_airport(network, source, Error::MissingSource)?,
            resolve_airport(network, dest, Error::MissingDestination)?,
        )),
        (None, None) => None,
        (Some(_), None) => return Err(Error::MissingDestination),
        (None, Some(_)) => return Err(Error::MissingSource),
    };

    let graph = Graph::build(network);
    debug!(algorithm = %query.algorithm, scoped = scope.is_some(), "building spanning tree");

    let scope = scope.as_ref().map(|(s, d)| (s.as_str(), d.as_str()));
    Ok(match query.algorithm {
        MstAlgorithm::Prim => prim_mst(&graph, scope, query.max_states),
        MstAlgorithm::Kruskal => kruskal_mst(&graph, scope, query.max_states),
    })
}

/// Route-local subgraph analysis with endpoint validation.
pub fn analyze_route(
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    max_hops: usize,
) -> Result<crate::analysis::RouteAnalysis> {
    let source = resolve_airport(network, source, Error::MissingSource)?;
    let dest = resolve_airport(network, dest, Error::MissingDestination)?;
    let graph = Graph::build(network);
    Ok(crate::analysis::route_analysis(
        &graph, network, &source, &dest, max_hops,
    ))
}

fn resolve_airport(network: &FlightNetwork, raw: &str, missing: Error) -> Result<String> {
    let code = normalize_code(raw);
    if code.is_empty() {
        return Err(missing);
    }
    if !network.contains(&code) {
        let suggestions = network.fuzzy_airport_matches(&code, SUGGESTION_LIMIT);
        return Err(Error::UnknownAirport { code, suggestions });
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mst::MstDecision;
    use crate::test_helpers::lhe_dxb_jfk_network;

    #[test]
    fn mode_round_trips_through_strings() {
        for mode in [
            SearchMode::Cheapest,
            SearchMode::Fastest,
            SearchMode::Shortest,
            SearchMode::BestOverall,
            SearchMode::Pareto,
            SearchMode::All,
        ] {
            assert_eq!(mode.to_string().parse::<SearchMode>().unwrap(), mode);
        }
        assert!(matches!(
            "scenic".parse::<SearchMode>(),
            Err(Error::UnknownMode { .. })
        ));
    }

    #[test]
    fn missing_endpoints_are_rejected() {
        let network = lhe_dxb_jfk_network();
        let query = RouteQuery::new("  ", "JFK", SearchMode::Cheapest);
        assert!(matches!(execute(&network, &query), Err(Error::MissingSource)));

        let query = RouteQuery::new("LHE", "", SearchMode::Cheapest);
        assert!(matches!(
            execute(&network, &query),
            Err(Error::MissingDestination)
        ));
    }

    #[test]
    fn unknown_airports_come_with_suggestions() {
        let network = lhe_dxb_jfk_network();
        let query = RouteQuery::new("lhx", "JFK", SearchMode::Cheapest);
        match execute(&network, &query) {
            Err(Error::UnknownAirport { code, suggestions }) => {
                assert_eq!(code, "LHX");
                assert!(suggestions.contains(&"LHE".to_string()));
            }
            other => panic!("expected UnknownAirport, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_max_stops_is_rejected() {
        let network = lhe_dxb_jfk_network();
        let mut query = RouteQuery::new("LHE", "JFK", SearchMode::All);
        query.max_stops = 5;
        assert!(matches!(
            execute(&network, &query),
            Err(Error::InvalidMaxStops { value: 5 })
        ));
    }

    #[test]
    fn negative_weights_are_rejected_before_search() {
        let network = lhe_dxb_jfk_network();
        let mut query = RouteQuery::new("LHE", "JFK", SearchMode::BestOverall);
        query.weights = Some(CriteriaWeights {
            price: -1.0,
            time: 1.0,
            distance: 1.0,
        });
        assert!(matches!(
            execute(&network, &query),
            Err(Error::InvalidWeights { .. })
        ));
    }

    #[test]
    fn cheapest_mode_finds_the_two_leg_route() {
        let network = lhe_dxb_jfk_network();
        let query = RouteQuery::new(" lhe ", "jfk", SearchMode::Cheapest);
        match execute(&network, &query).unwrap() {
            SearchOutcome::Route(Some(route)) => {
                assert_eq!(route.total_price_usd, 500.0);
                assert_eq!(route.path, vec!["LHE", "DXB", "JFK"]);
            }
            other => panic!("expected a route, got {other:?}"),
        }
    }

    #[test]
    fn all_mode_enumerates_both_routes() {
        let network = lhe_dxb_jfk_network();
        let mut query = RouteQuery::new("LHE", "JFK", SearchMode::All);
        query.max_stops = 1;
        match execute(&network, &query).unwrap() {
            SearchOutcome::Routes(routes) => assert_eq!(routes.len(), 2),
            other => panic!("expected routes, got {other:?}"),
        }
    }

    #[test]
    fn pareto_mode_returns_the_front() {
        let network = lhe_dxb_jfk_network();
        let query = RouteQuery::new("LHE", "JFK", SearchMode::Pareto);
        match execute(&network, &query).unwrap() {
            SearchOutcome::Pareto(result) => {
                assert_eq!(result.total_candidates, 2);
                assert!(result.pareto_count >= 1);
            }
            other => panic!("expected pareto result, got {other:?}"),
        }
    }

    #[test]
    fn repeated_queries_return_identical_routes() {
        let network = lhe_dxb_jfk_network();
        for mode in [
            SearchMode::Cheapest,
            SearchMode::Fastest,
            SearchMode::Shortest,
        ] {
            let query = RouteQuery::new("LHE", "JFK", mode);
            let first = match execute(&network, &query).unwrap() {
                SearchOutcome::Route(route) => route,
                other => panic!("expected a route, got {other:?}"),
            };
            let second = match execute(&network, &query).unwrap() {
                SearchOutcome::Route(route) => route,
                other => panic!("expected a route, got {other:?}"),
            };
            assert_eq!(first, second);
        }
    }

    #[test]
    fn comparison_scores_the_dominant_route_as_winner() {
        let network = lhe_dxb_jfk_network();
        let comparison = compare_modes(&network, "LHE", "JFK").unwrap();

        assert_eq!(comparison.winning_mode, Some(SearchMode::Cheapest));
        let best = comparison.best_overall.expect("winner exists");
        assert_eq!(best.total_price_usd, 500.0);
        assert!(comparison.shortest.is_some());
    }

    #[test]
    fn simulation_rejects_non_weight_modes() {
        let network = lhe_dxb_jfk_network();
        let query = RouteQuery::new("LHE", "JFK", SearchMode::Pareto);
        assert!(matches!(
            simulate_search(&network, &query),
            Err(Error::UnknownMode { .. })
        ));
    }

    #[test]
    fn simulation_honours_the_state_cap() {
        let network = lhe_dxb_jfk_network();
        let mut query = RouteQuery::new("LHE", "JFK", SearchMode::Cheapest);
        query.max_states = 1;
        let trace = simulate_search(&network, &query).unwrap();
        assert_eq!(trace.states.len(), 1);
        assert!(trace.route.is_none());
    }

    #[test]
    fn analyze_route_validates_endpoints() {
        let network = lhe_dxb_jfk_network();
        assert!(matches!(
            analyze_route(&network, "LHE", "XXX", 3),
            Err(Error::UnknownAirport { .. })
        ));

        let analysis = analyze_route(&network, "lhe", " jfk ", 3).unwrap();
        assert_eq!(analysis.source, "LHE");
        assert_eq!(analysis.path_options.direct, 1);
    }

    #[test]
    fn mst_scope_requires_both_endpoints() {
        let network = lhe_dxb_jfk_network();
        let mut query = MstQuery::new(MstAlgorithm::Prim);
        query.source = Some("LHE".to_string());
        assert!(matches!(
            minimum_spanning_tree(&network, &query),
            Err(Error::MissingDestination)
        ));
    }

    #[test]
    fn scoped_mst_runs_both_algorithms() {
        let network = lhe_dxb_jfk_network();
        for algorithm in [MstAlgorithm::Prim, MstAlgorithm::Kruskal] {
            let query = MstQuery::scoped(algorithm, "LHE", "JFK");
            let result = minimum_spanning_tree(&network, &query).unwrap();
            assert_eq!(result.airports.len(), 3);
            assert!(result.is_spanning());
            assert!(result
                .states
                .iter()
                .any(|state| state.decision == Some(MstDecision::Commit)));
        }
    }
}
