//! Search strategies implementing the Strategy pattern.
//!
//! Each single-route search mode (cheapest, fastest, shortest, best overall)
//! is encapsulated in its own planner, so new modes can be added without
//! touching the `execute` orchestrator.

use crate::composite::{best_overall, CriteriaWeights};
use crate::db::FlightNetwork;
use crate::graph::Graph;
use crate::path::{a_star, dijkstra};
use crate::route::Route;

use super::SearchMode;

/// Trait for single-route search strategies.
pub trait RoutePlanner {
    /// The search mode this planner implements.
    fn mode(&self) -> SearchMode;

    /// Run the search. `None` means no route exists, which is an expected
    /// outcome rather than an error.
    fn find_route(
        &self,
        graph: &Graph,
        network: &FlightNetwork,
        source: &str,
        dest: &str,
    ) -> Option<Route>;
}

/// Price-weighted Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestPlanner;

impl RoutePlanner for CheapestPlanner {
    fn mode(&self) -> SearchMode {
        SearchMode::Cheapest
    }

    fn find_route(
        &self,
        graph: &Graph,
        network: &FlightNetwork,
        source: &str,
        dest: &str,
    ) -> Option<Route> {
        dijkstra(graph, network, source, dest, |_, leg| Some(leg.price_usd))
    }
}

/// Duration-weighted Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastestPlanner;

impl RoutePlanner for FastestPlanner {
    fn mode(&self) -> SearchMode {
        SearchMode::Fastest
    }

    fn find_route(
        &self,
        graph: &Graph,
        network: &FlightNetwork,
        source: &str,
        dest: &str,
    ) -> Option<Route> {
        dijkstra(graph, network, source, dest, |_, leg| {
            Some(leg.duration_min as f64)
        })
    }
}

/// Geodesic A*: optimal by distance, usually exploring fewer nodes than
/// Dijkstra thanks to the admissible haversine heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPlanner;

impl RoutePlanner for ShortestPlanner {
    fn mode(&self) -> SearchMode {
        SearchMode::Shortest
    }

    fn find_route(
        &self,
        graph: &Graph,
        network: &FlightNetwork,
        source: &str,
        dest: &str,
    ) -> Option<Route> {
        a_star(graph, network, source, dest)
    }
}

/// Composite-weight Dijkstra over normalized price, time, and distance.
#[derive(Debug, Clone, Copy)]
pub struct BestOverallPlanner {
    weights: CriteriaWeights,
}

impl BestOverallPlanner {
    pub fn new(weights: CriteriaWeights) -> Self {
        Self { weights }
    }
}

impl RoutePlanner for BestOverallPlanner {
    fn mode(&self) -> SearchMode {
        SearchMode::BestOverall
    }

    fn find_route(
        &self,
        graph: &Graph,
        network: &FlightNetwork,
        source: &str,
        dest: &str,
    ) -> Option<Route> {
        best_overall(graph, network, source, dest, self.weights)
    }
}

/// Select the planner for a single-route mode. Enumeration and Pareto modes
/// produce route sets and have no planner here.
pub fn select_planner(mode: SearchMode, weights: CriteriaWeights) -> Option<Box<dyn RoutePlanner>> {
    match mode {
        SearchMode::Cheapest => Some(Box::new(CheapestPlanner)),
        SearchMode::Fastest => Some(Box::new(FastestPlanner)),
        SearchMode::Shortest => Some(Box::new(ShortestPlanner)),
        SearchMode::BestOverall => Some(Box::new(BestOverallPlanner::new(weights))),
        SearchMode::Pareto | SearchMode::All => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planners_report_their_modes() {
        assert_eq!(CheapestPlanner.mode(), SearchMode::Cheapest);
        assert_eq!(FastestPlanner.mode(), SearchMode::Fastest);
        assert_eq!(ShortestPlanner.mode(), SearchMode::Shortest);
        assert_eq!(
            BestOverallPlanner::new(CriteriaWeights::default()).mode(),
            SearchMode::BestOverall
        );
    }

    #[test]
    fn select_planner_covers_single_route_modes() {
        for mode in [
            SearchMode::Cheapest,
            SearchMode::Fastest,
            SearchMode::Shortest,
            SearchMode::BestOverall,
        ] {
            let planner =
                select_planner(mode, CriteriaWeights::default()).expect("planner exists");
            assert_eq!(planner.mode(), mode);
        }
    }

    #[test]
    fn set_producing_modes_have_no_planner() {
        assert!(select_planner(SearchMode::Pareto, CriteriaWeights::default()).is_none());
        assert!(select_planner(SearchMode::All, CriteriaWeights::default()).is_none());
    }
}
