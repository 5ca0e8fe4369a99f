use std::collections::HashSet;

use serde::Serialize;

use crate::db::FlightNetwork;
use crate::graph::Graph;
use crate::path::enumerate_routes;
use crate::route::Route;

/// Stop bound used when enumerating Pareto candidates.
const CANDIDATE_STOPS: usize = 4;

/// Presentation cap: a larger front is reduced to the per-criterion extremes.
const MAX_PRESENTED: usize = 3;

/// Outcome of a Pareto query. `all_candidates` keeps every deduplicated
/// enumeration result, dominated ones included, for downstream visualization.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoResult {
    pub pareto_routes: Vec<Route>,
    pub all_candidates: Vec<Route>,
    pub total_candidates: usize,
    pub pareto_count: usize,
}

/// Whether `a` dominates `b`: no worse on price, duration, and distance, and
/// strictly better on at least one. Exact ties never dominate.
pub fn dominates(a: &Route, b: &Route) -> bool {
    let no_worse = a.total_price_usd <= b.total_price_usd
        && a.total_duration_min <= b.total_duration_min
        && a.total_distance_km <= b.total_distance_km;
    let strictly_better = a.total_price_usd < b.total_price_usd
        || a.total_duration_min < b.total_duration_min
        || a.total_distance_km < b.total_distance_km;
    no_worse && strictly_better
}

/// Enumerate candidates, extract the Pareto front, and apply the presentation
/// policy.
///
/// Candidates are deduplicated by airport-code path signature, so parallel
/// legs over the same path collapse to the first enumerated. When the front
/// holds more than three members it is reduced to the minimum-price,
/// minimum-duration, and minimum-distance routes (deduplicated, backfilled
/// from the remaining front). This reduction is a presentation policy rather
/// than a principled subset selection; see DESIGN.md.
pub fn pareto_front(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
) -> ParetoResult {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for route in enumerate_routes(graph, network, source, dest, CANDIDATE_STOPS) {
        if seen.insert(route.path_signature()) {
            candidates.push(route);
        }
    }

    let front: Vec<Route> = candidates
        .iter()
        .enumerate()
        .filter(|(i, route)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && dominates(other, route))
        })
        .map(|(_, route)| route.clone())
        .collect();

    let presented = if front.len() <= MAX_PRESENTED {
        front
    } else {
        reduce_to_extremes(&front)
    };

    ParetoResult {
        total_candidates: candidates.len(),
        pareto_count: presented.len(),
        pareto_routes: presented,
        all_candidates: candidates,
    }
}

fn reduce_to_extremes(front: &[Route]) -> Vec<Route> {
    let extremes = [
        front
            .iter()
            .min_by(|a, b| a.total_price_usd.total_cmp(&b.total_price_usd)),
        front
            .iter()
            .min_by(|a, b| a.total_duration_min.cmp(&b.total_duration_min)),
        front
            .iter()
            .min_by(|a, b| a.total_distance_km.total_cmp(&b.total_distance_km)),
    ];

    let mut selected = Vec::new();
    let mut chosen = HashSet::new();
    for route in extremes.into_iter().flatten() {
        if chosen.insert(route.path_signature()) {
            selected.push(route.clone());
        }
    }

    // Collisions between the extremes can shrink the selection; refill from
    // the front in enumeration order.
    for route in front {
        if selected.len() >= MAX_PRESENTED {
            break;
        }
        if chosen.insert(route.path_signature()) {
            selected.push(route.clone());
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{lhe_dxb_jfk_network, NetworkBuilder};

    /// Four detour airports fanned out from a straight line, giving four
    /// mutually non-dominated price/time/distance tradeoffs plus one route
    /// that loses on every criterion.
    fn tradeoff_network() -> FlightNetwork {
        NetworkBuilder::new()
            .airport("SRC", 0.0, 0.0)
            .airport("DST", 0.0, 10.0)
            .airport("MAA", 0.0, 5.0)
            .airport("MBB", 2.0, 5.0)
            .airport("MCC", 4.0, 5.0)
            .airport("MDD", 6.0, 5.0)
            .airport("MEE", 8.0, 5.0)
            .leg("SRC", "MAA", 200.0, 200)
            .leg("MAA", "DST", 200.0, 200)
            .leg("SRC", "MBB", 150.0, 250)
            .leg("MBB", "DST", 150.0, 250)
            .leg("SRC", "MCC", 100.0, 300)
            .leg("MCC", "DST", 100.0, 300)
            .leg("SRC", "MDD", 50.0, 350)
            .leg("MDD", "DST", 50.0, 350)
            .leg("SRC", "MEE", 500.0, 800)
            .leg("MEE", "DST", 500.0, 800)
            .build()
    }

    #[test]
    fn front_members_never_dominate_each_other() {
        let network = tradeoff_network();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "SRC", "DST");

        for a in &result.pareto_routes {
            for b in &result.pareto_routes {
                assert!(!dominates(a, b), "{} dominates {}", a.path_signature(), b.path_signature());
            }
        }
    }

    #[test]
    fn dominated_candidates_are_filtered_but_reported() {
        let network = tradeoff_network();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "SRC", "DST");

        assert_eq!(result.total_candidates, 5);
        let presented: Vec<String> = result
            .pareto_routes
            .iter()
            .map(Route::path_signature)
            .collect();
        assert!(!presented.contains(&"SRC>MEE>DST".to_string()));
        let all: Vec<String> = result
            .all_candidates
            .iter()
            .map(Route::path_signature)
            .collect();
        assert!(all.contains(&"SRC>MEE>DST".to_string()));
    }

    #[test]
    fn oversized_front_reduces_to_three_extremes() {
        let network = tradeoff_network();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "SRC", "DST");

        assert_eq!(result.pareto_count, 3);
        assert_eq!(result.pareto_routes.len(), 3);

        let presented: Vec<String> = result
            .pareto_routes
            .iter()
            .map(Route::path_signature)
            .collect();
        // Cheapest and shortest extremes must survive the reduction.
        assert!(presented.contains(&"SRC>MDD>DST".to_string()));
        assert!(presented.contains(&"SRC>MAA>DST".to_string()));
    }

    #[test]
    fn small_front_is_returned_unchanged() {
        let network = lhe_dxb_jfk_network();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "LHE", "JFK");

        // The two-leg itinerary dominates on price and time but is longer in
        // distance, so both routes are non-dominated.
        assert_eq!(result.pareto_count, result.pareto_routes.len());
        assert!(result.pareto_count <= 3);
        assert_eq!(result.total_candidates, 2);
    }

    #[test]
    fn no_candidates_yields_empty_result() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 1.0)
            .build();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "AAA", "BBB");

        assert!(result.pareto_routes.is_empty());
        assert_eq!(result.total_candidates, 0);
        assert_eq!(result.pareto_count, 0);
    }

    #[test]
    fn duplicate_paths_collapse_to_one_candidate() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 1.0)
            .leg_with_flight("AAA", "BBB", 100.0, 60, "SG1")
            .leg_with_flight("AAA", "BBB", 120.0, 70, "SG2")
            .build();
        let graph = Graph::build(&network);
        let result = pareto_front(&graph, &network, "AAA", "BBB");

        assert_eq!(result.total_candidates, 1);
        assert_eq!(result.pareto_routes[0].legs[0].flight_no, "SG1");
    }
}
