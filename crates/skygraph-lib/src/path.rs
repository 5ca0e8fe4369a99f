use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::db::{FlightLeg, FlightNetwork};
use crate::graph::{EdgeId, Graph};
use crate::route::{assemble, Route, RouteStats};

/// Upper bound on `max_stops` accepted by the enumerator. Enumeration is
/// exponential in the stop count, so the caller-facing bound stays small.
pub const MAX_ENUMERATION_STOPS: usize = 4;

/// Edge-weight function used by [`dijkstra`]. Returning `None` excludes the
/// leg from the search entirely; returned weights must be non-negative for
/// the optimality guarantee to hold.
pub trait WeightFn: Fn(EdgeId, &FlightLeg) -> Option<f64> {}

impl<F> WeightFn for F where F: Fn(EdgeId, &FlightLeg) -> Option<f64> {}

/// Dijkstra over the directed leg graph with a pluggable weight function.
///
/// Nodes pop in non-decreasing accumulated cost, so the first pop of `dest`
/// is optimal. Ties are broken by airport code to keep runs reproducible.
/// No path (or `source == dest`) yields `None`, which is an expected outcome
/// rather than an error.
pub fn dijkstra(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    weight: impl WeightFn,
) -> Option<Route> {
    if source == dest {
        return None;
    }

    let mut distances: HashMap<String, f64> = HashMap::new();
    let mut came_from: HashMap<String, String> = HashMap::new();
    let mut leg_used: HashMap<String, EdgeId> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut stats = RouteStats::default();

    distances.insert(source.to_string(), 0.0);
    queue.push(QueueEntry::new(source.to_string(), 0.0));

    while let Some(entry) = queue.pop() {
        let Some(&best) = distances.get(&entry.code) else {
            continue;
        };
        if entry.cost.0 > best {
            // Stale heap entry superseded by a cheaper relaxation.
            continue;
        }
        stats.nodes_explored += 1;

        if entry.code == dest {
            return reconstruct(graph, network, &came_from, &leg_used, source, dest, stats);
        }

        for &edge in graph.neighbours(&entry.code) {
            let leg = graph.leg(edge);
            stats.edges_checked += 1;
            let Some(step) = weight(edge, leg) else {
                continue;
            };

            let next_cost = best + step;
            if next_cost < *distances.get(&leg.to).unwrap_or(&f64::INFINITY) {
                distances.insert(leg.to.clone(), next_cost);
                came_from.insert(leg.to.clone(), entry.code.clone());
                leg_used.insert(leg.to.clone(), edge);
                queue.push(QueueEntry::new(leg.to.clone(), next_cost));
            }
        }
    }

    None
}

/// A* over geodesic distance with the haversine heuristic.
///
/// The heuristic is the great-circle distance to `dest`, which can never
/// overestimate a multi-leg path and is consistent, so the result matches
/// Dijkstra-by-distance while typically expanding fewer nodes. Both endpoints
/// need coordinates; legs with unresolvable endpoints are skipped.
pub fn a_star(graph: &Graph, network: &FlightNetwork, source: &str, dest: &str) -> Option<Route> {
    if source == dest {
        return None;
    }
    let source_coords = network.coordinates(source)?;
    let goal = network.coordinates(dest)?;

    let mut g_score: HashMap<String, f64> = HashMap::new();
    let mut came_from: HashMap<String, String> = HashMap::new();
    let mut leg_used: HashMap<String, EdgeId> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut stats = RouteStats::default();

    g_score.insert(source.to_string(), 0.0);
    queue.push(AStarEntry::new(
        source.to_string(),
        0.0,
        source_coords.distance_to(&goal),
    ));

    while let Some(entry) = queue.pop() {
        let Some(&best) = g_score.get(&entry.code) else {
            continue;
        };
        if entry.cost.0 > best {
            continue;
        }
        stats.nodes_explored += 1;

        if entry.code == dest {
            return reconstruct(graph, network, &came_from, &leg_used, source, dest, stats);
        }

        for &edge in graph.neighbours(&entry.code) {
            let leg = graph.leg(edge);
            stats.edges_checked += 1;
            let Some(step) = network.leg_distance_km(leg) else {
                continue;
            };

            let tentative = best + step;
            if tentative < *g_score.get(&leg.to).unwrap_or(&f64::INFINITY) {
                let Some(next_coords) = network.coordinates(&leg.to) else {
                    continue;
                };
                g_score.insert(leg.to.clone(), tentative);
                came_from.insert(leg.to.clone(), entry.code.clone());
                leg_used.insert(leg.to.clone(), edge);
                queue.push(AStarEntry::new(
                    leg.to.clone(),
                    tentative,
                    next_coords.distance_to(&goal),
                ));
            }
        }
    }

    None
}

/// Exhaustively enumerate routes from `source` to `dest` using at most
/// `max_stops` intermediate airports.
///
/// Paths are edge-disjoint with themselves: a leg id may appear once per
/// path, so parallel legs between the same airports each yield their own
/// route and an airport may be revisited only through different legs.
/// Candidates whose endpoints lack coordinates are dropped during assembly.
pub fn enumerate_routes(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    max_stops: usize,
) -> Vec<Route> {
    let capped = max_stops.min(MAX_ENUMERATION_STOPS);
    let mut routes = Vec::new();
    let mut path: Vec<EdgeId> = Vec::new();
    visit(
        graph,
        network,
        dest,
        source,
        capped as i64,
        &mut path,
        &mut routes,
    );
    routes
}

fn visit(
    graph: &Graph,
    network: &FlightNetwork,
    dest: &str,
    current: &str,
    stops_left: i64,
    path: &mut Vec<EdgeId>,
    routes: &mut Vec<Route>,
) {
    if current == dest && !path.is_empty() {
        let legs: Vec<FlightLeg> = path.iter().map(|&id| graph.leg(id).clone()).collect();
        if let Some(route) = assemble(legs, network) {
            routes.push(route);
        }
        return;
    }

    if stops_left < 0 {
        return;
    }

    for &edge in graph.neighbours(current) {
        // Edge identity, not endpoint pair: parallel legs stay usable.
        if path.contains(&edge) {
            continue;
        }
        path.push(edge);
        let next = graph.leg(edge).to.clone();
        visit(graph, network, dest, &next, stops_left - 1, path, routes);
        path.pop();
    }
}

pub(crate) fn reconstruct(
    graph: &Graph,
    network: &FlightNetwork,
    came_from: &HashMap<String, String>,
    leg_used: &HashMap<String, EdgeId>,
    source: &str,
    dest: &str,
    stats: RouteStats,
) -> Option<Route> {
    let mut legs = Vec::new();
    let mut current = dest.to_string();
    while current != source {
        let edge = *leg_used.get(&current)?;
        legs.push(graph.leg(edge).clone());
        current = came_from.get(&current)?.clone();
    }
    legs.reverse();
    assemble(legs, network).map(|route| route.with_stats(stats))
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct FloatOrd(pub(crate) f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct QueueEntry {
    pub(crate) code: String,
    pub(crate) cost: FloatOrd,
}

impl QueueEntry {
    pub(crate) fn new(code: String, cost: f64) -> Self {
        Self {
            code,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, with the
        // airport code as a deterministic secondary key.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.code.cmp(&self.code))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    code: String,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(code: String, cost: f64, heuristic: f64) -> Self {
        Self {
            code,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.code.cmp(&self.code))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
