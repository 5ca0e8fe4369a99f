use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};
use std::time::Instant;

use serde::Serialize;

use crate::db::FlightNetwork;
use crate::graph::{EdgeId, Graph};
use crate::path::{reconstruct, QueueEntry, WeightFn};
use crate::route::{Route, RouteStats};

/// Hard ceiling on any trace length, applied on top of the caller's cap.
pub const MAX_TRACE_STATES: usize = 1_000;

/// Default trace cap for simulated searches.
pub const DEFAULT_SEARCH_STATES: usize = 300;

/// Number of frontier entries captured per snapshot.
const FRONTIER_SAMPLE: usize = 8;

/// One priority-queue entry as seen in a snapshot's frontier sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontierEntry {
    pub code: String,
    pub cost: f64,
}

/// What happened at a decision point in the simulated search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SearchEvent {
    /// A heap entry for an already-finalized node was discarded.
    SkippedVisited,
    /// An outgoing leg was examined; `updated` records whether it improved
    /// the tentative distance of its destination.
    Relaxation {
        from: String,
        to: String,
        flight_no: String,
        updated: bool,
        new_cost: Option<f64>,
    },
}

/// Immutable capture of the search state at one decision point.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSnapshot {
    pub step: usize,
    pub elapsed_ms: f64,
    pub current: Option<String>,
    pub frontier: Vec<FrontierEntry>,
    pub distances: BTreeMap<String, f64>,
    pub visited: Vec<String>,
    pub predecessors: BTreeMap<String, String>,
    pub event: Option<SearchEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

/// Full product of a simulated search: the route (when one was concluded)
/// plus the append-only snapshot sequence for step-by-step animation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchTrace {
    pub route: Option<Route>,
    pub states: Vec<SearchSnapshot>,
}

/// Run Dijkstra while recording one snapshot per decision point.
///
/// The trace starts with an initial snapshot before any pop, captures every
/// pop (including discarded stale pops) and every relaxation, and ends with a
/// concluding snapshot carrying the assembled route when the destination was
/// reached. The sequence never exceeds the caller's cap; a cap of 1 yields
/// exactly the initial snapshot and no concluded route.
pub fn simulate_dijkstra(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    weight: impl WeightFn,
    max_states: usize,
) -> SearchTrace {
    let cap = max_states.clamp(1, MAX_TRACE_STATES);
    let started = Instant::now();

    if source == dest || !graph.has_departures(source) {
        return SearchTrace {
            route: None,
            states: Vec::new(),
        };
    }

    let mut distances: HashMap<String, f64> = HashMap::new();
    let mut came_from: HashMap<String, String> = HashMap::new();
    let mut leg_used: HashMap<String, EdgeId> = HashMap::new();
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue = BinaryHeap::new();
    let mut states: Vec<SearchSnapshot> = Vec::new();
    let mut stats = RouteStats::default();

    distances.insert(source.to_string(), 0.0);
    queue.push(QueueEntry::new(source.to_string(), 0.0));

    states.push(capture(
        states.len(),
        &started,
        None,
        &queue,
        &distances,
        &visited,
        &came_from,
        None,
        None,
    ));

    'search: while let Some(entry) = queue.pop() {
        if states.len() >= cap {
            break;
        }

        if visited.contains(&entry.code) {
            states.push(capture(
                states.len(),
                &started,
                Some(entry.code.clone()),
                &queue,
                &distances,
                &visited,
                &came_from,
                Some(SearchEvent::SkippedVisited),
                None,
            ));
            continue;
        }

        visited.insert(entry.code.clone());
        stats.nodes_explored += 1;

        states.push(capture(
            states.len(),
            &started,
            Some(entry.code.clone()),
            &queue,
            &distances,
            &visited,
            &came_from,
            None,
            None,
        ));
        if states.len() >= cap {
            break;
        }

        if entry.code == dest {
            let route = reconstruct(graph, network, &came_from, &leg_used, source, dest, stats);
            states.push(capture(
                states.len(),
                &started,
                Some(entry.code.clone()),
                &queue,
                &distances,
                &visited,
                &came_from,
                None,
                route.clone(),
            ));
            return SearchTrace { route, states };
        }

        let current_cost = *distances.get(&entry.code).unwrap_or(&f64::INFINITY);
        for &edge in graph.neighbours(&entry.code) {
            let leg = graph.leg(edge);
            let Some(step_weight) = weight(edge, leg) else {
                continue;
            };
            stats.edges_checked += 1;

            let new_cost = current_cost + step_weight;
            let updated = new_cost < *distances.get(&leg.to).unwrap_or(&f64::INFINITY);
            if updated {
                distances.insert(leg.to.clone(), new_cost);
                came_from.insert(leg.to.clone(), entry.code.clone());
                leg_used.insert(leg.to.clone(), edge);
                queue.push(QueueEntry::new(leg.to.clone(), new_cost));
            }

            states.push(capture(
                states.len(),
                &started,
                Some(entry.code.clone()),
                &queue,
                &distances,
                &visited,
                &came_from,
                Some(SearchEvent::Relaxation {
                    from: leg.from.clone(),
                    to: leg.to.clone(),
                    flight_no: leg.flight_no.clone(),
                    updated,
                    new_cost: updated.then_some(new_cost),
                }),
                None,
            ));
            if states.len() >= cap {
                break 'search;
            }
        }
    }

    // Cap reached or frontier exhausted; salvage a route if the destination
    // was ever relaxed.
    let route = if leg_used.contains_key(dest) {
        reconstruct(graph, network, &came_from, &leg_used, source, dest, stats)
    } else {
        None
    };

    if route.is_some() && states.len() < cap {
        states.push(capture(
            states.len(),
            &started,
            None,
            &queue,
            &distances,
            &visited,
            &came_from,
            None,
            route.clone(),
        ));
    }

    SearchTrace { route, states }
}

#[allow(clippy::too_many_arguments)]
fn capture(
    step: usize,
    started: &Instant,
    current: Option<String>,
    queue: &BinaryHeap<QueueEntry>,
    distances: &HashMap<String, f64>,
    visited: &BTreeSet<String>,
    came_from: &HashMap<String, String>,
    event: Option<SearchEvent>,
    route: Option<Route>,
) -> SearchSnapshot {
    let mut frontier: Vec<FrontierEntry> = queue
        .iter()
        .map(|entry| FrontierEntry {
            code: entry.code.clone(),
            cost: entry.cost.0,
        })
        .collect();
    frontier.sort_by(|a, b| a.cost.total_cmp(&b.cost).then_with(|| a.code.cmp(&b.code)));
    frontier.truncate(FRONTIER_SAMPLE);

    SearchSnapshot {
        step,
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        current,
        frontier,
        distances: distances.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        visited: visited.iter().cloned().collect(),
        predecessors: came_from.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        event,
        route,
    }
}
