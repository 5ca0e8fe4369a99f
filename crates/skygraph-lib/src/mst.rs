use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};
use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::db::FlightLeg;
use crate::graph::{EdgeId, Graph};
use crate::path::FloatOrd;
use crate::trace::MAX_TRACE_STATES;

/// Default trace cap for MST simulations.
pub const DEFAULT_MST_STATES: usize = 500;

/// Hop bound for the reachability sweep that scopes a source/dest subgraph.
const SUBGRAPH_HOPS: usize = 3;

/// Number of frontier entries captured per snapshot.
const FRONTIER_SAMPLE: usize = 5;

/// Spanning-tree algorithm to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MstAlgorithm {
    Prim,
    Kruskal,
}

impl fmt::Display for MstAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MstAlgorithm::Prim => "prim",
            MstAlgorithm::Kruskal => "kruskal",
        };
        f.write_str(value)
    }
}

/// Outcome of one decision point during a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MstDecision {
    /// Edge committed to the spanning tree.
    Commit,
    /// Prim popped an edge whose destination was already visited.
    Skip,
    /// Kruskal rejected an edge whose endpoints already share a root.
    SkipCycle,
}

/// Undirected edge kept after collapsing parallel directed legs; endpoints
/// are stored in lexicographic order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MstEdge {
    pub a: String,
    pub b: String,
    pub weight: f64,
    pub leg: FlightLeg,
}

/// Edge referenced by a snapshot, either as the decision subject or as part
/// of the frontier sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateEdge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// Immutable capture of the simulation state at one decision point.
#[derive(Debug, Clone, Serialize)]
pub struct MstSnapshot {
    pub step: usize,
    pub elapsed_ms: f64,
    pub decision: Option<MstDecision>,
    pub edge: Option<CandidateEdge>,
    pub visited: Vec<String>,
    pub frontier: Vec<CandidateEdge>,
    pub mst_edges: Vec<MstEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

/// Product of an MST simulation: the accepted edges, the decision trace, and
/// the vertex set of the collapsed subgraph.
#[derive(Debug, Clone, Serialize)]
pub struct MstResult {
    pub algorithm: MstAlgorithm,
    pub mst_edges: Vec<MstEdge>,
    pub states: Vec<MstSnapshot>,
    pub airports: Vec<String>,
}

impl MstResult {
    /// Sum of the accepted edge weights.
    pub fn total_weight(&self) -> f64 {
        self.mst_edges.iter().map(|edge| edge.weight).sum()
    }

    /// Whether the accepted edges span the subgraph (V − 1 edges).
    pub fn is_spanning(&self) -> bool {
        self.mst_edges.len() == self.airports.len().saturating_sub(1)
    }
}

/// Transient disjoint-set over airport codes with path compression and
/// union-by-rank; lives for a single Kruskal run.
pub struct UnionFind {
    parent: HashMap<String, String>,
    rank: HashMap<String, u32>,
}

impl UnionFind {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let parent: HashMap<String, String> = nodes
            .into_iter()
            .map(|node| (node.clone(), node))
            .collect();
        let rank = parent.keys().map(|node| (node.clone(), 0)).collect();
        Self { parent, rank }
    }

    /// Root of the set containing `node`, compressing the walked path.
    pub fn find(&mut self, node: &str) -> String {
        let mut root = node.to_string();
        while self.parent[&root] != root {
            root = self.parent[&root].clone();
        }

        let mut current = node.to_string();
        while current != root {
            let next = self.parent[&current].clone();
            self.parent.insert(current, root.clone());
            current = next;
        }

        root
    }

    /// Merge the sets containing `x` and `y`. Returns `false` when they
    /// already share a root.
    pub fn union(&mut self, x: &str, y: &str) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        let rank_x = self.rank[&root_x];
        let rank_y = self.rank[&root_y];
        if rank_x < rank_y {
            self.parent.insert(root_x, root_y);
        } else if rank_x > rank_y {
            self.parent.insert(root_y, root_x);
        } else {
            self.parent.insert(root_y, root_x.clone());
            self.rank.insert(root_x, rank_x + 1);
        }

        true
    }
}

/// Undirected view of the (possibly scoped) network, collapsed to the
/// minimum-price edge per unordered airport pair.
struct UndirectedSubgraph {
    vertices: BTreeSet<String>,
    adjacency: BTreeMap<String, Vec<(String, f64, EdgeId)>>,
    /// Edges sorted ascending by `(weight, a, b)` for Kruskal.
    edges: Vec<(f64, String, String, EdgeId)>,
}

fn collapse_subgraph(graph: &Graph, scope: Option<(&str, &str)>) -> UndirectedSubgraph {
    let scoped: Option<BTreeSet<String>> = scope.map(|(source, dest)| {
        let mut reachable: BTreeSet<String> = graph
            .reachable_within(source, SUBGRAPH_HOPS)
            .into_iter()
            .collect();
        reachable.insert(dest.to_string());
        reachable
    });

    let mut best: BTreeMap<(String, String), (f64, EdgeId)> = BTreeMap::new();
    for (id, leg) in graph.legs().iter().enumerate() {
        if leg.from == leg.to {
            continue;
        }
        if let Some(scope) = &scoped {
            if !scope.contains(&leg.from) || !scope.contains(&leg.to) {
                continue;
            }
        }

        let key = if leg.from <= leg.to {
            (leg.from.clone(), leg.to.clone())
        } else {
            (leg.to.clone(), leg.from.clone())
        };
        match best.get(&key) {
            Some((weight, _)) if *weight <= leg.price_usd => {}
            _ => {
                best.insert(key, (leg.price_usd, id));
            }
        }
    }

    let mut vertices: BTreeSet<String> = match scoped {
        Some(scope) => scope,
        None => best
            .keys()
            .flat_map(|(a, b)| [a.clone(), b.clone()])
            .collect(),
    };
    if let Some((source, dest)) = scope {
        vertices.insert(source.to_string());
        vertices.insert(dest.to_string());
    }

    let mut adjacency: BTreeMap<String, Vec<(String, f64, EdgeId)>> = BTreeMap::new();
    let mut edges = Vec::with_capacity(best.len());
    for ((a, b), (weight, id)) in &best {
        adjacency
            .entry(a.clone())
            .or_default()
            .push((b.clone(), *weight, *id));
        adjacency
            .entry(b.clone())
            .or_default()
            .push((a.clone(), *weight, *id));
        edges.push((*weight, a.clone(), b.clone(), *id));
    }
    edges.sort_by(|x, y| {
        x.0.total_cmp(&y.0)
            .then_with(|| x.1.cmp(&y.1))
            .then_with(|| x.2.cmp(&y.2))
    });

    UndirectedSubgraph {
        vertices,
        adjacency,
        edges,
    }
}

/// Simulate Prim's algorithm over the collapsed subgraph.
///
/// Starts at the scope source (or the lexicographically first vertex for a
/// whole-network run) and repeatedly commits the cheapest frontier edge,
/// recording a snapshot per decision. Edges popped towards already-visited
/// vertices are recorded as `skip` decisions, not errors.
pub fn prim_mst(graph: &Graph, scope: Option<(&str, &str)>, max_states: usize) -> MstResult {
    let cap = max_states.clamp(1, MAX_TRACE_STATES);
    let started = Instant::now();
    let subgraph = collapse_subgraph(graph, scope);

    let start = match scope {
        Some((source, _)) => source.to_string(),
        None => match subgraph.vertices.iter().next() {
            Some(first) => first.clone(),
            None => {
                return MstResult {
                    algorithm: MstAlgorithm::Prim,
                    mst_edges: Vec::new(),
                    states: Vec::new(),
                    airports: Vec::new(),
                }
            }
        },
    };

    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut mst_edges: Vec<MstEdge> = Vec::new();
    let mut heap: BinaryHeap<PrimEntry> = BinaryHeap::new();
    let mut states: Vec<MstSnapshot> = Vec::new();

    visited.insert(start.clone());
    push_frontier(&mut heap, &subgraph, &start, &visited);

    states.push(MstSnapshot {
        step: 0,
        elapsed_ms: elapsed_ms(&started),
        decision: None,
        edge: None,
        visited: visited.iter().cloned().collect(),
        frontier: prim_frontier_sample(&heap),
        mst_edges: mst_edges.clone(),
        total_weight: None,
        valid: None,
    });

    while states.len() < cap && visited.len() < subgraph.vertices.len() {
        let Some(entry) = heap.pop() else {
            break;
        };

        let candidate = CandidateEdge {
            from: entry.from.clone(),
            to: entry.to.clone(),
            weight: entry.weight.0,
        };

        let decision = if visited.contains(&entry.to) {
            MstDecision::Skip
        } else {
            visited.insert(entry.to.clone());
            mst_edges.push(make_edge(graph, &entry));
            push_frontier(&mut heap, &subgraph, &entry.to, &visited);
            MstDecision::Commit
        };

        states.push(MstSnapshot {
            step: states.len(),
            elapsed_ms: elapsed_ms(&started),
            decision: Some(decision),
            edge: Some(candidate),
            visited: visited.iter().cloned().collect(),
            frontier: prim_frontier_sample(&heap),
            mst_edges: mst_edges.clone(),
            total_weight: None,
            valid: None,
        });
    }

    finalize(
        MstAlgorithm::Prim,
        mst_edges,
        states,
        subgraph.vertices,
        &started,
        cap,
    )
}

/// Simulate Kruskal's algorithm over the collapsed subgraph.
///
/// Edges are visited in ascending `(weight, a, b)` order; a union-find
/// rejects cycle-forming edges as `skip_cycle` decisions. The frontier sample
/// carries the next few unprocessed edges.
pub fn kruskal_mst(graph: &Graph, scope: Option<(&str, &str)>, max_states: usize) -> MstResult {
    let cap = max_states.clamp(1, MAX_TRACE_STATES);
    let started = Instant::now();
    let subgraph = collapse_subgraph(graph, scope);

    let mut union_find = UnionFind::new(subgraph.vertices.iter().cloned());
    let mut mst_edges: Vec<MstEdge> = Vec::new();
    let mut states: Vec<MstSnapshot> = Vec::new();

    states.push(MstSnapshot {
        step: 0,
        elapsed_ms: elapsed_ms(&started),
        decision: None,
        edge: None,
        visited: Vec::new(),
        frontier: kruskal_frontier_sample(&subgraph.edges, 0),
        mst_edges: mst_edges.clone(),
        total_weight: None,
        valid: None,
    });

    let target = subgraph.vertices.len().saturating_sub(1);
    for (index, (weight, a, b, id)) in subgraph.edges.iter().enumerate() {
        if states.len() >= cap || mst_edges.len() >= target {
            break;
        }

        let decision = if union_find.union(a, b) {
            mst_edges.push(MstEdge {
                a: a.clone(),
                b: b.clone(),
                weight: *weight,
                leg: graph.leg(*id).clone(),
            });
            MstDecision::Commit
        } else {
            MstDecision::SkipCycle
        };

        states.push(MstSnapshot {
            step: states.len(),
            elapsed_ms: elapsed_ms(&started),
            decision: Some(decision),
            edge: Some(CandidateEdge {
                from: a.clone(),
                to: b.clone(),
                weight: *weight,
            }),
            visited: committed_vertices(&mst_edges),
            frontier: kruskal_frontier_sample(&subgraph.edges, index + 1),
            mst_edges: mst_edges.clone(),
            total_weight: None,
            valid: None,
        });
    }

    finalize(
        MstAlgorithm::Kruskal,
        mst_edges,
        states,
        subgraph.vertices,
        &started,
        cap,
    )
}

fn finalize(
    algorithm: MstAlgorithm,
    mst_edges: Vec<MstEdge>,
    mut states: Vec<MstSnapshot>,
    vertices: BTreeSet<String>,
    started: &Instant,
    cap: usize,
) -> MstResult {
    let total_weight: f64 = mst_edges.iter().map(|edge| edge.weight).sum();
    let valid = mst_edges.len() == vertices.len().saturating_sub(1);

    if states.len() < cap {
        states.push(MstSnapshot {
            step: states.len(),
            elapsed_ms: elapsed_ms(started),
            decision: None,
            edge: None,
            visited: committed_vertices(&mst_edges),
            frontier: Vec::new(),
            mst_edges: mst_edges.clone(),
            total_weight: Some(total_weight),
            valid: Some(valid),
        });
    }

    MstResult {
        algorithm,
        mst_edges,
        states,
        airports: vertices.into_iter().collect(),
    }
}

fn make_edge(graph: &Graph, entry: &PrimEntry) -> MstEdge {
    let (a, b) = if entry.from <= entry.to {
        (entry.from.clone(), entry.to.clone())
    } else {
        (entry.to.clone(), entry.from.clone())
    };
    MstEdge {
        a,
        b,
        weight: entry.weight.0,
        leg: graph.leg(entry.edge).clone(),
    }
}

fn push_frontier(
    heap: &mut BinaryHeap<PrimEntry>,
    subgraph: &UndirectedSubgraph,
    from: &str,
    visited: &BTreeSet<String>,
) {
    let Some(neighbours) = subgraph.adjacency.get(from) else {
        return;
    };
    for (to, weight, edge) in neighbours {
        if !visited.contains(to) {
            heap.push(PrimEntry {
                weight: FloatOrd(*weight),
                from: from.to_string(),
                to: to.clone(),
                edge: *edge,
            });
        }
    }
}

fn prim_frontier_sample(heap: &BinaryHeap<PrimEntry>) -> Vec<CandidateEdge> {
    let mut sample: Vec<CandidateEdge> = heap
        .iter()
        .map(|entry| CandidateEdge {
            from: entry.from.clone(),
            to: entry.to.clone(),
            weight: entry.weight.0,
        })
        .collect();
    sample.sort_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });
    sample.truncate(FRONTIER_SAMPLE);
    sample
}

fn kruskal_frontier_sample(
    edges: &[(f64, String, String, EdgeId)],
    next: usize,
) -> Vec<CandidateEdge> {
    edges
        .iter()
        .skip(next)
        .take(FRONTIER_SAMPLE)
        .map(|(weight, a, b, _)| CandidateEdge {
            from: a.clone(),
            to: b.clone(),
            weight: *weight,
        })
        .collect()
}

fn committed_vertices(mst_edges: &[MstEdge]) -> Vec<String> {
    let set: BTreeSet<&str> = mst_edges
        .iter()
        .flat_map(|edge| [edge.a.as_str(), edge.b.as_str()])
        .collect();
    set.into_iter().map(str::to_string).collect()
}

fn elapsed_ms(started: &Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct PrimEntry {
    weight: FloatOrd,
    from: String,
    to: String,
    edge: EdgeId,
}

impl Ord for PrimEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by weight with lexicographic endpoints as tie-breakers.
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.from.cmp(&self.from))
            .then_with(|| other.to.cmp(&self.to))
    }
}

impl PartialOrd for PrimEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::NetworkBuilder;

    fn triangle_network() -> crate::db::FlightNetwork {
        NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .airport("CCC", 0.0, 1.0)
            .leg("AAA", "BBB", 10.0, 60)
            .leg("BBB", "CCC", 20.0, 60)
            .leg("AAA", "CCC", 30.0, 60)
            .build()
    }

    #[test]
    fn prim_and_kruskal_agree_on_total_weight() {
        let network = triangle_network();
        let graph = Graph::build(&network);

        let prim = prim_mst(&graph, None, DEFAULT_MST_STATES);
        let kruskal = kruskal_mst(&graph, None, DEFAULT_MST_STATES);

        assert!((prim.total_weight() - kruskal.total_weight()).abs() < 1e-9);
        assert_eq!(prim.total_weight(), 30.0);
    }

    #[test]
    fn spanning_tree_has_vertex_count_minus_one_edges() {
        let network = triangle_network();
        let graph = Graph::build(&network);
        let result = kruskal_mst(&graph, None, DEFAULT_MST_STATES);

        assert_eq!(result.airports.len(), 3);
        assert_eq!(result.mst_edges.len(), 2);
        assert!(result.is_spanning());
        assert_eq!(result.states.last().unwrap().valid, Some(true));
    }

    /// Square with a chord: the cycle-closing AAA-CCC edge is cheaper than
    /// the only edge reaching DDD, so both algorithms must consider and
    /// reject it before finishing.
    fn chorded_square_network() -> crate::db::FlightNetwork {
        NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .airport("CCC", 1.0, 1.0)
            .airport("DDD", 0.0, 1.0)
            .leg("AAA", "BBB", 1.0, 60)
            .leg("AAA", "CCC", 2.0, 60)
            .leg("BBB", "CCC", 3.0, 60)
            .leg("CCC", "DDD", 10.0, 60)
            .build()
    }

    #[test]
    fn kruskal_records_cycle_rejections() {
        let network = chorded_square_network();
        let graph = Graph::build(&network);
        let result = kruskal_mst(&graph, None, DEFAULT_MST_STATES);

        let skipped = result
            .states
            .iter()
            .any(|state| state.decision == Some(MstDecision::SkipCycle));
        assert!(skipped);
        assert!(result.is_spanning());
        assert_eq!(result.total_weight(), 13.0);
    }

    #[test]
    fn prim_skips_edges_into_visited_vertices() {
        let network = chorded_square_network();
        let graph = Graph::build(&network);
        let result = prim_mst(&graph, None, DEFAULT_MST_STATES);

        let skipped = result
            .states
            .iter()
            .any(|state| state.decision == Some(MstDecision::Skip));
        assert!(skipped);
        assert!(result.is_spanning());
        assert_eq!(result.total_weight(), 13.0);
    }

    #[test]
    fn disconnected_subgraph_reports_invalid() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .airport("CCC", 5.0, 5.0)
            .airport("DDD", 6.0, 5.0)
            .leg("AAA", "BBB", 1.0, 60)
            .leg("CCC", "DDD", 1.0, 60)
            .build();
        let graph = Graph::build(&network);
        let result = kruskal_mst(&graph, None, DEFAULT_MST_STATES);

        assert!(!result.is_spanning());
        assert_eq!(result.states.last().unwrap().valid, Some(false));
    }

    #[test]
    fn parallel_legs_collapse_to_minimum_price() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .leg("AAA", "BBB", 50.0, 60)
            .leg("BBB", "AAA", 20.0, 60)
            .leg("AAA", "BBB", 35.0, 60)
            .build();
        let graph = Graph::build(&network);
        let result = kruskal_mst(&graph, None, DEFAULT_MST_STATES);

        assert_eq!(result.mst_edges.len(), 1);
        assert_eq!(result.mst_edges[0].weight, 20.0);
        assert_eq!(result.mst_edges[0].a, "AAA");
        assert_eq!(result.mst_edges[0].b, "BBB");
    }

    #[test]
    fn scoped_subgraph_excludes_unreachable_airports() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .airport("FAR", 9.0, 9.0)
            .airport("WAY", 9.5, 9.0)
            .leg("AAA", "BBB", 1.0, 60)
            .leg("FAR", "WAY", 1.0, 60)
            .build();
        let graph = Graph::build(&network);
        let result = prim_mst(&graph, Some(("AAA", "BBB")), DEFAULT_MST_STATES);

        assert_eq!(result.airports, vec!["AAA", "BBB"]);
        assert!(result.is_spanning());
    }

    #[test]
    fn unreachable_dest_is_reported_not_fatal() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 0.0)
            .airport("ZZZ", 9.0, 9.0)
            .leg("AAA", "BBB", 1.0, 60)
            .build();
        let graph = Graph::build(&network);
        let result = prim_mst(&graph, Some(("AAA", "ZZZ")), DEFAULT_MST_STATES);

        // ZZZ joins the vertex set but no edge can reach it.
        assert_eq!(result.airports.len(), 3);
        assert!(!result.is_spanning());
        assert_eq!(result.states.last().unwrap().valid, Some(false));
    }

    #[test]
    fn single_state_cap_yields_only_the_initial_snapshot() {
        let network = triangle_network();
        let graph = Graph::build(&network);

        for result in [prim_mst(&graph, None, 1), kruskal_mst(&graph, None, 1)] {
            assert_eq!(result.states.len(), 1);
            assert!(result.states[0].mst_edges.is_empty());
            assert!(result.states[0].decision.is_none());
        }
    }

    #[test]
    fn traces_are_reproducible() {
        let network = triangle_network();
        let graph = Graph::build(&network);
        let first = prim_mst(&graph, None, DEFAULT_MST_STATES);
        let second = prim_mst(&graph, None, DEFAULT_MST_STATES);

        assert_eq!(first.states.len(), second.states.len());
        for (a, b) in first.states.iter().zip(&second.states) {
            assert_eq!(a.decision, b.decision);
            assert_eq!(a.edge, b.edge);
            assert_eq!(a.visited, b.visited);
        }
    }

    #[test]
    fn union_find_detects_shared_roots() {
        let mut uf = UnionFind::new(["AAA", "BBB", "CCC"].map(String::from));
        assert!(uf.union("AAA", "BBB"));
        assert!(!uf.union("BBB", "AAA"));
        assert!(uf.union("BBB", "CCC"));
        assert_eq!(uf.find("CCC"), uf.find("AAA"));
    }
}
