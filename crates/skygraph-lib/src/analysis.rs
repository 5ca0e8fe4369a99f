use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::db::FlightNetwork;
use crate::graph::Graph;

/// In/out tallies for one airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DegreeCount {
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Whole-network statistics derived from the directed edge set.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub vertices: usize,
    pub edges: usize,
    pub density: f64,
    pub degrees: BTreeMap<String, DegreeCount>,
}

/// One outgoing leg in the adjacency-list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacencyEntry {
    pub to: String,
    pub flight_no: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    #[serde(rename = "durationMin")]
    pub duration_min: i64,
}

/// Dense matrix view: cell `[i][j]` holds the minimum price among parallel
/// legs from `airports[i]` to `airports[j]`, 0 meaning no leg.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyMatrix {
    pub airports: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

/// One weakly connected component of the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub members: Vec<String>,
    pub size: usize,
}

/// Directed edge retained in a route-local subgraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphEdge {
    pub from: String,
    pub to: String,
    pub flight_no: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
}

/// The induced subgraph around a source/dest pair.
#[derive(Debug, Clone, Serialize)]
pub struct SubgraphSummary {
    pub airports: Vec<String>,
    pub edges: Vec<SubgraphEdge>,
    pub vertices_count: usize,
    pub edges_count: usize,
}

/// Distinct airport-sequence options between source and dest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PathOptions {
    pub direct: usize,
    pub one_stop: usize,
    pub two_stop: usize,
}

/// Route-local context: the bounded subgraph plus connectivity numbers.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAnalysis {
    pub source: String,
    pub dest: String,
    pub subgraph: SubgraphSummary,
    pub path_options: PathOptions,
    pub source_out_degree: usize,
    pub dest_in_degree: usize,
    pub connected: bool,
    pub local_density: f64,
}

/// Degree tallies and network density over the full directed edge set.
/// Density is `|E| / (|V| * (|V| - 1))` for more than one vertex, else 0.
pub fn graph_stats(network: &FlightNetwork) -> GraphStats {
    let mut degrees: BTreeMap<String, DegreeCount> = network
        .airports
        .keys()
        .map(|code| (code.clone(), DegreeCount::default()))
        .collect();

    for leg in &network.legs {
        degrees.entry(leg.from.clone()).or_default().out_degree += 1;
        degrees.entry(leg.to.clone()).or_default().in_degree += 1;
    }

    let vertices = degrees.len();
    let edges = network.legs.len();
    let density = if vertices > 1 {
        round4(edges as f64 / (vertices as f64 * (vertices as f64 - 1.0)))
    } else {
        0.0
    };

    GraphStats {
        vertices,
        edges,
        density,
        degrees,
    }
}

/// Adjacency-list view over every airport that appears in at least one leg.
pub fn adjacency_list(network: &FlightNetwork) -> BTreeMap<String, Vec<AdjacencyEntry>> {
    let mut list: BTreeMap<String, Vec<AdjacencyEntry>> = BTreeMap::new();
    for leg in &network.legs {
        list.entry(leg.to.clone()).or_default();
        list.entry(leg.from.clone()).or_default().push(AdjacencyEntry {
            to: leg.to.clone(),
            flight_no: leg.flight_no.clone(),
            price_usd: leg.price_usd,
            duration_min: leg.duration_min,
        });
    }

    for entries in list.values_mut() {
        entries.sort_by(|a, b| a.to.cmp(&b.to).then_with(|| a.flight_no.cmp(&b.flight_no)));
    }

    list
}

/// Dense minimum-price matrix over every airport in the snapshot (isolated
/// ones included), indexed by lexicographically sorted code.
pub fn adjacency_matrix(network: &FlightNetwork) -> AdjacencyMatrix {
    let airports: Vec<String> = {
        let mut codes: Vec<String> = network.airports.keys().cloned().collect();
        codes.sort();
        codes
    };
    let index: HashMap<&str, usize> = airports
        .iter()
        .enumerate()
        .map(|(i, code)| (code.as_str(), i))
        .collect();

    let n = airports.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for leg in &network.legs {
        let (Some(&i), Some(&j)) = (index.get(leg.from.as_str()), index.get(leg.to.as_str()))
        else {
            continue;
        };
        let cell = &mut matrix[i][j];
        if *cell == 0.0 || leg.price_usd < *cell {
            *cell = leg.price_usd;
        }
    }

    AdjacencyMatrix { airports, matrix }
}

/// Weakly connected components: legs are treated as undirected and every
/// unvisited airport seeds a breadth-first sweep. Isolated airports form
/// singleton components.
pub fn connected_components(network: &FlightNetwork) -> Vec<Component> {
    let mut undirected: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for code in network.airports.keys() {
        undirected.entry(code.as_str()).or_default();
    }
    for leg in &network.legs {
        undirected.entry(leg.from.as_str()).or_default().push(leg.to.as_str());
        undirected.entry(leg.to.as_str()).or_default().push(leg.from.as_str());
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();
    for &start in undirected.keys() {
        if seen.contains(start) {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            members.push(current.to_string());
            for &next in &undirected[current] {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        members.sort();
        components.push(Component {
            size: members.len(),
            members,
        });
    }

    components
}

/// Bounded subgraph analysis around a source/dest pair.
///
/// The subgraph is everything reachable from `source` within `max_hops`
/// directed legs, always including `dest`, with the legs induced on that
/// vertex set. Path options count distinct airport sequences, so parallel
/// legs contribute a single option.
pub fn route_analysis(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    max_hops: usize,
) -> RouteAnalysis {
    let mut scope = graph.reachable_within(source, max_hops);
    scope.insert(dest.to_string());

    let mut edges = Vec::new();
    let mut pairs: HashMap<&str, HashSet<&str>> = HashMap::new();
    for leg in graph.legs() {
        if !scope.contains(&leg.from) || !scope.contains(&leg.to) {
            continue;
        }
        edges.push(SubgraphEdge {
            from: leg.from.clone(),
            to: leg.to.clone(),
            flight_no: leg.flight_no.clone(),
            price_usd: leg.price_usd,
        });
        pairs.entry(leg.from.as_str()).or_default().insert(leg.to.as_str());
    }
    edges.sort_by(|a, b| {
        a.from
            .cmp(&b.from)
            .then_with(|| a.to.cmp(&b.to))
            .then_with(|| a.flight_no.cmp(&b.flight_no))
    });

    let path_options = count_path_options(&pairs, source, dest);
    let connected = reaches(&pairs, source, dest);

    let vertices_count = scope.len();
    let edges_count = edges.len();
    let local_density = if vertices_count > 1 {
        round4(edges_count as f64 / (vertices_count as f64 * (vertices_count as f64 - 1.0)))
    } else {
        0.0
    };

    let mut airports: Vec<String> = scope.into_iter().collect();
    airports.sort();

    let dest_in_degree = network.legs.iter().filter(|leg| leg.to == dest).count();

    RouteAnalysis {
        source: source.to_string(),
        dest: dest.to_string(),
        subgraph: SubgraphSummary {
            airports,
            edges,
            vertices_count,
            edges_count,
        },
        path_options,
        source_out_degree: graph.neighbours(source).len(),
        dest_in_degree,
        connected,
        local_density,
    }
}

fn count_path_options(
    pairs: &HashMap<&str, HashSet<&str>>,
    source: &str,
    dest: &str,
) -> PathOptions {
    let empty = HashSet::new();
    let from_source = pairs.get(source).unwrap_or(&empty);

    let direct = usize::from(from_source.contains(dest));

    let mut one_stop = 0;
    let mut two_stop = 0;
    for &mid in from_source {
        if mid == source || mid == dest {
            continue;
        }
        let onward = pairs.get(mid).unwrap_or(&empty);
        if onward.contains(dest) {
            one_stop += 1;
        }
        for &second in onward {
            if second == source || second == dest || second == mid {
                continue;
            }
            if pairs.get(second).unwrap_or(&empty).contains(dest) {
                two_stop += 1;
            }
        }
    }

    PathOptions {
        direct,
        one_stop,
        two_stop,
    }
}

fn reaches(pairs: &HashMap<&str, HashSet<&str>>, source: &str, dest: &str) -> bool {
    if source == dest {
        return true;
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(source);
    queue.push_back(source);
    while let Some(current) = queue.pop_front() {
        let Some(nexts) = pairs.get(current) else {
            continue;
        };
        for &next in nexts {
            if next == dest {
                return true;
            }
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
