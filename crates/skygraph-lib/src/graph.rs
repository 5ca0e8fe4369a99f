use std::collections::{HashMap, HashSet, VecDeque};

use crate::db::{FlightLeg, FlightNetwork};

/// Index of a leg within the graph it was built from. Stable for the graph's
/// lifetime, which lets the DFS enumerator track edge identity explicitly
/// instead of comparing endpoint pairs (parallel legs stay distinguishable).
pub type EdgeId = usize;

/// Directed adjacency structure over a snapshot's legs.
///
/// Built fresh from a [`FlightNetwork`] for every request; the graph owns its
/// legs so searches never reach back into the snapshot for edge data.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<String, Vec<EdgeId>>,
    legs: Vec<FlightLeg>,
}

impl Graph {
    /// Build the adjacency structure for a snapshot.
    pub fn build(network: &FlightNetwork) -> Self {
        let legs = network.legs.clone();
        let mut adjacency: HashMap<String, Vec<EdgeId>> = HashMap::new();
        for (id, leg) in legs.iter().enumerate() {
            adjacency.entry(leg.from.clone()).or_default().push(id);
        }

        Self { adjacency, legs }
    }

    /// Outgoing leg ids for a given airport code.
    pub fn neighbours(&self, code: &str) -> &[EdgeId] {
        self.adjacency.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a leg id to its leg.
    pub fn leg(&self, id: EdgeId) -> &FlightLeg {
        &self.legs[id]
    }

    /// Every leg in the graph, indexable by [`EdgeId`].
    pub fn legs(&self) -> &[FlightLeg] {
        &self.legs
    }

    /// Number of legs in the graph.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Whether the airport has at least one outgoing leg.
    pub fn has_departures(&self, code: &str) -> bool {
        self.adjacency.contains_key(code)
    }

    /// Airports reachable from `source` within `max_hops` directed legs,
    /// including `source` itself. Breadth-first, so each airport is recorded
    /// at its minimum hop count.
    pub fn reachable_within(&self, source: &str, max_hops: usize) -> HashSet<String> {
        let mut reached = HashSet::new();
        reached.insert(source.to_string());

        let mut queue = VecDeque::new();
        queue.push_back((source.to_string(), 0usize));

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            for &edge in self.neighbours(&current) {
                let next = &self.legs[edge].to;
                if reached.insert(next.clone()) {
                    queue.push_back((next.clone(), hops + 1));
                }
            }
        }

        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::NetworkBuilder;

    #[test]
    fn build_indexes_parallel_legs_separately() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 1.0)
            .leg("AAA", "BBB", 100.0, 60)
            .leg("AAA", "BBB", 80.0, 90)
            .build();
        let graph = Graph::build(&network);

        assert_eq!(graph.neighbours("AAA").len(), 2);
        assert_eq!(graph.leg_count(), 2);
        assert!(graph.neighbours("BBB").is_empty());
    }

    #[test]
    fn reachable_within_respects_hop_bound() {
        let network = NetworkBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 1.0, 1.0)
            .airport("CCC", 2.0, 2.0)
            .airport("DDD", 3.0, 3.0)
            .leg("AAA", "BBB", 10.0, 60)
            .leg("BBB", "CCC", 10.0, 60)
            .leg("CCC", "DDD", 10.0, 60)
            .build();
        let graph = Graph::build(&network);

        let two_hops = graph.reachable_within("AAA", 2);
        assert!(two_hops.contains("AAA"));
        assert!(two_hops.contains("BBB"));
        assert!(two_hops.contains("CCC"));
        assert!(!two_hops.contains("DDD"));
    }

    #[test]
    fn unknown_airport_has_no_neighbours() {
        let graph = Graph::build(&FlightNetwork::default());
        assert!(graph.neighbours("ZZZ").is_empty());
        assert!(!graph.has_departures("ZZZ"));
    }
}
