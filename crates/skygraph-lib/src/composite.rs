use serde::Serialize;

use crate::db::FlightNetwork;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::dijkstra;
use crate::route::Route;

/// Normalized value used when a metric's population is degenerate
/// (minimum equals maximum), avoiding a division by zero.
const DEGENERATE_MIDPOINT: f64 = 0.5;

/// Relative importance of price, travel time, and geodesic distance in the
/// composite edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriteriaWeights {
    pub price: f64,
    pub time: f64,
    pub distance: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            price: 0.40,
            time: 0.35,
            distance: 0.25,
        }
    }
}

impl CriteriaWeights {
    /// Reject negative weights before any computation happens.
    pub fn validated(self) -> Result<Self> {
        for (name, value) in [
            ("price", self.price),
            ("time", self.time),
            ("distance", self.distance),
        ] {
            if value < 0.0 {
                return Err(Error::InvalidWeights {
                    reason: format!("{name} weight is {value}"),
                });
            }
        }
        Ok(self)
    }

    /// Renormalize so the weights sum to 1. An all-zero set falls back to
    /// equal thirds.
    pub fn normalized(self) -> Self {
        let total = self.price + self.time + self.distance;
        if total > 0.0 {
            Self {
                price: self.price / total,
                time: self.time / total,
                distance: self.distance / total,
            }
        } else {
            Self {
                price: 1.0 / 3.0,
                time: 1.0 / 3.0,
                distance: 1.0 / 3.0,
            }
        }
    }
}

/// Observed range of one metric across the edge population.
#[derive(Debug, Clone, Copy)]
struct MetricBounds {
    min: f64,
    max: f64,
}

impl MetricBounds {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Linear [0, 1] normalization; degenerate populations map to the fixed
    /// midpoint.
    fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            DEGENERATE_MIDPOINT
        }
    }
}

/// Multi-criteria search: one Dijkstra pass over a composite weight that
/// blends normalized price, duration, and geodesic distance.
///
/// The first pass scans every leg to establish global min/max for each
/// metric; legs without resolvable coordinates are excluded from both the
/// normalization and the search. The composite weight stays non-negative, so
/// optimality is inherited from Dijkstra.
pub fn best_overall(
    graph: &Graph,
    network: &FlightNetwork,
    source: &str,
    dest: &str,
    weights: CriteriaWeights,
) -> Option<Route> {
    let weights = weights.normalized();

    let mut price_bounds = MetricBounds::new();
    let mut time_bounds = MetricBounds::new();
    let mut distance_bounds = MetricBounds::new();
    let mut usable = 0usize;

    let leg_distances: Vec<Option<f64>> = graph
        .legs()
        .iter()
        .map(|leg| network.leg_distance_km(leg))
        .collect();

    for (leg, distance) in graph.legs().iter().zip(&leg_distances) {
        let Some(distance) = distance else {
            continue;
        };
        price_bounds.observe(leg.price_usd);
        time_bounds.observe(leg.duration_min as f64);
        distance_bounds.observe(*distance);
        usable += 1;
    }

    if usable == 0 {
        return None;
    }

    dijkstra(graph, network, source, dest, |id, leg| {
        let distance = leg_distances[id]?;
        Some(
            weights.price * price_bounds.normalize(leg.price_usd)
                + weights.time * time_bounds.normalize(leg.duration_min as f64)
                + weights.distance * distance_bounds.normalize(distance),
        )
    })
}
