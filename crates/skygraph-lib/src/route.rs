use serde::Serialize;

use crate::db::{Coordinates, FlightLeg, FlightNetwork};

/// Lightweight observability counters attached to every assembled route.
///
/// Deliberately free of wall-clock fields so that repeated searches against an
/// unchanged snapshot produce identical routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RouteStats {
    pub nodes_explored: usize,
    pub edges_checked: usize,
}

/// A materialized itinerary: the ordered legs plus everything derived from
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub legs: Vec<FlightLeg>,
    pub path: Vec<String>,
    pub coords: Vec<Coordinates>,
    #[serde(rename = "totalPriceUSD")]
    pub total_price_usd: f64,
    #[serde(rename = "totalDurationMin")]
    pub total_duration_min: i64,
    #[serde(rename = "totalDistanceKM")]
    pub total_distance_km: f64,
    pub stops: usize,
    pub stats: RouteStats,
}

impl Route {
    /// The airport-code path joined into a stable signature, used to
    /// deduplicate candidate routes.
    pub fn path_signature(&self) -> String {
        self.path.join(">")
    }

    /// Replace the assembler's default stats with counters recorded by the
    /// search that produced this route.
    pub fn with_stats(mut self, stats: RouteStats) -> Self {
        self.stats = stats;
        self
    }
}

/// Assemble a [`Route`] from an ordered leg sequence.
///
/// Totals are the sums over the legs; distance is the haversine length of each
/// leg accumulated and rounded to two decimals. Returns `None` when the leg
/// list is empty or any endpoint lacks resolvable coordinates; such a
/// candidate is dropped, not an error.
pub fn assemble(legs: Vec<FlightLeg>, network: &FlightNetwork) -> Option<Route> {
    if legs.is_empty() {
        return None;
    }

    let mut total_price = 0.0;
    let mut total_duration = 0;
    let mut total_distance = 0.0;
    let mut path = Vec::with_capacity(legs.len() + 1);
    let mut coords = Vec::with_capacity(legs.len() + 1);

    for leg in &legs {
        let origin = network.coordinates(&leg.from)?;
        let dest = network.coordinates(&leg.to)?;

        total_price += leg.price_usd;
        total_duration += leg.duration_min;
        total_distance += origin.distance_to(&dest);

        if path.is_empty() {
            path.push(leg.from.clone());
            coords.push(origin);
        }
        path.push(leg.to.clone());
        coords.push(dest);
    }

    let stops = legs.len() - 1;
    let stats = RouteStats {
        nodes_explored: legs.len(),
        edges_checked: legs.len(),
    };

    Some(Route {
        legs,
        path,
        coords,
        total_price_usd: total_price,
        total_duration_min: total_duration,
        total_distance_km: (total_distance * 100.0).round() / 100.0,
        stops,
        stats,
    })
}
