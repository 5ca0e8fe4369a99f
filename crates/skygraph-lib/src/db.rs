use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum similarity score before an airport code is offered as a
/// "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.72;

/// Geographic coordinates of an airport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Great-circle distance to another point in kilometres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
    }
}

/// An airport known to the snapshot. Coordinates are optional; airports
/// without them still participate in searches that do not need geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub code: String,
    pub coordinates: Option<Coordinates>,
}

/// A directed flight leg between two airports. Parallel legs between the same
/// pair are permitted and kept distinct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightLeg {
    pub from: String,
    pub to: String,
    pub airline: String,
    pub flight_no: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    #[serde(rename = "durationMin")]
    pub duration_min: i64,
}

/// Point-in-time snapshot of the flight network: every airport plus every
/// directed leg. Rebuilt fresh for each request and never shared between
/// callers, so the engine needs no locking.
#[derive(Debug, Clone, Default)]
pub struct FlightNetwork {
    pub airports: HashMap<String, Airport>,
    pub legs: Vec<FlightLeg>,
}

impl FlightNetwork {
    /// Lookup the coordinates for a normalized airport code.
    pub fn coordinates(&self, code: &str) -> Option<Coordinates> {
        self.airports.get(code).and_then(|airport| airport.coordinates)
    }

    /// Whether the snapshot knows the given normalized airport code.
    pub fn contains(&self, code: &str) -> bool {
        self.airports.contains_key(code)
    }

    /// Great-circle length of a leg, when both endpoints have coordinates.
    pub fn leg_distance_km(&self, leg: &FlightLeg) -> Option<f64> {
        let origin = self.coordinates(&leg.from)?;
        let dest = self.coordinates(&leg.to)?;
        Some(origin.distance_to(&dest))
    }

    /// Return up to `limit` airport codes similar to `code`, ordered by
    /// similarity. Used to build "did you mean" suggestions.
    pub fn fuzzy_airport_matches(&self, code: &str, limit: usize) -> Vec<String> {
        let needle = normalize_code(code);
        let mut scored: Vec<(f64, &String)> = self
            .airports
            .keys()
            .map(|candidate| (strsim::jaro_winkler(&needle, candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.into_iter().take(limit).map(|(_, c)| c.clone()).collect()
    }
}

/// Normalize an airport code the way the snapshot stores them: trimmed and
/// uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Load the full flight network from a SQLite snapshot in one pass.
///
/// The snapshot contains an `airports` table (code plus optional latitude and
/// longitude) and a `flights` table referencing airports by row id. Codes are
/// normalized on the way in, durations are converted to integer minutes, and
/// legs whose endpoints do not resolve to a known code are dropped rather than
/// failing the whole load.
pub fn load_network(db_path: &Path) -> Result<FlightNetwork> {
    if !db_path.exists() {
        return Err(Error::SnapshotNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open(db_path)?;
    debug!(path = %db_path.display(), "loading flight network snapshot");

    let airports = load_airports(&connection)?;
    let legs = load_legs(&connection)?;

    Ok(FlightNetwork { airports, legs })
}

fn load_airports(connection: &Connection) -> Result<HashMap<String, Airport>> {
    let mut statement = connection.prepare("SELECT code, latitude, longitude FROM airports")?;
    let mut rows = statement.query([])?;

    let mut airports = HashMap::new();
    while let Some(row) = rows.next()? {
        let raw_code: Option<String> = row.get(0)?;
        let code = normalize_code(raw_code.as_deref().unwrap_or(""));
        if code.is_empty() {
            continue;
        }

        let lat: Option<f64> = row.get(1)?;
        let lon: Option<f64> = row.get(2)?;
        let coordinates = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        };

        airports.insert(code.clone(), Airport { code, coordinates });
    }

    Ok(airports)
}

fn load_legs(connection: &Connection) -> Result<Vec<FlightLeg>> {
    let mut statement = connection.prepare(
        "SELECT f.airline, f.flight_no, sa.code, da.code, f.duration, f.price
         FROM flights f
         LEFT JOIN airports sa ON f.source_airport = sa.id
         LEFT JOIN airports da ON f.dest_airport = da.id",
    )?;
    let mut rows = statement.query([])?;

    let mut legs = Vec::new();
    let mut skipped = 0usize;
    while let Some(row) = rows.next()? {
        let source: Option<String> = row.get(2)?;
        let dest: Option<String> = row.get(3)?;
        let from = normalize_code(source.as_deref().unwrap_or(""));
        let to = normalize_code(dest.as_deref().unwrap_or(""));
        if from.is_empty() || to.is_empty() {
            skipped += 1;
            continue;
        }

        let airline: Option<String> = row.get(0)?;
        let flight_no: Option<String> = row.get(1)?;
        let duration: Value = row.get(4)?;
        let price: Option<f64> = row.get(5)?;

        legs.push(FlightLeg {
            from,
            to,
            airline: airline.unwrap_or_default(),
            flight_no: flight_no.unwrap_or_default(),
            price_usd: price.unwrap_or(0.0).max(0.0),
            duration_min: duration_minutes(&duration),
        });
    }

    if skipped > 0 {
        warn!(skipped, "dropped flight legs with unresolvable airport codes");
    }

    Ok(legs)
}

/// Convert whatever the snapshot stored for a duration into whole minutes.
/// Integers and reals are taken as minutes; text accepts `HH:MM` or
/// `HH:MM:SS`. Anything unparseable becomes 0.
fn duration_minutes(value: &Value) -> i64 {
    match value {
        Value::Integer(minutes) => (*minutes).max(0),
        Value::Real(minutes) => (*minutes).max(0.0) as i64,
        Value::Text(text) => parse_clock_duration(text).unwrap_or(0),
        _ => 0,
    }
}

fn parse_clock_duration(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(minutes) = trimmed.parse::<i64>() {
        return Some(minutes.max(0));
    }

    let mut parts = trimmed.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    // Seconds are truncated when present; the engine works in whole minutes.
    Some((hours * 60 + minutes).max(0))
}
