// Test-only helpers for `skygraph-lib` tests
#![allow(dead_code)]

use crate::db::{Airport, Coordinates, FlightLeg, FlightNetwork};

/// Builder assembling small in-memory snapshots for algorithm tests.
pub struct NetworkBuilder {
    network: FlightNetwork,
    next_flight: u32,
}

impl NetworkBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            network: FlightNetwork::default(),
            next_flight: 100,
        }
    }

    pub fn airport(mut self, code: &str, lat: f64, lon: f64) -> Self {
        self.network.airports.insert(
            code.to_string(),
            Airport {
                code: code.to_string(),
                coordinates: Some(Coordinates { lat, lon }),
            },
        );
        self
    }

    pub fn airport_without_coordinates(mut self, code: &str) -> Self {
        self.network.airports.insert(
            code.to_string(),
            Airport {
                code: code.to_string(),
                coordinates: None,
            },
        );
        self
    }

    pub fn leg(self, from: &str, to: &str, price_usd: f64, duration_min: i64) -> Self {
        let flight_no = format!("SG{}", self.next_flight);
        self.leg_with_flight(from, to, price_usd, duration_min, &flight_no)
    }

    pub fn leg_with_flight(
        mut self,
        from: &str,
        to: &str,
        price_usd: f64,
        duration_min: i64,
        flight_no: &str,
    ) -> Self {
        self.network.legs.push(FlightLeg {
            from: from.to_string(),
            to: to.to_string(),
            airline: "SkyTest".to_string(),
            flight_no: flight_no.to_string(),
            price_usd,
            duration_min,
        });
        self.next_flight += 1;
        self
    }

    pub fn build(self) -> FlightNetwork {
        self.network
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-airport scenario used across search tests: the two-leg itinerary
/// beats the direct flight on both price and total time.
pub fn lhe_dxb_jfk_network() -> FlightNetwork {
    NetworkBuilder::new()
        .airport("LHE", 31.5216, 74.4036)
        .airport("DXB", 25.2532, 55.3657)
        .airport("JFK", 40.6413, -73.7781)
        .leg_with_flight("LHE", "DXB", 100.0, 180, "PK210")
        .leg_with_flight("DXB", "JFK", 400.0, 600, "EK202")
        .leg_with_flight("LHE", "JFK", 650.0, 900, "PK701")
        .build()
}
