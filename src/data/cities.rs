//! Supported cities.
//!
//! Add a city here to make it available to POI retrieval and the API.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::geo::model::{Bounds, Location};

/// Static metadata for a supported city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
    pub state: &'static str,
    pub country: &'static str,
    pub center: Location,
    pub zoom: u8,
    pub bounds: Bounds,
    pub description: &'static str,
    pub highlights: &'static [&'static str],
}

static SUPPORTED_CITIES: LazyLock<BTreeMap<&'static str, City>> = LazyLock::new(|| {
    [
        City {
            id: "nyc",
            name: "New York City",
            state: "New York",
            country: "US",
            center: Location::new(40.7128, -74.0060),
            zoom: 12,
            bounds: Bounds {
                north: 40.92,
                south: 40.49,
                east: -73.70,
                west: -74.26,
            },
            description: "The city that never sleeps: unmatched culture, food, and history.",
            highlights: &["Statue of Liberty", "Central Park", "Times Square", "Brooklyn Bridge"],
        },
        City {
            id: "sf",
            name: "San Francisco",
            state: "California",
            country: "US",
            center: Location::new(37.7749, -122.4194),
            zoom: 12,
            bounds: Bounds {
                north: 37.83,
                south: 37.70,
                east: -122.35,
                west: -122.52,
            },
            description: "Hills, fog, the Golden Gate, and a legendary food scene.",
            highlights: &["Golden Gate Bridge", "Alcatraz", "Fisherman's Wharf", "Chinatown"],
        },
        City {
            id: "boston",
            name: "Boston",
            state: "Massachusetts",
            country: "US",
            center: Location::new(42.3601, -71.0589),
            zoom: 13,
            bounds: Bounds {
                north: 42.40,
                south: 42.30,
                east: -70.99,
                west: -71.13,
            },
            description: "Where American history began: cobblestone streets and world-class universities.",
            highlights: &["Freedom Trail", "Fenway Park", "Harvard Square", "Boston Common"],
        },
    ]
    .into_iter()
    .map(|city| (city.id, city))
    .collect()
});

/// Look up a supported city by id.
pub fn city(id: &str) -> Option<&'static City> {
    SUPPORTED_CITIES.get(id)
}

/// All supported cities, keyed by id.
pub fn all() -> &'static BTreeMap<&'static str, City> {
    &SUPPORTED_CITIES
}
