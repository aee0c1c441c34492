//! Route builder: asks the ArcGIS routing service for a best-sequence route
//! through a set of POIs.
//!
//! **Routing never fails a tour.** Any problem with the remote call degrades
//! to the fallback route; the error is logged and swallowed here and nowhere
//! else.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::GeoError;
use crate::geo::arcgis::ArcGisClient;
use crate::geo::model::{Location, Poi};

/// Message attached to a fallback route built from at least one POI.
pub const FALLBACK_DIRECTIONS: &str = "Route calculation requires an ArcGIS API key.";

/// A visiting route through a set of POIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub total_distance_miles: f64,
    pub total_time_min: f64,
    pub directions: Vec<String>,
    /// Mean of the input POI locations, not the path centroid.
    pub center: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    /// Visiting order as indices into the input POI list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<usize>>,
    /// Set only when the routing service produced this route.
    #[serde(skip)]
    pub(crate) solved: bool,
}

impl Route {
    /// Zero-metric route used when optimization is unavailable or inapplicable.
    pub fn fallback(pois: &[Poi]) -> Self {
        let center = Location::mean(pois.iter().map(|p| &p.location));
        let directions = if pois.is_empty() {
            Vec::new()
        } else {
            vec![FALLBACK_DIRECTIONS.to_string()]
        };
        Self {
            total_distance_miles: 0.0,
            total_time_min: 0.0,
            directions,
            center,
            geometry: None,
            sequence: None,
            solved: false,
        }
    }

    /// Whether this route was built locally instead of by the routing service.
    pub fn is_fallback(&self) -> bool {
        !self.solved
    }
}

/// Async route optimization via ArcGIS Routing.
#[derive(Debug, Clone)]
pub struct RouteService {
    client: ArcGisClient,
    route_url: String,
}

impl RouteService {
    pub fn new(client: ArcGisClient, route_url: impl Into<String>) -> Self {
        Self {
            client,
            route_url: route_url.into(),
        }
    }

    /// Build a route through `pois`. Always returns a route.
    pub async fn optimise(&self, pois: &[Poi]) -> Route {
        if pois.len() < 2 {
            debug!(stops = pois.len(), "Too few stops to route, using fallback");
            return Route::fallback(pois);
        }

        if !self.client.has_token() {
            debug!("No ArcGIS API key configured, using fallback route");
            return Route::fallback(pois);
        }

        match self.solve(pois).await {
            Ok(route) => {
                info!(
                    stops = pois.len(),
                    miles = route.total_distance_miles,
                    minutes = route.total_time_min,
                    "Route optimised"
                );
                route
            }
            Err(e) => {
                warn!(error = %e, stops = pois.len(), "Route API error, using fallback route");
                Route::fallback(pois)
            }
        }
    }

    async fn solve(&self, pois: &[Poi]) -> Result<Route, GeoError> {
        let stops = pois
            .iter()
            .map(|p| format!("{},{}", p.location.longitude, p.location.latitude))
            .collect::<Vec<_>>()
            .join(";");

        let params = vec![
            ("stops", stops),
            ("findBestSequence", "true".to_string()),
            ("returnDirections", "true".to_string()),
            ("returnRoutes", "true".to_string()),
            ("returnStops", "true".to_string()),
            ("directionsLanguage", "en".to_string()),
        ];

        let body = self.client.get_json("route", &self.route_url, params).await?;
        parse_solve_response(&body, pois)
    }
}

/// Turn a `solve` response body into a route over `pois`.
fn parse_solve_response(body: &Value, pois: &[Poi]) -> Result<Route, GeoError> {
    let route = body
        .pointer("/routes/features/0")
        .ok_or_else(|| GeoError::InvalidResponse {
            service: "route".to_string(),
            reason: "response contains no routes".to_string(),
        })?;

    let attr = |name: &str| {
        route
            .get("attributes")
            .and_then(|a| a.get(name))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };

    Ok(Route {
        total_distance_miles: round_to(attr("Total_Miles"), 2),
        total_time_min: round_to(attr("Total_TravelTime"), 1),
        directions: parse_directions(body.get("directions")),
        center: Location::mean(pois.iter().map(|p| &p.location)),
        geometry: route.get("geometry").filter(|g| !g.is_null()).cloned(),
        sequence: parse_sequence(body.get("stops"), pois.len()),
        solved: true,
    })
}

/// Flatten `directions[*].features[*].attributes.text`.
fn parse_directions(directions: Option<&Value>) -> Vec<String> {
    let Some(groups) = directions.and_then(Value::as_array) else {
        return Vec::new();
    };

    groups
        .iter()
        .filter_map(|group| group.get("features").and_then(Value::as_array))
        .flatten()
        .filter_map(|feature| feature.pointer("/attributes/text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Visiting order from the solved stops: `ObjectID` is the 1-based input
/// position, `Sequence` the visit position. Only a full permutation of the
/// input is accepted.
fn parse_sequence(stops: Option<&Value>, count: usize) -> Option<Vec<usize>> {
    let features = stops?.get("features")?.as_array()?;
    if features.len() != count {
        return None;
    }

    let mut visits = features
        .iter()
        .map(|f| {
            let attrs = f.get("attributes")?;
            let object_id = attrs.get("ObjectID")?.as_u64()?;
            let sequence = attrs.get("Sequence")?.as_u64()?;
            let index = usize::try_from(object_id.checked_sub(1)?).ok()?;
            Some((sequence, index))
        })
        .collect::<Option<Vec<_>>>()?;
    visits.sort_by_key(|&(sequence, _)| sequence);

    let order: Vec<usize> = visits.into_iter().map(|(_, index)| index).collect();
    let mut seen = vec![false; count];
    for &index in &order {
        if index >= count || seen[index] {
            return None;
        }
        seen[index] = true;
    }
    Some(order)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
