//! Types produced by the tour pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::model::{Location, Poi};
use crate::geo::route::Route;

/// Default time to spend at a stop, in minutes.
pub const DEFAULT_STOP_MINUTES: u32 = 15;

/// Structured interpretation of a free-text tour request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub tour_type: String,
    pub categories: Vec<String>,
    pub num_stops: usize,
    pub time_budget_min: Option<u32>,
    pub accessibility: Option<String>,
    pub transport_mode: Option<String>,
}

impl Default for Intent {
    /// Conservative fallback: a general five-stop landmarks tour.
    fn default() -> Self {
        Self {
            tour_type: "general".to_string(),
            categories: vec!["landmarks".to_string()],
            num_stops: 5,
            time_budget_min: None,
            accessibility: None,
            transport_mode: None,
        }
    }
}

/// One stop of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourStop {
    /// 1-based position in the tour.
    pub order: usize,
    pub poi: Poi,
    /// Per-stop text. Empty: the narrative covers the whole tour.
    pub narrative: String,
    pub duration_min: u32,
}

/// A generated tour. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub category: String,
    pub stops: Vec<TourStop>,
    pub route: Route,
    pub total_distance_miles: f64,
    pub total_time_min: f64,
    pub created_at: DateTime<Utc>,
}

/// What the map frontend needs to draw the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub center: Option<Location>,
    pub waypoints: Vec<Location>,
}

/// Final pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourResponse {
    pub reply: String,
    pub tour: Tour,
    pub map_data: MapData,
}
