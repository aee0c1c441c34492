//! Tour agent: runs the full pipeline for one request.
//!
//! Flow (strictly sequential, nothing cached):
//! 1. Intent parsing → never fails
//! 2. POI retrieval → never fails (may be empty)
//! 3. Route building → never fails (may be the fallback route)
//! 4. Narrative generation → the only step allowed to fail the request
//! 5. Response assembly

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{AgentConfig, AppConfig};
use crate::data::cities;
use crate::error::PipelineError;
use crate::geo::arcgis::ArcGisClient;
use crate::geo::model::Poi;
use crate::geo::route::{Route, RouteService};
use crate::llm::create_provider;
use crate::llm::provider::LlmProvider;
use crate::tour::intent::IntentParser;
use crate::tour::model::{DEFAULT_STOP_MINUTES, MapData, Tour, TourResponse, TourStop};
use crate::tour::narrative::NarrativeGenerator;
use crate::tour::pois::{FeatureServiceSource, PoiService};

pub struct TourAgent {
    intent: IntentParser,
    pois: PoiService,
    routes: RouteService,
    narrative: NarrativeGenerator,
}

impl TourAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        pois: PoiService,
        routes: RouteService,
        config: &AgentConfig,
    ) -> Self {
        Self {
            intent: IntentParser::new(Arc::clone(&llm), config),
            pois,
            routes,
            narrative: NarrativeGenerator::new(llm, config),
        }
    }

    /// Wire the model provider, ArcGIS client, POI source and route service
    /// from service configuration.
    pub fn from_config(config: &AppConfig) -> crate::error::Result<Self> {
        let llm = create_provider(&config.llm)?;
        let arcgis = ArcGisClient::from_settings(&config.arcgis)?;

        let pois = match config.arcgis.poi_feature_url.as_deref() {
            Some(url) => {
                info!(url, "Using feature service for POIs");
                PoiService::new(Arc::new(FeatureServiceSource::new(arcgis.clone(), url)))
            }
            None => {
                info!("Using placeholder POIs");
                PoiService::placeholder()
            }
        };
        let routes = RouteService::new(arcgis, config.arcgis.route_url.clone());

        Ok(Self::new(llm, pois, routes, &config.agent))
    }

    /// user message → intent → POIs → route → narrative → response
    pub async fn run(
        &self,
        message: &str,
        city: &str,
        preferences: Option<&Value>,
    ) -> Result<TourResponse, PipelineError> {
        info!(city, message_len = message.len(), "Running tour pipeline");

        let intent = self.intent.parse(message, city, preferences).await;

        let pois = self
            .pois
            .search(city, &intent.categories, intent.num_stops)
            .await;

        let route = self.routes.optimise(&pois).await;

        let pois = order_stops(pois, route.sequence.as_deref());

        let reply = self
            .narrative
            .generate(&pois, &route, preferences)
            .await?;

        let tour = build_tour(city, &intent.tour_type, pois, route);
        let map_data = MapData {
            center: tour.route.center,
            waypoints: tour.stops.iter().map(|s| s.poi.location).collect(),
        };

        info!(
            tour_id = %tour.id,
            stops = tour.stops.len(),
            miles = tour.total_distance_miles,
            "Tour assembled"
        );

        Ok(TourResponse {
            reply,
            tour,
            map_data,
        })
    }
}

/// Reorder POIs by the route's visiting sequence when it is a permutation
/// of the list; otherwise keep retrieval order.
fn order_stops(pois: Vec<Poi>, sequence: Option<&[usize]>) -> Vec<Poi> {
    let Some(sequence) = sequence else {
        return pois;
    };
    if !is_permutation(sequence, pois.len()) {
        debug!(?sequence, stops = pois.len(), "Ignoring invalid route sequence");
        return pois;
    }

    let mut slots: Vec<Option<Poi>> = pois.into_iter().map(Some).collect();
    sequence.iter().filter_map(|&i| slots[i].take()).collect()
}

fn is_permutation(sequence: &[usize], len: usize) -> bool {
    if sequence.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    sequence.iter().all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}

fn build_tour(city: &str, tour_type: &str, pois: Vec<Poi>, route: Route) -> Tour {
    let city_name = cities::city(city).map_or(city, |c| c.name);
    let stops = pois
        .into_iter()
        .enumerate()
        .map(|(i, poi)| TourStop {
            order: i + 1,
            poi,
            narrative: String::new(),
            duration_min: DEFAULT_STOP_MINUTES,
        })
        .collect();

    Tour {
        id: Uuid::new_v4(),
        name: format!("{city_name} {} Tour", title_case(tour_type)),
        city: city.to_string(),
        category: tour_type.to_string(),
        stops,
        total_distance_miles: route.total_distance_miles,
        total_time_min: route.total_time_min,
        route,
        created_at: Utc::now(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
