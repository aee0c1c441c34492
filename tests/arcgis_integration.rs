//! Integration tests for the ArcGIS clients against a local stub service.
//!
//! The stub answers every path with a canned status and body and records
//! each request's path and query string.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use geo_explore::config::{AgentConfig, ArcGisSettings};
use geo_explore::error::{GeoError, LlmError};
use geo_explore::geo::route::FALLBACK_DIRECTIONS;
use geo_explore::geo::{ArcGisClient, Location, Poi, Route, RouteService};
use geo_explore::llm::{CompletionRequest, CompletionResponse, LlmProvider};
use geo_explore::tour::TourAgent;
use geo_explore::tour::pois::{FeatureServiceSource, PoiService};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

type Hits = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: Arc<String>,
    hits: Hits,
}

async fn stub_handler(
    State(stub): State<Stub>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.hits
        .lock()
        .unwrap()
        .push((uri.path().to_string(), query));
    (stub.status, stub.body.as_ref().clone())
}

/// Start a stub ArcGIS server, return (base url, recorded hits).
async fn start_stub(status: StatusCode, body: impl Into<String>) -> (String, Hits) {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: Arc::new(body.into()),
        hits: Arc::clone(&hits),
    };
    let app = Router::new().fallback(stub_handler).with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), hits)
}

fn settings(base: &str, api_key: Option<&str>) -> ArcGisSettings {
    ArcGisSettings {
        api_key: api_key.map(|k| SecretString::from(k.to_string())),
        geocode_url: format!("{base}/geocode"),
        route_url: format!("{base}/solve"),
        poi_feature_url: Some(format!("{base}/pois")),
        timeout: Duration::from_secs(2),
    }
}

fn route_service(base: &str, api_key: Option<&str>) -> RouteService {
    let settings = settings(base, api_key);
    let client = ArcGisClient::from_settings(&settings).unwrap();
    RouteService::new(client, settings.route_url.clone())
}

fn poi(name: &str, lat: f64, lng: f64) -> Poi {
    Poi {
        name: name.to_string(),
        category: "Landmarks and Monuments".to_string(),
        location: Location::new(lat, lng),
        address: String::new(),
        description: String::new(),
        rating: None,
        image_url: None,
    }
}

fn three_pois() -> Vec<Poi> {
    vec![
        poi("A", 40.70, -74.02),
        poi("B", 40.72, -74.00),
        poi("C", 40.74, -73.98),
    ]
}

fn solved_body() -> Value {
    json!({
        "routes": {"features": [{
            "attributes": {"Total_Miles": 2.34567, "Total_TravelTime": 18.46},
            "geometry": {"paths": [[[-74.02, 40.70], [-73.98, 40.74]]]}
        }]},
        "directions": [{"features": [
            {"attributes": {"text": "Start at Location 1"}},
            {"attributes": {"text": "Turn left onto Broadway"}},
            {"attributes": {"text": "Finish at Location 2"}}
        ]}],
        "stops": {"features": [
            {"attributes": {"ObjectID": 1, "Sequence": 1}},
            {"attributes": {"ObjectID": 2, "Sequence": 3}},
            {"attributes": {"ObjectID": 3, "Sequence": 2}}
        ]}
    })
}

// ── Routing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn route_success_uses_provider_metrics_and_input_center() {
    timeout(TEST_TIMEOUT, async {
        let (base, hits) = start_stub(StatusCode::OK, solved_body().to_string()).await;
        let pois = three_pois();

        let route = route_service(&base, Some("test-key")).optimise(&pois).await;

        assert_eq!(route.total_distance_miles, 2.35);
        assert_eq!(route.total_time_min, 18.5);
        assert_eq!(route.directions.len(), 3);
        assert_eq!(route.directions[1], "Turn left onto Broadway");
        assert_eq!(route.sequence, Some(vec![0, 2, 1]));
        assert!(route.geometry.is_some());
        let center = route.center.unwrap();
        assert!((center.latitude - 40.72).abs() < 1e-9);
        assert!((center.longitude - -74.00).abs() < 1e-9);

        let hits = hits.lock().unwrap();
        assert_eq!(hits.len(), 1);
        let (path, query) = &hits[0];
        assert_eq!(path, "/solve");
        assert_eq!(query["f"], "json");
        assert_eq!(query["token"], "test-key");
        assert_eq!(query["findBestSequence"], "true");
        assert_eq!(query["returnDirections"], "true");
        assert_eq!(query["stops"], "-74.02,40.7;-74,40.72;-73.98,40.74");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn route_malformed_json_falls_back() {
    timeout(TEST_TIMEOUT, async {
        let (base, _hits) = start_stub(StatusCode::OK, "{not json").await;
        let pois = three_pois();

        let route = route_service(&base, Some("test-key")).optimise(&pois).await;

        assert_eq!(route, Route::fallback(&pois));
        assert_eq!(route.directions, vec![FALLBACK_DIRECTIONS.to_string()]);
        assert!(route.center.is_some());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn route_http_error_falls_back() {
    timeout(TEST_TIMEOUT, async {
        let (base, _hits) = start_stub(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;
        let pois = three_pois();
        let route = route_service(&base, Some("test-key")).optimise(&pois).await;
        assert_eq!(route, Route::fallback(&pois));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn route_provider_error_or_missing_routes_falls_back() {
    timeout(TEST_TIMEOUT, async {
        let pois = three_pois();

        let body = json!({"error": {"code": 498, "message": "Invalid token."}});
        let (base, _) = start_stub(StatusCode::OK, body.to_string()).await;
        let route = route_service(&base, Some("bad-key")).optimise(&pois).await;
        assert_eq!(route, Route::fallback(&pois));

        let (base, _) = start_stub(StatusCode::OK, json!({"directions": []}).to_string()).await;
        let route = route_service(&base, Some("test-key")).optimise(&pois).await;
        assert_eq!(route, Route::fallback(&pois));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn route_skips_network_without_key_or_with_one_stop() {
    timeout(TEST_TIMEOUT, async {
        let (base, hits) = start_stub(StatusCode::OK, solved_body().to_string()).await;

        let route = route_service(&base, None).optimise(&three_pois()).await;
        assert_eq!(route, Route::fallback(&three_pois()));

        let single = vec![poi("Only", 40.7128, -74.0060)];
        let route = route_service(&base, Some("test-key")).optimise(&single).await;
        assert_eq!(route.total_distance_miles, 0.0);
        assert_eq!(route.total_time_min, 0.0);
        assert_eq!(route.directions, vec![FALLBACK_DIRECTIONS.to_string()]);
        assert_eq!(route.center, Some(Location::new(40.7128, -74.0060)));

        let route = route_service(&base, Some("test-key")).optimise(&[]).await;
        assert_eq!(route.center, None);
        assert!(route.directions.is_empty());

        assert!(hits.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

// ── Geocoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn geocode_returns_best_candidate() {
    timeout(TEST_TIMEOUT, async {
        let body = json!({"candidates": [
            {"address": "Federal Hall, New York", "location": {"x": -74.0102, "y": 40.7073}, "score": 98.5},
            {"address": "Elsewhere", "location": {"x": 0.0, "y": 0.0}, "score": 40.0}
        ]});
        let (base, hits) = start_stub(StatusCode::OK, body.to_string()).await;
        let client = ArcGisClient::from_settings(&settings(&base, Some("k"))).unwrap();

        let best = client.geocode("26 Wall St").await.unwrap().unwrap();
        assert_eq!(best.label, "Federal Hall, New York");
        assert_eq!(best.location, Location::new(40.7073, -74.0102));
        assert_eq!(best.score, 98.5);

        let hits = hits.lock().unwrap();
        assert_eq!(hits[0].0, "/geocode/findAddressCandidates");
        assert_eq!(hits[0].1["singleLine"], "26 Wall St");
        assert_eq!(hits[0].1["maxLocations"], "1");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn geocode_without_candidates_is_none() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_stub(StatusCode::OK, json!({"candidates": []}).to_string()).await;
        let client = ArcGisClient::from_settings(&settings(&base, None)).unwrap();
        assert!(client.geocode("nowhere").await.unwrap().is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn geocode_surfaces_provider_errors() {
    timeout(TEST_TIMEOUT, async {
        let body = json!({"error": {"code": 498, "message": "Invalid token."}});
        let (base, _) = start_stub(StatusCode::OK, body.to_string()).await;
        let client = ArcGisClient::from_settings(&settings(&base, Some("bad"))).unwrap();
        let err = client.geocode("x").await.unwrap_err();
        assert!(matches!(err, GeoError::Provider { code: 498, .. }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn reverse_geocode_reads_long_label() {
    timeout(TEST_TIMEOUT, async {
        let body = json!({"address": {"LongLabel": "26 Wall St, New York, NY, USA"}});
        let (base, hits) = start_stub(StatusCode::OK, body.to_string()).await;
        let client = ArcGisClient::from_settings(&settings(&base, Some("k"))).unwrap();

        let label = client
            .reverse_geocode(Location::new(40.7073, -74.0102))
            .await
            .unwrap();
        assert_eq!(label.as_deref(), Some("26 Wall St, New York, NY, USA"));

        let hits = hits.lock().unwrap();
        assert_eq!(hits[0].0, "/geocode/reverseGeocode");
        assert_eq!(hits[0].1["location"], "-74.0102,40.7073");
    })
    .await
    .expect("test timed out");
}

// ── Feature-service POIs ─────────────────────────────────────────────

#[tokio::test]
async fn feature_service_pois_are_mapped_and_filtered() {
    timeout(TEST_TIMEOUT, async {
        let body = json!({"features": [
            {"attributes": {"name": "The Met", "address": "1000 5th Ave", "rating": 4.8},
             "geometry": {"x": -73.9632, "y": 40.7794}},
            {"attributes": {"name": "No Geometry"}},
            {"attributes": {"name": "MoMA"}, "geometry": {"x": -73.9776, "y": 40.7614}}
        ]});
        let (base, hits) = start_stub(StatusCode::OK, body.to_string()).await;
        let settings = settings(&base, Some("k"));
        let client = ArcGisClient::from_settings(&settings).unwrap();
        let source = FeatureServiceSource::new(client, settings.poi_feature_url.clone().unwrap());
        let service = PoiService::new(Arc::new(source));

        let pois = service.search("nyc", &["museums".to_string()], 5).await;
        let names: Vec<_> = pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["The Met", "MoMA"]);
        assert!(pois.iter().all(|p| p.category == "Museums"));
        assert_eq!(pois[0].rating, Some(4.8));

        let hits = hits.lock().unwrap();
        let (path, query) = &hits[0];
        assert_eq!(path, "/pois/query");
        assert_eq!(query["where"], "category = 'Museums'");
        assert_eq!(query["resultRecordCount"], "5");
        assert_eq!(query["geometry"], "-74.26,40.49,-73.7,40.92");
        assert_eq!(query["outSR"], "4326");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn feature_service_failure_yields_no_pois() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_stub(StatusCode::BAD_GATEWAY, "").await;
        let settings = settings(&base, Some("k"));
        let client = ArcGisClient::from_settings(&settings).unwrap();
        let source = FeatureServiceSource::new(client, settings.poi_feature_url.clone().unwrap());

        let pois = PoiService::new(Arc::new(source))
            .search("sf", &["parks".to_string()], 5)
            .await;
        assert!(pois.is_empty());
    })
    .await
    .expect("test timed out");
}

// ── Pipeline with live routing ───────────────────────────────────────

struct EchoLlm;

#[async_trait]
impl LlmProvider for EchoLlm {
    fn model_name(&self) -> &str {
        "echo"
    }
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            content: request.messages.last().map(|m| m.content.clone()).unwrap_or_default(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

#[tokio::test]
async fn tour_stops_follow_route_sequence() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_stub(StatusCode::OK, solved_body().to_string()).await;
        let agent = TourAgent::new(
            Arc::new(EchoLlm),
            PoiService::placeholder(),
            route_service(&base, Some("test-key")),
            &AgentConfig::default(),
        );

        let response = agent.run("landmarks please", "nyc", None).await.unwrap();

        let names: Vec<_> = response
            .tour
            .stops
            .iter()
            .map(|s| s.poi.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Sample Landmarks and Monuments #1",
                "Sample Landmarks and Monuments #3",
                "Sample Landmarks and Monuments #2",
            ]
        );
        assert_eq!(
            response.map_data.waypoints,
            response
                .tour
                .stops
                .iter()
                .map(|s| s.poi.location)
                .collect::<Vec<_>>()
        );
        assert_eq!(response.tour.total_distance_miles, 2.35);
        assert!(response.reply.contains("Route: 2.35 miles"));
    })
    .await
    .expect("test timed out");
}
