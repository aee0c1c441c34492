//! Thin async client for ArcGIS location services: geocoding, reverse
//! geocoding and feature queries. Routing goes through the same transport
//! (see `geo::route`).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ArcGisSettings;
use crate::error::GeoError;
use crate::geo::model::{Bounds, Location};

/// Best forward-geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeCandidate {
    pub location: Location,
    pub label: String,
    pub score: f64,
}

/// Parameters for a feature service `query` call.
#[derive(Debug, Clone)]
pub struct FeatureQuery {
    pub where_clause: String,
    pub out_fields: String,
    pub limit: usize,
    /// Restrict results to this box (WGS84 in and out).
    pub envelope: Option<Bounds>,
}

impl Default for FeatureQuery {
    fn default() -> Self {
        Self {
            where_clause: "1=1".to_string(),
            out_fields: "*".to_string(),
            limit: 50,
            envelope: None,
        }
    }
}

/// A feature record as returned by a feature service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl Feature {
    /// Case-insensitive attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Non-empty string attribute.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Point geometry as a location (`x` = longitude, `y` = latitude).
    pub fn point(&self) -> Option<Location> {
        let geometry = self.geometry.as_ref()?;
        let x = geometry.get("x")?.as_f64()?;
        let y = geometry.get("y")?.as_f64()?;
        Some(Location::new(y, x))
    }
}

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    address: String,
    location: XY,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct XY {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(rename = "LongLabel", default)]
    long_label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureSet {
    #[serde(default)]
    features: Vec<Feature>,
}

/// ArcGIS REST client. Cheap to clone; the inner `reqwest::Client` pools
/// connections.
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    http: reqwest::Client,
    api_key: Option<SecretString>,
    geocode_url: String,
}

impl ArcGisClient {
    /// Build a client with its own HTTP transport and the configured timeout.
    pub fn from_settings(settings: &ArcGisSettings) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GeoError::Request {
                service: "arcgis".to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self::new(http, settings))
    }

    pub fn new(http: reqwest::Client, settings: &ArcGisSettings) -> Self {
        Self {
            http,
            api_key: settings.api_key.clone(),
            geocode_url: settings.geocode_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether an API token is configured.
    pub fn has_token(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forward-geocode an address to its best match.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodeCandidate>, GeoError> {
        let url = format!("{}/findAddressCandidates", self.geocode_url);
        let params = vec![
            ("singleLine", address.to_string()),
            ("maxLocations", "1".to_string()),
        ];
        let body = self.get_json("geocode", &url, params).await?;
        let parsed: CandidatesResponse = decode("geocode", body)?;

        Ok(parsed.candidates.into_iter().next().map(|best| GeocodeCandidate {
            location: Location::new(best.location.y, best.location.x),
            label: best.address,
            score: best.score,
        }))
    }

    /// Reverse-geocode a point to a long address label.
    pub async fn reverse_geocode(&self, location: Location) -> Result<Option<String>, GeoError> {
        let url = format!("{}/reverseGeocode", self.geocode_url);
        let params = vec![(
            "location",
            format!("{},{}", location.longitude, location.latitude),
        )];
        let body = self.get_json("reverse_geocode", &url, params).await?;
        let parsed: ReverseResponse = decode("reverse_geocode", body)?;
        Ok(parsed.address.and_then(|a| a.long_label))
    }

    /// Query a feature service layer.
    pub async fn query_features(
        &self,
        service_url: &str,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, GeoError> {
        let url = format!("{}/query", service_url.trim_end_matches('/'));
        let mut params = vec![
            ("where", query.where_clause.clone()),
            ("outFields", query.out_fields.clone()),
            ("resultRecordCount", query.limit.to_string()),
        ];
        if let Some(bounds) = query.envelope {
            params.push(("geometry", bounds.envelope()));
            params.push(("geometryType", "esriGeometryEnvelope".to_string()));
            params.push(("spatialRel", "esriSpatialRelIntersects".to_string()));
            params.push(("inSR", "4326".to_string()));
        }
        params.push(("outSR", "4326".to_string()));

        let body = self.get_json("feature_query", &url, params).await?;
        let parsed: FeatureSet = decode("feature_query", body)?;
        Ok(parsed.features)
    }

    /// GET `url` with `f=json` and the token appended, returning the parsed
    /// body. ArcGIS reports many failures as HTTP 200 with an `error` object;
    /// those are surfaced as `GeoError::Provider`.
    pub(crate) async fn get_json(
        &self,
        service: &str,
        url: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value, GeoError> {
        params.push(("f", "json".to_string()));
        if let Some(ref key) = self.api_key {
            params.push(("token", key.expose_secret().to_string()));
        }

        debug!(service, url, "ArcGIS request");

        let resp = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GeoError::Request {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeoError::Status {
                service: service.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.map_err(|e| GeoError::Request {
            service: service.to_string(),
            reason: e.to_string(),
        })?;
        let body: Value = serde_json::from_str(&text).map_err(|e| GeoError::InvalidResponse {
            service: service.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(error) = body.get("error") {
            return Err(GeoError::Provider {
                service: service.to_string(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        Ok(body)
    }
}

fn decode<T: serde::de::DeserializeOwned>(service: &str, body: Value) -> Result<T, GeoError> {
    serde_json::from_value(body).map_err(|e| GeoError::InvalidResponse {
        service: service.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feature(value: Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn attribute_lookup_ignores_case() {
        let f = feature(json!({"attributes": {"NAME": "Federal Hall", "Rating": 4.5}}));
        assert_eq!(f.text("name"), Some("Federal Hall"));
        assert_eq!(f.attribute("rating").and_then(Value::as_f64), Some(4.5));
        assert_eq!(f.text("address"), None);
    }

    #[test]
    fn blank_text_attribute_is_none() {
        let f = feature(json!({"attributes": {"name": "   "}}));
        assert_eq!(f.text("name"), None);
    }

    #[test]
    fn point_maps_x_to_longitude() {
        let f = feature(json!({"geometry": {"x": -74.0, "y": 40.7}}));
        assert_eq!(f.point(), Some(Location::new(40.7, -74.0)));
    }

    #[test]
    fn non_point_geometry_has_no_location() {
        let f = feature(json!({"geometry": {"paths": [[[0.0, 0.0]]]}}));
        assert_eq!(f.point(), None);
        assert_eq!(Feature::default().point(), None);
    }

    #[test]
    fn candidates_default_to_empty() {
        let parsed: CandidatesResponse = decode("geocode", json!({})).unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
