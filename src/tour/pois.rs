//! POI retrieval: resolves user-facing category tags to provider
//! categories and collects POIs for a city.
//!
//! The record source sits behind `PoiSource`. `PlaceholderSource` produces
//! deterministic synthetic records; `FeatureServiceSource` queries a live
//! ArcGIS feature layer. Either way `PoiService::search` never fails: an
//! unknown city is an empty result and a failed query contributes nothing.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::cities::{self, City};
use crate::geo::arcgis::{ArcGisClient, Feature, FeatureQuery};
use crate::geo::model::Poi;

/// Grid step between placeholder POIs, in degrees.
const PLACEHOLDER_STEP: f64 = 0.002;

/// Placeholder records generated per category.
const PLACEHOLDER_PER_CATEGORY: usize = 3;

static CATEGORY_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("landmarks", "Landmarks and Monuments"),
        ("museums", "Museums"),
        ("restaurants", "Restaurants"),
        ("parks", "Parks and Gardens"),
        ("historical", "Historic Sites"),
        ("architecture", "Architecture"),
        ("nightlife", "Nightlife"),
        ("shopping", "Shopping"),
    ])
});

/// Provider category for a user-facing tag. Unmapped tags pass through.
pub fn provider_category(tag: &str) -> &str {
    CATEGORY_MAP.get(tag).copied().unwrap_or(tag)
}

/// Where POI records come from.
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Source name, for logging.
    fn name(&self) -> &str;

    /// Up to `limit` POIs of a provider `category` in `city`.
    async fn fetch(&self, city: &City, category: &str, limit: usize) -> Vec<Poi>;
}

/// Synthetic records laid out on a small diagonal grid from the city center.
pub struct PlaceholderSource;

#[async_trait]
impl PoiSource for PlaceholderSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn fetch(&self, city: &City, category: &str, limit: usize) -> Vec<Poi> {
        placeholder_pois(city, category, limit)
    }
}

/// `min(limit, 3)` stub POIs for a category.
pub fn placeholder_pois(city: &City, category: &str, limit: usize) -> Vec<Poi> {
    (0..limit.min(PLACEHOLDER_PER_CATEGORY))
        .map(|i| Poi {
            name: format!("Sample {category} #{}", i + 1),
            category: category.to_string(),
            location: city.center.offset(i as f64 * PLACEHOLDER_STEP),
            address: format!("{} Main St, {}", 100 + i, city.name),
            description: format!("A wonderful {} worth visiting.", category.to_lowercase()),
            rating: None,
            image_url: None,
        })
        .collect()
}

/// POIs from an ArcGIS feature layer with a `category` attribute.
pub struct FeatureServiceSource {
    client: ArcGisClient,
    service_url: String,
}

impl FeatureServiceSource {
    pub fn new(client: ArcGisClient, service_url: impl Into<String>) -> Self {
        Self {
            client,
            service_url: service_url.into(),
        }
    }
}

#[async_trait]
impl PoiSource for FeatureServiceSource {
    fn name(&self) -> &str {
        "feature_service"
    }

    async fn fetch(&self, city: &City, category: &str, limit: usize) -> Vec<Poi> {
        let query = FeatureQuery {
            where_clause: format!("category = '{}'", category.replace('\'', "''")),
            limit,
            envelope: Some(city.bounds),
            ..FeatureQuery::default()
        };

        match self.client.query_features(&self.service_url, &query).await {
            Ok(features) => features
                .iter()
                .filter_map(|f| feature_to_poi(f, category))
                .take(limit)
                .collect(),
            Err(e) => {
                warn!(error = %e, city = city.id, category, "Feature query failed");
                Vec::new()
            }
        }
    }
}

/// Features without a name or point geometry are dropped.
fn feature_to_poi(feature: &Feature, category: &str) -> Option<Poi> {
    let name = feature.text("name")?.to_string();
    let location = feature.point()?;
    Some(Poi {
        name,
        category: category.to_string(),
        location,
        address: feature.text("address").unwrap_or_default().to_string(),
        description: feature.text("description").unwrap_or_default().to_string(),
        rating: feature.attribute("rating").and_then(Value::as_f64),
        image_url: feature.text("image_url").map(str::to_string),
    })
}

/// Retrieve POIs for a city across categories.
#[derive(Clone)]
pub struct PoiService {
    source: Arc<dyn PoiSource>,
}

impl PoiService {
    pub fn new(source: Arc<dyn PoiSource>) -> Self {
        Self { source }
    }

    pub fn placeholder() -> Self {
        Self::new(Arc::new(PlaceholderSource))
    }

    /// POIs in category-list order, at most `limit` of them.
    pub async fn search(&self, city: &str, categories: &[String], limit: usize) -> Vec<Poi> {
        let Some(city_meta) = cities::city(city) else {
            debug!(city, "Unsupported city, no POIs");
            return Vec::new();
        };

        let default_categories = ["landmarks".to_string()];
        let categories = if categories.is_empty() {
            &default_categories[..]
        } else {
            categories
        };

        let mut results = Vec::new();
        for tag in categories {
            if results.len() >= limit {
                break;
            }
            let category = provider_category(tag);
            let found = self.source.fetch(city_meta, category, limit).await;
            debug!(
                source = self.source.name(),
                tag = %tag,
                category,
                count = found.len(),
                "Fetched POIs"
            );
            results.extend(found);
        }
        results.truncate(limit);

        info!(city, count = results.len(), source = self.source.name(), "POIs retrieved");
        results
    }
}
