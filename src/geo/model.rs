//! Geographic value types shared across the service.

use serde::{Deserialize, Serialize};

/// A WGS84 point. Serialized as `{"lat", "lng"}` for the map frontend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shift by the same delta on both axes.
    pub fn offset(&self, delta: f64) -> Self {
        Self::new(self.latitude + delta, self.longitude + delta)
    }

    /// Arithmetic mean of a set of points, `None` when empty.
    pub fn mean<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let (count, lat, lng) = points
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(n, lat, lng), p| {
                (n + 1, lat + p.latitude, lng + p.longitude)
            });
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self::new(lat / n, lng / n))
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// `xmin,ymin,xmax,ymax` envelope string for ArcGIS queries.
    pub fn envelope(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// A point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub category: String,
    pub location: Location,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}
