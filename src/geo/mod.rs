//! Geographic types and the ArcGIS location-service clients.

pub mod arcgis;
pub mod model;
pub mod route;

pub use arcgis::{ArcGisClient, Feature, FeatureQuery, GeocodeCandidate};
pub use model::{Bounds, Location, Poi};
pub use route::{Route, RouteService};
