//! GeoExplore: AI-generated city tours backed by ArcGIS location services.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod llm;
pub mod tour;
