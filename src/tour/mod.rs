//! Tour generation pipeline.
//!
//! Every chat request flows through:
//! 1. `IntentParser::parse()`: model call → structured intent (defaults on failure)
//! 2. `PoiService::search()`: category mapping → POI records
//! 3. `RouteService::optimise()`: remote best-sequence routing (fallback on failure)
//! 4. `NarrativeGenerator::generate()`: model call → tour prose
//!
//! `TourAgent` owns the ordering and assembles the response.

pub mod agent;
pub mod intent;
pub mod model;
pub mod narrative;
pub mod pois;
pub mod prompts;

pub use agent::TourAgent;
pub use model::{Intent, MapData, Tour, TourResponse, TourStop};
