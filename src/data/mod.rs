//! Read-only lookup tables, initialized once per process.

pub mod cities;
pub mod templates;

pub use cities::City;
pub use templates::{TourSummary, TourTemplate};
